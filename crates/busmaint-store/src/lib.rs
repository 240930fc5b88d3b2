//! Storage layer: key-value backends, the persisted record collection, and
//! the form reconciler that merges drafts into it.

pub mod backend;
mod error;
mod reconcile;
mod records;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::{BackendError, StoreError};
pub use reconcile::{Clock, FormReconciler};
pub use records::{RecordStore, STORAGE_KEY};
