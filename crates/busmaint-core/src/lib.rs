//! Core types for bus maintenance inspections: records, drafts, the fixed
//! checklist catalog, and list search.

pub mod checklist;
mod error;
pub mod record;
pub mod search;

pub use checklist::{CheckSpec, Checklist, ChecklistKind, Tally};
pub use error::FormError;
pub use record::{CheckItem, FormData, MaintenanceRecord, MaintenanceType, MissingNotes, RecordStatus};
