//! Bridges editable drafts and the record store.
//!
//! The reconciler owns identity assignment and the merge policy: a save with
//! no record id appends a new `pending` record, a save with an id overlays
//! the draft onto that record and keeps its `id` and `status`. Either way the
//! full collection is written back in one call, so a failed save leaves the
//! stored collection exactly as it was. Saves read strictly: if the stored
//! collection cannot be read or decoded, nothing is written.

use busmaint_core::{FormData, MaintenanceRecord, RecordStatus};
use tracing::info;

use crate::{RecordStore, StoreError};

/// Source of the current time in epoch milliseconds.
pub type Clock = fn() -> i64;

fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Identity for a new record: the clock reading, bumped past every existing
/// id so two creations in the same millisecond still differ.
fn next_id(now: i64, records: &[MaintenanceRecord]) -> Result<i64, StoreError> {
    match records.iter().map(|r| r.id).max() {
        Some(max) if max >= now => max.checked_add(1).ok_or(StoreError::IdExhausted(max)),
        _ => Ok(now),
    }
}

pub struct FormReconciler {
    store: RecordStore,
    clock: Clock,
}

impl FormReconciler {
    pub fn new(store: RecordStore) -> Self {
        Self::with_clock(store, wall_clock_ms)
    }

    pub fn with_clock(store: RecordStore, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Draft to edit.
    ///
    /// `None` gives the default draft. `Some(id)` gives the stored record's
    /// fields over the default shape, or [`StoreError::NotFound`].
    pub async fn load_for_edit(&self, record_id: Option<i64>) -> Result<FormData, StoreError> {
        let Some(id) = record_id else {
            return Ok(FormData::default());
        };
        let records = self.store.try_get_all_records().await?;
        records
            .iter()
            .find(|r| r.id == id)
            .map(MaintenanceRecord::to_draft)
            .ok_or(StoreError::NotFound(id))
    }

    /// Persist `draft`, creating a record when `record_id` is `None`.
    ///
    /// Returns the record as stored.
    pub async fn save(
        &self,
        draft: &FormData,
        record_id: Option<i64>,
    ) -> Result<MaintenanceRecord, StoreError> {
        let mut records = self.store.try_get_all_records().await?;
        let draft = draft.clone().normalized();

        let saved = match record_id {
            Some(id) => {
                let record = records
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or(StoreError::NotFound(id))?;
                record.merge(draft);
                record.clone()
            }
            None => {
                let id = next_id((self.clock)(), &records)?;
                let record = MaintenanceRecord::new(id, draft);
                records.push(record.clone());
                record
            }
        };

        self.store.replace_all(&records).await?;
        info!(
            id = saved.id,
            created = record_id.is_none(),
            count = records.len(),
            "saved maintenance record"
        );
        Ok(saved)
    }

    /// Move a record to `status`, leaving every other field untouched.
    pub async fn set_status(
        &self,
        record_id: i64,
        status: RecordStatus,
    ) -> Result<MaintenanceRecord, StoreError> {
        let mut records = self.store.try_get_all_records().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(StoreError::NotFound(record_id))?;
        record.status = status;
        let updated = record.clone();

        self.store.replace_all(&records).await?;
        info!(id = record_id, %status, "updated record status");
        Ok(updated)
    }
}
