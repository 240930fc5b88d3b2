//! The persisted record collection.
//!
//! All records live in one JSON array under [`STORAGE_KEY`]. Every write
//! rewrites the whole array in a single backend call.

use std::collections::HashSet;
use std::sync::Arc;

use busmaint_core::MaintenanceRecord;
use tracing::{debug, info, warn};

use crate::StoreError;
use crate::backend::KeyValueBackend;

/// Key the mobile app has always used for the collection.
pub const STORAGE_KEY: &str = "maintenanceRecords";

/// Durable storage of the full record collection.
///
/// Cloning is cheap; clones share the backend.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueBackend>,
    key: String,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn KeyValueBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records in insertion order, or [`StoreError::Decode`] if the
    /// stored value is not a valid record array.
    ///
    /// A missing or blank value is an empty collection.
    pub async fn try_get_all_records(&self) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let raw = self
            .backend
            .get_item(&self.key)
            .await
            .map_err(|source| StoreError::Read {
                key: self.key.clone(),
                source,
            })?;

        let records = match raw {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str::<Vec<MaintenanceRecord>>(&raw).map_err(StoreError::Decode)?
            }
            _ => Vec::new(),
        };
        debug!(key = %self.key, count = records.len(), "loaded records");
        Ok(records)
    }

    /// All records in insertion order. Unreadable or corrupt storage yields an
    /// empty collection; the cause is only logged.
    pub async fn get_all_records(&self) -> Vec<MaintenanceRecord> {
        match self.try_get_all_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %self.key, error = %e, "treating unreadable records as empty");
                Vec::new()
            }
        }
    }

    /// Append one record to the stored collection.
    ///
    /// Fails without writing if the stored value cannot be decoded, so a
    /// corrupt collection is never silently replaced by this call.
    pub async fn save_record(&self, record: MaintenanceRecord) -> Result<(), StoreError> {
        let mut records = self.try_get_all_records().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        let id = record.id;
        records.push(record);
        self.replace_all(&records).await?;
        info!(id, count = records.len(), "appended record");
        Ok(())
    }

    /// Replace the stored collection with `records` in one write.
    pub async fn replace_all(&self, records: &[MaintenanceRecord]) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id)) {
            return Err(StoreError::DuplicateId(dup.id));
        }

        let json = serde_json::to_string(records).map_err(StoreError::Encode)?;
        self.backend
            .set_item(&self.key, &json)
            .await
            .map_err(|source| StoreError::Write {
                key: self.key.clone(),
                source,
            })?;
        info!(key = %self.key, count = records.len(), bytes = json.len(), "stored records");
        Ok(())
    }

    /// Remove the stored collection entirely.
    pub async fn clear_records(&self) -> Result<(), StoreError> {
        self.backend
            .remove_item(&self.key)
            .await
            .map_err(|source| StoreError::Write {
                key: self.key.clone(),
                source,
            })?;
        info!(key = %self.key, "cleared all records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileBackend, MemoryBackend, ReadOnlyBackend};
    use busmaint_core::{CheckItem, FormData, MaintenanceType};

    fn sample(id: i64, plate: &str) -> MaintenanceRecord {
        let mut form = FormData {
            plate: plate.into(),
            date: "12/03/2025".into(),
            km: "125000".into(),
            kind: MaintenanceType::Fault,
            technician: "Ahmet Yılmaz".into(),
            completed_work: "Replaced brake pads".into(),
            ..Default::default()
        };
        form.checks.insert("brakePads".into(), CheckItem::failed("worn to 2mm"));
        form.post_tests.insert("brakePerformance".into(), CheckItem::passed());
        MaintenanceRecord::new(id, form)
    }

    fn memory_store() -> (Arc<MemoryBackend>, RecordStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = RecordStore::new(backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn empty_store_has_no_records() {
        let (_, store) = memory_store();
        assert!(store.get_all_records().await.is_empty());
        assert!(store.try_get_all_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let (_, store) = memory_store();
        let record = sample(1, "34 ABC 1");
        store.save_record(record.clone()).await.unwrap();

        let all = store.get_all_records().await;
        assert_eq!(all, vec![record]);
    }

    #[tokio::test]
    async fn save_appends_in_order() {
        let (_, store) = memory_store();
        store.save_record(sample(3, "A")).await.unwrap();
        store.save_record(sample(1, "B")).await.unwrap();
        store.save_record(sample(2, "C")).await.unwrap();

        let ids: Vec<i64> = store.get_all_records().await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_id() {
        let (_, store) = memory_store();
        store.save_record(sample(5, "A")).await.unwrap();
        let result = store.save_record(sample(5, "B")).await;
        assert!(matches!(result, Err(StoreError::DuplicateId(5))));
        assert_eq!(store.get_all_records().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_empty() {
        let backend = Arc::new(MemoryBackend::with_item(STORAGE_KEY, "{not json"));
        let store = RecordStore::new(backend);

        assert!(store.get_all_records().await.is_empty());
        // Calling again behaves the same.
        assert!(store.get_all_records().await.is_empty());
        assert!(matches!(
            store.try_get_all_records().await,
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn blank_value_reads_as_empty() {
        let backend = Arc::new(MemoryBackend::with_item(STORAGE_KEY, "  "));
        let store = RecordStore::new(backend);
        assert!(store.try_get_all_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_record_leaves_corrupt_value_alone() {
        let backend = Arc::new(MemoryBackend::with_item(STORAGE_KEY, "garbage"));
        let store = RecordStore::new(backend.clone());

        let result = store.save_record(sample(1, "A")).await;
        assert!(matches!(result, Err(StoreError::Decode(_))));
        assert_eq!(backend.raw(STORAGE_KEY).as_deref(), Some("garbage"));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let (backend, store) = memory_store();
        store.save_record(sample(1, "A")).await.unwrap();
        store.save_record(sample(2, "B")).await.unwrap();

        store.clear_records().await.unwrap();
        assert!(store.get_all_records().await.is_empty());
        assert_eq!(backend.raw(STORAGE_KEY), None);
    }

    #[tokio::test]
    async fn clear_after_corruption() {
        let backend = Arc::new(MemoryBackend::with_item(STORAGE_KEY, "[[["));
        let store = RecordStore::new(backend);
        store.clear_records().await.unwrap();
        assert!(store.try_get_all_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_all_rejects_duplicates() {
        let (backend, store) = memory_store();
        let result = store
            .replace_all(&[sample(1, "A"), sample(2, "B"), sample(1, "C")])
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateId(1))));
        assert_eq!(backend.raw(STORAGE_KEY), None);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let store = RecordStore::new(Arc::new(ReadOnlyBackend::default()));
        let result = store.save_record(sample(1, "A")).await;
        assert!(matches!(result, Err(StoreError::Write { .. })));
        assert!(store.get_all_records().await.is_empty());
    }

    #[tokio::test]
    async fn custom_key_is_isolated() {
        let backend = Arc::new(MemoryBackend::new());
        let main = RecordStore::new(backend.clone());
        let other = RecordStore::with_key(backend, "archivedRecords");

        other.save_record(sample(1, "A")).await.unwrap();
        assert!(main.get_all_records().await.is_empty());
        assert_eq!(other.get_all_records().await.len(), 1);
        assert_eq!(other.key(), "archivedRecords");
    }

    #[tokio::test]
    async fn file_backed_store_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let record = sample(1_738_000_000_000, "34 ABC 1");

        let store = RecordStore::new(Arc::new(FileBackend::open(tmp.path()).await.unwrap()));
        store.save_record(record.clone()).await.unwrap();
        drop(store);

        let store = RecordStore::new(Arc::new(FileBackend::open(tmp.path()).await.unwrap()));
        assert_eq!(store.get_all_records().await, vec![record]);
    }

    #[tokio::test]
    async fn reads_collection_written_by_app() {
        let json = r#"[{"plate":"34 ABC 1","date":"","km":"","type":"Periyodik","technician":"",
            "checks":{},"completedWork":"","postTests":{},"id":1,"status":"pending"}]"#;
        let backend = Arc::new(MemoryBackend::with_item(STORAGE_KEY, json));
        let store = RecordStore::new(backend);
        let all = store.try_get_all_records().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].form.plate, "34 ABC 1");
    }
}
