//! Free-text filtering for the record list.
//!
//! A term matches a record when it appears, case-insensitively, in the plate,
//! the technician name, or the maintenance type. The type matches on both the
//! stored label ("Periyodik", "Arıza") and its English name.

use crate::record::MaintenanceRecord;

/// Whether `record` matches the search `term`. An empty term matches everything.
pub fn matches(record: &MaintenanceRecord, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let form = &record.form;
    [
        form.plate.as_str(),
        form.technician.as_str(),
        form.kind.label(),
        form.kind.name(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Records matching `term`, in their stored order.
pub fn filter<'a>(records: &'a [MaintenanceRecord], term: &str) -> Vec<&'a MaintenanceRecord> {
    records.iter().filter(|r| matches(r, term)).collect()
}
