//! Maintenance record and draft types shared by the store and the CLI.
//!
//! The JSON shape matches what the mobile app has always written under the
//! `maintenanceRecords` key: camelCase keys, `type` as `"Periyodik"`/`"Arıza"`,
//! and unanswered checks as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::checklist::{self, Checklist, ChecklistKind};
use crate::error::FormError;

/// Kind of inspection: scheduled service or a repair after a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaintenanceType {
    #[default]
    #[serde(rename = "Periyodik", alias = "Periodic")]
    Periodic,
    #[serde(rename = "Arıza", alias = "Fault")]
    Fault,
}

impl MaintenanceType {
    /// The label stored on disk and shown on record cards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Periodic => "Periyodik",
            Self::Fault => "Arıza",
        }
    }

    /// English name, accepted by search alongside the stored label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Periodic => "Periodic",
            Self::Fault => "Fault",
        }
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Completed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Answer to one inspection question.
///
/// `status` is tri-state: `Some(true)` passed, `Some(false)` failed, `None`
/// not answered yet. `notes` only matters for failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub status: Option<bool>,
    #[serde(default)]
    pub notes: String,
}

impl CheckItem {
    pub fn passed() -> Self {
        Self {
            status: Some(true),
            notes: String::new(),
        }
    }

    pub fn failed(notes: impl Into<String>) -> Self {
        Self {
            status: Some(false),
            notes: notes.into(),
        }
    }

    /// A failure with no justification written down.
    pub fn missing_notes(&self) -> bool {
        self.status == Some(false) && self.notes.trim().is_empty()
    }
}

/// Editable form state for one record (the draft).
///
/// Carries every field of a [`MaintenanceRecord`] except `id` and `status`,
/// which only the store assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub km: String,
    #[serde(rename = "type", default)]
    pub kind: MaintenanceType,
    #[serde(default)]
    pub technician: String,
    #[serde(default = "default_checks")]
    pub checks: Checklist,
    #[serde(default)]
    pub completed_work: String,
    #[serde(default = "default_post_tests")]
    pub post_tests: Checklist,
}

fn default_checks() -> Checklist {
    ChecklistKind::Checks.default_checklist()
}

fn default_post_tests() -> Checklist {
    ChecklistKind::PostTests.default_checklist()
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            plate: String::new(),
            date: String::new(),
            km: String::new(),
            kind: MaintenanceType::Periodic,
            technician: String::new(),
            checks: default_checks(),
            completed_work: String::new(),
            post_tests: default_post_tests(),
        }
    }
}

/// A failed item with blank notes, reported by [`FormData::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNotes {
    pub kind: ChecklistKind,
    pub key: &'static str,
}

impl FormData {
    pub fn checklist(&self, kind: ChecklistKind) -> &Checklist {
        match kind {
            ChecklistKind::Checks => &self.checks,
            ChecklistKind::PostTests => &self.post_tests,
        }
    }

    pub fn checklist_mut(&mut self, kind: ChecklistKind) -> &mut Checklist {
        match kind {
            ChecklistKind::Checks => &mut self.checks,
            ChecklistKind::PostTests => &mut self.post_tests,
        }
    }

    /// Record an answer for one fixed item.
    ///
    /// `notes = None` keeps whatever notes the item already had.
    pub fn set_check(
        &mut self,
        kind: ChecklistKind,
        key: &str,
        status: Option<bool>,
        notes: Option<String>,
    ) -> Result<(), FormError> {
        if kind.spec(key).is_none() {
            return Err(FormError::UnknownCheck {
                kind,
                key: key.to_string(),
            });
        }
        let item = self.checklist_mut(kind).entry(key.to_string()).or_default();
        item.status = status;
        if let Some(notes) = notes {
            item.notes = notes;
        }
        Ok(())
    }

    /// Bring both checklists back to exactly the fixed key sets.
    pub fn normalized(mut self) -> Self {
        self.checks = checklist::normalize(ChecklistKind::Checks, self.checks);
        self.post_tests = checklist::normalize(ChecklistKind::PostTests, self.post_tests);
        self
    }

    /// Failed items that have no notes, in catalog order.
    ///
    /// Advisory only; saving does not require a clean result.
    pub fn validate(&self) -> Vec<MissingNotes> {
        let mut issues = Vec::new();
        for kind in ChecklistKind::ALL {
            let list = self.checklist(kind);
            for spec in kind.catalog() {
                if list.get(spec.key).is_some_and(CheckItem::missing_notes) {
                    issues.push(MissingNotes {
                        kind,
                        key: spec.key,
                    });
                }
            }
        }
        issues
    }
}

/// One persisted inspection event.
///
/// Stored fields this crate does not model land in `extra` and are written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: i64,
    pub status: RecordStatus,
    #[serde(flatten)]
    pub form: FormData,
    // Must follow `form`: it receives only the keys `form` left unclaimed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MaintenanceRecord {
    /// A freshly created record: always `pending`.
    pub fn new(id: i64, form: FormData) -> Self {
        Self {
            id,
            status: RecordStatus::Pending,
            form,
            extra: Map::new(),
        }
    }

    /// Overlay draft fields onto this record. `id`, `status`, and unmodelled
    /// fields are kept.
    pub fn merge(&mut self, draft: FormData) {
        self.form = draft;
    }

    /// The editable view of this record, with `id` and `status` stripped.
    pub fn to_draft(&self) -> FormData {
        self.form.clone().normalized()
    }
}
