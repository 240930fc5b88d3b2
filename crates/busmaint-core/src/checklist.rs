//! The fixed inspection catalog.
//!
//! Every record carries two checklists keyed by stable item names: 17
//! pre-maintenance checks and 8 post-maintenance tests. Keys are part of the
//! persisted JSON and must never be renamed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::FormError;
use crate::record::CheckItem;

/// Answers keyed by catalog item name.
pub type Checklist = BTreeMap<String, CheckItem>;

/// One question in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub group: &'static str,
}

const fn item(key: &'static str, label: &'static str, group: &'static str) -> CheckSpec {
    CheckSpec { key, label, group }
}

const BODY: &str = "Body and chassis";
const ENGINE: &str = "Engine and fuel system";
const BRAKES: &str = "Brakes and suspension";
const ELECTRICAL: &str = "Electrical and lighting";

pub const PRE_CHECKS: &[CheckSpec] = &[
    item("bodywork", "Bodywork (scratches, dents, rust)", BODY),
    item("windows", "Windows and mirrors", BODY),
    item("tireTread", "Tire tread depth", BODY),
    item("tirePressure", "Tire pressure", BODY),
    item("wheels", "Rims and wheel nuts", BODY),
    item("oilLevel", "Engine oil level", ENGINE),
    item("coolant", "Coolant / antifreeze", ENGINE),
    item("fuelFilter", "Fuel filter", ENGINE),
    item("airFilter", "Air filter", ENGINE),
    item("exhaust", "Exhaust system leaks", ENGINE),
    item("brakePads", "Brake pads", BRAKES),
    item("brakeFluid", "Brake fluid", BRAKES),
    item("shockAbsorbers", "Shock absorbers", BRAKES),
    item("tierods", "Tie rod ends", BRAKES),
    item("battery", "Battery voltage (12.6V+)", ELECTRICAL),
    item("lights", "Head and signal lights", ELECTRICAL),
    item("ac", "Air conditioning", ELECTRICAL),
];

const ENGINE_RUN: &str = "Engine run test";
const TEST_DRIVE: &str = "Test drive (10 km)";
const FINAL: &str = "Final checks";

pub const POST_TESTS: &[CheckSpec] = &[
    item("idleBalance", "Idle balance", ENGINE_RUN),
    item("temperature", "Engine temperature", ENGINE_RUN),
    item("abnormalSounds", "Abnormal sound / vibration", ENGINE_RUN),
    item("brakePerformance", "Brake performance", TEST_DRIVE),
    item("gearShifts", "Gear shifts", TEST_DRIVE),
    item("steering", "Steering alignment", TEST_DRIVE),
    item("leaks", "Fluid leaks", FINAL),
    item("obdScan", "OBD-II fault scan", FINAL),
];

/// Which of the two checklists on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistKind {
    /// Pre-maintenance checks, stored under `checks`.
    Checks,
    /// Post-maintenance tests, stored under `postTests`.
    PostTests,
}

impl ChecklistKind {
    pub const ALL: [ChecklistKind; 2] = [ChecklistKind::Checks, ChecklistKind::PostTests];

    pub fn catalog(self) -> &'static [CheckSpec] {
        match self {
            Self::Checks => PRE_CHECKS,
            Self::PostTests => POST_TESTS,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Checks => "Pre-maintenance checks",
            Self::PostTests => "Post-maintenance tests",
        }
    }

    pub fn spec(self, key: &str) -> Option<&'static CheckSpec> {
        self.catalog().iter().find(|s| s.key == key)
    }

    /// Every catalog key, all unanswered.
    pub fn default_checklist(self) -> Checklist {
        self.catalog()
            .iter()
            .map(|s| (s.key.to_string(), CheckItem::default()))
            .collect()
    }
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checks => f.write_str("checks"),
            Self::PostTests => f.write_str("post-tests"),
        }
    }
}

impl FromStr for ChecklistKind {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checks" | "pre" => Ok(Self::Checks),
            "post-tests" | "posttests" | "post" => Ok(Self::PostTests),
            _ => Err(FormError::UnknownChecklist(s.to_string())),
        }
    }
}

/// Overlay stored answers onto the default shape.
///
/// Missing keys come back unanswered; keys outside the catalog are dropped.
pub fn normalize(kind: ChecklistKind, mut stored: Checklist) -> Checklist {
    let mut out = kind.default_checklist();
    for (key, slot) in out.iter_mut() {
        if let Some(item) = stored.remove(key) {
            *slot = item;
        }
    }
    if !stored.is_empty() {
        let dropped: Vec<&str> = stored.keys().map(String::as_str).collect();
        warn!(checklist = %kind, ?dropped, "dropping unknown checklist items");
    }
    out
}

/// Passed / failed / unanswered counts for one checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub unset: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.unset
    }
}

pub fn tally(list: &Checklist) -> Tally {
    let mut t = Tally::default();
    for item in list.values() {
        match item.status {
            Some(true) => t.passed += 1,
            Some(false) => t.failed += 1,
            None => t.unset += 1,
        }
    }
    t
}
