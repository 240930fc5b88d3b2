//! Command-line flags that edit a draft.

use busmaint_core::{FormData, MaintenanceType};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Periodic,
    Fault,
}

impl From<TypeArg> for MaintenanceType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Periodic => MaintenanceType::Periodic,
            TypeArg::Fault => MaintenanceType::Fault,
        }
    }
}

/// Answer for one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Pass,
    Fail,
    Unset,
}

impl Answer {
    pub fn status(self) -> Option<bool> {
        match self {
            Answer::Pass => Some(true),
            Answer::Fail => Some(false),
            Answer::Unset => None,
        }
    }
}

/// General-information fields. Only flags that are given change the draft.
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    /// Vehicle plate, e.g. "34 ABC 123"
    #[arg(long)]
    pub plate: Option<String>,

    /// Maintenance date (DD/MM/YYYY)
    #[arg(long)]
    pub date: Option<String>,

    /// Odometer reading
    #[arg(long)]
    pub km: Option<String>,

    /// Maintenance type
    #[arg(long = "type", value_enum)]
    pub kind: Option<TypeArg>,

    /// Technician name
    #[arg(long)]
    pub technician: Option<String>,

    /// Description of the work performed
    #[arg(long)]
    pub work: Option<String>,
}

impl FieldArgs {
    pub fn apply(self, draft: &mut FormData) {
        if let Some(v) = self.plate {
            draft.plate = v;
        }
        if let Some(v) = self.date {
            draft.date = v;
        }
        if let Some(v) = self.km {
            draft.km = v;
        }
        if let Some(v) = self.kind {
            draft.kind = v.into();
        }
        if let Some(v) = self.technician {
            draft.technician = v;
        }
        if let Some(v) = self.work {
            draft.completed_work = v;
        }
    }
}
