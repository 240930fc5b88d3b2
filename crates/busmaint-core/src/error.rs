use thiserror::Error;

use crate::checklist::ChecklistKind;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown {kind} item: {key}")]
    UnknownCheck { kind: ChecklistKind, key: String },

    #[error("unknown checklist `{0}` (expected `checks` or `post-tests`)")]
    UnknownChecklist(String),
}
