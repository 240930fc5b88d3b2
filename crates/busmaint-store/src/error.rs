use thiserror::Error;

/// Failure inside a key-value backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("backend lock poisoned")]
    Poisoned,

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored records are not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to write `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("no maintenance record with id {0}")]
    NotFound(i64),

    #[error("duplicate maintenance record id {0}")]
    DuplicateId(i64),

    #[error("no record id available after {0}")]
    IdExhausted(i64),
}
