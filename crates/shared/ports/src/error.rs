use thiserror::Error;

/// Storage-level errors for ledger row persistence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Append rejected: {0}")]
    AppendRejected(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
