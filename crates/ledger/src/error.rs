use conviction_ports::StoreError;
use thiserror::Error;

/// Ledger-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The storage layer refused the row; the triggering mutation must be
    /// rolled back in full - nothing is partially visible.
    #[error("Ledger append failed: {0}")]
    AppendFailed(#[from] StoreError),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
