use conviction_core::AuditEvent;

use crate::error::StoreResult;

/// Port for durable, append-only storage of audit ledger rows.
///
/// Implementations must treat a successful `append` as final: rows are never
/// updated or deleted, and `load` must return them in append order. A failed
/// append must leave the store unchanged - the caller rolls the whole
/// mutation back on error.
pub trait LedgerStore: Send + Sync {
    /// Persist one event at the end of the log
    fn append(&mut self, event: &AuditEvent) -> StoreResult<()>;

    /// Load every stored event in append order
    fn load(&self) -> StoreResult<Vec<AuditEvent>>;

    /// Number of stored events
    fn len(&self) -> usize;

    /// Is the store empty?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the store's name/identifier for debugging
    fn name(&self) -> &str {
        "LedgerStore"
    }
}
