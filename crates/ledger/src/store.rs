use conviction_core::AuditEvent;
use conviction_ports::{LedgerStore, StoreResult};

/// In-memory append-only store.
///
/// The default backing for tests and single-process deployments; durable
/// backends implement [`LedgerStore`] behind the same contract.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    rows: Vec<AuditEvent>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct row access, mainly for verification and tests
    pub fn rows(&self) -> &[AuditEvent] {
        &self.rows
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(&mut self, event: &AuditEvent) -> StoreResult<()> {
        self.rows.push(event.clone());
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<AuditEvent>> {
        Ok(self.rows.clone())
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn name(&self) -> &str {
        "MemoryLedgerStore"
    }
}
