//! Conviction Audit Ledger
//!
//! Append-only, hash-chained event store. Every lifecycle mutation is
//! committed only once its event lands here, so the chain is the single
//! total order of everything that ever happened to a signal or position.
//!
//! - `append` links each event to the current tip via `previous_hash`
//! - `verify` walks the chain from the root, recomputing every hash
//! - corruption is reported with its index, never silently repaired

pub mod chain;
pub mod hash;
pub mod store;

mod error;

pub use chain::{ChainStatus, CorruptionKind, Ledger};
pub use error::{LedgerError, LedgerResult};
pub use hash::{compute_event_hash, recompute_hash};
pub use store::MemoryLedgerStore;

// Re-export the storage port for implementers
pub use conviction_ports::{LedgerStore, StoreError};
