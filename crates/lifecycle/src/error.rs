//! Lifecycle Manager errors - the caller-facing taxonomy

use conviction_ledger::LedgerError;
use conviction_scoring::ScoringError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed scoring input - rejected at ingestion, no record created
    #[error("Invalid factor: {0}")]
    InvalidFactor(#[source] ScoringError),

    /// The same source transaction was already ingested; no new record
    #[error("Duplicate signal: already ingested as {existing_id}")]
    DuplicateSignal { existing_id: Uuid },

    /// Signal not ACTIVE at open time - rejected, no partial state
    #[error("Signal {signal_id} is not available")]
    SignalUnavailable { signal_id: Uuid },

    /// allocation_power has been throttled to zero - retriable later
    #[error("Allocation throttled: power is {power}")]
    AllocationThrottled { power: Decimal },

    /// Concurrent-mutation loser - re-read current state and retry
    #[error("Stale state for {entity_id}: {detail}")]
    StaleState { entity_id: Uuid, detail: String },

    /// Request failed validation before touching any state
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced entity does not exist
    #[error("Unknown entity: {entity_id}")]
    UnknownEntity { entity_id: Uuid },

    /// Ledger append failed - the triggering mutation was fully rolled back
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The event log could not be folded back into entity state
    #[error(transparent)]
    Replay(#[from] crate::replay::ReplayError),
}

pub type Result<T> = std::result::Result<T, Error>;
