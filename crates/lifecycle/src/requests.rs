//! Boundary messages consumed from external collaborators.
//!
//! Collaborators hand the core validated, normalized inputs; the core turns
//! them into ledger-committed state transitions.

use chrono::{DateTime, Utc};
use conviction_core::{Direction, FactorScores, Symbol};
use conviction_scoring::FilerHistory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw candidate signal from an ingestion source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSubmission {
    /// Provenance tag (e.g. "insider", "congressional", "13f")
    pub source: String,
    pub symbol: Symbol,
    pub direction: Direction,
    pub filer_name: Option<String>,
    pub filer_id: Option<String>,
    /// Track record of the filer, when the source has one
    pub filer_history: Option<FilerHistory>,
    pub transaction_at: Option<DateTime<Utc>>,
    pub filed_at: Option<DateTime<Utc>>,
    pub shares: Option<Decimal>,
    pub price: Option<Decimal>,
    pub transaction_value: Decimal,
    /// Pre-scored sources may supply factors directly; otherwise they are
    /// derived from the raw attributes above
    pub factors: Option<FactorScores>,
    /// Opaque source payload, kept for audit
    pub raw_payload: serde_json::Value,
}

/// An allocation decision asking for a position against active signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRequest {
    pub symbol: Symbol,
    pub direction: Direction,
    /// Signals to consume; must be non-empty and all ACTIVE
    pub signal_ids: Vec<Uuid>,
    pub shares: Decimal,
    pub entry_price: Decimal,
    /// Which doctrine drove this allocation
    pub philosophy: String,
}

/// Exit confirmation from the execution collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillNotice {
    pub position_id: Uuid,
    pub exit_price: Decimal,
    pub exit_at: DateTime<Utc>,
    /// Broker-reported PnL; the core recomputes and logs any mismatch
    pub realized_pnl: Decimal,
}
