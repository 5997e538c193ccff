use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel `previous_hash` for the first event in a chain
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Who drove a recorded mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// Normal policy-driven path
    System,
    /// Periodic sweep / round-boundary evaluation
    Sweep,
    /// Manual operator action inside policy
    Operator,
    /// Manual action bypassing a policy precondition - audited, not blocked
    Override,
}

impl Actor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::System => "system",
            Actor::Sweep => "sweep",
            Actor::Operator => "operator",
            Actor::Override => "override",
        }
    }

    /// Does this actor mark a policy bypass?
    pub fn is_override(&self) -> bool {
        matches!(self, Actor::Override)
    }
}

/// Which record set an event mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Signal,
    Position,
    Order,
    Rollup,
}

/// Lifecycle event kinds recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    SignalCreated,
    SignalExpired,
    /// Composite event: position created and all source signals consumed
    PositionOpened,
    PositionExtended,
    PositionClosed,
    PositionRetired,
    OrderRecorded,
    OrderFilled,
    OrderRejected,
    RollupRecorded,
}

/// One immutable ledger entry.
///
/// `event_hash` covers the before/after snapshots, the event identity fields
/// and `previous_hash`, so the sequence forms a singly-linked chain rooted at
/// [`GENESIS_HASH`]. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Monotonically increasing position in the chain, starting at 0
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub entity_type: EntityType,
    /// Id of the mutated entity (uuid for entities, ISO date for rollups)
    pub entity_id: String,
    pub actor: Actor,
    /// Short label for the transition, e.g. "open", "extend_round"
    pub action: String,
    /// Entity snapshot before the mutation; `None` on creation
    pub before_state: Option<serde_json::Value>,
    /// Entity snapshot after the mutation
    pub after_state: serde_json::Value,
    /// hex(SHA-256) over this event's hashed fields
    pub event_hash: String,
    /// `event_hash` of the previous event, or [`GENESIS_HASH`]
    pub previous_hash: String,
}

impl AuditEvent {
    /// Is this the chain root?
    pub fn is_root(&self) -> bool {
        self.previous_hash == GENESIS_HASH
    }
}
