//! Conviction Core Domain
//!
//! Pure domain types for the conviction allocation engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Audit ledger types
    Actor,
    AuditEvent,
    ConvictionTier,
    Direction,
    // Rollup types
    DisciplineRollup,
    EntityType,
    EventType,
    FactorScores,
    GENESIS_HASH,
    // Execution correlation types
    OrderRecord,
    OrderSide,
    OrderState,
    // Core lifecycle entities
    Position,
    PositionExit,
    PositionStatus,
    SignalStatus,
    TradeSignal,
};
pub use values::{Price, Quantity, Symbol, Timestamp};
