mod audit;
mod direction;
mod order;
mod position;
mod rollup;
mod signal;
mod tier;

pub use audit::{Actor, AuditEvent, EntityType, EventType, GENESIS_HASH};
pub use direction::Direction;
pub use order::{OrderRecord, OrderSide, OrderState};
pub use position::{Position, PositionExit, PositionStatus};
pub use rollup::DisciplineRollup;
pub use signal::{FactorScores, SignalStatus, TradeSignal};
pub use tier::ConvictionTier;
