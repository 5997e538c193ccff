//! State reconstruction from the audit log alone.
//!
//! The ledger is the system of record: replaying its events must reproduce
//! the manager's current-state tables exactly. This is the consistency check
//! behind the split between the mutable "current state" maps and the
//! immutable event log.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::NaiveDate;
use conviction_core::{
    AuditEvent, DisciplineRollup, EventType, OrderRecord, Position, SignalStatus, TradeSignal,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Malformed event at sequence {sequence}: {detail}")]
    Malformed { sequence: u64, detail: String },
}

/// Entity state rebuilt purely from the event log
#[derive(Debug, Default, PartialEq)]
pub struct ReplayState {
    pub signals: HashMap<Uuid, TradeSignal>,
    pub positions: HashMap<Uuid, Position>,
    pub orders: HashMap<Uuid, OrderRecord>,
    pub rollups: BTreeMap<NaiveDate, DisciplineRollup>,
}

fn malformed(event: &AuditEvent, detail: impl ToString) -> ReplayError {
    ReplayError::Malformed {
        sequence: event.sequence,
        detail: detail.to_string(),
    }
}

fn parse_after<T: serde::de::DeserializeOwned>(event: &AuditEvent) -> Result<T, ReplayError> {
    serde_json::from_value(event.after_state.clone()).map_err(|e| malformed(event, e))
}

/// Fold a committed event sequence into entity state.
///
/// The composite `PositionOpened` event is applied to both sides: the
/// position is inserted and every listed source signal flips to CONSUMED.
pub fn replay(events: &[AuditEvent]) -> Result<ReplayState, ReplayError> {
    let mut state = ReplayState::default();
    for event in events {
        match event.event_type {
            EventType::SignalCreated | EventType::SignalExpired => {
                let signal: TradeSignal = parse_after(event)?;
                state.signals.insert(signal.id, signal);
            }
            EventType::PositionOpened => {
                let position: Position = serde_json::from_value(
                    event
                        .after_state
                        .get("position")
                        .cloned()
                        .ok_or_else(|| malformed(event, "missing position snapshot"))?,
                )
                .map_err(|e| malformed(event, e))?;
                let consumed: Vec<String> = serde_json::from_value(
                    event
                        .after_state
                        .get("consumed_signals")
                        .cloned()
                        .ok_or_else(|| malformed(event, "missing consumed_signals"))?,
                )
                .map_err(|e| malformed(event, e))?;
                for raw in consumed {
                    let signal_id = Uuid::from_str(&raw).map_err(|e| malformed(event, e))?;
                    let signal = state
                        .signals
                        .get_mut(&signal_id)
                        .ok_or_else(|| malformed(event, format!("unknown signal {signal_id}")))?;
                    signal.status = SignalStatus::Consumed;
                }
                state.positions.insert(position.id, position);
            }
            EventType::PositionExtended
            | EventType::PositionClosed
            | EventType::PositionRetired => {
                let position: Position = parse_after(event)?;
                state.positions.insert(position.id, position);
            }
            EventType::OrderRecorded | EventType::OrderFilled | EventType::OrderRejected => {
                let order: OrderRecord = parse_after(event)?;
                state.orders.insert(order.id, order);
            }
            EventType::RollupRecorded => {
                let rollup: DisciplineRollup = parse_after(event)?;
                state.rollups.insert(rollup.date, rollup);
            }
        }
    }
    Ok(state)
}
