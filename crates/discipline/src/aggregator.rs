use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use conviction_core::{AuditEvent, DisciplineRollup, EventType, Position, TradeSignal};
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use crate::config::PowerConfig;
use crate::error::{DisciplineError, DisciplineResult};

/// Consensus score at or above which a signal counts as cluster-backed
const CLUSTER_CONSENSUS: Decimal = dec!(0.6);
/// Decimal places kept on averaged returns
const RETURN_DP: u32 = 6;
/// Decimal places kept on averaged metrics and on power
const METRIC_DP: u32 = 4;

/// Folds daily audit events into discipline rollups and publishes the
/// latest one for read-through consumers.
///
/// The fold itself is pure: state lives in the ledger and in the rollup
/// history the caller passes back in, never in the aggregator.
pub struct DisciplineAggregator {
    config: PowerConfig,
    current: Arc<RwLock<DisciplineRollup>>,
}

impl DisciplineAggregator {
    pub fn new(config: PowerConfig) -> Self {
        Self {
            config,
            current: Arc::new(RwLock::new(DisciplineRollup::empty(NaiveDate::default()))),
        }
    }

    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Fold one date's events into its rollup.
    ///
    /// `history` is the already-recorded rollups for earlier dates; only the
    /// trailing window feeds the violation rate. Idempotent: recomputing a
    /// date with the same events and history yields the same rollup.
    pub fn rollup(
        &self,
        date: NaiveDate,
        events: &[AuditEvent],
        history: &[DisciplineRollup],
    ) -> DisciplineResult<DisciplineRollup> {
        let mut rollup = DisciplineRollup::empty(date);
        let mut round_returns: Vec<Decimal> = Vec::new();
        let mut extension_metrics: Vec<Decimal> = Vec::new();

        for event in events {
            rollup.decisions_logged += 1;
            if event.actor.is_override() {
                rollup.intuition_overrides += 1;
            }

            match event.event_type {
                EventType::SignalCreated => {
                    let signal: TradeSignal = parse(event, &event.after_state)?;
                    if signal.factors.consensus >= CLUSTER_CONSENSUS {
                        rollup.cluster_signals_detected += 1;
                    }
                }
                EventType::PositionOpened => {
                    let position = parse_opened(event)?;
                    if event.actor.is_override() {
                        rollup.opens_without_safety += 1;
                    } else {
                        rollup.opens_with_safety += 1;
                    }
                    if position.source_signals.len() > 1 {
                        rollup.cluster_positions_taken += 1;
                    }
                    record_violations(&mut rollup, event, 0, position.discipline_violations);
                }
                EventType::PositionExtended => {
                    let position: Position = parse(event, &event.after_state)?;
                    rollup.positions_extended += 1;
                    if let Some(metric) = position.extension_metric {
                        extension_metrics.push(metric);
                    }
                    record_violations(
                        &mut rollup,
                        event,
                        before_violations(event)?,
                        position.discipline_violations,
                    );
                }
                EventType::PositionClosed | EventType::PositionRetired => {
                    let position: Position = parse(event, &event.after_state)?;
                    if event.event_type == EventType::PositionRetired {
                        rollup.positions_retired += 1;
                    }
                    if let Some(exit) = &position.exit {
                        round_returns.push(exit.return_pct);
                    }
                }
                EventType::SignalExpired
                | EventType::OrderRecorded
                | EventType::OrderFilled
                | EventType::OrderRejected
                | EventType::RollupRecorded => {}
            }
        }

        rollup.avg_round_return = mean(&round_returns, RETURN_DP);
        rollup.avg_extension_metric = mean(&extension_metrics, METRIC_DP);
        rollup.allocation_power = self.allocation_power(
            date,
            rollup.rule_violations,
            rollup.decisions_logged,
            history,
        );

        debug!(
            "[DISCIPLINE] rollup {}: {} decisions, {} violations, power {}",
            date, rollup.decisions_logged, rollup.rule_violations, rollup.allocation_power
        );
        Ok(rollup)
    }

    /// Throttle from the trailing-window violation rate.
    ///
    /// Monotone non-increasing in the rate; a window with no violations
    /// restores full power.
    fn allocation_power(
        &self,
        date: NaiveDate,
        today_violations: u32,
        today_decisions: u32,
        history: &[DisciplineRollup],
    ) -> Decimal {
        let window_start = date - Duration::days(self.config.trailing_window_days - 1);
        let mut violations = Decimal::from(today_violations);
        let mut decisions = Decimal::from(today_decisions);
        for past in history {
            if past.date >= window_start && past.date < date {
                violations += Decimal::from(past.rule_violations);
                decisions += Decimal::from(past.decisions_logged);
            }
        }
        if decisions.is_zero() {
            return Decimal::ONE;
        }
        let rate = violations / decisions;
        (Decimal::ONE - self.config.penalty_slope * rate)
            .clamp(self.config.floor, Decimal::ONE)
            .round_dp(METRIC_DP)
    }

    /// Make a rollup the published current one.
    pub async fn publish(&self, rollup: DisciplineRollup) {
        info!(
            "[DISCIPLINE] published rollup {}: power={} violations={}",
            rollup.date, rollup.allocation_power, rollup.rule_violations
        );
        let mut current = self.current.write().await;
        *current = rollup;
    }

    /// Shared handle consumers read the latest rollup through
    pub fn handle(&self) -> Arc<RwLock<DisciplineRollup>> {
        self.current.clone()
    }

    /// Currently published allocation power
    pub async fn current_power(&self) -> Decimal {
        self.current.read().await.allocation_power
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    event: &AuditEvent,
    value: &serde_json::Value,
) -> DisciplineResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| DisciplineError::Malformed {
        sequence: event.sequence,
        detail: e.to_string(),
    })
}

/// The open event is composite; the position snapshot sits under "position"
fn parse_opened(event: &AuditEvent) -> DisciplineResult<Position> {
    let value = event
        .after_state
        .get("position")
        .ok_or_else(|| DisciplineError::Malformed {
            sequence: event.sequence,
            detail: "missing position snapshot".to_string(),
        })?;
    parse(event, value)
}

fn before_violations(event: &AuditEvent) -> DisciplineResult<u32> {
    match &event.before_state {
        Some(before) => {
            let position: Position = parse(event, before)?;
            Ok(position.discipline_violations)
        }
        None => Ok(0),
    }
}

/// Count the violations this transition added, labeled by its action
fn record_violations(rollup: &mut DisciplineRollup, event: &AuditEvent, before: u32, after: u32) {
    for _ in before..after {
        rollup.rule_violations += 1;
        rollup.violated_rules.push(event.action.clone());
    }
}

fn mean(values: &[Decimal], dp: u32) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some((sum / Decimal::from(values.len() as u64)).round_dp(dp))
}
