use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use conviction_core::{
    Actor, AuditEvent, DisciplineRollup, EntityType, EventType, FactorScores, OrderRecord,
    OrderSide, OrderState, Position, PositionStatus, SignalStatus, TradeSignal,
};
use conviction_ledger::{ChainStatus, Ledger, LedgerError};
use conviction_ports::{Clock, LedgerStore};
use conviction_scoring::{SignalScorer, factors};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::LifecycleConfig;
use crate::error::{Error, Result};
use crate::replay::replay;
use crate::requests::{FillNotice, OpenRequest, SignalSubmission};
use crate::review::RoundReview;

/// What a round-boundary evaluation decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Round boundary not reached yet; nothing changed
    NotDue,
    /// Extension policy held; round pushed forward
    Extended(Box<Position>),
    /// Policy did not hold; position exited at the given price
    Exited(Box<Position>),
}

/// Result of a periodic sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Signals moved ACTIVE -> EXPIRED
    pub signals_expired: Vec<Uuid>,
    /// Active positions whose round boundary has passed; feed these into
    /// `evaluate_round` with fresh quotes and metrics
    pub rounds_due: Vec<Uuid>,
}

/// Owns all Signal/Position/Order state and the audit ledger.
///
/// Mutating methods take `&mut self`: concurrent workers share the manager
/// behind a lock, which serializes validate -> snapshot -> append -> commit.
/// The loser of a race re-validates against committed state and observes
/// `SignalUnavailable` or `StaleState` instead of clobbering the winner.
pub struct LifecycleManager<S: LedgerStore> {
    config: LifecycleConfig,
    scorer: SignalScorer,
    clock: Arc<dyn Clock>,
    ledger: Ledger<S>,
    signals: HashMap<Uuid, TradeSignal>,
    positions: HashMap<Uuid, Position>,
    orders: HashMap<Uuid, OrderRecord>,
    rollups: BTreeMap<NaiveDate, DisciplineRollup>,
}

impl<S: LedgerStore> LifecycleManager<S> {
    pub fn new(
        config: LifecycleConfig,
        scorer: SignalScorer,
        clock: Arc<dyn Clock>,
        store: S,
    ) -> Result<Self> {
        Ok(Self {
            config,
            scorer,
            clock,
            ledger: Ledger::new(store)?,
            signals: HashMap::new(),
            positions: HashMap::new(),
            orders: HashMap::new(),
            rollups: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    // === Signal ingestion ===

    /// Score and record a submitted signal.
    ///
    /// A submission matching an already-ingested source transaction is an
    /// idempotent no-op: `DuplicateSignal` carries the existing id and no
    /// second record is created.
    pub fn submit_signal(&mut self, submission: SignalSubmission) -> Result<TradeSignal> {
        let now = self.clock.now();

        let key = (
            submission.source.clone(),
            submission.symbol.clone(),
            submission.filer_id.clone(),
            submission.transaction_at,
        );
        if let Some(existing) = self.signals.values().find(|s| s.dedupe_key() == key) {
            debug!(
                "[LIFECYCLE] duplicate signal for {} from {}, keeping {}",
                submission.symbol, submission.source, existing.id
            );
            return Err(Error::DuplicateSignal {
                existing_id: existing.id,
            });
        }

        let factor_scores = match submission.factors {
            Some(factors) => factors,
            None => self.derive_factors(&submission, now),
        };
        let (total_score, tier) = self
            .scorer
            .score(&factor_scores)
            .map_err(Error::InvalidFactor)?;

        let signal = TradeSignal {
            id: Uuid::new_v4(),
            source: submission.source,
            symbol: submission.symbol,
            direction: submission.direction,
            filer_name: submission.filer_name,
            filer_id: submission.filer_id,
            transaction_at: submission.transaction_at,
            filed_at: submission.filed_at,
            discovered_at: now,
            shares: submission.shares,
            price: submission.price,
            transaction_value: submission.transaction_value,
            factors: factor_scores,
            total_score,
            tier,
            status: SignalStatus::Active,
            expires_at: now + self.config.signal_ttl,
            raw_payload: submission.raw_payload,
        };

        self.ledger.append(
            now,
            EventType::SignalCreated,
            EntityType::Signal,
            &signal.id.to_string(),
            Actor::System,
            "create",
            None,
            snapshot(&signal)?,
        )?;

        info!(
            "[LIFECYCLE] signal {} created: {} {:?} score={} tier={}",
            signal.id, signal.symbol, signal.direction, signal.total_score, signal.tier
        );
        self.signals.insert(signal.id, signal.clone());
        Ok(signal)
    }

    /// Derive the five factor scores from raw submission attributes
    fn derive_factors(&self, submission: &SignalSubmission, now: DateTime<Utc>) -> FactorScores {
        let filed_at = submission
            .filed_at
            .or(submission.transaction_at)
            .unwrap_or(now);
        let similar = self
            .signals
            .values()
            .filter(|s| {
                s.status == SignalStatus::Active
                    && s.symbol == submission.symbol
                    && s.direction == submission.direction
            })
            .count();
        FactorScores {
            recency: factors::recency_score(filed_at, now),
            size: factors::size_score(submission.transaction_value),
            competence: factors::competence_score(submission.filer_history),
            consensus: factors::consensus_score(similar),
            regime: factors::regime_score(),
        }
    }

    /// Move one overdue signal to EXPIRED, ledger-first.
    fn expire_signal(&mut self, signal_id: Uuid, actor: Actor) -> Result<()> {
        let now = self.clock.now();
        let Some(signal) = self.signals.get(&signal_id) else {
            return Err(Error::UnknownEntity {
                entity_id: signal_id,
            });
        };
        let before = snapshot(signal)?;
        let mut expired = signal.clone();
        expired.status = SignalStatus::Expired;

        self.ledger.append(
            now,
            EventType::SignalExpired,
            EntityType::Signal,
            &signal_id.to_string(),
            actor,
            "expire",
            Some(before),
            snapshot(&expired)?,
        )?;

        info!("[LIFECYCLE] signal {} expired", signal_id);
        self.signals.insert(signal_id, expired);
        Ok(())
    }

    // === Position lifecycle ===

    /// Open a position against one or more ACTIVE signals.
    ///
    /// The position creation and every signal's ACTIVE -> CONSUMED flip are
    /// covered by a single composite ledger event and committed together;
    /// a failed append leaves no trace of any of it.
    ///
    /// `allocation_power` is the caller-supplied throttle read from the
    /// latest discipline rollup. `Actor::Override` may push past a zero
    /// power, which is recorded as a discipline violation.
    pub fn open_position(
        &mut self,
        request: OpenRequest,
        allocation_power: Decimal,
        actor: Actor,
    ) -> Result<Position> {
        let now = self.clock.now();

        if request.shares <= Decimal::ZERO {
            return Err(Error::InvalidRequest(format!(
                "shares must be positive, got {}",
                request.shares
            )));
        }
        if request.entry_price <= Decimal::ZERO {
            return Err(Error::InvalidRequest(format!(
                "entry price must be positive, got {}",
                request.entry_price
            )));
        }
        if request.signal_ids.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one source signal is required".to_string(),
            ));
        }
        let mut deduped = request.signal_ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        if deduped.len() != request.signal_ids.len() {
            return Err(Error::InvalidRequest(
                "source signal ids must be distinct".to_string(),
            ));
        }

        let throttled = allocation_power <= Decimal::ZERO;
        if throttled && !actor.is_override() {
            return Err(Error::AllocationThrottled {
                power: allocation_power,
            });
        }

        // Validate every source signal before touching anything. Overdue
        // signals are expired on access, then reported unavailable.
        for signal_id in &request.signal_ids {
            let Some(signal) = self.signals.get(signal_id) else {
                return Err(Error::SignalUnavailable {
                    signal_id: *signal_id,
                });
            };
            if signal.is_overdue(now) {
                self.expire_signal(*signal_id, Actor::System)?;
                return Err(Error::SignalUnavailable {
                    signal_id: *signal_id,
                });
            }
            let signal = &self.signals[signal_id];
            if !signal.is_available(now) {
                return Err(Error::SignalUnavailable {
                    signal_id: *signal_id,
                });
            }
            if signal.symbol != request.symbol || signal.direction != request.direction {
                return Err(Error::InvalidRequest(format!(
                    "signal {} is for {} {:?}, not {} {:?}",
                    signal_id, signal.symbol, signal.direction, request.symbol, request.direction
                )));
            }
        }

        let tier = request
            .signal_ids
            .iter()
            .filter_map(|id| self.signals.get(id).map(|s| s.tier))
            .max()
            .ok_or_else(|| {
                Error::InvalidRequest("at least one source signal is required".to_string())
            })?;

        let mut position = Position::open(
            request.symbol,
            request.direction,
            request.shares,
            request.entry_price,
            request.signal_ids.clone(),
            tier,
            request.philosophy,
            now,
            self.config.round_length,
        );
        if throttled {
            warn!(
                "[LIFECYCLE] override open past zero allocation power for {}",
                position.symbol
            );
            position.discipline_violations += 1;
        }

        // Composite event: position + consumed signals commit as one unit
        let consumed: Vec<String> = request.signal_ids.iter().map(Uuid::to_string).collect();
        self.ledger.append(
            now,
            EventType::PositionOpened,
            EntityType::Position,
            &position.id.to_string(),
            actor,
            "open",
            None,
            json!({
                "position": snapshot(&position)?,
                "consumed_signals": consumed,
            }),
        )?;

        for signal_id in &request.signal_ids {
            if let Some(signal) = self.signals.get_mut(signal_id) {
                signal.status = SignalStatus::Consumed;
            }
        }
        info!(
            "[LIFECYCLE] position {} opened: {} {:?} x{} @ {} tier={} (signals: {})",
            position.id,
            position.symbol,
            position.direction,
            position.shares,
            position.entry_price,
            position.tier,
            position.source_signals.len()
        );
        self.positions.insert(position.id, position.clone());
        Ok(position)
    }

    /// Push a position's round boundary forward by one round length.
    ///
    /// Policy: the boundary must have been reached, the trailing performance
    /// metric must clear the configured threshold, and the extension count
    /// must be under the cap. `Actor::Override` may extend early or below
    /// the metric - recorded as a discipline violation - but the cap binds
    /// everyone.
    pub fn extend_round(
        &mut self,
        position_id: Uuid,
        performance_metric: Decimal,
        actor: Actor,
    ) -> Result<Position> {
        let now = self.clock.now();
        let Some(position) = self.positions.get(&position_id) else {
            return Err(Error::UnknownEntity {
                entity_id: position_id,
            });
        };
        if position.status.is_terminal() {
            return Err(Error::StaleState {
                entity_id: position_id,
                detail: format!("position is already {:?}", position.status),
            });
        }
        if position.extensions >= self.config.max_extensions {
            return Err(Error::InvalidRequest(format!(
                "extension cap reached ({} of {})",
                position.extensions, self.config.max_extensions
            )));
        }

        let policy_met = position.round_due(now)
            && performance_metric >= self.config.extension_metric_threshold;
        if !policy_met && !actor.is_override() {
            return Err(Error::InvalidRequest(format!(
                "extension policy not satisfied: due={}, metric={} (threshold {})",
                position.round_due(now),
                performance_metric,
                self.config.extension_metric_threshold
            )));
        }

        let before = snapshot(position)?;
        let mut extended = position.clone();
        extended.round_expiry += self.config.round_length;
        extended.round_extended = true;
        extended.extensions += 1;
        extended.extension_metric = Some(performance_metric);
        extended.status = PositionStatus::Extended;
        if !policy_met {
            warn!(
                "[LIFECYCLE] override extension of {} outside policy window",
                position_id
            );
            extended.discipline_violations += 1;
        }

        self.ledger.append(
            now,
            EventType::PositionExtended,
            EntityType::Position,
            &position_id.to_string(),
            actor,
            "extend_round",
            Some(before),
            snapshot(&extended)?,
        )?;

        info!(
            "[LIFECYCLE] position {} extended to {} (extension {} of {}, metric {})",
            position_id,
            extended.round_expiry,
            extended.extensions,
            self.config.max_extensions,
            performance_metric
        );
        self.positions.insert(position_id, extended.clone());
        Ok(extended)
    }

    /// Exit a position at the given price.
    ///
    /// Exit facts are populated together, exactly once. The final status
    /// follows the favorability rule: return at or above the configured
    /// threshold closes the position, anything below retires it.
    pub fn close_position(
        &mut self,
        position_id: Uuid,
        exit_price: Decimal,
        exit_at: Option<DateTime<Utc>>,
        actor: Actor,
    ) -> Result<Position> {
        let now = self.clock.now();
        if exit_price <= Decimal::ZERO {
            return Err(Error::InvalidRequest(format!(
                "exit price must be positive, got {}",
                exit_price
            )));
        }
        let Some(position) = self.positions.get(&position_id) else {
            return Err(Error::UnknownEntity {
                entity_id: position_id,
            });
        };
        if position.status.is_terminal() {
            return Err(Error::StaleState {
                entity_id: position_id,
                detail: format!("position is already {:?}", position.status),
            });
        }

        let before = snapshot(position)?;
        let exit = position.exit_outcome(exit_price, exit_at.unwrap_or(now));
        let favorable = exit.return_pct >= self.config.favorable_return_threshold;

        let mut closed = position.clone();
        closed.exit = Some(exit);
        closed.status = if favorable {
            PositionStatus::Closed
        } else {
            PositionStatus::Retired
        };
        let (event_type, action) = if favorable {
            (EventType::PositionClosed, "close")
        } else {
            (EventType::PositionRetired, "retire")
        };

        self.ledger.append(
            now,
            event_type,
            EntityType::Position,
            &position_id.to_string(),
            actor,
            action,
            Some(before),
            snapshot(&closed)?,
        )?;

        info!(
            "[LIFECYCLE] position {} {}: pnl={} return={}",
            position_id, action, exit.realized_pnl, exit.return_pct
        );
        self.positions.insert(position_id, closed.clone());
        Ok(closed)
    }

    /// Finalize a position from an execution-collaborator fill notice.
    pub fn handle_fill(&mut self, notice: FillNotice) -> Result<Position> {
        let closed = self.close_position(
            notice.position_id,
            notice.exit_price,
            Some(notice.exit_at),
            Actor::System,
        )?;
        if let Some(exit) = &closed.exit
            && exit.realized_pnl != notice.realized_pnl
        {
            warn!(
                "[LIFECYCLE] broker pnl {} disagrees with computed {} for {}",
                notice.realized_pnl, exit.realized_pnl, notice.position_id
            );
        }
        Ok(closed)
    }

    /// Evaluate one position at its round boundary: extend when the policy
    /// holds, otherwise exit at the current price.
    pub fn evaluate_round(
        &mut self,
        position_id: Uuid,
        current_price: Decimal,
        performance_metric: Decimal,
    ) -> Result<RoundOutcome> {
        let now = self.clock.now();
        let Some(position) = self.positions.get(&position_id) else {
            return Err(Error::UnknownEntity {
                entity_id: position_id,
            });
        };
        if position.status.is_terminal() {
            return Err(Error::StaleState {
                entity_id: position_id,
                detail: format!("position is already {:?}", position.status),
            });
        }
        if !position.round_due(now) {
            return Ok(RoundOutcome::NotDue);
        }

        let extendable = position.extensions < self.config.max_extensions
            && performance_metric >= self.config.extension_metric_threshold;
        if extendable {
            let extended = self.extend_round(position_id, performance_metric, Actor::Sweep)?;
            Ok(RoundOutcome::Extended(Box::new(extended)))
        } else {
            let exited = self.close_position(position_id, current_price, None, Actor::Sweep)?;
            Ok(RoundOutcome::Exited(Box::new(exited)))
        }
    }

    /// Periodic sweep: expire overdue signals and report which positions
    /// have reached their round boundary.
    pub fn sweep(&mut self) -> Result<SweepReport> {
        let now = self.clock.now();
        let overdue: Vec<Uuid> = self
            .signals
            .values()
            .filter(|s| s.is_overdue(now))
            .map(|s| s.id)
            .collect();
        let mut report = SweepReport::default();
        for signal_id in overdue {
            self.expire_signal(signal_id, Actor::Sweep)?;
            report.signals_expired.push(signal_id);
        }
        report.rounds_due = self
            .positions
            .values()
            .filter(|p| p.status.is_active() && p.round_due(now))
            .map(|p| p.id)
            .collect();
        if !report.signals_expired.is_empty() || !report.rounds_due.is_empty() {
            info!(
                "[LIFECYCLE] sweep: {} signals expired, {} rounds due",
                report.signals_expired.len(),
                report.rounds_due.len()
            );
        }
        Ok(report)
    }

    // === Execution correlation ===

    /// Record a broker order submitted for a position.
    pub fn record_order(
        &mut self,
        position_id: Uuid,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderRecord> {
        let now = self.clock.now();
        if !self.positions.contains_key(&position_id) {
            return Err(Error::UnknownEntity {
                entity_id: position_id,
            });
        }
        let order = OrderRecord::submitted(position_id, side, quantity, now);
        self.ledger.append(
            now,
            EventType::OrderRecorded,
            EntityType::Order,
            &order.id.to_string(),
            Actor::System,
            "record",
            None,
            snapshot(&order)?,
        )?;
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// Record a fill reported by the execution collaborator.
    pub fn record_order_fill(
        &mut self,
        order_id: Uuid,
        price: Decimal,
        quantity: Decimal,
        commission: Option<Decimal>,
    ) -> Result<OrderRecord> {
        let now = self.clock.now();
        let Some(order) = self.orders.get(&order_id) else {
            return Err(Error::UnknownEntity {
                entity_id: order_id,
            });
        };
        if order.state != OrderState::Submitted {
            return Err(Error::StaleState {
                entity_id: order_id,
                detail: format!("order is already {:?}", order.state),
            });
        }
        let before = snapshot(order)?;
        let mut filled = order.clone();
        filled.fill(price, quantity, commission, now);

        self.ledger.append(
            now,
            EventType::OrderFilled,
            EntityType::Order,
            &order_id.to_string(),
            Actor::System,
            "fill",
            Some(before),
            snapshot(&filled)?,
        )?;
        self.orders.insert(order_id, filled.clone());
        Ok(filled)
    }

    /// Record a broker rejection.
    pub fn record_order_rejection(
        &mut self,
        order_id: Uuid,
        error: impl Into<String>,
    ) -> Result<OrderRecord> {
        let now = self.clock.now();
        let Some(order) = self.orders.get(&order_id) else {
            return Err(Error::UnknownEntity {
                entity_id: order_id,
            });
        };
        if order.state != OrderState::Submitted {
            return Err(Error::StaleState {
                entity_id: order_id,
                detail: format!("order is already {:?}", order.state),
            });
        }
        let before = snapshot(order)?;
        let mut rejected = order.clone();
        rejected.reject(error, now);

        self.ledger.append(
            now,
            EventType::OrderRejected,
            EntityType::Order,
            &order_id.to_string(),
            Actor::System,
            "reject",
            Some(before),
            snapshot(&rejected)?,
        )?;
        self.orders.insert(order_id, rejected.clone());
        Ok(rejected)
    }

    // === Discipline rollups ===

    /// Upsert the rollup for its date, ledger-first.
    pub fn record_rollup(&mut self, rollup: DisciplineRollup) -> Result<()> {
        let now = self.clock.now();
        let before = match self.rollups.get(&rollup.date) {
            Some(existing) => Some(snapshot(existing)?),
            None => None,
        };
        self.ledger.append(
            now,
            EventType::RollupRecorded,
            EntityType::Rollup,
            &rollup.date.to_string(),
            Actor::System,
            "rollup",
            before,
            snapshot(&rollup)?,
        )?;
        info!(
            "[LIFECYCLE] rollup for {} recorded: power={} violations={}",
            rollup.date, rollup.allocation_power, rollup.rule_violations
        );
        self.rollups.insert(rollup.date, rollup);
        Ok(())
    }

    /// Current throttle: the latest rollup's allocation power, or full
    /// power when no rollup exists yet.
    pub fn allocation_power(&self) -> Decimal {
        self.rollups
            .values()
            .next_back()
            .map(|r| r.allocation_power)
            .unwrap_or(Decimal::ONE)
    }

    // === Read-only queries ===

    pub fn signal(&self, id: Uuid) -> Option<&TradeSignal> {
        self.signals.get(&id)
    }

    pub fn position(&self, id: Uuid) -> Option<&Position> {
        self.positions.get(&id)
    }

    pub fn order(&self, id: Uuid) -> Option<&OrderRecord> {
        self.orders.get(&id)
    }

    pub fn rollup(&self, date: NaiveDate) -> Option<&DisciplineRollup> {
        self.rollups.get(&date)
    }

    /// Rollups for dates in `[from, to)`, in date order
    pub fn rollups_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&DisciplineRollup> {
        self.rollups.range(from..to).map(|(_, r)| r).collect()
    }

    pub fn signals_by_status(&self, status: SignalStatus) -> Vec<&TradeSignal> {
        self.signals
            .values()
            .filter(|s| s.status == status)
            .collect()
    }

    pub fn positions_by_status(&self, status: PositionStatus) -> Vec<&Position> {
        self.positions
            .values()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Signals discovered in `[from, to)`
    pub fn signals_discovered_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&TradeSignal> {
        self.signals
            .values()
            .filter(|s| s.discovered_at >= from && s.discovered_at < to)
            .collect()
    }

    /// Positions entered in `[from, to)`
    pub fn positions_entered_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&Position> {
        self.positions
            .values()
            .filter(|p| p.entry_at >= from && p.entry_at < to)
            .collect()
    }

    /// All committed audit events in chain order
    pub fn events(&self) -> Result<Vec<AuditEvent>> {
        Ok(self.ledger.events()?)
    }

    /// Audit events whose timestamp falls on the given date
    pub fn events_on(&self, date: NaiveDate) -> Result<Vec<AuditEvent>> {
        Ok(self
            .ledger
            .events()?
            .into_iter()
            .filter(|e| e.timestamp.date_naive() == date)
            .collect())
    }

    /// Walk the full chain; corruption is reported, never repaired.
    pub fn verify_ledger(&self) -> Result<ChainStatus> {
        Ok(self.ledger.verify()?)
    }

    /// Post-round review summary for a position.
    pub fn review(&self, position_id: Uuid) -> Option<RoundReview> {
        self.positions.get(&position_id).map(RoundReview::of)
    }

    /// Rebuild entity state from the log alone and compare it with the live
    /// tables. Divergence means a commit escaped the ledger discipline.
    pub fn check_log_consistency(&self) -> Result<bool> {
        let replayed = replay(&self.events()?)?;
        Ok(replayed.signals == self.signals
            && replayed.positions == self.positions
            && replayed.orders == self.orders
            && replayed.rollups == self.rollups)
    }
}

/// Serialize an entity snapshot for the ledger.
fn snapshot<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::Ledger(LedgerError::Serialization(e.to_string())))
}
