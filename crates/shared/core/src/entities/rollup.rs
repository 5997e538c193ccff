use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One-per-date discipline rollup.
///
/// Produced by the discipline aggregator as a pure fold over that date's
/// audit events; read-only to every other component. `allocation_power`
/// is the throttle the lifecycle manager consults before sizing opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRollup {
    pub date: NaiveDate,
    /// Ledger events recorded that day
    pub decisions_logged: u32,
    /// Events driven by a policy override
    pub intuition_overrides: u32,
    /// Position opens that passed the safety policy
    pub opens_with_safety: u32,
    /// Position opens forced through by override
    pub opens_without_safety: u32,
    /// Signals created with strong consensus backing
    pub cluster_signals_detected: u32,
    /// Positions opened against more than one signal
    pub cluster_positions_taken: u32,
    pub positions_retired: u32,
    /// Mean return across positions closed or retired that day
    pub avg_round_return: Option<Decimal>,
    pub positions_extended: u32,
    /// Mean performance metric among that day's extensions
    pub avg_extension_metric: Option<Decimal>,
    /// Transitions taken outside their preconditions
    pub rule_violations: u32,
    /// Action labels of the violating transitions
    pub violated_rules: Vec<String>,
    /// Throttle scalar in [0, 1]; lower means less new allocation
    pub allocation_power: Decimal,
}

impl DisciplineRollup {
    /// A rollup for a day with no events: full allocation power
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            decisions_logged: 0,
            intuition_overrides: 0,
            opens_with_safety: 0,
            opens_without_safety: 0,
            cluster_signals_detected: 0,
            cluster_positions_taken: 0,
            positions_retired: 0,
            avg_round_return: None,
            positions_extended: 0,
            avg_extension_metric: None,
            rule_violations: 0,
            violated_rules: Vec::new(),
            allocation_power: Decimal::ONE,
        }
    }

    /// Was the day free of violations?
    pub fn is_clean(&self) -> bool {
        self.rule_violations == 0
    }
}
