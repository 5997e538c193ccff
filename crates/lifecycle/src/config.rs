use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Policy knobs for the lifecycle state machines.
///
/// Escalation beyond these knobs (e.g. automatic retirement after N
/// violations) is deliberately not built in; violations only feed the
/// discipline rollup and its allocation-power throttle.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// How long a signal stays eligible after discovery
    pub signal_ttl: Duration,
    /// Fixed round length; round_expiry = round_start + round_length
    pub round_length: Duration,
    /// Hard cap on extensions per position, overrides included
    pub max_extensions: u32,
    /// Trailing performance metric required to extend at the boundary
    pub extension_metric_threshold: Decimal,
    /// Return at or above this closes the position; below it retires
    pub favorable_return_threshold: Decimal,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            signal_ttl: Duration::days(14),
            round_length: Duration::days(45),
            max_extensions: 2,
            extension_metric_threshold: dec!(1.0),
            favorable_return_threshold: Decimal::ZERO,
        }
    }
}
