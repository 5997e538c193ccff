use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{DisciplineError, DisciplineResult};

/// Knobs for the allocation-power throttle.
///
/// `allocation_power = clamp(1 - penalty_slope x violation_rate, floor, 1)`
/// where the violation rate is taken over the trailing window ending on the
/// rollup date. A clean window restores full power.
#[derive(Debug, Clone)]
pub struct PowerConfig {
    /// Days of history (including the rollup date) feeding the rate
    pub trailing_window_days: i64,
    /// How hard each unit of violation rate cuts power
    pub penalty_slope: Decimal,
    /// Power never drops below this
    pub floor: Decimal,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            trailing_window_days: 7,
            penalty_slope: dec!(2.0),
            floor: Decimal::ZERO,
        }
    }
}

impl PowerConfig {
    pub fn new(
        trailing_window_days: i64,
        penalty_slope: Decimal,
        floor: Decimal,
    ) -> DisciplineResult<Self> {
        if trailing_window_days < 1 {
            return Err(DisciplineError::InvalidConfig(format!(
                "trailing window must cover at least one day, got {trailing_window_days}"
            )));
        }
        if penalty_slope < Decimal::ZERO {
            return Err(DisciplineError::InvalidConfig(format!(
                "penalty slope must be non-negative, got {penalty_slope}"
            )));
        }
        if floor < Decimal::ZERO || floor > Decimal::ONE {
            return Err(DisciplineError::InvalidConfig(format!(
                "floor must lie in [0, 1], got {floor}"
            )));
        }
        Ok(Self {
            trailing_window_days,
            penalty_slope,
            floor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let d = PowerConfig::default();
        assert!(PowerConfig::new(d.trailing_window_days, d.penalty_slope, d.floor).is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(PowerConfig::new(0, dec!(2.0), Decimal::ZERO).is_err());
        assert!(PowerConfig::new(7, dec!(-0.1), Decimal::ZERO).is_err());
        assert!(PowerConfig::new(7, dec!(2.0), dec!(1.1)).is_err());
    }
}
