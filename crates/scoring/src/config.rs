use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Weight applied to each factor when computing the total score.
///
/// Weights are configuration, not logic: any set is valid as long as it
/// sums to exactly 1, which keeps scores reproducible and in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub recency: Decimal,
    pub size: Decimal,
    pub competence: Decimal,
    pub consensus: Decimal,
    pub regime: Decimal,
}

impl FactorWeights {
    pub fn sum(&self) -> Decimal {
        self.recency + self.size + self.competence + self.consensus + self.regime
    }

    /// Weights in factor order (recency, size, competence, consensus, regime)
    pub fn as_array(&self) -> [Decimal; 5] {
        [
            self.recency,
            self.size,
            self.competence,
            self.consensus,
            self.regime,
        ]
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            recency: dec!(0.30),
            size: dec!(0.20),
            competence: dec!(0.20),
            consensus: dec!(0.15),
            regime: dec!(0.15),
        }
    }
}

/// Ordered tier boundaries applied to the total score.
///
/// Intervals are closed on the upper bound: a score exactly on a boundary
/// resolves to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// total_score >= s  =>  tier S
    pub s: Decimal,
    /// total_score >= a  =>  tier A
    pub a: Decimal,
    /// total_score >= b  =>  tier B, anything below is C
    pub b: Decimal,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            s: dec!(0.85),
            a: dec!(0.70),
            b: dec!(0.55),
        }
    }
}

/// Full scoring configuration: weights plus tier boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    pub thresholds: TierThresholds,
}

impl ScoringConfig {
    /// Build a validated configuration
    pub fn new(weights: FactorWeights, thresholds: TierThresholds) -> ScoringResult<Self> {
        if weights.sum() != Decimal::ONE {
            return Err(ScoringError::InvalidWeights(format!(
                "weights must sum to 1, got {}",
                weights.sum()
            )));
        }
        if weights.as_array().iter().any(|w| w.is_sign_negative()) {
            return Err(ScoringError::InvalidWeights(
                "weights must be non-negative".to_string(),
            ));
        }
        if !(thresholds.s > thresholds.a && thresholds.a > thresholds.b) {
            return Err(ScoringError::InvalidThresholds(format!(
                "thresholds must be strictly ordered S > A > B, got {} / {} / {}",
                thresholds.s, thresholds.a, thresholds.b
            )));
        }
        if thresholds.b <= Decimal::ZERO || thresholds.s > Decimal::ONE {
            return Err(ScoringError::InvalidThresholds(
                "thresholds must lie inside (0, 1]".to_string(),
            ));
        }
        Ok(Self {
            weights,
            thresholds,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            thresholds: TierThresholds::default(),
        }
    }
}
