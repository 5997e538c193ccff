use conviction_core::{ConvictionTier, FactorScores};
use rust_decimal::Decimal;

use crate::config::ScoringConfig;
use crate::error::{ScoringError, ScoringResult};

/// Decimal places kept on the total score
const SCORE_DP: u32 = 4;

/// Pure scoring engine: factor scores in, (total score, tier) out.
///
/// Stateless and thread-safe by construction; safe to call repeatedly with
/// identical results for identical input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalScorer {
    config: ScoringConfig,
}

impl SignalScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute the weighted total score and conviction tier.
    ///
    /// Every factor must lie in [0, 1]; out-of-range input is rejected with
    /// `InvalidFactor` and no signal should be created from it.
    pub fn score(&self, factors: &FactorScores) -> ScoringResult<(Decimal, ConvictionTier)> {
        for (name, value) in factors.named() {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ScoringError::InvalidFactor { name, value });
            }
        }

        let w = &self.config.weights;
        let total = (factors.recency * w.recency
            + factors.size * w.size
            + factors.competence * w.competence
            + factors.consensus * w.consensus
            + factors.regime * w.regime)
            .round_dp(SCORE_DP);

        Ok((total, self.assign_tier(total)))
    }

    /// Map a total score onto a tier. Boundaries are closed on the upper
    /// bound, so a score exactly at a threshold takes the higher tier.
    pub fn assign_tier(&self, total_score: Decimal) -> ConvictionTier {
        let t = &self.config.thresholds;
        if total_score >= t.s {
            ConvictionTier::S
        } else if total_score >= t.a {
            ConvictionTier::A
        } else if total_score >= t.b {
            ConvictionTier::B
        } else {
            ConvictionTier::C
        }
    }
}
