//! Post-round review: a read-only summary graded on realized return.

use conviction_core::{ConvictionTier, Position, Symbol};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome grade ladder applied to a completed round's return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeGrade {
    /// Return >= 15%
    Excellent,
    /// Return >= 8%
    Good,
    /// Return >= 5%
    Satisfactory,
    /// Return >= 0%
    BreakEven,
    /// Negative return
    Loss,
}

impl OutcomeGrade {
    pub fn from_return(return_pct: Decimal) -> Self {
        if return_pct >= dec!(0.15) {
            OutcomeGrade::Excellent
        } else if return_pct >= dec!(0.08) {
            OutcomeGrade::Good
        } else if return_pct >= dec!(0.05) {
            OutcomeGrade::Satisfactory
        } else if return_pct >= Decimal::ZERO {
            OutcomeGrade::BreakEven
        } else {
            OutcomeGrade::Loss
        }
    }

    /// Letter grade for reports
    pub fn letter(&self) -> &'static str {
        match self {
            OutcomeGrade::Excellent => "A+",
            OutcomeGrade::Good => "A",
            OutcomeGrade::Satisfactory => "B",
            OutcomeGrade::BreakEven => "C",
            OutcomeGrade::Loss => "F",
        }
    }
}

/// Review summary for one position's round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReview {
    pub position_id: Uuid,
    pub symbol: Symbol,
    pub tier: ConvictionTier,
    pub philosophy: String,
    /// Days from entry to exit; `None` while the position is still live
    pub duration_days: Option<i64>,
    pub return_pct: Option<Decimal>,
    pub realized_pnl: Option<Decimal>,
    pub round_extended: bool,
    pub discipline_violations: u32,
    /// Grade for completed rounds; `None` while still live
    pub grade: Option<OutcomeGrade>,
}

impl RoundReview {
    pub fn of(position: &Position) -> Self {
        let (duration_days, return_pct, realized_pnl, grade) = match &position.exit {
            Some(exit) => (
                Some((exit.exit_at - position.entry_at).num_days()),
                Some(exit.return_pct),
                Some(exit.realized_pnl),
                Some(OutcomeGrade::from_return(exit.return_pct)),
            ),
            None => (None, None, None, None),
        };
        Self {
            position_id: position.id,
            symbol: position.symbol.clone(),
            tier: position.tier,
            philosophy: position.philosophy.clone(),
            duration_days,
            return_pct,
            realized_pnl,
            round_extended: position.round_extended,
            discipline_violations: position.discipline_violations,
            grade,
        }
    }
}
