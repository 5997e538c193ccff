use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConvictionTier, Direction};
use crate::values::{Price, Quantity, Symbol};

/// Decimal places kept for money values (entry/exit value, PnL)
const MONEY_DP: u32 = 2;
/// Decimal places kept for return ratios
const RETURN_DP: u32 = 6;

/// Position lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Inside its first round
    Open,
    /// Round boundary was pushed forward at least once
    Extended,
    /// Exited with a favorable outcome
    Closed,
    /// Wound down at the round boundary or by policy
    Retired,
}

impl PositionStatus {
    /// Returns true if the position can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionStatus::Closed | PositionStatus::Retired)
    }

    /// Returns true if the position still holds capital
    pub fn is_active(&self) -> bool {
        matches!(self, PositionStatus::Open | PositionStatus::Extended)
    }
}

/// Exit facts, populated together exactly once when a position terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionExit {
    pub exit_at: DateTime<Utc>,
    pub exit_price: Price,
    pub exit_value: Decimal,
    pub realized_pnl: Decimal,
    /// Realized PnL over entry value
    pub return_pct: Decimal,
}

/// A capital commitment opened against one or more consumed signals.
///
/// Lives inside a fixed round: `round_expiry` is set at open and only moves
/// forward through an explicit, ledger-recorded extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Unique position identifier
    pub id: Uuid,
    pub symbol: Symbol,
    pub direction: Direction,
    /// When the position was opened
    pub entry_at: DateTime<Utc>,
    pub entry_price: Price,
    /// Share count (always positive)
    pub shares: Quantity,
    /// shares x entry_price, fixed at open
    pub entry_value: Decimal,
    /// Signals consumed to open this position (never empty, open order)
    pub source_signals: Vec<Uuid>,
    /// Best tier among the source signals, inherited at open
    pub tier: ConvictionTier,
    /// Which doctrine drove the open (e.g. "cluster_follow", "single_conviction")
    pub philosophy: String,
    /// Round window start (equals entry time)
    pub round_start: DateTime<Utc>,
    /// Round window end; advances only via extension
    pub round_expiry: DateTime<Utc>,
    /// True iff at least one extension was granted
    pub round_extended: bool,
    /// How many times the round was extended
    pub extensions: u32,
    /// Performance metric recorded at the most recent extension
    pub extension_metric: Option<Decimal>,
    /// Transitions taken outside their declared preconditions via override
    pub discipline_violations: u32,
    /// Exit facts, all-or-nothing
    pub exit: Option<PositionExit>,
    pub status: PositionStatus,
}

impl Position {
    /// Create a new open position with its round window
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        symbol: impl Into<Symbol>,
        direction: Direction,
        shares: Quantity,
        entry_price: Price,
        source_signals: Vec<Uuid>,
        tier: ConvictionTier,
        philosophy: impl Into<String>,
        entry_at: DateTime<Utc>,
        round_length: Duration,
    ) -> Self {
        let entry_value = (shares * entry_price).round_dp(MONEY_DP);
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction,
            entry_at,
            entry_price,
            shares,
            entry_value,
            source_signals,
            tier,
            philosophy: philosophy.into(),
            round_start: entry_at,
            round_expiry: entry_at + round_length,
            round_extended: false,
            extensions: 0,
            extension_metric: None,
            discipline_violations: 0,
            exit: None,
            status: PositionStatus::Open,
        }
    }

    /// Has the round boundary been reached?
    pub fn round_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.round_expiry
    }

    /// Compute exit facts at the given price without mutating the position.
    ///
    /// PnL is signed by direction: a short profits when price falls.
    pub fn exit_outcome(&self, exit_price: Price, exit_at: DateTime<Utc>) -> PositionExit {
        let exit_value = (self.shares * exit_price).round_dp(MONEY_DP);
        let price_diff = exit_price - self.entry_price;
        let raw_pnl = match self.direction {
            Direction::Long => self.shares * price_diff,
            Direction::Short => self.shares * -price_diff,
        };
        let realized_pnl = raw_pnl.round_dp(MONEY_DP);
        let return_pct = if self.entry_value.is_zero() {
            Decimal::ZERO
        } else {
            (realized_pnl / self.entry_value).round_dp(RETURN_DP)
        };
        PositionExit {
            exit_at,
            exit_price,
            exit_value,
            realized_pnl,
            return_pct,
        }
    }
}
