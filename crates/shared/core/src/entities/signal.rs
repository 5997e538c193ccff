use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConvictionTier, Direction};
use crate::values::Symbol;

/// Signal lifecycle status
///
/// `Active` is the only non-terminal state: a signal may be consumed by a
/// position open or expire, never both and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalStatus {
    /// Eligible to back a new position
    Active,
    /// Consumed by a position open
    Consumed,
    /// Aged out before being consumed
    Expired,
}

impl SignalStatus {
    /// Returns true if the signal can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignalStatus::Consumed | SignalStatus::Expired)
    }
}

/// The five factor scores behind a signal's conviction, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorScores {
    /// How fresh the underlying filing/transaction is
    pub recency: Decimal,
    /// How large the underlying transaction is
    pub size: Decimal,
    /// Historical accuracy of the filer
    pub competence: Decimal,
    /// How many similar signals agree
    pub consensus: Decimal,
    /// Current market regime fit
    pub regime: Decimal,
}

impl FactorScores {
    /// Factor values paired with their names, in weighting order
    pub fn named(&self) -> [(&'static str, Decimal); 5] {
        [
            ("recency", self.recency),
            ("size", self.size),
            ("competence", self.competence),
            ("consensus", self.consensus),
            ("regime", self.regime),
        ]
    }
}

/// A scored candidate trade, ingested from an external signal source.
///
/// Created once at ingestion and never deleted; the lifecycle manager is the
/// only writer and supersedes it via `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    /// Unique signal identifier
    pub id: Uuid,
    /// Provenance tag (e.g. "insider", "congressional", "13f")
    pub source: String,
    pub symbol: Symbol,
    pub direction: Direction,
    /// Name of the filer behind the signal, when known
    pub filer_name: Option<String>,
    /// Stable filer identifier (e.g. CIK), when known
    pub filer_id: Option<String>,
    /// When the underlying transaction happened
    pub transaction_at: Option<DateTime<Utc>>,
    /// When the transaction was filed/published
    pub filed_at: Option<DateTime<Utc>>,
    /// When this system first saw the signal
    pub discovered_at: DateTime<Utc>,
    pub shares: Option<Decimal>,
    pub price: Option<Decimal>,
    /// Dollar value of the underlying transaction
    pub transaction_value: Decimal,
    /// Individual factor scores, each in [0, 1]
    pub factors: FactorScores,
    /// Weighted total conviction score in [0, 1]
    pub total_score: Decimal,
    pub tier: ConvictionTier,
    pub status: SignalStatus,
    /// Signal is no longer eligible to open positions after this time
    pub expires_at: DateTime<Utc>,
    /// Opaque source payload, kept for audit
    pub raw_payload: serde_json::Value,
}

impl TradeSignal {
    /// Eligible to back a position open at `now`?
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.status == SignalStatus::Active && now <= self.expires_at
    }

    /// Past its expiry but not yet swept?
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == SignalStatus::Active && now > self.expires_at
    }

    /// Identity key for duplicate detection: the same source reporting the
    /// same filer transaction on the same symbol is the same signal.
    pub fn dedupe_key(&self) -> (String, Symbol, Option<String>, Option<DateTime<Utc>>) {
        (
            self.source.clone(),
            self.symbol.clone(),
            self.filer_id.clone(),
            self.transaction_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn test_signal(now: DateTime<Utc>) -> TradeSignal {
        TradeSignal {
            id: Uuid::new_v4(),
            source: "insider".to_string(),
            symbol: "ACME".to_string(),
            direction: Direction::Long,
            filer_name: Some("J. Doe".to_string()),
            filer_id: Some("0001234".to_string()),
            transaction_at: Some(now - Duration::days(2)),
            filed_at: Some(now - Duration::days(1)),
            discovered_at: now,
            shares: Some(dec!(1000)),
            price: Some(dec!(42.50)),
            transaction_value: dec!(42500),
            factors: FactorScores {
                recency: dec!(0.9),
                size: dec!(0.5),
                competence: dec!(0.5),
                consensus: dec!(0.0),
                regime: dec!(0.5),
            },
            total_score: dec!(0.55),
            tier: ConvictionTier::B,
            status: SignalStatus::Active,
            expires_at: now + Duration::days(7),
            raw_payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_availability_window() {
        let now = Utc::now();
        let signal = test_signal(now);

        assert!(signal.is_available(now));
        assert!(!signal.is_overdue(now));
        assert!(!signal.is_available(now + Duration::days(8)));
        assert!(signal.is_overdue(now + Duration::days(8)));
    }

    #[test]
    fn test_terminal_status_is_never_available() {
        let now = Utc::now();
        let mut signal = test_signal(now);

        signal.status = SignalStatus::Consumed;
        assert!(!signal.is_available(now));
        assert!(!signal.is_overdue(now + Duration::days(8)));
        assert!(signal.status.is_terminal());
    }
}
