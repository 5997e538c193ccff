//! Factor derivation from raw signal attributes.
//!
//! Each helper maps one raw attribute onto a [0, 1] factor score. The
//! lifecycle manager assembles these into a `FactorScores` before handing
//! it to the scorer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Days after which a filing contributes nothing to recency
const RECENCY_HORIZON_DAYS: i64 = 90;
/// Filer track records below this sample size are shrunk toward neutral
const COMPETENCE_MIN_SAMPLE: u32 = 5;

/// Historical accuracy of a filer, supplied by the ingestion collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilerHistory {
    /// Fraction of tracked trades that worked out, in [0, 1]
    pub win_rate: Decimal,
    /// How many trades back the win rate
    pub trades_tracked: u32,
}

/// Linear decay from 1.0 (filed today) to 0.0 (filed 90+ days ago)
pub fn recency_score(filed_at: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let days_ago = (now - filed_at).num_days();
    if days_ago <= 0 {
        return Decimal::ONE;
    }
    if days_ago >= RECENCY_HORIZON_DAYS {
        return Decimal::ZERO;
    }
    (Decimal::ONE - Decimal::from(days_ago) / Decimal::from(RECENCY_HORIZON_DAYS)).round_dp(4)
}

/// Transaction-size ladder: larger commitments signal more conviction
pub fn size_score(transaction_value: Decimal) -> Decimal {
    if transaction_value >= dec!(10_000_000) {
        dec!(1.0)
    } else if transaction_value >= dec!(1_000_000) {
        dec!(0.8)
    } else if transaction_value >= dec!(100_000) {
        dec!(0.5)
    } else if transaction_value >= dec!(10_000) {
        dec!(0.3)
    } else {
        dec!(0.1)
    }
}

/// Filer track record, shrunk toward the neutral 0.5 when the sample is thin
pub fn competence_score(history: Option<FilerHistory>) -> Decimal {
    let Some(history) = history else {
        return dec!(0.5);
    };
    let win_rate = history.win_rate.clamp(Decimal::ZERO, Decimal::ONE);
    if history.trades_tracked < COMPETENCE_MIN_SAMPLE {
        let confidence =
            Decimal::from(history.trades_tracked) / Decimal::from(COMPETENCE_MIN_SAMPLE);
        return (dec!(0.5) + (win_rate - dec!(0.5)) * confidence).round_dp(4);
    }
    win_rate
}

/// How many similar active signals agree with this one
pub fn consensus_score(similar_count: usize) -> Decimal {
    match similar_count {
        0 => dec!(0.0),
        1 => dec!(0.3),
        2 => dec!(0.6),
        3 => dec!(0.8),
        _ => dec!(1.0),
    }
}

/// Market regime fit. Neutral until a regime model feeds this in.
pub fn regime_score() -> Decimal {
    dec!(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_recency_decay() {
        let now = Utc::now();

        assert_eq!(recency_score(now, now), Decimal::ONE);
        assert_eq!(recency_score(now - Duration::days(90), now), Decimal::ZERO);
        assert_eq!(recency_score(now - Duration::days(120), now), Decimal::ZERO);
        // 45 of 90 days gone
        assert_eq!(recency_score(now - Duration::days(45), now), dec!(0.5));
    }

    #[test]
    fn test_size_ladder() {
        assert_eq!(size_score(dec!(25_000_000)), dec!(1.0));
        assert_eq!(size_score(dec!(10_000_000)), dec!(1.0));
        assert_eq!(size_score(dec!(2_500_000)), dec!(0.8));
        assert_eq!(size_score(dec!(150_000)), dec!(0.5));
        assert_eq!(size_score(dec!(42_500)), dec!(0.3));
        assert_eq!(size_score(dec!(5_000)), dec!(0.1));
    }

    #[test]
    fn test_competence_shrinks_thin_samples() {
        assert_eq!(competence_score(None), dec!(0.5));

        // Full sample: win rate taken at face value
        let seasoned = FilerHistory {
            win_rate: dec!(0.8),
            trades_tracked: 20,
        };
        assert_eq!(competence_score(Some(seasoned)), dec!(0.8));

        // 2 of 5 trades tracked: 0.5 + (0.8 - 0.5) * 0.4 = 0.62
        let thin = FilerHistory {
            win_rate: dec!(0.8),
            trades_tracked: 2,
        };
        assert_eq!(competence_score(Some(thin)), dec!(0.62));
    }

    #[test]
    fn test_consensus_ladder() {
        assert_eq!(consensus_score(0), dec!(0.0));
        assert_eq!(consensus_score(1), dec!(0.3));
        assert_eq!(consensus_score(2), dec!(0.6));
        assert_eq!(consensus_score(3), dec!(0.8));
        assert_eq!(consensus_score(7), dec!(1.0));
    }
}
