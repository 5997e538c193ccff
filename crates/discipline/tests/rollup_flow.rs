//! Lifecycle-to-discipline loop: a day of audited decisions rolls up into
//! counters and a power throttle, the rollup is recorded back through the
//! ledger, and the next open reads the throttle.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use conviction_clock::{Clock, FixedClock};
use conviction_core::{Actor, Direction, FactorScores};
use conviction_discipline::{DisciplineAggregator, PowerConfig};
use conviction_ledger::MemoryLedgerStore;
use conviction_lifecycle::{Error, LifecycleConfig, LifecycleManager, OpenRequest, SignalSubmission};
use conviction_scoring::SignalScorer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

fn submission(symbol: &str, filer_id: &str, consensus: Decimal) -> SignalSubmission {
    SignalSubmission {
        source: "insider".to_string(),
        symbol: symbol.to_string(),
        direction: Direction::Long,
        filer_name: None,
        filer_id: Some(filer_id.to_string()),
        filer_history: None,
        transaction_at: Some(start() - Duration::days(2)),
        filed_at: Some(start() - Duration::days(1)),
        shares: Some(dec!(29)),
        price: Some(dec!(96.1356)),
        transaction_value: dec!(2787.93),
        factors: Some(FactorScores {
            recency: dec!(0.9),
            size: dec!(0.8),
            competence: dec!(0.5),
            consensus,
            regime: dec!(0.5),
        }),
        raw_payload: serde_json::Value::Null,
    }
}

fn open_request(symbol: &str, signal_ids: Vec<Uuid>) -> OpenRequest {
    OpenRequest {
        symbol: symbol.to_string(),
        direction: Direction::Long,
        signal_ids,
        shares: dec!(29),
        entry_price: dec!(96.1356),
        philosophy: "cluster_follow".to_string(),
    }
}

#[tokio::test]
async fn test_day_of_decisions_rolls_up_and_throttles() {
    let clock = Arc::new(FixedClock::new(start()));
    let mut manager = LifecycleManager::new(
        LifecycleConfig::default(),
        SignalScorer::default(),
        clock.clone(),
        MemoryLedgerStore::new(),
    )
    .unwrap();
    // Heavy slope so a single violation among few decisions zeroes power
    let aggregator = DisciplineAggregator::new(PowerConfig::new(7, dec!(8.0), Decimal::ZERO).unwrap());

    // A clustered open inside policy, then an early extension forced through
    let first = manager
        .submit_signal(submission("ACME", "0001", dec!(0.6)))
        .unwrap();
    let second = manager
        .submit_signal(submission("ACME", "0002", dec!(0.8)))
        .unwrap();
    let position = manager
        .open_position(
            open_request("ACME", vec![first.id, second.id]),
            manager.allocation_power(),
            Actor::System,
        )
        .unwrap();
    manager
        .extend_round(position.id, dec!(0.4), Actor::Override)
        .unwrap();

    // End of day: fold the day's events and record the rollup
    let date = clock.now().date_naive();
    let history: Vec<_> = Vec::new();
    let rollup = aggregator
        .rollup(date, &manager.events_on(date).unwrap(), &history)
        .unwrap();
    assert_eq!(rollup.decisions_logged, 4);
    assert_eq!(rollup.cluster_signals_detected, 2);
    assert_eq!(rollup.cluster_positions_taken, 1);
    assert_eq!(rollup.opens_with_safety, 1);
    assert_eq!(rollup.intuition_overrides, 1);
    assert_eq!(rollup.rule_violations, 1);
    assert_eq!(rollup.violated_rules, vec!["extend_round".to_string()]);
    // 1 violation over 4 decisions, slope 8: power hits the floor
    assert_eq!(rollup.allocation_power, Decimal::ZERO);

    aggregator.publish(rollup.clone()).await;
    manager.record_rollup(rollup).unwrap();
    assert_eq!(manager.allocation_power(), Decimal::ZERO);
    assert_eq!(aggregator.current_power().await, Decimal::ZERO);

    // The next open reads the throttle and is refused
    let third = manager
        .submit_signal(submission("OTHER", "0003", dec!(0.0)))
        .unwrap();
    let blocked = manager.open_position(
        open_request("OTHER", vec![third.id]),
        manager.allocation_power(),
        Actor::System,
    );
    assert!(matches!(blocked, Err(Error::AllocationThrottled { .. })));

    // Recomputing the same day is a pure no-op apart from the audit upsert
    let recomputed = aggregator
        .rollup(date, &manager.events_on(date).unwrap(), &history)
        .unwrap();
    // The recorded rollup and the refused open added events, but neither
    // carries violations, so power only recovers through clean days
    assert_eq!(recomputed.rule_violations, 1);
    assert!(manager.check_log_consistency().unwrap());
}
