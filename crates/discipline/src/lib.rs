//! Conviction Discipline Aggregator
//!
//! Folds one day's audit events into a [`conviction_core::DisciplineRollup`]
//! and derives the allocation-power throttle from the trailing violation
//! rate. The fold is pure and idempotent: re-running it over the same events
//! and history produces the same rollup, so a recompute is always safe.
//!
//! The latest rollup is published through an `Arc<RwLock<_>>` handle for
//! read-through consumers (allocation sizing reads the power, reporting
//! reads the counters).

pub mod aggregator;
pub mod config;
pub mod error;

pub use aggregator::DisciplineAggregator;
pub use config::PowerConfig;
pub use error::{DisciplineError, DisciplineResult};
