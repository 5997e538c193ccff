//! Conviction Scoring Engine
//!
//! Quantifies conviction for each trade signal:
//!
//! 1. Derive five factor scores (0.0 to 1.0) from raw signal attributes
//! 2. Apply configured weights (must sum to 1)
//! 3. Produce a total score (0.0 to 1.0)
//! 4. Assign a conviction tier (S/A/B/C) from ordered thresholds
//!
//! The engine is stateless: identical input always yields identical output,
//! and scoring has no side effects.

pub mod config;
pub mod engine;
pub mod factors;

mod error;

pub use config::{FactorWeights, ScoringConfig, TierThresholds};
pub use engine::SignalScorer;
pub use error::{ScoringError, ScoringResult};
pub use factors::FilerHistory;
