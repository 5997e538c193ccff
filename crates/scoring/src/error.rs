use rust_decimal::Decimal;
use thiserror::Error;

/// Scoring engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Invalid factor {name}: {value} is outside [0, 1]")]
    InvalidFactor { name: &'static str, value: Decimal },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid tier thresholds: {0}")]
    InvalidThresholds(String),
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
