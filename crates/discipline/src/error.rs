use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisciplineError {
    /// An audit event's snapshot could not be read back as its entity type
    #[error("Malformed event at sequence {sequence}: {detail}")]
    Malformed { sequence: u64, detail: String },

    /// Power configuration failed validation
    #[error("Invalid power config: {0}")]
    InvalidConfig(String),
}

pub type DisciplineResult<T> = Result<T, DisciplineError>;
