use serde::{Deserialize, Serialize};

/// Trade direction - long (bought) or short (sold/bet against)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Long - profit when price rises
    Long,
    /// Short - profit when price falls
    Short,
}

impl Direction {
    /// Returns the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}
