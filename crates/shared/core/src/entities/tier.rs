use serde::{Deserialize, Serialize};

/// Conviction tier - discrete quality classification of a signal.
///
/// Variants are declared worst-to-best so the derived `Ord` ranks
/// `S > A > B > C`; a position opened against several signals inherits
/// the `max()` of their tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConvictionTier {
    C,
    B,
    A,
    S,
}

impl ConvictionTier {
    /// Human-readable tier label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvictionTier::S => "S",
            ConvictionTier::A => "A",
            ConvictionTier::B => "B",
            ConvictionTier::C => "C",
        }
    }
}

impl std::fmt::Display for ConvictionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(ConvictionTier::S > ConvictionTier::A);
        assert!(ConvictionTier::A > ConvictionTier::B);
        assert!(ConvictionTier::B > ConvictionTier::C);
        assert_eq!(
            [ConvictionTier::B, ConvictionTier::S, ConvictionTier::C]
                .into_iter()
                .max(),
            Some(ConvictionTier::S)
        );
    }
}
