use std::str::FromStr;

use sandgraph_core::AppError;
use serde::{Deserialize, Serialize};

/// Urgency tier for asynchronous graph mutations.
///
/// Variants are declared in ascending order so `Ord` ranks `High` first when
/// sorting descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Background work.
    Low,
    /// Default urgency.
    Normal,
    /// Highest urgency tier.
    High,
}

impl Priority {
    /// Returns a stable storage value for this priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        }
    }

    /// Returns the numeric rank persisted alongside queued jobs.
    #[must_use]
    pub fn rank(&self) -> i16 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
        }
    }

    /// Restores a priority from its persisted rank.
    pub fn from_rank(rank: i16) -> Result<Self, AppError> {
        match rank {
            0 => Ok(Self::Low),
            1 => Ok(Self::Normal),
            2 => Ok(Self::High),
            _ => Err(AppError::Validation(format!(
                "unknown priority rank '{rank}'"
            ))),
        }
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(Self::Low),
            "NORMAL" => Ok(Self::Normal),
            "HIGH" => Ok(Self::High),
            _ => Err(AppError::Validation(format!(
                "unknown priority value '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Priority;

    #[test]
    fn high_outranks_other_tiers() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn unknown_rank_is_rejected() {
        assert!(Priority::from_rank(7).is_err());
    }

    proptest! {
        #[test]
        fn rank_order_matches_enum_order(left in 0_i16..3, right in 0_i16..3) {
            let left_priority = Priority::from_rank(left).unwrap_or(Priority::Low);
            let right_priority = Priority::from_rank(right).unwrap_or(Priority::Low);
            prop_assert_eq!(left.cmp(&right), left_priority.cmp(&right_priority));
        }
    }
}
