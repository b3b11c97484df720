use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// Product policy knobs of the streak rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    /// Consecutive missed (or unrecorded) days after the last streak day
    /// that break the run.
    pub missed_day_reset_threshold: u32,
    /// Longest block of consecutive frozen days that may bridge a gap.
    /// `None` means any number of frozen days bridges.
    pub max_bridged_frozen_days: Option<u32>,
}

impl StreakPolicy {
    pub const DEFAULT_RESET_THRESHOLD: u32 = 3;

    pub fn new(
        missed_day_reset_threshold: u32,
        max_bridged_frozen_days: Option<u32>,
    ) -> Result<Self, DomainError> {
        if missed_day_reset_threshold == 0 {
            return Err(DomainError::Validation(
                "Missed-day reset threshold must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            missed_day_reset_threshold,
            max_bridged_frozen_days,
        })
    }
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            missed_day_reset_threshold: Self::DEFAULT_RESET_THRESHOLD,
            max_bridged_frozen_days: None,
        }
    }
}
