use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::UserId;

/// The projection the engine derives from a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub streak_days: u32,
    pub last_streak_date: Option<NaiveDate>,
    pub consecutive_missed_days: u32,
}

impl StreakState {
    pub fn is_streak_on(&self, day: NaiveDate) -> bool {
        self.last_streak_date == Some(day)
    }
}

/// Cached per-user copy of [`StreakState`].
///
/// Never the source of truth; only the consistency maintainer writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounter {
    user_id: UserId,
    state: StreakState,
    updated_at: DateTime<Utc>,
}

impl StreakCounter {
    /// Counter of a freshly registered user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: StreakState::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn restore(user_id: UserId, state: StreakState, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            state,
            updated_at,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> StreakState {
        self.state
    }

    pub fn streak_days(&self) -> u32 {
        self.state.streak_days
    }

    pub fn last_streak_date(&self) -> Option<NaiveDate> {
        self.state.last_streak_date
    }

    pub fn consecutive_missed_days(&self) -> u32 {
        self.state.consecutive_missed_days
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the projection. Returns false (and leaves `updated_at` alone)
    /// when nothing changed.
    pub fn apply(&mut self, state: StreakState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.updated_at = Utc::now();
        true
    }
}
