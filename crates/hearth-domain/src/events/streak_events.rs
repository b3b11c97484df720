use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::events::DomainEvent;
use crate::reward::{RewardPayload, RewardSource};
use crate::shared::{TaskId, UserId};

// Every streak event carries a `user_id` field.
macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }

            fn user_id(&self) -> &UserId {
                &self.user_id
            }
        }
    };
}

/// Fired after a reconciliation changed a user's cached streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakRecalculated {
    pub user_id: UserId,
    pub previous_streak_days: u32,
    pub streak_days: u32,
    pub last_streak_date: Option<NaiveDate>,
    pub consecutive_missed_days: u32,
    pub pruned_dates: u64,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(StreakRecalculated);

/// Fired after a reward claim committed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardClaimed {
    pub user_id: UserId,
    pub source: RewardSource,
    pub source_key: String,
    pub claim_date: NaiveDate,
    pub payload: RewardPayload,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(RewardClaimed);

/// Fired by the task flow when a user finishes a qualifying task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub user_id: UserId,
    pub task_id: TaskId,
    pub completed_at: DateTime<Utc>,
}

impl_domain_event!(TaskCompleted);
