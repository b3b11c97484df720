use async_trait::async_trait;
use chrono::NaiveDate;

use super::{DateRewardRule, RewardCycleRule};
use crate::shared::{DomainError, RuleId};

/// Read access to the reward rule catalog (managed elsewhere).
#[async_trait]
pub trait RewardCatalog: Send + Sync {
    async fn cycle_rules(&self) -> Result<Vec<RewardCycleRule>, DomainError>;

    async fn date_rules_on(&self, date: NaiveDate) -> Result<Vec<DateRewardRule>, DomainError>;

    async fn find_cycle_rule(&self, id: &RuleId) -> Result<Option<RewardCycleRule>, DomainError>;

    async fn find_date_rule(&self, id: &RuleId) -> Result<Option<DateRewardRule>, DomainError>;
}
