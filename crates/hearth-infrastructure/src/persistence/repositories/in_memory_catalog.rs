use async_trait::async_trait;
use chrono::NaiveDate;
use hearth_domain::reward::{DateRewardRule, RewardCatalog, RewardCycleRule};
use hearth_domain::shared::{DomainError, RuleId};
use tokio::sync::RwLock;

/// Catalog held in process memory, for embedding and tests.
#[derive(Default)]
pub struct InMemoryRewardCatalog {
    cycle_rules: RwLock<Vec<RewardCycleRule>>,
    date_rules: RwLock<Vec<DateRewardRule>>,
}

impl InMemoryRewardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(cycle_rules: Vec<RewardCycleRule>, date_rules: Vec<DateRewardRule>) -> Self {
        Self {
            cycle_rules: RwLock::new(cycle_rules),
            date_rules: RwLock::new(date_rules),
        }
    }

    /// Insert or replace by rule id.
    pub async fn put_cycle_rule(&self, rule: RewardCycleRule) {
        let mut rules = self.cycle_rules.write().await;
        rules.retain(|existing| existing.id() != rule.id());
        rules.push(rule);
    }

    /// Insert or replace by rule id.
    pub async fn put_date_rule(&self, rule: DateRewardRule) {
        let mut rules = self.date_rules.write().await;
        rules.retain(|existing| existing.id() != rule.id());
        rules.push(rule);
    }

    pub async fn remove_rule(&self, id: &RuleId) -> bool {
        let mut cycle = self.cycle_rules.write().await;
        let mut date = self.date_rules.write().await;
        let before = cycle.len() + date.len();
        cycle.retain(|rule| rule.id() != id);
        date.retain(|rule| rule.id() != id);
        cycle.len() + date.len() < before
    }
}

#[async_trait]
impl RewardCatalog for InMemoryRewardCatalog {
    async fn cycle_rules(&self) -> Result<Vec<RewardCycleRule>, DomainError> {
        Ok(self.cycle_rules.read().await.clone())
    }

    async fn date_rules_on(&self, date: NaiveDate) -> Result<Vec<DateRewardRule>, DomainError> {
        Ok(self
            .date_rules
            .read()
            .await
            .iter()
            .filter(|rule| rule.calendar_date() == date)
            .cloned()
            .collect())
    }

    async fn find_cycle_rule(&self, id: &RuleId) -> Result<Option<RewardCycleRule>, DomainError> {
        Ok(self
            .cycle_rules
            .read()
            .await
            .iter()
            .find(|rule| rule.id() == id)
            .cloned())
    }

    async fn find_date_rule(&self, id: &RuleId) -> Result<Option<DateRewardRule>, DomainError> {
        Ok(self
            .date_rules
            .read()
            .await
            .iter()
            .find(|rule| rule.id() == id)
            .cloned())
    }
}
