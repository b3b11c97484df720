use hearth_domain::reward::{
    claimable_rewards, validate_claim, ClaimLedger, ClaimRecord, ClaimableReward, DateRewardRule,
    RewardCatalog, RewardCycleRule, RewardSource, RewardSourceKey,
};
use hearth_domain::shared::{DomainError, StreakTransaction, UserId};
use hearth_domain::streak::StreakState;
use log::info;
use std::sync::Arc;

/// Catalog rules relevant to one streak state.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub cycle_rules: Vec<RewardCycleRule>,
    pub date_rules: Vec<DateRewardRule>,
}

/// A claim request whose rule has been looked up in the catalog.
#[derive(Debug, Clone)]
pub struct ResolvedClaim {
    pub key: RewardSourceKey,
    cycle_rule: Option<RewardCycleRule>,
    date_rule: Option<DateRewardRule>,
}

/// Decides which rewards a streak state unlocks and records claims.
///
/// Catalog reads happen in [`rules_for`](Self::rules_for) and
/// [`resolve`](Self::resolve), before any transaction is opened; the
/// transactional half only touches the claim ledger.
pub struct RewardEligibilityEvaluator {
    catalog: Arc<dyn RewardCatalog>,
}

impl RewardEligibilityEvaluator {
    pub fn new(catalog: Arc<dyn RewardCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn rules_for(&self, state: &StreakState) -> Result<RuleSet, DomainError> {
        let cycle_rules = self.catalog.cycle_rules().await?;
        let date_rules = match state.last_streak_date {
            Some(date) => self.catalog.date_rules_on(date).await?,
            None => Vec::new(),
        };
        Ok(RuleSet {
            cycle_rules,
            date_rules,
        })
    }

    pub async fn claimable(
        &self,
        tx: &mut dyn StreakTransaction,
        user_id: &UserId,
        state: &StreakState,
        rules: &RuleSet,
    ) -> Result<Vec<ClaimableReward>, DomainError> {
        let claimed = tx.claimed_keys(user_id).await?;
        Ok(claimable_rewards(
            state,
            &rules.cycle_rules,
            &rules.date_rules,
            &claimed,
        ))
    }

    /// Parse the claim request and look up its rule. Unknown rules fail
    /// here with `UnknownRule`.
    pub async fn resolve(
        &self,
        source: RewardSource,
        source_key: &str,
    ) -> Result<ResolvedClaim, DomainError> {
        let key = RewardSourceKey::parse(source, source_key)?;
        let (cycle_rule, date_rule) = match &key {
            RewardSourceKey::Cycle { rule_id, .. } => {
                (self.catalog.find_cycle_rule(rule_id).await?, None)
            }
            RewardSourceKey::Date { rule_id } => {
                (None, self.catalog.find_date_rule(rule_id).await?)
            }
        };

        Ok(ResolvedClaim {
            key,
            cycle_rule,
            date_rule,
        })
    }

    /// Validate against `state`, then insert the claim and credit it.
    ///
    /// A second claim of the same key is rejected by the store's unique
    /// constraint and surfaces as `AlreadyClaimed`.
    pub async fn claim(
        &self,
        tx: &mut dyn StreakTransaction,
        user_id: &UserId,
        state: &StreakState,
        resolved: &ResolvedClaim,
    ) -> Result<ClaimRecord, DomainError> {
        let reward = validate_claim(
            state,
            &resolved.key,
            resolved.cycle_rule.as_ref(),
            resolved.date_rule.as_ref(),
        )?;

        let record = ClaimRecord::new(user_id.clone(), reward.claim_key(), reward.payload);
        tx.insert_claim(&record).await?;
        tx.credit(user_id, record.payload()).await?;

        info!(
            "Reward {} {} ({}) claimed by {}",
            record.key().source,
            record.key().source_key,
            record.key().claim_date,
            user_id
        );

        Ok(record)
    }
}
