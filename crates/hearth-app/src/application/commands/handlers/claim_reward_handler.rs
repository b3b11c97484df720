use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hearth_domain::events::streak_events::RewardClaimed;
use hearth_domain::events::EventBus;
use hearth_domain::reward::ClaimRecord;
use hearth_domain::shared::{DomainError, ReferenceClock, TransactionContext, UnitOfWork, UserId};
use log::{info, warn};
use std::sync::Arc;

use super::shared::{parse_user_id, publish_recalculated};
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::streak_commands::ClaimRewardCommand;
use crate::application::dtos::ClaimResultDto;
use crate::application::services::{
    ConsistencyMaintainer, ReconcileOutcome, ResolvedClaim, RewardEligibilityEvaluator,
};

/// Claim reward command handler
///
/// Reconciliation, validation, the claim insert and the credit share one
/// transaction, so a reward is granted at most once and always against a
/// current streak.
pub struct ClaimRewardCommandHandler {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    evaluator: Arc<RewardEligibilityEvaluator>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<dyn EventBus>,
}

impl ClaimRewardCommandHandler {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        maintainer: Arc<ConsistencyMaintainer>,
        evaluator: Arc<RewardEligibilityEvaluator>,
        clock: Arc<dyn ReferenceClock>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            uow,
            maintainer,
            evaluator,
            clock,
            event_bus,
        }
    }

    async fn try_claim(
        &self,
        user_id: &UserId,
        resolved: &ResolvedClaim,
        today: NaiveDate,
    ) -> Result<(ReconcileOutcome, ClaimRecord), DomainError> {
        let mut tx = self.uow.begin().await?;

        let outcome = self.maintainer.reconcile(tx.as_mut(), user_id, today).await?;
        let record = self
            .evaluator
            .claim(tx.as_mut(), user_id, &outcome.state, resolved)
            .await?;

        tx.commit().await?;
        Ok((outcome, record))
    }

    async fn publish_claimed(&self, record: &ClaimRecord) {
        let key = record.key();
        let event = RewardClaimed {
            user_id: record.user_id().clone(),
            source: key.source,
            source_key: key.source_key.clone(),
            claim_date: key.claim_date,
            payload: record.payload().clone(),
            occurred_at: Utc::now(),
        };

        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish RewardClaimed for {}: {}", record.user_id(), e);
        }
    }
}

#[async_trait]
impl CommandHandler<ClaimRewardCommand> for ClaimRewardCommandHandler {
    type Result = ClaimResultDto;

    async fn handle(&self, cmd: ClaimRewardCommand) -> Result<Self::Result, DomainError> {
        let user_id = parse_user_id(&cmd.user_id)?;
        let today = self.clock.today();

        info!(
            "Handling ClaimRewardCommand: {} {} for {}",
            cmd.source, cmd.source_key, user_id
        );

        let resolved = self.evaluator.resolve(cmd.source, &cmd.source_key).await?;

        // A busy store is retried once; the retry either claims or hits the
        // unique key and reports AlreadyClaimed.
        let (outcome, record) = match self.try_claim(&user_id, &resolved, today).await {
            Err(e) if e.is_storage_conflict() => {
                warn!(
                    "Claim of {} {} for {} conflicted, retrying: {}",
                    cmd.source,
                    cmd.source_key,
                    user_id,
                    e.format_with_code()
                );
                self.try_claim(&user_id, &resolved, today).await?
            }
            other => other?,
        };

        publish_recalculated(self.event_bus.as_ref(), &user_id, &outcome).await;
        self.publish_claimed(&record).await;

        Ok(ClaimResultDto::from(&record))
    }
}
