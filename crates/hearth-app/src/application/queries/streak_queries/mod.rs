use hearth_domain::ledger::DateLedger;
use hearth_domain::reward::ClaimLedger;
use hearth_domain::shared::{
    DomainError, ReferenceClock, StreakTransaction, TransactionContext, UnitOfWork, UserId,
};
use hearth_infrastructure::persistence::repositories::SqliteWalletRepository;
use std::sync::Arc;

use crate::application::dtos::{
    ClaimRecordDto, ClaimableRewardDto, StreakCalendarDto, StreakStateDto, WalletDto,
};
use crate::application::services::{
    ConsistencyMaintainer, ReconcileOutcome, RewardEligibilityEvaluator,
};

mod calendar;

/// Read side of the engine.
///
/// Every read reconciles first, so a state returned here is never staler
/// than the ledger. The transaction is committed only when reconciliation
/// wrote something.
pub struct StreakQueries {
    uow: Arc<dyn UnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    evaluator: Arc<RewardEligibilityEvaluator>,
    wallet_repo: Arc<SqliteWalletRepository>,
    clock: Arc<dyn ReferenceClock>,
}

impl StreakQueries {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        maintainer: Arc<ConsistencyMaintainer>,
        evaluator: Arc<RewardEligibilityEvaluator>,
        wallet_repo: Arc<SqliteWalletRepository>,
        clock: Arc<dyn ReferenceClock>,
    ) -> Self {
        Self {
            uow,
            maintainer,
            evaluator,
            wallet_repo,
            clock,
        }
    }

    pub async fn get_streak_state(&self, user_id: &UserId) -> Result<StreakStateDto, DomainError> {
        let today = self.clock.today();
        let outcome = self
            .maintainer
            .reconcile_committed(self.uow.as_ref(), user_id, today)
            .await?;

        Ok(StreakStateDto::from_state(user_id, &outcome.state, today))
    }

    pub async fn list_claimable_rewards(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ClaimableRewardDto>, DomainError> {
        let today = self.clock.today();
        let outcome = self
            .maintainer
            .reconcile_committed(self.uow.as_ref(), user_id, today)
            .await?;

        // Rules are read before the claim ledger transaction opens.
        let rules = self.evaluator.rules_for(&outcome.state).await?;

        let mut tx = self.uow.begin().await?;
        let rewards = self
            .evaluator
            .claimable(tx.as_mut(), user_id, &outcome.state, &rules)
            .await?;
        tx.rollback().await?;

        Ok(rewards.into_iter().map(ClaimableRewardDto::from).collect())
    }

    pub async fn get_calendar(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<StreakCalendarDto, DomainError> {
        calendar::month_bounds(year, month)?;

        let today = self.clock.today();
        let mut tx = self.uow.begin().await?;

        let outcome = self.maintainer.reconcile(tx.as_mut(), user_id, today).await?;
        let snapshot = tx.snapshot(user_id).await?;

        finish(tx, &outcome).await?;

        calendar::build_calendar(
            user_id,
            year,
            month,
            &snapshot,
            StreakStateDto::from_state(user_id, &outcome.state, today),
            today,
        )
    }

    /// Claim history, newest first.
    pub async fn list_claims(&self, user_id: &UserId) -> Result<Vec<ClaimRecordDto>, DomainError> {
        let mut tx = self.uow.begin().await?;
        let claims = tx.list_claims(user_id).await?;
        tx.rollback().await?;

        Ok(claims.into_iter().map(ClaimRecordDto::from).collect())
    }

    pub async fn get_wallet(&self, user_id: &UserId) -> Result<WalletDto, DomainError> {
        let points = self.wallet_repo.points_balance(user_id).await?;
        let items = self.wallet_repo.backpack(user_id).await?;

        Ok(WalletDto {
            user_id: user_id.to_string(),
            points,
            items,
        })
    }
}

async fn finish(
    tx: Box<dyn StreakTransaction>,
    outcome: &ReconcileOutcome,
) -> Result<(), DomainError> {
    if outcome.changed {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }
    Ok(())
}
