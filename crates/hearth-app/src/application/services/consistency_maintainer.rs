use chrono::{NaiveDate, Utc};
use hearth_domain::events::streak_events::StreakRecalculated;
use hearth_domain::ledger::DateLedger;
use hearth_domain::shared::{DomainError, StreakTransaction, TransactionContext, UnitOfWork, UserId};
use hearth_domain::streak::{recompute, StreakCounter, StreakCounterStore, StreakPolicy, StreakState};
use log::debug;

use super::conflict_retry::retry_on_conflict;

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub previous: StreakState,
    pub state: StreakState,
    /// Whether the pass wrote anything (counter or pruning).
    pub changed: bool,
    pub pruned: u64,
}

impl ReconcileOutcome {
    /// Streak length or anchor moved; the missed-day count alone does not
    /// count.
    pub fn streak_changed(&self) -> bool {
        self.previous.streak_days != self.state.streak_days
            || self.previous.last_streak_date != self.state.last_streak_date
    }

    pub fn to_event(&self, user_id: &UserId) -> StreakRecalculated {
        StreakRecalculated {
            user_id: user_id.clone(),
            previous_streak_days: self.previous.streak_days,
            streak_days: self.state.streak_days,
            last_streak_date: self.state.last_streak_date,
            consecutive_missed_days: self.state.consecutive_missed_days,
            pruned_dates: self.pruned,
            occurred_at: Utc::now(),
        }
    }
}

/// Keeps the cached streak counter equal to the ledger's projection.
///
/// The only writer of `streak_counters`. Every ledger mutation and every
/// state read goes through [`ConsistencyMaintainer::reconcile`] inside the
/// caller's transaction.
pub struct ConsistencyMaintainer {
    policy: StreakPolicy,
}

impl ConsistencyMaintainer {
    pub fn new(policy: StreakPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StreakPolicy {
        &self.policy
    }

    pub async fn reconcile(
        &self,
        tx: &mut dyn StreakTransaction,
        user_id: &UserId,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome, DomainError> {
        let snapshot = tx.snapshot(user_id).await?;
        let recomputed = recompute(&snapshot, today, &self.policy);

        let pruned = match recomputed.keep_from {
            Some(keep_from) if recomputed.stale_streak_dates(&snapshot) > 0 => {
                tx.prune_streak_dates_before(user_id, keep_from).await?
            }
            _ => 0,
        };

        let (mut counter, is_new) = match tx.load_counter(user_id).await? {
            Some(counter) => (counter, false),
            None => (StreakCounter::new(user_id.clone()), true),
        };
        let previous = counter.state();
        let counter_changed = counter.apply(recomputed.state) || is_new;

        if counter_changed {
            tx.save_counter(&counter).await?;
        }

        let outcome = ReconcileOutcome {
            previous,
            state: recomputed.state,
            changed: counter_changed || pruned > 0,
            pruned,
        };

        if outcome.changed {
            debug!(
                "Reconciled streak for {}: {} -> {} days (missed {}, pruned {}, reset {})",
                user_id,
                previous.streak_days,
                outcome.state.streak_days,
                outcome.state.consecutive_missed_days,
                pruned,
                recomputed.reset
            );
        }

        Ok(outcome)
    }

    /// Reconcile in a transaction of its own and commit. A read that loses
    /// its snapshot to a concurrent writer starts over.
    pub async fn reconcile_committed(
        &self,
        uow: &dyn UnitOfWork,
        user_id: &UserId,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome, DomainError> {
        let label = format!("Reconcile of {}", user_id);
        retry_on_conflict(&label, || self.reconcile_once(uow, user_id, today)).await
    }

    async fn reconcile_once(
        &self,
        uow: &dyn UnitOfWork,
        user_id: &UserId,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome, DomainError> {
        let mut tx = uow.begin().await?;
        let outcome = self.reconcile(tx.as_mut(), user_id, today).await?;
        if outcome.changed {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(outcome)
    }
}
