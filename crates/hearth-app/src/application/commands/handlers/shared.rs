use chrono::NaiveDate;
use hearth_domain::events::EventBus;
use hearth_domain::ledger::{DateLedger, DateLedgerEntry, DayCategory};
use hearth_domain::shared::{DomainError, TransactionContext, UnitOfWork, UserId};
use log::warn;

use crate::application::services::{retry_on_conflict, ConsistencyMaintainer, ReconcileOutcome};

pub(super) fn parse_user_id(raw: &str) -> Result<UserId, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput("User id must not be empty".to_string()));
    }
    Ok(UserId::from_string(trimmed))
}

pub(super) enum LedgerChange {
    Mark(DateLedgerEntry),
    Unmark { date: NaiveDate, category: DayCategory },
}

/// Apply one ledger mutation and reconcile, all in one transaction.
///
/// Marks and unmarks are idempotent, so a conflicting attempt is simply
/// applied again in a fresh transaction; the returned state always
/// includes this change.
pub(super) async fn apply_ledger_change(
    uow: &dyn UnitOfWork,
    maintainer: &ConsistencyMaintainer,
    user_id: &UserId,
    change: &LedgerChange,
    today: NaiveDate,
) -> Result<ReconcileOutcome, DomainError> {
    let label = format!("Ledger write for {}", user_id);
    retry_on_conflict(&label, || try_apply(uow, maintainer, user_id, change, today)).await
}

async fn try_apply(
    uow: &dyn UnitOfWork,
    maintainer: &ConsistencyMaintainer,
    user_id: &UserId,
    change: &LedgerChange,
    today: NaiveDate,
) -> Result<ReconcileOutcome, DomainError> {
    let mut tx = uow.begin().await?;

    match change {
        LedgerChange::Mark(entry) => tx.mark(entry).await?,
        LedgerChange::Unmark { date, category } => {
            tx.unmark(user_id, *date, *category).await?;
        }
    }

    let outcome = maintainer.reconcile(tx.as_mut(), user_id, today).await?;
    tx.commit().await?;
    Ok(outcome)
}

/// Announce a streak change. Delivery failures are logged only; the
/// ledger change is already committed.
pub(super) async fn publish_recalculated(
    event_bus: &dyn EventBus,
    user_id: &UserId,
    outcome: &ReconcileOutcome,
) {
    if !outcome.streak_changed() {
        return;
    }
    if let Err(e) = event_bus.publish(Box::new(outcome.to_event(user_id))).await {
        warn!("Failed to publish StreakRecalculated for {}: {}", user_id, e);
    }
}
