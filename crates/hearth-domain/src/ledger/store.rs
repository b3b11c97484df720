use async_trait::async_trait;
use chrono::NaiveDate;

use super::{DateLedgerEntry, DayCategory, LedgerSnapshot};
use crate::shared::{DomainError, UserId};

/// Date ledger operations available inside a transaction.
#[async_trait]
pub trait DateLedger: Send {
    /// Insert the entry, first deleting any entry for the same date in the
    /// other two categories. Re-marking with the same category is a no-op.
    async fn mark(&mut self, entry: &DateLedgerEntry) -> Result<(), DomainError>;

    /// Delete the entry if present. Returns whether a row was removed.
    async fn unmark(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        category: DayCategory,
    ) -> Result<bool, DomainError>;

    /// Ascending dates of one category.
    async fn list_by_category(
        &mut self,
        user_id: &UserId,
        category: DayCategory,
    ) -> Result<Vec<NaiveDate>, DomainError>;

    /// All three sets at once.
    async fn snapshot(&mut self, user_id: &UserId) -> Result<LedgerSnapshot, DomainError>;

    /// Delete every streak date strictly before `keep_from`.
    async fn prune_streak_dates_before(
        &mut self,
        user_id: &UserId,
        keep_from: NaiveDate,
    ) -> Result<u64, DomainError>;

    /// Users with ledger rows or a cached counter.
    async fn known_users(&mut self) -> Result<Vec<UserId>, DomainError>;
}
