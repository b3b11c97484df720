use async_trait::async_trait;

use crate::ledger::DateLedger;
use crate::reward::ClaimLedger;
use crate::streak::StreakCounterStore;

/// Commit/rollback half of an open transaction. Dropping an uncommitted
/// context rolls it back.
#[async_trait]
pub trait TransactionContext: Send {
    async fn commit(self: Box<Self>) -> Result<(), UnitOfWorkError>;

    async fn rollback(self: Box<Self>) -> Result<(), UnitOfWorkError>;
}

/// Everything the streak engine touches inside one atomic boundary:
/// the date ledger, the cached counter, and the claim/credit tables.
pub trait StreakTransaction:
    TransactionContext + DateLedger + StreakCounterStore + ClaimLedger
{
}

impl<T> StreakTransaction for T where
    T: TransactionContext + DateLedger + StreakCounterStore + ClaimLedger
{
}

#[derive(Debug, thiserror::Error)]
pub enum UnitOfWorkError {
    #[error("Could not open transaction: {0}")]
    TransactionFailed(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Rollback failed: {0}")]
    RollbackFailed(String),

    /// A concurrent writer holds the store; the caller may retry.
    #[error("Transaction conflict: {0}")]
    Conflict(String),
}

/// Opens streak transactions against the backing store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StreakTransaction>, UnitOfWorkError>;
}
