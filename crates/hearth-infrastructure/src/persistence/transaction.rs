use async_trait::async_trait;
use hearth_domain::shared::{
    DomainError, StreakTransaction, TransactionContext, UnitOfWork, UnitOfWorkError,
};
use sqlx::{Pool, Sqlite, SqliteConnection, Transaction as SqlxTransaction};
use std::sync::Arc;

use super::RepositoryErrorMapper;

/// One SQLite transaction carrying every ledger, counter and claim
/// operation. Dropping it without committing rolls back.
pub struct SqliteStreakTransaction {
    tx: Option<SqlxTransaction<'static, Sqlite>>,
}

impl SqliteStreakTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Connection the repositories run their statements on.
    pub(crate) fn connection(&mut self) -> Result<&mut SqliteConnection, DomainError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| DomainError::Infrastructure("Transaction already finished".to_string()))
    }
}

fn map_transaction_error(error: sqlx::Error, wrap: fn(String) -> UnitOfWorkError) -> UnitOfWorkError {
    if RepositoryErrorMapper::is_busy(&error) {
        UnitOfWorkError::Conflict(error.to_string())
    } else {
        wrap(error.to_string())
    }
}

#[async_trait]
impl TransactionContext for SqliteStreakTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), UnitOfWorkError> {
        match self.tx.take() {
            Some(tx) => tx
                .commit()
                .await
                .map_err(|e| map_transaction_error(e, UnitOfWorkError::CommitFailed)),
            None => Err(UnitOfWorkError::CommitFailed(
                "Transaction already finished".to_string(),
            )),
        }
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), UnitOfWorkError> {
        match self.tx.take() {
            Some(tx) => tx
                .rollback()
                .await
                .map_err(|e| UnitOfWorkError::RollbackFailed(e.to_string())),
            None => Err(UnitOfWorkError::RollbackFailed(
                "Transaction already finished".to_string(),
            )),
        }
    }
}

/// Sqlite implementation of Unit of Work
pub struct SqliteUnitOfWork {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteUnitOfWork {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn StreakTransaction>, UnitOfWorkError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_transaction_error(e, UnitOfWorkError::TransactionFailed))?;

        Ok(Box::new(SqliteStreakTransaction::new(tx)))
    }
}
