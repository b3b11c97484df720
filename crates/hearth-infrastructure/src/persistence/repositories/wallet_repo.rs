use hearth_domain::shared::{DomainError, UserId};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::SqliteRepositoryBase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BackpackItem {
    pub item_key: String,
    pub quantity: i64,
}

/// Read side of the points balance and backpack that claims credit.
pub struct SqliteWalletRepository {
    base: SqliteRepositoryBase,
}

impl SqliteWalletRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    pub async fn points_balance(&self, user_id: &UserId) -> Result<i64, DomainError> {
        let row: Option<(i64,)> = self
            .base
            .fetch_optional(
                sqlx::query_as("SELECT balance FROM user_points WHERE user_id = ?1")
                    .bind(user_id.as_str()),
                "Load points balance",
            )
            .await?;

        Ok(row.map(|(balance,)| balance).unwrap_or(0))
    }

    pub async fn backpack(&self, user_id: &UserId) -> Result<Vec<BackpackItem>, DomainError> {
        self.base
            .fetch_all(
                sqlx::query_as(
                    "SELECT item_key, quantity FROM backpack_items WHERE user_id = ?1 AND quantity > 0 ORDER BY item_key ASC",
                )
                .bind(user_id.as_str()),
                "Load backpack items",
            )
            .await
    }
}
