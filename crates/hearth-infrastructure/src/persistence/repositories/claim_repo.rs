use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hearth_domain::reward::{ClaimKey, ClaimLedger, ClaimRecord, RewardPayload, RewardSource};
use hearth_domain::shared::{DomainError, UserId};
use sqlx::FromRow;
use std::collections::HashSet;

use super::PayloadColumns;
use crate::persistence::{RepositoryErrorMapper, ResultExt, SqliteStreakTransaction};

fn parse_source(raw: &str) -> Result<RewardSource, DomainError> {
    raw.parse::<RewardSource>()
        .map_err(|e| DomainError::DataIntegrity(e.message().to_string()))
}

#[derive(FromRow)]
struct ClaimRow {
    user_id: String,
    claim_date: NaiveDate,
    reward_source: String,
    source_key: String,
    reward_type: String,
    points: Option<i64>,
    item_key: Option<String>,
    quantity: Option<i64>,
    claimed_at: DateTime<Utc>,
}

impl ClaimRow {
    fn into_record(self) -> Result<ClaimRecord, DomainError> {
        let key = ClaimKey {
            claim_date: self.claim_date,
            source: parse_source(&self.reward_source)?,
            source_key: self.source_key,
        };
        let payload =
            RewardPayload::from_columns(&self.reward_type, self.points, self.item_key, self.quantity)?;

        Ok(ClaimRecord::restore(
            UserId::from_string(&self.user_id),
            key,
            payload,
            self.claimed_at,
        ))
    }
}

#[async_trait]
impl ClaimLedger for SqliteStreakTransaction {
    async fn claimed_keys(&mut self, user_id: &UserId) -> Result<HashSet<ClaimKey>, DomainError> {
        let conn = self.connection()?;

        let rows: Vec<(NaiveDate, String, String)> = sqlx::query_as(
            "SELECT claim_date, reward_source, source_key FROM reward_claims WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_all(&mut *conn)
        .await
        .map_repo_error("Load claimed reward keys")?;

        rows.into_iter()
            .map(|(claim_date, source, source_key)| {
                Ok(ClaimKey {
                    claim_date,
                    source: parse_source(&source)?,
                    source_key,
                })
            })
            .collect()
    }

    async fn insert_claim(&mut self, claim: &ClaimRecord) -> Result<(), DomainError> {
        let conn = self.connection()?;
        let columns = PayloadColumns::from(claim.payload());
        let key = claim.key();

        let query = r#"
            INSERT INTO reward_claims (user_id, claim_date, reward_source, source_key, reward_type, points, item_key, quantity, claimed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#;

        let result = sqlx::query(query)
            .bind(claim.user_id().as_str())
            .bind(key.claim_date)
            .bind(key.source.as_str())
            .bind(&key.source_key)
            .bind(columns.reward_type)
            .bind(columns.points)
            .bind(columns.item_key)
            .bind(columns.quantity)
            .bind(claim.claimed_at())
            .execute(&mut *conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if RepositoryErrorMapper::is_unique_violation(&e) => {
                Err(DomainError::AlreadyClaimed(format!(
                    "{} {} on {} was already claimed by {}",
                    key.source,
                    key.source_key,
                    key.claim_date,
                    claim.user_id()
                )))
            }
            Err(e) => Err(RepositoryErrorMapper::map_sqlx_error(e, "Insert reward claim")),
        }
    }

    async fn credit(
        &mut self,
        user_id: &UserId,
        payload: &RewardPayload,
    ) -> Result<(), DomainError> {
        let conn = self.connection()?;
        let now = Utc::now();

        match payload {
            RewardPayload::Points { amount } => {
                sqlx::query(
                    r#"
                    INSERT INTO user_points (user_id, balance, updated_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(user_id) DO UPDATE SET
                        balance = balance + excluded.balance,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(user_id.as_str())
                .bind(*amount)
                .bind(now)
                .execute(&mut *conn)
                .await
                .map_repo_error("Credit points")?;
            }
            RewardPayload::Item { item_key, quantity } => {
                sqlx::query(
                    r#"
                    INSERT INTO backpack_items (user_id, item_key, quantity, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(user_id, item_key) DO UPDATE SET
                        quantity = quantity + excluded.quantity,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(user_id.as_str())
                .bind(item_key)
                .bind(i64::from(*quantity))
                .bind(now)
                .execute(&mut *conn)
                .await
                .map_repo_error("Credit backpack item")?;
            }
        }

        tracing::debug!(user_id = %user_id, reward_type = payload.reward_type(), "Reward credited");
        Ok(())
    }

    async fn list_claims(&mut self, user_id: &UserId) -> Result<Vec<ClaimRecord>, DomainError> {
        let conn = self.connection()?;

        let rows: Vec<ClaimRow> = sqlx::query_as(
            "SELECT user_id, claim_date, reward_source, source_key, reward_type, points, item_key, quantity, claimed_at FROM reward_claims WHERE user_id = ?1 ORDER BY claimed_at DESC, id DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(&mut *conn)
        .await
        .map_repo_error("List reward claims")?;

        rows.into_iter().map(ClaimRow::into_record).collect()
    }
}
