use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hearth_domain::reward::{DateRewardRule, RewardCatalog, RewardCycleRule, RewardPayload};
use hearth_domain::shared::{DomainError, RuleId};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use super::PayloadColumns;
use crate::persistence::SqliteRepositoryBase;

#[derive(FromRow)]
struct CycleRuleRow {
    id: String,
    cycle_days: i64,
    reward_type: String,
    points: Option<i64>,
    item_key: Option<String>,
    quantity: Option<i64>,
}

impl CycleRuleRow {
    fn into_rule(self) -> Result<RewardCycleRule, DomainError> {
        let cycle_days = u32::try_from(self.cycle_days).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Invalid cycle_days {} for rule {}",
                self.cycle_days, self.id
            ))
        })?;
        let payload =
            RewardPayload::from_columns(&self.reward_type, self.points, self.item_key, self.quantity)?;
        RewardCycleRule::new(RuleId::from_string(&self.id), cycle_days, payload)
    }
}

#[derive(FromRow)]
struct DateRuleRow {
    id: String,
    calendar_date: NaiveDate,
    reward_type: String,
    points: Option<i64>,
    item_key: Option<String>,
    quantity: Option<i64>,
}

impl DateRuleRow {
    fn into_rule(self) -> Result<DateRewardRule, DomainError> {
        let payload =
            RewardPayload::from_columns(&self.reward_type, self.points, self.item_key, self.quantity)?;
        Ok(DateRewardRule::new(
            RuleId::from_string(&self.id),
            self.calendar_date,
            payload,
        ))
    }
}

const CYCLE_COLUMNS: &str = "id, cycle_days, reward_type, points, item_key, quantity";
const DATE_COLUMNS: &str = "id, calendar_date, reward_type, points, item_key, quantity";

/// Reward rules stored in `reward_cycle_rules` / `reward_date_rules`.
///
/// The engine only reads them; the save/delete methods are for whoever
/// manages the catalog (seeding, admin tooling, tests).
pub struct SqliteRewardCatalog {
    base: SqliteRepositoryBase,
}

impl SqliteRewardCatalog {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    pub async fn save_cycle_rule(&self, rule: &RewardCycleRule) -> Result<(), DomainError> {
        let columns = PayloadColumns::from(rule.payload());
        let query = r#"
            INSERT INTO reward_cycle_rules (id, cycle_days, reward_type, points, item_key, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                cycle_days = ?2,
                reward_type = ?3,
                points = ?4,
                item_key = ?5,
                quantity = ?6
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(rule.id().as_str())
                    .bind(i64::from(rule.cycle_days()))
                    .bind(columns.reward_type)
                    .bind(columns.points)
                    .bind(columns.item_key)
                    .bind(columns.quantity)
                    .bind(Utc::now()),
                "Save cycle reward rule",
            )
            .await?;

        Ok(())
    }

    pub async fn save_date_rule(&self, rule: &DateRewardRule) -> Result<(), DomainError> {
        let columns = PayloadColumns::from(rule.payload());
        let query = r#"
            INSERT INTO reward_date_rules (id, calendar_date, reward_type, points, item_key, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                calendar_date = ?2,
                reward_type = ?3,
                points = ?4,
                item_key = ?5,
                quantity = ?6
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(rule.id().as_str())
                    .bind(rule.calendar_date())
                    .bind(columns.reward_type)
                    .bind(columns.points)
                    .bind(columns.item_key)
                    .bind(columns.quantity)
                    .bind(Utc::now()),
                "Save date reward rule",
            )
            .await?;

        Ok(())
    }

    /// Remove a rule from both tables. Returns whether anything was deleted.
    pub async fn delete_rule(&self, id: &RuleId) -> Result<bool, DomainError> {
        let cycle = self
            .base
            .execute(
                sqlx::query("DELETE FROM reward_cycle_rules WHERE id = ?1").bind(id.as_str()),
                "Delete cycle reward rule",
            )
            .await?;
        let date = self
            .base
            .execute(
                sqlx::query("DELETE FROM reward_date_rules WHERE id = ?1").bind(id.as_str()),
                "Delete date reward rule",
            )
            .await?;

        Ok(cycle.rows_affected() + date.rows_affected() > 0)
    }
}

#[async_trait]
impl RewardCatalog for SqliteRewardCatalog {
    async fn cycle_rules(&self) -> Result<Vec<RewardCycleRule>, DomainError> {
        let query = format!("SELECT {} FROM reward_cycle_rules ORDER BY cycle_days ASC, id ASC", CYCLE_COLUMNS);

        let rows: Vec<CycleRuleRow> = self
            .base
            .fetch_all(sqlx::query_as(&query), "Load cycle reward rules")
            .await?;

        rows.into_iter().map(CycleRuleRow::into_rule).collect()
    }

    async fn date_rules_on(&self, date: NaiveDate) -> Result<Vec<DateRewardRule>, DomainError> {
        let query = format!(
            "SELECT {} FROM reward_date_rules WHERE calendar_date = ?1 ORDER BY id ASC",
            DATE_COLUMNS
        );

        let rows: Vec<DateRuleRow> = self
            .base
            .fetch_all(sqlx::query_as(&query).bind(date), "Load date reward rules")
            .await?;

        rows.into_iter().map(DateRuleRow::into_rule).collect()
    }

    async fn find_cycle_rule(&self, id: &RuleId) -> Result<Option<RewardCycleRule>, DomainError> {
        let query = format!("SELECT {} FROM reward_cycle_rules WHERE id = ?1", CYCLE_COLUMNS);

        let row: Option<CycleRuleRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.as_str()), "Find cycle reward rule")
            .await?;

        row.map(CycleRuleRow::into_rule).transpose()
    }

    async fn find_date_rule(&self, id: &RuleId) -> Result<Option<DateRewardRule>, DomainError> {
        let query = format!("SELECT {} FROM reward_date_rules WHERE id = ?1", DATE_COLUMNS);

        let row: Option<DateRuleRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.as_str()), "Find date reward rule")
            .await?;

        row.map(DateRuleRow::into_rule).transpose()
    }
}
