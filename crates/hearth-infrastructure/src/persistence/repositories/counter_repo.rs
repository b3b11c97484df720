use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hearth_domain::shared::{DomainError, UserId};
use hearth_domain::streak::{StreakCounter, StreakCounterStore, StreakState};
use sqlx::FromRow;

use crate::persistence::{ResultExt, SqliteStreakTransaction};

#[derive(FromRow)]
struct StreakCounterRow {
    user_id: String,
    streak_days: i64,
    last_streak_date: Option<NaiveDate>,
    consecutive_missed_days: i64,
    updated_at: DateTime<Utc>,
}

impl StreakCounterRow {
    fn into_counter(self) -> Result<StreakCounter, DomainError> {
        let streak_days = u32::try_from(self.streak_days).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Invalid streak_days {} for user {}",
                self.streak_days, self.user_id
            ))
        })?;
        let consecutive_missed_days = u32::try_from(self.consecutive_missed_days).map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Invalid consecutive_missed_days {} for user {}",
                self.consecutive_missed_days, self.user_id
            ))
        })?;

        Ok(StreakCounter::restore(
            UserId::from_string(&self.user_id),
            StreakState {
                streak_days,
                last_streak_date: self.last_streak_date,
                consecutive_missed_days,
            },
            self.updated_at,
        ))
    }
}

#[async_trait]
impl StreakCounterStore for SqliteStreakTransaction {
    async fn load_counter(
        &mut self,
        user_id: &UserId,
    ) -> Result<Option<StreakCounter>, DomainError> {
        let conn = self.connection()?;

        let row: Option<StreakCounterRow> = sqlx::query_as(
            "SELECT user_id, streak_days, last_streak_date, consecutive_missed_days, updated_at FROM streak_counters WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_repo_error("Load streak counter")?;

        row.map(StreakCounterRow::into_counter).transpose()
    }

    async fn save_counter(&mut self, counter: &StreakCounter) -> Result<(), DomainError> {
        let conn = self.connection()?;

        let query = r#"
            INSERT INTO streak_counters (user_id, streak_days, last_streak_date, consecutive_missed_days, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id) DO UPDATE SET
                streak_days = ?2,
                last_streak_date = ?3,
                consecutive_missed_days = ?4,
                updated_at = ?5
        "#;

        sqlx::query(query)
            .bind(counter.user_id().as_str())
            .bind(i64::from(counter.streak_days()))
            .bind(counter.last_streak_date())
            .bind(i64::from(counter.consecutive_missed_days()))
            .bind(counter.updated_at())
            .execute(&mut *conn)
            .await
            .map_repo_error("Save streak counter")?;

        Ok(())
    }
}
