use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hearth_domain::ledger::{DateLedger, DateLedgerEntry, DayCategory, LedgerSnapshot};
use hearth_domain::shared::{DomainError, UserId};

use crate::persistence::{ResultExt, SqliteStreakTransaction};

#[async_trait]
impl DateLedger for SqliteStreakTransaction {
    /// One upsert, so a write transaction's first statement takes the
    /// write lock and waits out the busy timeout instead of failing on a
    /// read-to-write upgrade.
    async fn mark(&mut self, entry: &DateLedgerEntry) -> Result<(), DomainError> {
        let conn = self.connection()?;

        let result = sqlx::query(
            r#"
            INSERT INTO date_ledger (user_id, entry_date, category, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, entry_date) DO UPDATE SET
                category = excluded.category,
                created_at = excluded.created_at
            WHERE date_ledger.category <> excluded.category
            "#,
        )
        .bind(entry.user_id().as_str())
        .bind(entry.date())
        .bind(entry.category().as_str())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_repo_error("Write ledger entry")?;

        tracing::debug!(
            user_id = %entry.user_id(),
            date = %entry.date(),
            category = %entry.category(),
            written = result.rows_affected() > 0,
            "Ledger entry marked"
        );

        Ok(())
    }

    async fn unmark(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        category: DayCategory,
    ) -> Result<bool, DomainError> {
        let conn = self.connection()?;

        let result = sqlx::query(
            "DELETE FROM date_ledger WHERE user_id = ?1 AND entry_date = ?2 AND category = ?3",
        )
        .bind(user_id.as_str())
        .bind(date)
        .bind(category.as_str())
        .execute(&mut *conn)
        .await
        .map_repo_error("Delete ledger entry")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_category(
        &mut self,
        user_id: &UserId,
        category: DayCategory,
    ) -> Result<Vec<NaiveDate>, DomainError> {
        let conn = self.connection()?;

        sqlx::query_scalar(
            "SELECT entry_date FROM date_ledger WHERE user_id = ?1 AND category = ?2 ORDER BY entry_date ASC",
        )
        .bind(user_id.as_str())
        .bind(category.as_str())
        .fetch_all(&mut *conn)
        .await
        .map_repo_error("List ledger dates by category")
    }

    async fn snapshot(&mut self, user_id: &UserId) -> Result<LedgerSnapshot, DomainError> {
        let conn = self.connection()?;

        let rows: Vec<(NaiveDate, String)> = sqlx::query_as(
            "SELECT entry_date, category FROM date_ledger WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_all(&mut *conn)
        .await
        .map_repo_error("Load ledger snapshot")?;

        let entries = rows
            .into_iter()
            .map(|(date, category)| {
                category
                    .parse::<DayCategory>()
                    .map(|category| (date, category))
                    .map_err(|e| DomainError::DataIntegrity(e.message().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LedgerSnapshot::from_entries(entries))
    }

    async fn prune_streak_dates_before(
        &mut self,
        user_id: &UserId,
        keep_from: NaiveDate,
    ) -> Result<u64, DomainError> {
        let conn = self.connection()?;

        let result = sqlx::query(
            "DELETE FROM date_ledger WHERE user_id = ?1 AND category = 'streak' AND entry_date < ?2",
        )
        .bind(user_id.as_str())
        .bind(keep_from)
        .execute(&mut *conn)
        .await
        .map_repo_error("Prune streak dates")?;

        let pruned = result.rows_affected();
        if pruned > 0 {
            tracing::debug!(user_id = %user_id, keep_from = %keep_from, pruned, "Pruned streak history");
        }
        Ok(pruned)
    }

    async fn known_users(&mut self) -> Result<Vec<UserId>, DomainError> {
        let conn = self.connection()?;

        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM date_ledger UNION SELECT user_id FROM streak_counters ORDER BY user_id",
        )
        .fetch_all(&mut *conn)
        .await
        .map_repo_error("List known users")?;

        Ok(ids.iter().map(|id| UserId::from_string(id)).collect())
    }
}
