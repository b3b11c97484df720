#![allow(dead_code)]

use chrono::NaiveDate;
use hearth_infrastructure::persistence::{Database, SqliteUnitOfWork};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Fresh migrated in-memory database.
pub async fn setup_in_memory_db() -> SqlitePool {
    let db = Database::in_memory()
        .await
        .expect("open in-memory database");
    db.run_migrations().await.expect("run migrations");
    db.pool().clone()
}

pub fn unit_of_work(pool: &SqlitePool) -> SqliteUnitOfWork {
    SqliteUnitOfWork::new(Arc::new(pool.clone()))
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
