#![allow(dead_code)]

use chrono::NaiveDate;
use hearth_app::{EngineBuilder, StreakEngine};
use hearth_domain::shared::FixedClock;
use hearth_infrastructure::config::EngineConfig;
use std::sync::Arc;

pub const USER: &str = "alice";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Engine over a fresh in-memory database whose clock is pinned to `today`.
pub async fn engine_at(today: NaiveDate) -> StreakEngine {
    EngineBuilder::new(EngineConfig::in_memory())
        .with_clock(Arc::new(FixedClock::new(today)))
        .build()
        .await
        .expect("build engine")
}
