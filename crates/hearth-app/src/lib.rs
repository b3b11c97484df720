//! Streak calendar engine: application services and the `StreakEngine`
//! facade over the SQLite-backed ledger.

pub mod application;
pub mod presentation;

pub use presentation::bootstrap::EngineBuilder;
pub use presentation::engine::StreakEngine;
pub use presentation::error::CommandError;
