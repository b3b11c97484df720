use anyhow::Result;
use hearth_domain::shared::DomainError;
use hearth_domain::streak::StreakPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::clock::FixedOffsetClock;
use crate::persistence::DatabaseOptions;

const APP_DIR: &str = "hearth";

/// Persistent engine configuration (`engine_config.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file, or `:memory:` for a private in-memory database.
    pub database_path: PathBuf,
    /// Reference timezone as minutes east of UTC.
    pub utc_offset_minutes: i32,
    pub missed_day_reset_threshold: u32,
    pub max_bridged_frozen_days: Option<u32>,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
    pub db_busy_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: default_data_dir().join("hearth.db"),
            utc_offset_minutes: 480,
            missed_day_reset_threshold: StreakPolicy::DEFAULT_RESET_THRESHOLD,
            max_bridged_frozen_days: None,
            log_dir: None,
            db_busy_timeout_secs: 5,
            max_connections: 5,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl EngineConfig {
    pub const FILE_NAME: &'static str = "engine_config.json";
    pub const IN_MEMORY: &'static str = ":memory:";

    /// Configuration backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database_path: PathBuf::from(Self::IN_MEMORY),
            ..Self::default()
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(Self::FILE_NAME)
    }

    /// Load from `path`. A missing file is created with defaults; an
    /// unreadable one falls back to defaults without being overwritten.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!(path = %path.display(), "Created default engine config");
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config = match serde_json::from_str::<Self>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid engine config, using defaults");
                Self::default()
            }
        };

        info!(path = %path.display(), "Engine config loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == Self::IN_MEMORY
    }

    pub fn policy(&self) -> Result<StreakPolicy, DomainError> {
        StreakPolicy::new(self.missed_day_reset_threshold, self.max_bridged_frozen_days)
    }

    pub fn clock(&self) -> Result<FixedOffsetClock, DomainError> {
        FixedOffsetClock::from_minutes(self.utc_offset_minutes)
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            max_connections: self.max_connections,
            busy_timeout: Duration::from_secs(self.db_busy_timeout_secs),
        }
    }
}
