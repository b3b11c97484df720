use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::application::commands::handlers::*;
use crate::application::queries::StreakQueries;
use crate::application::services::{ConsistencyMaintainer, RewardEligibilityEvaluator};
use crate::application::ResultExt;
use crate::presentation::engine::StreakEngine;
use crate::presentation::state::{CommandHandlers, Queries, Runtime};
use hearth_domain::events::EventBus;
use hearth_domain::reward::RewardCatalog;
use hearth_domain::shared::{DomainError, ReferenceClock, UnitOfWork};
use hearth_infrastructure::config::EngineConfig;
use hearth_infrastructure::events::InMemoryEventBus;
use hearth_infrastructure::logging::init_logger;
use hearth_infrastructure::persistence::repositories::{
    SqliteRewardCatalog, SqliteWalletRepository,
};
use hearth_infrastructure::persistence::{Database, SqliteUnitOfWork};

/// Wires a [`StreakEngine`] from an [`EngineConfig`].
///
/// The clock and the reward catalog default to the configured reference
/// timezone and the SQLite rule tables; both can be replaced.
pub struct EngineBuilder {
    config: EngineConfig,
    clock: Option<Arc<dyn ReferenceClock>>,
    catalog: Option<Arc<dyn RewardCatalog>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: None,
            catalog: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ReferenceClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Read rules from `catalog` instead of the database. Rule edits
    /// through the engine are then rejected.
    pub fn with_catalog(mut self, catalog: Arc<dyn RewardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub async fn build(self) -> Result<StreakEngine, DomainError> {
        let startup_started_at = Instant::now();
        let config = self.config;

        if let Some(log_dir) = &config.log_dir {
            init_logger(log_dir.clone()).to_infra_err("init logger")?;
        }

        let policy = config.policy()?;
        let clock: Arc<dyn ReferenceClock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(config.clock()?),
        };

        info!("🔌 Connecting to database...");
        let started_at = Instant::now();
        let database = if config.is_in_memory() {
            Database::in_memory().await?
        } else {
            let db_path = config.database_path.to_str().ok_or_else(|| {
                DomainError::Validation(format!(
                    "Invalid database path: {}",
                    config.database_path.display()
                ))
            })?;
            info!("Database path: {}", db_path);
            Database::with_options(db_path, config.database_options()).await?
        };
        info!(
            "✓ Database connection established ({}ms)",
            started_at.elapsed().as_millis()
        );

        info!("🔄 Running migrations...");
        let started_at = Instant::now();
        database.run_migrations().await?;
        info!(
            "✓ Migrations completed ({}ms)",
            started_at.elapsed().as_millis()
        );

        let pool = Arc::new(database.pool().clone());
        let uow = Arc::new(SqliteUnitOfWork::new(pool.clone())) as Arc<dyn UnitOfWork>;
        let wallet_repo = Arc::new(SqliteWalletRepository::new(pool.clone()));

        let (catalog, rule_store) = match self.catalog {
            Some(catalog) => {
                warn!("Using an injected reward catalog; rule edits are disabled");
                (catalog, None)
            }
            None => {
                let store = Arc::new(SqliteRewardCatalog::new(pool.clone()));
                (store.clone() as Arc<dyn RewardCatalog>, Some(store))
            }
        };

        let maintainer = Arc::new(ConsistencyMaintainer::new(policy));
        let evaluator = Arc::new(RewardEligibilityEvaluator::new(catalog));

        let event_bus = Arc::new(InMemoryEventBus::new());
        let bus: Arc<dyn EventBus> = event_bus.clone();

        let mark_day = Arc::new(MarkDayCommandHandler::new(
            uow.clone(),
            maintainer.clone(),
            clock.clone(),
            bus.clone(),
        ));

        let command_handlers = CommandHandlers {
            mark_day: mark_day.clone(),
            unmark_day: Arc::new(UnmarkDayCommandHandler::new(
                uow.clone(),
                maintainer.clone(),
                clock.clone(),
                bus.clone(),
            )),
            claim_reward: Arc::new(ClaimRewardCommandHandler::new(
                uow.clone(),
                maintainer.clone(),
                evaluator.clone(),
                clock.clone(),
                bus.clone(),
            )),
            register_user: Arc::new(RegisterUserCommandHandler::new(
                uow.clone(),
                maintainer.clone(),
                clock.clone(),
            )),
            reconcile_all: Arc::new(ReconcileAllCommandHandler::new(
                uow.clone(),
                maintainer.clone(),
                clock.clone(),
                bus.clone(),
            )),
            complete_task: Arc::new(CompleteTaskCommandHandler::new(
                mark_day.clone(),
                clock.clone(),
                bus.clone(),
            )),
        };

        let queries = Queries {
            streak: Arc::new(StreakQueries::new(
                uow,
                maintainer,
                evaluator,
                wallet_repo,
                clock.clone(),
            )),
        };

        info!(
            "✅ Streak engine ready, today is {} ({}ms)",
            clock.today(),
            startup_started_at.elapsed().as_millis()
        );

        Ok(StreakEngine {
            runtime: Runtime {
                db: Arc::new(database),
                clock,
                event_bus,
                rule_store,
            },
            command_handlers,
            queries,
        })
    }
}
