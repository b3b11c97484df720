use std::sync::Arc;

use crate::application::commands::handlers::*;
use crate::application::queries::StreakQueries;
use hearth_domain::shared::ReferenceClock;
use hearth_infrastructure::events::InMemoryEventBus;
use hearth_infrastructure::persistence::repositories::SqliteRewardCatalog;
use hearth_infrastructure::persistence::Database;

/// Command handlers container
pub struct CommandHandlers {
    pub mark_day: Arc<MarkDayCommandHandler>,
    pub unmark_day: Arc<UnmarkDayCommandHandler>,
    pub claim_reward: Arc<ClaimRewardCommandHandler>,
    pub register_user: Arc<RegisterUserCommandHandler>,
    pub reconcile_all: Arc<ReconcileAllCommandHandler>,
    pub complete_task: Arc<CompleteTaskCommandHandler>,
}

pub struct Runtime {
    pub db: Arc<Database>,
    pub clock: Arc<dyn ReferenceClock>,
    /// Handlers publish through it; host code subscribes via the engine.
    pub event_bus: Arc<InMemoryEventBus>,
    /// Present when the engine reads its rules from SQLite; rule edits
    /// go through it.
    pub rule_store: Option<Arc<SqliteRewardCatalog>>,
}

pub struct Queries {
    pub streak: Arc<StreakQueries>,
}
