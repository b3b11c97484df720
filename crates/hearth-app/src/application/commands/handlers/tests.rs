use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use mockall::mock;

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::handlers::*;
use crate::application::commands::*;
use crate::application::services::{
    ConsistencyMaintainer, RewardEligibilityEvaluator, CONFLICT_ATTEMPTS,
};
use hearth_domain::events::{DomainEvent, EventBus};
use hearth_domain::ledger::DayCategory;
use hearth_domain::reward::{
    DateRewardRule, RewardCatalog, RewardCycleRule, RewardPayload, RewardSource,
};
use hearth_domain::shared::{
    DomainError, FixedClock, ReferenceClock, RuleId, StreakTransaction, UnitOfWork,
    UnitOfWorkError,
};
use hearth_domain::streak::StreakPolicy;
use hearth_infrastructure::persistence::{Database, SqliteUnitOfWork};

mock! {
    pub Catalog {}

    #[async_trait::async_trait]
    impl RewardCatalog for Catalog {
        async fn cycle_rules(&self) -> Result<Vec<RewardCycleRule>, DomainError>;
        async fn date_rules_on(&self, date: NaiveDate) -> Result<Vec<DateRewardRule>, DomainError>;
        async fn find_cycle_rule(&self, id: &RuleId) -> Result<Option<RewardCycleRule>, DomainError>;
        async fn find_date_rule(&self, id: &RuleId) -> Result<Option<DateRewardRule>, DomainError>;
    }
}

struct MockEventBus {
    events: tokio::sync::RwLock<Vec<&'static str>>,
}

impl MockEventBus {
    fn new() -> Self {
        Self {
            events: tokio::sync::RwLock::new(Vec::new()),
        }
    }

    async fn count_of(&self, short_name: &str) -> usize {
        self.events
            .read()
            .await
            .iter()
            .filter(|name| name.ends_with(short_name))
            .count()
    }

    async fn total(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait::async_trait]
impl EventBus for MockEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        self.events.write().await.push(event.event_type_name());
        Ok(())
    }
}

/// Refuses the first `conflicts` transactions the way a busy database
/// does, then behaves like the wrapped unit of work.
struct ConflictingUnitOfWork {
    inner: SqliteUnitOfWork,
    conflicts: AtomicUsize,
}

#[async_trait::async_trait]
impl UnitOfWork for ConflictingUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn StreakTransaction>, UnitOfWorkError> {
        let refused = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(UnitOfWorkError::Conflict("database is locked".to_string()));
        }
        self.inner.begin().await
    }
}

/// A store that cannot open transactions at all.
struct BrokenUnitOfWork;

#[async_trait::async_trait]
impl UnitOfWork for BrokenUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn StreakTransaction>, UnitOfWorkError> {
        Err(UnitOfWorkError::TransactionFailed("disk I/O error".to_string()))
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const TODAY: (i32, u32, u32) = (2024, 1, 6);

fn today() -> NaiveDate {
    day(TODAY.0, TODAY.1, TODAY.2)
}

struct Fixture {
    pool: sqlx::SqlitePool,
    uow: Arc<SqliteUnitOfWork>,
    maintainer: Arc<ConsistencyMaintainer>,
    clock: Arc<dyn ReferenceClock>,
    event_bus: Arc<MockEventBus>,
}

impl Fixture {
    async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let pool = db.pool().clone();

        Self {
            uow: Arc::new(SqliteUnitOfWork::new(Arc::new(pool.clone()))),
            pool,
            maintainer: Arc::new(ConsistencyMaintainer::new(StreakPolicy::default())),
            clock: Arc::new(FixedClock::new(today())),
            event_bus: Arc::new(MockEventBus::new()),
        }
    }

    fn mark_handler(&self) -> MarkDayCommandHandler {
        self.mark_handler_with(self.uow.clone())
    }

    fn mark_handler_with(&self, uow: Arc<dyn UnitOfWork>) -> MarkDayCommandHandler {
        MarkDayCommandHandler::new(
            uow,
            self.maintainer.clone(),
            self.clock.clone(),
            self.event_bus.clone(),
        )
    }

    fn complete_task_handler_with(&self, uow: Arc<dyn UnitOfWork>) -> CompleteTaskCommandHandler {
        CompleteTaskCommandHandler::new(
            Arc::new(self.mark_handler_with(uow)),
            self.clock.clone(),
            self.event_bus.clone(),
        )
    }

    fn claim_handler_with(
        &self,
        uow: Arc<dyn UnitOfWork>,
        catalog: MockCatalog,
    ) -> ClaimRewardCommandHandler {
        ClaimRewardCommandHandler::new(
            uow,
            self.maintainer.clone(),
            Arc::new(RewardEligibilityEvaluator::new(Arc::new(catalog))),
            self.clock.clone(),
            self.event_bus.clone(),
        )
    }

    async fn mark_streak_days(&self, from: NaiveDate, count: i64) {
        let handler = self.mark_handler();
        for offset in 0..count {
            handler
                .handle(MarkDayCommand {
                    user_id: "alice".to_string(),
                    date: from + Duration::days(offset),
                    category: DayCategory::Streak,
                })
                .await
                .unwrap();
        }
    }
}

fn every_three_days() -> RewardCycleRule {
    RewardCycleRule::new(
        RuleId::from_string("r1"),
        3,
        RewardPayload::Points { amount: 10 },
    )
    .unwrap()
}

fn catalog_with_cycle_rule() -> MockCatalog {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_find_cycle_rule()
        .returning(|id| Ok((id.as_str() == "r1").then(every_three_days)));
    catalog
}

// Tests

#[tokio::test]
async fn test_mark_day_handler_returns_reconciled_state() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;

    let state = fixture
        .mark_handler()
        .handle(MarkDayCommand {
            user_id: "alice".to_string(),
            date: today(),
            category: DayCategory::Streak,
        })
        .await
        .unwrap();

    assert_eq!(state.streak_days, 6);
    assert_eq!(state.last_streak_date, Some(today()));
    assert!(state.is_streak_today);
    assert_eq!(fixture.event_bus.count_of("StreakRecalculated").await, 6);
}

#[tokio::test]
async fn test_marking_same_day_twice_publishes_once() {
    let fixture = Fixture::new().await;
    let handler = fixture.mark_handler();
    let command = MarkDayCommand {
        user_id: "alice".to_string(),
        date: day(2024, 1, 5),
        category: DayCategory::Streak,
    };

    let first = handler.handle(command.clone()).await.unwrap();
    let second = handler.handle(command).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fixture.event_bus.total().await, 1);
}

#[tokio::test]
async fn test_mark_today_as_missed_is_rejected() {
    let fixture = Fixture::new().await;

    for category in [DayCategory::Missed, DayCategory::Frozen] {
        let result = fixture
            .mark_handler()
            .handle(MarkDayCommand {
                user_id: "alice".to_string(),
                date: today(),
                category,
            })
            .await;
        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
    }

    let future = fixture
        .mark_handler()
        .handle(MarkDayCommand {
            user_id: "alice".to_string(),
            date: today() + Duration::days(1),
            category: DayCategory::Streak,
        })
        .await;
    assert!(matches!(future, Err(DomainError::InvalidDate(_))));
    assert_eq!(fixture.event_bus.total().await, 0);
}

#[tokio::test]
async fn test_mark_day_rejects_blank_user() {
    let fixture = Fixture::new().await;
    let result = fixture
        .mark_handler()
        .handle(MarkDayCommand {
            user_id: "   ".to_string(),
            date: today(),
            category: DayCategory::Streak,
        })
        .await;
    assert!(matches!(result, Err(DomainError::InvalidInput(_))));
}

#[tokio::test]
async fn test_unmark_day_shortens_streak() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;

    let handler = UnmarkDayCommandHandler::new(
        fixture.uow.clone(),
        fixture.maintainer.clone(),
        fixture.clock.clone(),
        fixture.event_bus.clone(),
    );
    let state = handler
        .handle(UnmarkDayCommand {
            user_id: "alice".to_string(),
            date: day(2024, 1, 5),
            category: DayCategory::Streak,
        })
        .await
        .unwrap();

    assert_eq!(state.streak_days, 4);
    assert_eq!(state.last_streak_date, Some(day(2024, 1, 4)));
    assert_eq!(state.consecutive_missed_days, 1);
}

#[tokio::test]
async fn test_mark_retries_after_conflict_and_applies_the_change() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 4), 1).await;

    let conflicting = Arc::new(ConflictingUnitOfWork {
        inner: SqliteUnitOfWork::new(Arc::new(fixture.pool.clone())),
        conflicts: AtomicUsize::new(2),
    });

    let state = fixture
        .mark_handler_with(conflicting.clone())
        .handle(MarkDayCommand {
            user_id: "alice".to_string(),
            date: day(2024, 1, 5),
            category: DayCategory::Streak,
        })
        .await
        .unwrap();

    assert_eq!(state.streak_days, 2);
    assert_eq!(state.last_streak_date, Some(day(2024, 1, 5)));
    assert_eq!(conflicting.conflicts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mark_that_never_gets_the_store_fails_without_conflict_code() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 4), 1).await;

    let conflicting = Arc::new(ConflictingUnitOfWork {
        inner: SqliteUnitOfWork::new(Arc::new(fixture.pool.clone())),
        conflicts: AtomicUsize::new(CONFLICT_ATTEMPTS as usize),
    });

    let result = fixture
        .mark_handler_with(conflicting)
        .handle(MarkDayCommand {
            user_id: "alice".to_string(),
            date: day(2024, 1, 5),
            category: DayCategory::Streak,
        })
        .await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));

    let state = fixture
        .mark_handler()
        .handle(MarkDayCommand {
            user_id: "alice".to_string(),
            date: day(2024, 1, 4),
            category: DayCategory::Streak,
        })
        .await
        .unwrap();
    assert_eq!(state.streak_days, 1);
}

#[tokio::test]
async fn test_claim_unknown_rule_is_rejected() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;

    let mut catalog = MockCatalog::new();
    catalog.expect_find_cycle_rule().times(1).returning(|_| Ok(None));
    let handler = fixture.claim_handler_with(fixture.uow.clone(), catalog);

    let result = handler
        .handle(ClaimRewardCommand {
            user_id: "alice".to_string(),
            source: RewardSource::CycleReward,
            source_key: "missing#3".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::UnknownRule(_))));
}

#[tokio::test]
async fn test_claim_cycle_milestone_once() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;
    let handler = fixture.claim_handler_with(fixture.uow.clone(), catalog_with_cycle_rule());

    let command = ClaimRewardCommand {
        user_id: "alice".to_string(),
        source: RewardSource::CycleReward,
        source_key: "r1#3".to_string(),
    };

    let result = handler.handle(command.clone()).await.unwrap();
    assert_eq!(result.claim_date, day(2024, 1, 3));
    assert_eq!(result.credited_payload, RewardPayload::Points { amount: 10 });
    assert_eq!(fixture.event_bus.count_of("RewardClaimed").await, 1);

    let again = handler.handle(command).await;
    assert!(matches!(again, Err(DomainError::AlreadyClaimed(_))));
    assert_eq!(fixture.event_bus.count_of("RewardClaimed").await, 1);
}

#[tokio::test]
async fn test_claim_unreached_milestone_is_not_eligible() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;
    let handler = fixture.claim_handler_with(fixture.uow.clone(), catalog_with_cycle_rule());

    let result = handler
        .handle(ClaimRewardCommand {
            user_id: "alice".to_string(),
            source: RewardSource::CycleReward,
            source_key: "r1#6".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::NotEligible(_))));
}

#[tokio::test]
async fn test_claim_retries_once_after_conflict() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 3).await;

    let conflicting = Arc::new(ConflictingUnitOfWork {
        inner: SqliteUnitOfWork::new(Arc::new(fixture.pool.clone())),
        conflicts: AtomicUsize::new(1),
    });
    let handler = fixture.claim_handler_with(conflicting, catalog_with_cycle_rule());

    let result = handler
        .handle(ClaimRewardCommand {
            user_id: "alice".to_string(),
            source: RewardSource::CycleReward,
            source_key: "r1#3".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.source_key, "r1#3");
}

#[tokio::test]
async fn test_claim_gives_up_after_second_conflict() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 3).await;

    let conflicting = Arc::new(ConflictingUnitOfWork {
        inner: SqliteUnitOfWork::new(Arc::new(fixture.pool.clone())),
        conflicts: AtomicUsize::new(2),
    });
    let handler = fixture.claim_handler_with(conflicting, catalog_with_cycle_rule());

    let result = handler
        .handle(ClaimRewardCommand {
            user_id: "alice".to_string(),
            source: RewardSource::CycleReward,
            source_key: "r1#3".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::StorageConflict(_))));
    assert_eq!(fixture.event_bus.count_of("RewardClaimed").await, 0);
}

#[tokio::test]
async fn test_register_user_handler() {
    let fixture = Fixture::new().await;
    let handler = RegisterUserCommandHandler::new(
        fixture.uow.clone(),
        fixture.maintainer.clone(),
        fixture.clock.clone(),
    );

    let first = handler
        .handle(RegisterUserCommand {
            user_id: Some("bob".to_string()),
        })
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.user_id, "bob");

    let second = handler
        .handle(RegisterUserCommand {
            user_id: Some("bob".to_string()),
        })
        .await
        .unwrap();
    assert!(!second.created);

    let generated = handler
        .handle(RegisterUserCommand { user_id: None })
        .await
        .unwrap();
    assert!(generated.created);
    assert!(!generated.user_id.is_empty());
}

#[tokio::test]
async fn test_reconcile_all_handler_advances_idle_users() {
    let fixture = Fixture::new().await;
    fixture.mark_streak_days(day(2024, 1, 1), 5).await;

    // Same ledger, but the day rolled over three times since.
    let later: Arc<dyn ReferenceClock> = Arc::new(FixedClock::new(day(2024, 1, 9)));
    let handler = ReconcileAllCommandHandler::new(
        fixture.uow.clone(),
        fixture.maintainer.clone(),
        later,
        fixture.event_bus.clone(),
    );

    let result = handler.handle(ReconcileAllCommand).await.unwrap();
    assert_eq!(result.users, 1);
    assert_eq!(result.changed, 1);
    assert_eq!(result.pruned_dates, 4);
    assert!(result.failed.is_empty());

    let again = handler.handle(ReconcileAllCommand).await.unwrap();
    assert_eq!(again.changed, 0);
    assert_eq!(again.pruned_dates, 0);
}

#[tokio::test]
async fn test_complete_task_handler_validates_and_publishes() {
    let fixture = Fixture::new().await;
    let handler = fixture.complete_task_handler_with(fixture.uow.clone());

    let noon_today = Utc.with_ymd_and_hms(2024, 1, 6, 12, 0, 0).unwrap();
    let state = handler
        .handle(CompleteTaskCommand {
            user_id: "alice".to_string(),
            task_id: "dishes".to_string(),
            completed_at: noon_today,
        })
        .await
        .unwrap();
    assert_eq!(state.streak_days, 1);
    assert_eq!(state.last_streak_date, Some(today()));
    assert_eq!(fixture.event_bus.count_of("TaskCompleted").await, 1);
    let published = fixture.event_bus.total().await;

    let tomorrow = handler
        .handle(CompleteTaskCommand {
            user_id: "alice".to_string(),
            task_id: "dishes".to_string(),
            completed_at: noon_today + Duration::days(1),
        })
        .await;
    assert!(matches!(tomorrow, Err(DomainError::InvalidDate(_))));

    let blank_task = handler
        .handle(CompleteTaskCommand {
            user_id: "alice".to_string(),
            task_id: " ".to_string(),
            completed_at: noon_today,
        })
        .await;
    assert!(matches!(blank_task, Err(DomainError::InvalidInput(_))));
    assert_eq!(fixture.event_bus.total().await, published);
}

#[tokio::test]
async fn test_complete_task_reports_a_failed_mark() {
    let fixture = Fixture::new().await;
    let handler = fixture.complete_task_handler_with(Arc::new(BrokenUnitOfWork));

    let result = handler
        .handle(CompleteTaskCommand {
            user_id: "alice".to_string(),
            task_id: "dishes".to_string(),
            completed_at: Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::Repository(_))));
    assert_eq!(fixture.event_bus.count_of("TaskCompleted").await, 0);
}
