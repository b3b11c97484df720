//! `hearth` - operate the streak calendar engine from a shell.
//!
//! Usage:
//!   hearth reconcile                          # Day rollover for every user
//!   hearth mark <user> <date> [--category c]  # Record a day
//!   hearth state <user>                       # Current streak
//!   hearth claimable <user>                   # Rewards ready to claim
//!   hearth claim <user> <source> <key>        # Claim one of them
//!   hearth calendar <user> <YYYY-MM>          # Month view

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use hearth_app::application::ResultExt;
use hearth_app::{EngineBuilder, StreakEngine};
use hearth_domain::ledger::DayCategory;
use hearth_domain::reward::{DateRewardRule, RewardCycleRule, RewardPayload, RewardSource};
use hearth_domain::shared::{DomainError, RuleId};
use hearth_infrastructure::config::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "hearth",
    version,
    about = "Household streak calendar engine",
    long_about = "Records streak, missed and frozen days per user, keeps the cached\n\
                  streak counter consistent with the ledger, and grants cycle and\n\
                  date rewards at most once."
)]
struct Args {
    /// Engine config file (default: <config dir>/hearth/engine_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile every known user against today
    Reconcile,
    /// Register a user (an id is generated when omitted)
    Register { user: Option<String> },
    /// Record a day in a user's ledger
    Mark {
        user: String,
        date: NaiveDate,
        #[arg(long, default_value = "streak")]
        category: DayCategory,
    },
    /// Remove a day from a user's ledger
    Unmark {
        user: String,
        date: NaiveDate,
        #[arg(long, default_value = "streak")]
        category: DayCategory,
    },
    /// Show a user's current streak
    State { user: String },
    /// List rewards the user may claim now
    Claimable { user: String },
    /// Claim a reward (source: cycle_reward | date_reward)
    Claim {
        user: String,
        source: RewardSource,
        key: String,
    },
    /// Show one month of a user's ledger (YYYY-MM)
    Calendar { user: String, month: String },
    /// List a user's claim history
    Claims { user: String },
    /// Show a user's points and backpack
    Wallet { user: String },
    /// Record a finished task; its day becomes a streak day
    CompleteTask { user: String, task: String },
    /// Add or replace a cycle reward rule
    AddCycleRule {
        id: String,
        cycle_days: u32,
        #[command(flatten)]
        reward: RewardArgs,
    },
    /// Add or replace a date reward rule
    AddDateRule {
        id: String,
        date: NaiveDate,
        #[command(flatten)]
        reward: RewardArgs,
    },
    /// Delete a reward rule of either kind
    DeleteRule { id: String },
}

#[derive(clap::Args, Debug)]
struct RewardArgs {
    /// Points granted
    #[arg(long, conflicts_with = "item")]
    points: Option<i64>,
    /// Backpack item granted
    #[arg(long)]
    item: Option<String>,
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

impl RewardArgs {
    fn payload(self) -> Result<RewardPayload, DomainError> {
        match (self.points, self.item) {
            (Some(amount), None) => Ok(RewardPayload::Points { amount }),
            (None, Some(item_key)) => Ok(RewardPayload::Item {
                item_key,
                quantity: self.quantity,
            }),
            _ => Err(DomainError::InvalidInput(
                "Exactly one of --points or --item is required".to_string(),
            )),
        }
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32), DomainError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").to_input_err("month")?;
    Ok((first.year(), first.month()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(engine: &StreakEngine, command: Command) -> Result<()> {
    match command {
        Command::Reconcile => print_json(&engine.reconcile_all().await?),
        Command::Register { user } => {
            let user_id = engine.register_user(user.as_deref()).await?;
            print_json(&serde_json::json!({ "user_id": user_id }))
        }
        Command::Mark {
            user,
            date,
            category,
        } => print_json(&engine.mark_day(&user, date, category).await?),
        Command::Unmark {
            user,
            date,
            category,
        } => print_json(&engine.unmark_day(&user, date, category).await?),
        Command::State { user } => print_json(&engine.get_streak_state(&user).await?),
        Command::Claimable { user } => print_json(&engine.list_claimable_rewards(&user).await?),
        Command::Claim { user, source, key } => {
            print_json(&engine.claim_reward(&user, source, &key).await?)
        }
        Command::Calendar { user, month } => {
            let (year, month) = parse_month(&month)?;
            print_json(&engine.get_calendar(&user, year, month).await?)
        }
        Command::Claims { user } => print_json(&engine.list_claims(&user).await?),
        Command::Wallet { user } => print_json(&engine.get_wallet(&user).await?),
        Command::CompleteTask { user, task } => {
            print_json(&engine.complete_task(&user, &task, Utc::now()).await?)
        }
        Command::AddCycleRule {
            id,
            cycle_days,
            reward,
        } => {
            let rule = RewardCycleRule::new(RuleId::from_string(&id), cycle_days, reward.payload()?)?;
            engine.save_cycle_rule(&rule).await?;
            print_json(&rule)
        }
        Command::AddDateRule { id, date, reward } => {
            let rule = DateRewardRule::new(RuleId::from_string(&id), date, reward.payload()?);
            engine.save_date_rule(&rule).await?;
            print_json(&rule)
        }
        Command::DeleteRule { id } => {
            let deleted = engine.delete_rule(&id).await?;
            print_json(&serde_json::json!({ "rule_id": id, "deleted": deleted }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load(&config_path)?;

    let engine = EngineBuilder::new(config).build().await?;
    let result = run(&engine, args.command).await;
    engine.shutdown().await;
    result
}
