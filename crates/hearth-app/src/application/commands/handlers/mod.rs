mod claim_reward_handler;
mod complete_task_handler;
mod ledger_handlers;
mod reconcile_all_handler;
mod register_user_handler;
mod shared;

#[cfg(test)]
mod tests;

pub use claim_reward_handler::ClaimRewardCommandHandler;
pub use complete_task_handler::CompleteTaskCommandHandler;
pub use ledger_handlers::{MarkDayCommandHandler, UnmarkDayCommandHandler};
pub use reconcile_all_handler::ReconcileAllCommandHandler;
pub use register_user_handler::RegisterUserCommandHandler;
