use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ClaimKey, DateRewardRule, RewardCycleRule, RewardPayload, RewardSource, RewardSourceKey};
use crate::shared::DomainError;
use crate::streak::StreakState;

/// A reward that may be claimed right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimableReward {
    pub source: RewardSource,
    pub source_key: String,
    pub claim_date: NaiveDate,
    pub payload: RewardPayload,
}

impl ClaimableReward {
    pub fn claim_key(&self) -> ClaimKey {
        ClaimKey {
            claim_date: self.claim_date,
            source: self.source,
            source_key: self.source_key.clone(),
        }
    }
}

/// Calendar day on which the current run reached `milestone` days.
///
/// The run is a contiguous block of days ending at `last_streak_date`, so
/// day `m` of the run is `last_streak_date - (streak_days - m)`.
pub fn milestone_date(state: &StreakState, milestone: u32) -> Option<NaiveDate> {
    let last = state.last_streak_date?;
    if milestone == 0 || milestone > state.streak_days {
        return None;
    }
    Some(last - Duration::days(i64::from(state.streak_days - milestone)))
}

fn cycle_candidate(
    state: &StreakState,
    rule: &RewardCycleRule,
    milestone: u32,
) -> Option<ClaimableReward> {
    if !rule.is_milestone(milestone) {
        return None;
    }
    let claim_date = milestone_date(state, milestone)?;
    Some(ClaimableReward {
        source: RewardSource::CycleReward,
        source_key: RewardSourceKey::Cycle {
            rule_id: rule.id().clone(),
            milestone,
        }
        .encode(),
        claim_date,
        payload: rule.payload().clone(),
    })
}

fn date_candidate(state: &StreakState, rule: &DateRewardRule) -> Option<ClaimableReward> {
    if state.last_streak_date != Some(rule.calendar_date()) {
        return None;
    }
    Some(ClaimableReward {
        source: RewardSource::DateReward,
        source_key: RewardSourceKey::Date {
            rule_id: rule.id().clone(),
        }
        .encode(),
        claim_date: rule.calendar_date(),
        payload: rule.payload().clone(),
    })
}

/// Every reward the state makes eligible that has no claim record yet.
///
/// Cycle rules contribute one entry per reached, unclaimed multiple of the
/// cycle within the current run; date rules contribute when their date is
/// the last streak day.
pub fn claimable_rewards(
    state: &StreakState,
    cycle_rules: &[RewardCycleRule],
    date_rules: &[DateRewardRule],
    claimed: &HashSet<ClaimKey>,
) -> Vec<ClaimableReward> {
    let mut rewards: Vec<ClaimableReward> = cycle_rules
        .iter()
        .flat_map(|rule| {
            rule.milestones_up_to(state.streak_days)
                .filter_map(move |milestone| cycle_candidate(state, rule, milestone))
        })
        .chain(date_rules.iter().filter_map(|rule| date_candidate(state, rule)))
        .filter(|reward| !claimed.contains(&reward.claim_key()))
        .collect();

    rewards.sort_by(|a, b| {
        a.claim_date
            .cmp(&b.claim_date)
            .then_with(|| a.source_key.cmp(&b.source_key))
    });
    rewards
}

/// Re-check a single claim against current state.
///
/// Only the rule math is checked here. Whether the reward was already
/// claimed is left to the store's uniqueness constraint.
pub fn validate_claim(
    state: &StreakState,
    key: &RewardSourceKey,
    cycle_rule: Option<&RewardCycleRule>,
    date_rule: Option<&DateRewardRule>,
) -> Result<ClaimableReward, DomainError> {
    match key {
        RewardSourceKey::Cycle { rule_id, milestone } => {
            let rule = cycle_rule
                .filter(|rule| rule.id() == rule_id)
                .ok_or_else(|| DomainError::UnknownRule(rule_id.to_string()))?;
            cycle_candidate(state, rule, *milestone).ok_or_else(|| {
                DomainError::NotEligible(format!(
                    "Milestone {} of rule {} (every {} days) is not reached by a {}-day streak",
                    milestone,
                    rule_id,
                    rule.cycle_days(),
                    state.streak_days
                ))
            })
        }
        RewardSourceKey::Date { rule_id } => {
            let rule = date_rule
                .filter(|rule| rule.id() == rule_id)
                .ok_or_else(|| DomainError::UnknownRule(rule_id.to_string()))?;
            date_candidate(state, rule).ok_or_else(|| {
                DomainError::NotEligible(format!(
                    "Date reward {} requires the last streak day to be {}",
                    rule_id,
                    rule.calendar_date()
                ))
            })
        }
    }
}
