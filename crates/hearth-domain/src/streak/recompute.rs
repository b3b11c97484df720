use chrono::NaiveDate;

use super::{StreakPolicy, StreakState};
use crate::ledger::LedgerSnapshot;

/// Output of [`recompute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputedStreak {
    pub state: StreakState,
    /// First day (streak or frozen) of the unbroken run ending at the last
    /// streak day.
    pub run_start: Option<NaiveDate>,
    /// Streak dates strictly before this day are history outside the kept
    /// run and may be pruned.
    pub keep_from: Option<NaiveDate>,
    /// The run was broken by too many missed days since the last streak day.
    pub reset: bool,
}

impl RecomputedStreak {
    fn empty() -> Self {
        Self {
            state: StreakState::default(),
            run_start: None,
            keep_from: None,
            reset: false,
        }
    }

    /// Number of streak dates in `snapshot` that fall outside the kept run.
    pub fn stale_streak_dates(&self, snapshot: &LedgerSnapshot) -> usize {
        self.keep_from
            .map(|keep_from| snapshot.streak.range(..keep_from).count())
            .unwrap_or(0)
    }
}

/// Derive the canonical streak projection from a ledger snapshot.
///
/// The run is the longest unbroken sequence of streak/frozen days ending at
/// the most recent streak day; a missed or unrecorded day ends it. Frozen
/// days extend the run without being streak days themselves.
///
/// Missed days are counted forward from the day after the last streak day
/// up to (excluding) `today`, skipping frozen days. Reaching the policy
/// threshold breaks the run: the streak drops to zero and only the last
/// streak day is kept as the anchor.
pub fn recompute(
    snapshot: &LedgerSnapshot,
    today: NaiveDate,
    policy: &StreakPolicy,
) -> RecomputedStreak {
    let Some(&latest) = snapshot.streak.iter().next_back() else {
        return RecomputedStreak::empty();
    };

    let (run_length, run_start) = walk_run(snapshot, latest, policy.max_bridged_frozen_days);
    let consecutive_missed_days = missed_since(snapshot, latest, today);
    let reset = consecutive_missed_days >= policy.missed_day_reset_threshold;

    let (streak_days, keep_from) = if reset {
        (0, latest)
    } else {
        (run_length, run_start)
    };

    RecomputedStreak {
        state: StreakState {
            streak_days,
            last_streak_date: Some(latest),
            consecutive_missed_days,
        },
        run_start: Some(run_start),
        keep_from: Some(keep_from),
        reset,
    }
}

fn walk_run(
    snapshot: &LedgerSnapshot,
    latest: NaiveDate,
    frozen_cap: Option<u32>,
) -> (u32, NaiveDate) {
    let mut count = 1u32;
    let mut start = latest;
    let mut frozen_block = 0u32;
    let mut cursor = latest.pred_opt();

    while let Some(day) = cursor {
        if snapshot.streak.contains(&day) {
            frozen_block = 0;
        } else if snapshot.frozen.contains(&day) {
            frozen_block += 1;
            if frozen_cap.is_some_and(|cap| frozen_block > cap) {
                break;
            }
        } else {
            // missed, or nothing recorded
            break;
        }

        count += 1;
        start = day;
        cursor = day.pred_opt();
    }

    (count, start)
}

fn missed_since(snapshot: &LedgerSnapshot, latest: NaiveDate, today: NaiveDate) -> u32 {
    let Some(first) = latest.succ_opt() else {
        return 0;
    };
    if first >= today {
        return 0;
    }

    // No streak day can follow `latest`, so every day in the window is
    // either frozen (skipped) or counts as missed.
    let window = (today - first).num_days();
    let frozen = snapshot.frozen.range(first..today).count() as i64;
    u32::try_from(window - frozen).unwrap_or(u32::MAX)
}
