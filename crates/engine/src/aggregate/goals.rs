//! Goal aggregation: dashboard totals and per-goal progress.
//!
//! Every function is a pure derivation over a goal slice. Time-relative
//! values take `now` explicitly so results are reproducible.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, SavingsGoal};

/// Goals due within this many days (and not yet reached) count as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn total_saved(goals: &[SavingsGoal]) -> MoneyCents {
    goals.iter().map(|g| g.current_amount).sum()
}

pub fn total_target(goals: &[SavingsGoal]) -> MoneyCents {
    goals.iter().map(|g| g.target_amount).sum()
}

/// Overall saved amount as a percentage of the overall target.
///
/// Returns `0.0` when there is no target at all.
pub fn savings_rate(goals: &[SavingsGoal]) -> f64 {
    total_saved(goals).percent_of(total_target(goals))
}

pub fn completed_count(goals: &[SavingsGoal]) -> usize {
    goals.iter().filter(|g| g.is_completed()).count()
}

/// Unmet goals whose deadline is at most [`UPCOMING_WINDOW_DAYS`] away.
///
/// Overdue goals are included: there is no separate overdue bucket.
pub fn upcoming_deadline_count(goals: &[SavingsGoal], now: DateTime<Utc>) -> usize {
    goals
        .iter()
        .filter(|g| !g.is_completed() && days_remaining(g.deadline, now) <= UPCOMING_WINDOW_DAYS)
        .count()
}

/// Whole days left until `deadline`, rounded up.
///
/// Zero or negative once the deadline is reached.
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = (deadline - now).num_milliseconds();
    -(-diff_ms).div_euclid(DAY_MS)
}

/// Display progress in `[0, 100]`.
///
/// A goal without a positive target is trivially reached.
pub fn progress(goal: &SavingsGoal) -> f64 {
    if !goal.target_amount.is_positive() {
        return 100.0;
    }
    goal.current_amount.percent_of(goal.target_amount).min(100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "days")]
pub enum DeadlineStatus {
    DaysLeft(i64),
    Passed,
}

impl DeadlineStatus {
    pub fn from_days(days: i64) -> Self {
        if days > 0 {
            Self::DaysLeft(days)
        } else {
            Self::Passed
        }
    }
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DaysLeft(days) => write!(f, "{days} days left"),
            Self::Passed => f.write_str("Deadline passed"),
        }
    }
}

/// Colour band of a goal progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    Complete,
    OnTrack,
    Halfway,
    Starting,
}

impl ProgressTier {
    pub fn classify(completed: bool, progress: f64) -> Self {
        if completed {
            Self::Complete
        } else if progress >= 75.0 {
            Self::OnTrack
        } else if progress >= 50.0 {
            Self::Halfway
        } else {
            Self::Starting
        }
    }
}

/// Everything a goal card shows besides the raw record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub progress: f64,
    pub completed: bool,
    pub remaining: MoneyCents,
    pub days_remaining: i64,
    pub deadline_status: DeadlineStatus,
    pub tier: ProgressTier,
}

pub fn goal_progress(goal: &SavingsGoal, now: DateTime<Utc>) -> GoalProgress {
    let progress = progress(goal);
    let completed = goal.is_completed();
    let days = days_remaining(goal.deadline, now);
    GoalProgress {
        goal_id: goal.id,
        progress,
        completed,
        remaining: goal.target_amount.saturating_floor_sub(goal.current_amount),
        days_remaining: days,
        deadline_status: DeadlineStatus::from_days(days),
        tier: ProgressTier::classify(completed, progress),
    }
}

/// The four dashboard stat cards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub total_saved: MoneyCents,
    pub total_target: MoneyCents,
    pub savings_rate: f64,
    pub completed: usize,
    pub upcoming_deadlines: usize,
}

pub fn summarize(goals: &[SavingsGoal], now: DateTime<Utc>) -> GoalSummary {
    GoalSummary {
        total_saved: total_saved(goals),
        total_target: total_target(goals),
        savings_rate: savings_rate(goals),
        completed: completed_count(goals),
        upcoming_deadlines: upcoming_deadline_count(goals, now),
    }
}

/// One goal in the savings charts. `progress` is not clamped here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub goal_id: Uuid,
    pub name: String,
    pub current: MoneyCents,
    pub target: MoneyCents,
    pub progress: f64,
}

pub fn chart_slices(goals: &[SavingsGoal]) -> Vec<ChartSlice> {
    goals
        .iter()
        .map(|goal| ChartSlice {
            goal_id: goal.id,
            name: goal.name.clone(),
            current: goal.current_amount,
            target: goal.target_amount,
            progress: goal.current_amount.percent_of(goal.target_amount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn goal(target: i64, current: i64, deadline: DateTime<Utc>) -> SavingsGoal {
        SavingsGoal {
            id: Uuid::new_v4(),
            name: "Goal".to_string(),
            target_amount: MoneyCents::new(target),
            current_amount: MoneyCents::new(current),
            deadline,
            category: "Other".to_string(),
            description: None,
            user_id: "alice".to_string(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn totals_and_rate() {
        let far = now() + Duration::days(365);
        let goals = vec![goal(10_000, 2_500, far), goal(30_000, 7_500, far)];

        assert_eq!(total_saved(&goals), MoneyCents::new(10_000));
        assert_eq!(total_target(&goals), MoneyCents::new(40_000));
        assert_eq!(savings_rate(&goals), 25.0);
    }

    #[test]
    fn huge_targets_saturate_instead_of_overflowing() {
        let far = now() + Duration::days(365);
        let huge = i64::MAX / 2 + 10;
        let goals = vec![goal(huge, huge, far), goal(huge, 0, far)];

        let summary = summarize(&goals, now());
        assert_eq!(summary.total_target, MoneyCents::new(i64::MAX));
        assert_eq!(summary.total_saved, MoneyCents::new(huge));
        assert!((summary.savings_rate - 50.0).abs() < 0.001);
    }

    #[test]
    fn empty_list_has_zero_rate() {
        assert_eq!(savings_rate(&[]), 0.0);
        assert_eq!(summarize(&[], now()).total_saved, MoneyCents::ZERO);
    }

    #[test]
    fn progress_is_clamped_when_over_saved() {
        let g = goal(10_000, 15_000, now());
        assert_eq!(progress(&g), 100.0);
        assert_eq!(chart_slices(&[g])[0].progress, 150.0);
    }

    #[test]
    fn completed_counts_boundary_equal() {
        let far = now() + Duration::days(90);
        let goals = vec![
            goal(10_000, 10_000, far),
            goal(10_000, 9_999, far),
            goal(10_000, 12_000, far),
        ];
        assert_eq!(completed_count(&goals), 2);
    }

    #[test]
    fn days_remaining_rounds_up() {
        assert_eq!(days_remaining(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_remaining(now() + Duration::days(30), now()), 30);
        assert_eq!(days_remaining(now() + Duration::days(30) + Duration::seconds(1), now()), 31);
        assert_eq!(days_remaining(now(), now()), 0);
        assert_eq!(days_remaining(now() - Duration::hours(1), now()), 0);
        assert_eq!(days_remaining(now() - Duration::days(2), now()), -2);
    }

    #[test]
    fn upcoming_includes_overdue_but_not_completed() {
        let goals = vec![
            goal(10_000, 1_000, now() + Duration::days(10)),
            goal(10_000, 1_000, now() - Duration::days(10)),
            goal(10_000, 10_000, now() + Duration::days(5)),
            goal(10_000, 1_000, now() + Duration::days(45)),
        ];
        assert_eq!(upcoming_deadline_count(&goals, now()), 2);
    }

    #[test]
    fn reached_goal_past_deadline() {
        let g = goal(10_000, 10_000, now() - Duration::days(1));
        let p = goal_progress(&g, now());

        assert_eq!(p.progress, 100.0);
        assert!(p.completed);
        assert_eq!(p.deadline_status, DeadlineStatus::Passed);
        assert_eq!(p.tier, ProgressTier::Complete);
        assert_eq!(p.remaining, MoneyCents::ZERO);
        assert_eq!(upcoming_deadline_count(&[g], now()), 0);
    }

    #[test]
    fn progress_tiers() {
        assert_eq!(ProgressTier::classify(false, 75.0), ProgressTier::OnTrack);
        assert_eq!(ProgressTier::classify(false, 74.9), ProgressTier::Halfway);
        assert_eq!(ProgressTier::classify(false, 50.0), ProgressTier::Halfway);
        assert_eq!(ProgressTier::classify(false, 10.0), ProgressTier::Starting);
        assert_eq!(ProgressTier::classify(true, 10.0), ProgressTier::Complete);
    }

    #[test]
    fn deadline_labels() {
        assert_eq!(DeadlineStatus::from_days(3).to_string(), "3 days left");
        assert_eq!(DeadlineStatus::from_days(0).to_string(), "Deadline passed");
    }
}
