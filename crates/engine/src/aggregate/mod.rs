//! Derived state computed from fetched records.
//!
//! Nothing in here touches the database: every function takes the current
//! record lists (and `now` where time matters) and returns fresh values. The
//! results are never cached; callers recompute on every snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Budget, BudgetTransaction, GoalTransaction, SavingsGoal};

pub mod account;
pub mod budgets;
pub mod goals;
pub mod history;

pub use account::AccountOverview;
pub use budgets::{BudgetSummary, BudgetTier, LedgerTotals};
pub use goals::{ChartSlice, DeadlineStatus, GoalProgress, GoalSummary, ProgressTier};
pub use history::{EntryKind, HistoryEntry, HistoryTab, ParentRef, RelativeDay, Sign, TabStats};

/// All four collections of one user, as returned by the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    pub goals: Vec<SavingsGoal>,
    pub transactions: Vec<GoalTransaction>,
    pub budgets: Vec<Budget>,
    pub budget_transactions: Vec<BudgetTransaction>,
}

/// Everything the dashboard renders, recomputed in one pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: GoalSummary,
    pub goals: Vec<GoalProgress>,
    pub chart: Vec<ChartSlice>,
    pub budgets: Vec<BudgetSummary>,
    pub recent: Vec<HistoryEntry>,
}

impl Dashboard {
    pub fn compute(records: &Records, now: DateTime<Utc>) -> Self {
        let feed = history::merged_feed(&records.transactions, &records.budget_transactions);
        Self {
            summary: goals::summarize(&records.goals, now),
            goals: records
                .goals
                .iter()
                .map(|goal| goals::goal_progress(goal, now))
                .collect(),
            chart: goals::chart_slices(&records.goals),
            budgets: records.budgets.iter().map(budgets::summarize).collect(),
            recent: history::recent(&feed, history::RECENT_LIMIT).to_vec(),
        }
    }
}
