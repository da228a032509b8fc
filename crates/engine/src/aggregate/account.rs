use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GoalTransaction, MoneyCents, SavingsGoal, User};

const FALLBACK_DISPLAY_NAME: &str = "User";

/// Profile header and stat tiles of the account page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOverview {
    pub username: String,
    pub display_name: String,
    pub member_since: DateTime<Utc>,
    pub goal_count: usize,
    pub total_saved: MoneyCents,
    pub completed_goals: usize,
    pub transaction_count: usize,
}

impl AccountOverview {
    pub fn compute(user: &User, goals: &[SavingsGoal], transactions: &[GoalTransaction]) -> Self {
        Self {
            username: user.username.clone(),
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string()),
            member_since: user.created_at,
            goal_count: goals.len(),
            total_saved: super::goals::total_saved(goals),
            completed_goals: super::goals::completed_count(goals),
            transaction_count: transactions.len(),
        }
    }
}
