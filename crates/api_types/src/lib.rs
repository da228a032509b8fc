//! JSON request and response bodies of the HTTP API.
//!
//! Money is always carried as integer centavos in `*_minor` fields.
//! Percentages are plain floats in `[0, 100]` unless stated otherwise.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub username: String,
        pub display_name: Option<String>,
        pub member_since: DateTime<Utc>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ProgressTier {
        Complete,
        OnTrack,
        Halfway,
        Starting,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_minor: i64,
        /// Amount already saved. Defaults to 0.
        pub current_minor: Option<i64>,
        /// RFC3339 timestamp, including timezone offset.
        pub deadline: DateTime<FixedOffset>,
        pub category: Option<String>,
        pub description: Option<String>,
    }

    /// Partial update. Absent fields are left untouched; an empty
    /// `description` clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub target_minor: Option<i64>,
        pub current_minor: Option<i64>,
        pub deadline: Option<DateTime<FixedOffset>>,
        pub category: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub target_minor: i64,
        pub current_minor: i64,
        pub deadline: DateTime<Utc>,
        pub category: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// Clamped to 100.
        pub progress: f64,
        pub completed: bool,
        pub remaining_minor: i64,
        /// Zero or negative once the deadline has passed.
        pub days_remaining: i64,
        /// `"N days left"` or `"Deadline passed"`.
        pub deadline_label: String,
        pub tier: ProgressTier,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalsResponse {
        pub goals: Vec<GoalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalSummary {
        pub total_saved_minor: i64,
        pub total_target_minor: i64,
        pub savings_rate: f64,
        pub completed: usize,
        pub upcoming_deadlines: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartSlice {
        pub goal_id: Uuid,
        pub name: String,
        pub current_minor: i64,
        pub target_minor: i64,
        /// Not clamped: over-saved goals exceed 100.
        pub progress: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartResponse {
        pub slices: Vec<ChartSlice>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Deposit,
        Withdrawal,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub goal_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub goal_id: Uuid,
        /// Must be > 0. The kind defines the direction.
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub description: Option<String>,
        /// Optional: if absent, server uses now().
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub goal_id: Uuid,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub description: String,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetTier {
        Critical,
        Elevated,
        Caution,
        Nominal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
        pub total_budget_minor: i64,
        /// Any day of the budgeted month.
        pub period: NaiveDate,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: Option<String>,
        pub total_budget_minor: Option<i64>,
        pub period: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub total_budget_minor: i64,
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        /// First day of the month.
        pub period: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// Negative when overspent.
        pub remaining_minor: i64,
        /// Not clamped.
        pub percent_used: f64,
        pub bar_fill: f64,
        pub tier: BudgetTier,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsResponse {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod budget_transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetTransactionKind {
        Income,
        Expense,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetTransactionList {
        pub budget_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetTransactionNew {
        pub budget_id: Uuid,
        pub amount_minor: i64,
        pub kind: BudgetTransactionKind,
        /// Ignored for income.
        pub category: Option<String>,
        pub description: Option<String>,
        /// Optional: if absent, server uses now().
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetTransactionView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub amount_minor: i64,
        pub kind: BudgetTransactionKind,
        pub category: Option<String>,
        pub description: String,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetTransactionListResponse {
        pub transactions: Vec<BudgetTransactionView>,
    }
}

pub mod history {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Deposit,
        Withdrawal,
        Income,
        Expense,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ParentKind {
        Goal,
        Budget,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        /// `all` (default), `deposit`, `withdrawal` or `budget`.
        pub tab: Option<String>,
        pub limit: Option<usize>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryEntryView {
        pub id: Uuid,
        pub kind: EntryKind,
        pub amount_minor: i64,
        /// Negative for withdrawals and expenses.
        pub signed_amount_minor: i64,
        /// e.g. `+₱1,000.00`.
        pub display_amount: String,
        pub date: DateTime<Utc>,
        /// `Today`, `Yesterday`, `N days ago` or the date.
        pub relative_date: String,
        pub description: String,
        pub category: Option<String>,
        pub parent_kind: ParentKind,
        pub parent_id: Uuid,
        /// Falls back to `Unknown Goal` / `Unknown Budget`.
        pub parent_name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TabStat {
        pub count: usize,
        pub total_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryStats {
        pub all: usize,
        pub deposit: TabStat,
        pub withdrawal: TabStat,
        /// Entry count of the budget tab.
        pub budget: usize,
        pub income: TabStat,
        pub expense: TabStat,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub entries: Vec<HistoryEntryView>,
        pub stats: HistoryStats,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub username: String,
        pub display_name: String,
        pub member_since: DateTime<Utc>,
        pub goal_count: usize,
        pub total_saved_minor: i64,
        pub completed_goals: usize,
        pub transaction_count: usize,
    }
}

pub mod categories {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesResponse {
        pub goal: Vec<String>,
        pub expense: Vec<String>,
    }
}

pub mod dashboard {
    use super::*;

    /// Payload of each `dashboard` server-sent event.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardEvent {
        pub summary: goal::GoalSummary,
        pub goals: Vec<goal::GoalView>,
        pub budgets: Vec<budget::BudgetView>,
        pub recent: Vec<history::HistoryEntryView>,
    }
}
