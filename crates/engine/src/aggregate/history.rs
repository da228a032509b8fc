//! Unified transaction history.
//!
//! Goal transactions and budget transactions live in separate collections.
//! The feed merges them into one list of [`HistoryEntry`] values tagged with
//! an [`EntryKind`], newest first.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Budget, BudgetTransaction, BudgetTransactionKind, EngineError, GoalTransaction,
    GoalTransactionKind, MoneyCents, SavingsGoal,
};

pub const UNKNOWN_GOAL: &str = "Unknown Goal";
pub const UNKNOWN_BUDGET: &str = "Unknown Budget";

/// Number of entries on the dashboard's recent list.
pub const RECENT_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Credit,
    Debit,
}

impl EntryKind {
    pub fn sign(self) -> Sign {
        match self {
            Self::Deposit | Self::Income => Sign::Credit,
            Self::Withdrawal | Self::Expense => Sign::Debit,
        }
    }

    pub fn is_budget(self) -> bool {
        matches!(self, Self::Income | Self::Expense)
    }
}

impl From<GoalTransactionKind> for EntryKind {
    fn from(kind: GoalTransactionKind) -> Self {
        match kind {
            GoalTransactionKind::Deposit => Self::Deposit,
            GoalTransactionKind::Withdrawal => Self::Withdrawal,
        }
    }
}

impl From<BudgetTransactionKind> for EntryKind {
    fn from(kind: BudgetTransactionKind) -> Self {
        match kind {
            BudgetTransactionKind::Income => Self::Income,
            BudgetTransactionKind::Expense => Self::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum ParentRef {
    Goal(Uuid),
    Budget(Uuid),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    /// Always positive; see [`HistoryEntry::signed_amount`].
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: Option<String>,
    pub parent: ParentRef,
}

impl HistoryEntry {
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind.sign() {
            Sign::Credit => self.amount,
            Sign::Debit => -self.amount,
        }
    }

    /// `+₱1,000.00` for credits, `-₱1,000.00` for debits.
    pub fn display_amount(&self) -> String {
        match self.kind.sign() {
            Sign::Credit => format!("+{}", self.amount),
            Sign::Debit => format!("-{}", self.amount),
        }
    }
}

impl From<&GoalTransaction> for HistoryEntry {
    fn from(tx: &GoalTransaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind.into(),
            amount: tx.amount,
            date: tx.date,
            description: tx.description.clone(),
            category: None,
            parent: ParentRef::Goal(tx.goal_id),
        }
    }
}

impl From<&BudgetTransaction> for HistoryEntry {
    fn from(tx: &BudgetTransaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind.into(),
            amount: tx.amount,
            date: tx.date,
            description: tx.description.clone(),
            category: tx.category.clone(),
            parent: ParentRef::Budget(tx.budget_id),
        }
    }
}

/// A record with a kind and a positive amount.
pub trait Movement {
    type Kind: Copy + PartialEq;

    fn kind(&self) -> Self::Kind;
    fn amount(&self) -> MoneyCents;
}

impl Movement for GoalTransaction {
    type Kind = GoalTransactionKind;

    fn kind(&self) -> Self::Kind {
        self.kind
    }

    fn amount(&self) -> MoneyCents {
        self.amount
    }
}

impl Movement for BudgetTransaction {
    type Kind = BudgetTransactionKind;

    fn kind(&self) -> Self::Kind {
        self.kind
    }

    fn amount(&self) -> MoneyCents {
        self.amount
    }
}

impl Movement for HistoryEntry {
    type Kind = EntryKind;

    fn kind(&self) -> Self::Kind {
        self.kind
    }

    fn amount(&self) -> MoneyCents {
        self.amount
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    pub count: usize,
    pub total: MoneyCents,
}

impl TypeStats {
    fn push(&mut self, amount: MoneyCents) {
        self.count += 1;
        self.total = self.total.saturating_add(amount);
    }
}

pub fn stats_by_type<T: Movement>(items: &[T], kind: T::Kind) -> TypeStats {
    items
        .iter()
        .filter(|item| item.kind() == kind)
        .fold(TypeStats::default(), |mut stats, item| {
            stats.push(item.amount());
            stats
        })
}

/// Goal transactions followed by budget transactions, sorted newest first.
///
/// The sort is stable so entries sharing a date keep that input order.
pub fn merged_feed(goal_txs: &[GoalTransaction], budget_txs: &[BudgetTransaction]) -> Vec<HistoryEntry> {
    let mut feed: Vec<HistoryEntry> = goal_txs
        .iter()
        .map(HistoryEntry::from)
        .chain(budget_txs.iter().map(HistoryEntry::from))
        .collect();
    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTab {
    #[default]
    All,
    Deposit,
    Withdrawal,
    /// Any budget transaction, income or expense.
    Budget,
}

impl HistoryTab {
    pub fn includes(self, kind: EntryKind) -> bool {
        match self {
            Self::All => true,
            Self::Deposit => kind == EntryKind::Deposit,
            Self::Withdrawal => kind == EntryKind::Withdrawal,
            Self::Budget => kind.is_budget(),
        }
    }
}

impl FromStr for HistoryTab {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "budget" => Ok(Self::Budget),
            other => Err(EngineError::InvalidInput(format!("unknown history tab: {other}"))),
        }
    }
}

pub fn filter(feed: &[HistoryEntry], tab: HistoryTab) -> Vec<HistoryEntry> {
    feed.iter().filter(|e| tab.includes(e.kind)).cloned().collect()
}

pub fn recent(feed: &[HistoryEntry], n: usize) -> &[HistoryEntry] {
    &feed[..n.min(feed.len())]
}

/// Header counters shown above the history tabs.
///
/// The budget tab mixes credits and debits, so it only carries a count;
/// its income and expense sums are reported separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStats {
    pub all: usize,
    pub deposit: TypeStats,
    pub withdrawal: TypeStats,
    pub budget: usize,
    pub income: TypeStats,
    pub expense: TypeStats,
}

pub fn tab_stats(feed: &[HistoryEntry]) -> TabStats {
    let mut stats = TabStats {
        all: feed.len(),
        ..TabStats::default()
    };
    for entry in feed {
        match entry.kind {
            EntryKind::Deposit => stats.deposit.push(entry.amount),
            EntryKind::Withdrawal => stats.withdrawal.push(entry.amount),
            EntryKind::Income => stats.income.push(entry.amount),
            EntryKind::Expense => stats.expense.push(entry.amount),
        }
    }
    stats.budget = stats.income.count + stats.expense.count;
    stats
}

/// Name of the goal or budget an entry belongs to, or a placeholder when the
/// parent is gone.
pub fn parent_label<'a>(
    parent: &ParentRef,
    goals: &'a [SavingsGoal],
    budgets: &'a [Budget],
) -> &'a str {
    match parent {
        ParentRef::Goal(id) => goals
            .iter()
            .find(|g| g.id == *id)
            .map_or(UNKNOWN_GOAL, |g| g.name.as_str()),
        ParentRef::Budget(id) => budgets
            .iter()
            .find(|b| b.id == *id)
            .map_or(UNKNOWN_BUDGET, |b| b.name.as_str()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum RelativeDay {
    Today,
    Yesterday,
    DaysAgo(i64),
    On(NaiveDate),
}

impl fmt::Display for RelativeDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("Today"),
            Self::Yesterday => f.write_str("Yesterday"),
            Self::DaysAgo(days) => write!(f, "{days} days ago"),
            Self::On(date) => write!(f, "{}", date.format("%b %-d, %Y")),
        }
    }
}

/// Whole days elapsed since `date`, rounded down. Future dates read as today.
pub fn relative_day(date: DateTime<Utc>, now: DateTime<Utc>) -> RelativeDay {
    match (now - date).num_days() {
        i64::MIN..=0 => RelativeDay::Today,
        1 => RelativeDay::Yesterday,
        days @ 2..=6 => RelativeDay::DaysAgo(days),
        _ => RelativeDay::On(date.date_naive()),
    }
}
