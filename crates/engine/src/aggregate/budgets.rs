//! Budget aggregation: remaining balance, usage and alert tier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Budget, BudgetTransaction, BudgetTransactionKind, MoneyCents};

/// `total_budget - total_expenses`. Negative means overspent.
pub fn remaining(budget: &Budget) -> MoneyCents {
    budget.total_budget.saturating_sub(budget.total_expenses)
}

/// Expenses as a percentage of the cap, `0.0` for an empty cap.
pub fn percent_used(budget: &Budget) -> f64 {
    budget.total_expenses.percent_of(budget.total_budget)
}

/// Width of the usage bar, always within `[0, 100]`.
pub fn bar_fill(budget: &Budget) -> f64 {
    percent_used(budget).clamp(0.0, 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Critical,
    Elevated,
    Caution,
    Nominal,
}

impl BudgetTier {
    /// Lower bounds are inclusive and checked highest first.
    pub fn for_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            Self::Critical
        } else if percent >= 75.0 {
            Self::Elevated
        } else if percent >= 50.0 {
            Self::Caution
        } else {
            Self::Nominal
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget_id: Uuid,
    pub remaining: MoneyCents,
    pub percent_used: f64,
    pub bar_fill: f64,
    pub tier: BudgetTier,
}

pub fn summarize(budget: &Budget) -> BudgetSummary {
    let percent = percent_used(budget);
    BudgetSummary {
        budget_id: budget.id,
        remaining: remaining(budget),
        percent_used: percent,
        bar_fill: percent.clamp(0.0, 100.0),
        tier: BudgetTier::for_percent(percent),
    }
}

/// Income and expense sums as derived from a budget's ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub income: MoneyCents,
    pub expenses: MoneyCents,
}

impl LedgerTotals {
    pub fn matches(&self, budget: &Budget) -> bool {
        self.income == budget.total_income && self.expenses == budget.total_expenses
    }
}

/// Sums the transactions of `budget_id`, skipping any belonging elsewhere.
pub fn ledger_totals<'a, I>(budget_id: Uuid, transactions: I) -> LedgerTotals
where
    I: IntoIterator<Item = &'a BudgetTransaction>,
{
    transactions
        .into_iter()
        .filter(|tx| tx.budget_id == budget_id)
        .fold(LedgerTotals::default(), |mut totals, tx| {
            match tx.kind {
                BudgetTransactionKind::Income => {
                    totals.income = totals.income.saturating_add(tx.amount)
                }
                BudgetTransactionKind::Expense => {
                    totals.expenses = totals.expenses.saturating_add(tx.amount)
                }
            }
            totals
        })
}
