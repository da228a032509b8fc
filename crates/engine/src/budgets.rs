//! The module contains the representation of a monthly budget.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetTransactionKind, EngineError, MoneyCents, ResultEngine, util::parse_uuid,
};

/// A monthly spending envelope.
///
/// `total_income` and `total_expenses` are running accumulators: every
/// appended budget transaction bumps one of them and nothing else touches
/// them, except an explicit reconcile against the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub total_budget: MoneyCents,
    pub total_income: MoneyCents,
    pub total_expenses: MoneyCents,
    /// First day of the budgeted month.
    pub period: NaiveDate,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Adds a transaction amount to the matching accumulator.
    ///
    /// On overflow the budget is left untouched.
    pub fn apply(&mut self, kind: BudgetTransactionKind, amount: MoneyCents) -> ResultEngine<()> {
        let total = match kind {
            BudgetTransactionKind::Income => &mut self.total_income,
            BudgetTransactionKind::Expense => &mut self.total_expenses,
        };
        *total = total
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Ok(())
    }
}

/// Normalizes any date to the first day of its month.
pub fn month_start(date: NaiveDate) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| EngineError::InvalidInput("invalid budget period".to_string()))
}

/// Input for creating a budget. Totals always start at zero.
#[derive(Clone, Debug)]
pub struct BudgetDraft {
    pub name: String,
    pub total_budget: MoneyCents,
    pub period: NaiveDate,
}

/// Partial update of a budget. `None` leaves the field untouched.
///
/// The accumulators are deliberately not part of the patch.
#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    pub name: Option<String>,
    pub total_budget: Option<MoneyCents>,
    pub period: Option<NaiveDate>,
}

impl BudgetPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.total_budget.is_none() && self.period.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub total_budget_minor: i64,
    pub total_income_minor: i64,
    pub total_expenses_minor: i64,
    pub period: Date,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            name: ActiveValue::Set(budget.name.clone()),
            total_budget_minor: ActiveValue::Set(budget.total_budget.cents()),
            total_income_minor: ActiveValue::Set(budget.total_income.cents()),
            total_expenses_minor: ActiveValue::Set(budget.total_expenses.cents()),
            period: ActiveValue::Set(budget.period),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            name: model.name,
            total_budget: MoneyCents::new(model.total_budget_minor),
            total_income: MoneyCents::new(model.total_income_minor),
            total_expenses: MoneyCents::new(model.total_expenses_minor),
            period: model.period,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_start_truncates_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            month_start(date).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    fn monthly() -> Budget {
        let now = Utc::now();
        Budget {
            id: Uuid::new_v4(),
            name: "Monthly".to_string(),
            total_budget: MoneyCents::new(500_000),
            total_income: MoneyCents::ZERO,
            total_expenses: MoneyCents::ZERO,
            period: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            user_id: "alice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn apply_bumps_only_the_matching_total() {
        let mut budget = monthly();

        budget
            .apply(BudgetTransactionKind::Expense, MoneyCents::new(150_000))
            .unwrap();
        budget
            .apply(BudgetTransactionKind::Income, MoneyCents::new(20_000))
            .unwrap();

        assert_eq!(budget.total_expenses, MoneyCents::new(150_000));
        assert_eq!(budget.total_income, MoneyCents::new(20_000));
        assert_eq!(budget.total_budget, MoneyCents::new(500_000));
    }

    #[test]
    fn apply_rejects_overflowing_expense() {
        let mut budget = monthly();
        budget.total_expenses = MoneyCents::new(i64::MAX - 1);

        let err = budget
            .apply(BudgetTransactionKind::Expense, MoneyCents::new(2))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(budget.total_expenses, MoneyCents::new(i64::MAX - 1));
    }
}
