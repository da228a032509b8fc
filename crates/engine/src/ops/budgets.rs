use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetDraft, BudgetPatch, BudgetTransaction, EngineError, MoneyCents, ResultEngine,
    aggregate::budgets::ledger_totals,
    budget_transactions, budgets,
    budgets::month_start,
    live::Collection,
    util::{ensure_non_negative, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Budgets of `user_id`, newest first.
    pub async fn budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    pub async fn budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        let model = budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
        Budget::try_from(model)
    }

    /// Add a new budget. Income and expense totals start at zero.
    pub async fn new_budget(&self, user_id: &str, draft: BudgetDraft) -> ResultEngine<Budget> {
        let name = normalize_required_name(&draft.name, "budget")?;
        ensure_non_negative(draft.total_budget, "total budget")?;

        let now = Utc::now();
        let budget = Budget {
            id: Uuid::new_v4(),
            name,
            total_budget: draft.total_budget,
            total_income: MoneyCents::ZERO,
            total_expenses: MoneyCents::ZERO,
            period: month_start(draft.period)?,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let model: budgets::ActiveModel = (&budget).into();
        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            Ok(())
        })?;

        self.publish(user_id, &[Collection::Budgets]);
        Ok(budget)
    }

    /// Applies a partial update. The running totals are never touched here.
    pub async fn update_budget(
        &self,
        user_id: &str,
        budget_id: Uuid,
        patch: BudgetPatch,
    ) -> ResultEngine<Budget> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("nothing to update".to_string()));
        }

        let budget = with_tx!(self, |db_tx| {
            let mut budget = self.require_budget(&db_tx, user_id, budget_id).await?;

            if let Some(name) = patch.name.as_deref() {
                budget.name = normalize_required_name(name, "budget")?;
            }
            if let Some(total) = patch.total_budget {
                ensure_non_negative(total, "total budget")?;
                budget.total_budget = total;
            }
            if let Some(period) = patch.period {
                budget.period = month_start(period)?;
            }
            budget.updated_at = Utc::now();

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                name: ActiveValue::Set(budget.name.clone()),
                total_budget_minor: ActiveValue::Set(budget.total_budget.cents()),
                period: ActiveValue::Set(budget.period),
                updated_at: ActiveValue::Set(budget.updated_at),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(budget)
        })?;

        self.publish(user_id, &[Collection::Budgets]);
        Ok(budget)
    }

    /// Deletes a budget. Its transactions are kept.
    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;

        self.publish(user_id, &[Collection::Budgets]);
        Ok(())
    }

    /// Recomputes `total_income` and `total_expenses` from the budget's
    /// ledger and persists them.
    ///
    /// Change notifications are only sent when the stored totals drifted.
    pub async fn reconcile_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        let (budget, drifted) = with_tx!(self, |db_tx| {
            let mut budget = self.require_budget(&db_tx, user_id, budget_id).await?;

            let ledger = budget_transactions::Entity::find()
                .filter(budget_transactions::Column::UserId.eq(user_id.to_string()))
                .filter(budget_transactions::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(BudgetTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let totals = ledger_totals(budget.id, &ledger);
            if totals.matches(&budget) {
                Ok((budget, false))
            } else {
                tracing::info!(
                    budget_id = %budget.id,
                    stored_income = budget.total_income.cents(),
                    stored_expenses = budget.total_expenses.cents(),
                    ledger_income = totals.income.cents(),
                    ledger_expenses = totals.expenses.cents(),
                    "reconciling budget totals"
                );
                budget.total_income = totals.income;
                budget.total_expenses = totals.expenses;
                budget.updated_at = Utc::now();

                let active = budgets::ActiveModel {
                    id: ActiveValue::Set(budget.id.to_string()),
                    total_income_minor: ActiveValue::Set(budget.total_income.cents()),
                    total_expenses_minor: ActiveValue::Set(budget.total_expenses.cents()),
                    updated_at: ActiveValue::Set(budget.updated_at),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
                Ok((budget, true))
            }
        })?;

        if drifted {
            self.publish(user_id, &[Collection::Budgets]);
        }
        Ok(budget)
    }

    pub(super) async fn require_budget(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        budget_id: Uuid,
    ) -> ResultEngine<Budget> {
        let model = budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
        Budget::try_from(model)
    }
}
