use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    BudgetTransaction, BudgetTransactionDraft, BudgetTransactionKind, ResultEngine,
    budget_transactions, budgets, live::Collection,
};

use super::{Engine, with_tx};

impl Engine {
    /// Budget transactions of `user_id`, newest first, optionally for one budget.
    pub async fn budget_transactions(
        &self,
        user_id: &str,
        budget_id: Option<Uuid>,
    ) -> ResultEngine<Vec<BudgetTransaction>> {
        let mut query = budget_transactions::Entity::find()
            .filter(budget_transactions::Column::UserId.eq(user_id.to_string()));
        if let Some(budget_id) = budget_id {
            query = query.filter(budget_transactions::Column::BudgetId.eq(budget_id.to_string()));
        }

        query
            .order_by_desc(budget_transactions::Column::Date)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BudgetTransaction::try_from)
            .collect()
    }

    /// Appends an income or expense and bumps the matching running total.
    pub async fn add_budget_transaction(
        &self,
        user_id: &str,
        draft: BudgetTransactionDraft,
    ) -> ResultEngine<BudgetTransaction> {
        let tx = with_tx!(self, |db_tx| {
            let mut budget = self.require_budget(&db_tx, user_id, draft.budget_id).await?;
            let tx = BudgetTransaction::new(draft, user_id)?;
            budget.apply(tx.kind, tx.amount)?;

            let model: budget_transactions::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;

            let mut budget_model = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            match tx.kind {
                BudgetTransactionKind::Income => {
                    budget_model.total_income_minor = ActiveValue::Set(budget.total_income.cents());
                }
                BudgetTransactionKind::Expense => {
                    budget_model.total_expenses_minor =
                        ActiveValue::Set(budget.total_expenses.cents());
                }
            }
            budget_model.update(&db_tx).await?;

            Ok(tx)
        })?;

        self.publish(user_id, &[Collection::BudgetTransactions, Collection::Budgets]);
        Ok(tx)
    }
}
