use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    GoalTransaction, GoalTransactionDraft, ResultEngine, goals, live::Collection, transactions,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Goal transactions of `user_id`, newest first, optionally for one goal.
    pub async fn transactions(
        &self,
        user_id: &str,
        goal_id: Option<Uuid>,
    ) -> ResultEngine<Vec<GoalTransaction>> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id.to_string()));
        if let Some(goal_id) = goal_id {
            query = query.filter(transactions::Column::GoalId.eq(goal_id.to_string()));
        }

        query
            .order_by_desc(transactions::Column::Date)
            .all(&self.database)
            .await?
            .into_iter()
            .map(GoalTransaction::try_from)
            .collect()
    }

    /// Appends a deposit or withdrawal and moves the goal's current amount.
    ///
    /// A withdrawal larger than the saved amount empties the goal; the
    /// recorded transaction keeps the requested amount.
    pub async fn add_transaction(
        &self,
        user_id: &str,
        draft: GoalTransactionDraft,
    ) -> ResultEngine<GoalTransaction> {
        let tx = with_tx!(self, |db_tx| {
            let goal = self.require_goal(&db_tx, user_id, draft.goal_id).await?;

            let description = normalize_optional_text(draft.description.as_deref())
                .unwrap_or_else(|| format!("{} to {}", draft.kind.as_str(), goal.name));
            let kind = draft.kind;
            let tx = GoalTransaction::new(draft, description, user_id)?;
            let current = kind.apply(goal.current_amount, tx.amount)?;

            let model: transactions::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;

            let goal_model = goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                current_minor: ActiveValue::Set(current.cents()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            goal_model.update(&db_tx).await?;

            Ok(tx)
        })?;

        self.publish(user_id, &[Collection::Transactions, Collection::Goals]);
        Ok(tx)
    }
}
