use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, GoalDraft, GoalPatch, ResultEngine, SavingsGoal,
    categories::DEFAULT_GOAL_CATEGORY,
    goals,
    live::Collection,
    util::{ensure_non_negative, ensure_positive, normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Goals of `user_id`, newest first.
    pub async fn goals(&self, user_id: &str) -> ResultEngine<Vec<SavingsGoal>> {
        goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(goals::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SavingsGoal::try_from)
            .collect()
    }

    /// Return one goal. Goals of other users are reported as missing.
    pub async fn goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<SavingsGoal> {
        let model = goals::Entity::find_by_id(goal_id.to_string())
            .filter(goals::Column::UserId.eq(user_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
        SavingsGoal::try_from(model)
    }

    /// Add a new goal.
    ///
    /// The category falls back to the first default goal category.
    pub async fn new_goal(&self, user_id: &str, draft: GoalDraft) -> ResultEngine<SavingsGoal> {
        let name = normalize_required_name(&draft.name, "goal")?;
        ensure_positive(draft.target_amount, "target amount")?;
        ensure_non_negative(draft.current_amount, "current amount")?;

        let now = Utc::now();
        let goal = SavingsGoal {
            id: Uuid::new_v4(),
            name,
            target_amount: draft.target_amount,
            current_amount: draft.current_amount,
            deadline: draft.deadline,
            category: normalize_optional_text(draft.category.as_deref())
                .unwrap_or_else(|| DEFAULT_GOAL_CATEGORY.to_string()),
            description: normalize_optional_text(draft.description.as_deref()),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let model: goals::ActiveModel = (&goal).into();
        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            Ok(())
        })?;

        self.publish(user_id, &[Collection::Goals]);
        Ok(goal)
    }

    /// Applies a partial update and bumps `updated_at`.
    pub async fn update_goal(
        &self,
        user_id: &str,
        goal_id: Uuid,
        patch: GoalPatch,
    ) -> ResultEngine<SavingsGoal> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("nothing to update".to_string()));
        }

        let goal = with_tx!(self, |db_tx| {
            let mut goal = self.require_goal(&db_tx, user_id, goal_id).await?;

            if let Some(name) = patch.name.as_deref() {
                goal.name = normalize_required_name(name, "goal")?;
            }
            if let Some(target) = patch.target_amount {
                ensure_positive(target, "target amount")?;
                goal.target_amount = target;
            }
            if let Some(current) = patch.current_amount {
                ensure_non_negative(current, "current amount")?;
                goal.current_amount = current;
            }
            if let Some(deadline) = patch.deadline {
                goal.deadline = deadline;
            }
            if let Some(category) = patch.category.as_deref() {
                goal.category = normalize_optional_text(Some(category))
                    .unwrap_or_else(|| DEFAULT_GOAL_CATEGORY.to_string());
            }
            if let Some(description) = patch.description.as_ref() {
                goal.description = normalize_optional_text(description.as_deref());
            }
            goal.updated_at = Utc::now();

            let active = goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                name: ActiveValue::Set(goal.name.clone()),
                target_minor: ActiveValue::Set(goal.target_amount.cents()),
                current_minor: ActiveValue::Set(goal.current_amount.cents()),
                deadline: ActiveValue::Set(goal.deadline),
                category: ActiveValue::Set(goal.category.clone()),
                description: ActiveValue::Set(goal.description.clone()),
                updated_at: ActiveValue::Set(goal.updated_at),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(goal)
        })?;

        self.publish(user_id, &[Collection::Goals]);
        Ok(goal)
    }

    /// Deletes a goal. Its transactions are kept.
    pub async fn delete_goal(&self, user_id: &str, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, user_id, goal_id).await?;
            goals::Entity::delete_by_id(goal_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;

        self.publish(user_id, &[Collection::Goals]);
        Ok(())
    }

    pub(super) async fn require_goal(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        goal_id: Uuid,
    ) -> ResultEngine<SavingsGoal> {
        let model = goals::Entity::find_by_id(goal_id.to_string())
            .filter(goals::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
        SavingsGoal::try_from(model)
    }
}
