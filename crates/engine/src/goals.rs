//! The module contains the representation of a savings goal.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// A named savings target with a deadline.
///
/// `current_amount` is allowed to exceed `target_amount` (over-saving); the
/// aggregators clamp the displayed progress, the record itself is never
/// clamped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub deadline: DateTime<Utc>,
    pub category: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// Returns `true` once the saved amount reaches the target.
    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

/// Input for creating a goal.
#[derive(Clone, Debug)]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub deadline: DateTime<Utc>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a goal. `None` leaves the field untouched.
///
/// `description: Some(None)` clears the description.
#[derive(Clone, Debug, Default)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<MoneyCents>,
    pub current_amount: Option<MoneyCents>,
    pub deadline: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
}

impl GoalPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_amount.is_none()
            && self.current_amount.is_none()
            && self.deadline.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub deadline: DateTimeUtc,
    pub category: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsGoal> for ActiveModel {
    fn from(goal: &SavingsGoal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            name: ActiveValue::Set(goal.name.clone()),
            target_minor: ActiveValue::Set(goal.target_amount.cents()),
            current_minor: ActiveValue::Set(goal.current_amount.cents()),
            deadline: ActiveValue::Set(goal.deadline),
            category: ActiveValue::Set(goal.category.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            created_at: ActiveValue::Set(goal.created_at),
            updated_at: ActiveValue::Set(goal.updated_at),
        }
    }
}

impl TryFrom<Model> for SavingsGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            name: model.name,
            target_amount: MoneyCents::new(model.target_minor),
            current_amount: MoneyCents::new(model.current_minor),
            deadline: model.deadline,
            category: model.category,
            description: model.description,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
