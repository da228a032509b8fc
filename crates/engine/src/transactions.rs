//! Goal-scoped transactions (deposits and withdrawals).
//!
//! A `GoalTransaction` moves money into or out of a savings goal. The amount
//! is always positive: the sign is carried by [`GoalTransactionKind`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalTransactionKind {
    Deposit,
    Withdrawal,
}

impl GoalTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }

    /// Applies a movement of `amount` to a goal balance.
    ///
    /// Withdrawals never take the balance below zero. A deposit that would
    /// overflow the balance is rejected.
    pub fn apply(self, current: MoneyCents, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        match self {
            Self::Deposit => current
                .checked_add(amount)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string())),
            Self::Withdrawal => Ok(current.saturating_floor_sub(amount)),
        }
    }
}

impl TryFrom<&str> for GoalTransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(EngineError::InvalidInput(format!(
                "invalid goal transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTransaction {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount: MoneyCents,
    pub kind: GoalTransactionKind,
    pub description: String,
    pub date: DateTime<Utc>,
    pub user_id: String,
}

/// Input for appending a goal transaction.
#[derive(Clone, Debug)]
pub struct GoalTransactionDraft {
    pub goal_id: Uuid,
    pub amount: MoneyCents,
    pub kind: GoalTransactionKind,
    /// Defaults to `"<kind> to <goal name>"` when empty.
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl GoalTransaction {
    pub(crate) fn new(
        draft: GoalTransactionDraft,
        description: String,
        user_id: &str,
    ) -> ResultEngine<Self> {
        crate::util::ensure_positive(draft.amount, "amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            goal_id: draft.goal_id,
            amount: draft.amount,
            kind: draft.kind,
            description,
            date: draft.date,
            user_id: user_id.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub goal_id: String,
    pub amount_minor: i64,
    pub kind: String,
    pub description: String,
    pub date: DateTimeUtc,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GoalTransaction> for ActiveModel {
    fn from(tx: &GoalTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            goal_id: ActiveValue::Set(tx.goal_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            date: ActiveValue::Set(tx.date),
            user_id: ActiveValue::Set(tx.user_id.clone()),
        }
    }
}

impl TryFrom<Model> for GoalTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            amount: MoneyCents::new(model.amount_minor),
            kind: GoalTransactionKind::try_from(model.kind.as_str())?,
            description: model.description,
            date: model.date,
            user_id: model.user_id,
        })
    }
}
