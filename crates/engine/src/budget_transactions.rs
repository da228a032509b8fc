//! Budget-scoped transactions (income and expenses).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTransactionKind {
    Income,
    Expense,
}

impl BudgetTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for BudgetTransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidInput(format!(
                "invalid budget transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTransaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub amount: MoneyCents,
    pub kind: BudgetTransactionKind,
    /// Only ever set on expenses.
    pub category: Option<String>,
    pub description: String,
    pub date: DateTime<Utc>,
    pub user_id: String,
}

/// Input for appending a budget transaction.
#[derive(Clone, Debug)]
pub struct BudgetTransactionDraft {
    pub budget_id: Uuid,
    pub amount: MoneyCents,
    pub kind: BudgetTransactionKind,
    /// Ignored for income.
    pub category: Option<String>,
    /// Defaults to `"<kind> transaction"` when empty.
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl BudgetTransaction {
    pub(crate) fn new(draft: BudgetTransactionDraft, user_id: &str) -> ResultEngine<Self> {
        crate::util::ensure_positive(draft.amount, "amount")?;
        let category = match draft.kind {
            BudgetTransactionKind::Expense => {
                crate::util::normalize_optional_text(draft.category.as_deref())
            }
            BudgetTransactionKind::Income => None,
        };
        let description = crate::util::normalize_optional_text(draft.description.as_deref())
            .unwrap_or_else(|| format!("{} transaction", draft.kind.as_str()));

        Ok(Self {
            id: Uuid::new_v4(),
            budget_id: draft.budget_id,
            amount: draft.amount,
            kind: draft.kind,
            category,
            description,
            date: draft.date,
            user_id: user_id.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub amount_minor: i64,
    pub kind: String,
    pub category: Option<String>,
    pub description: String,
    pub date: DateTimeUtc,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BudgetTransaction> for ActiveModel {
    fn from(tx: &BudgetTransaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            budget_id: ActiveValue::Set(tx.budget_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            category: ActiveValue::Set(tx.category.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            date: ActiveValue::Set(tx.date),
            user_id: ActiveValue::Set(tx.user_id.clone()),
        }
    }
}

impl TryFrom<Model> for BudgetTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget transaction")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            amount: MoneyCents::new(model.amount_minor),
            kind: BudgetTransactionKind::try_from(model.kind.as_str())?,
            category: model.category,
            description: model.description,
            date: model.date,
            user_id: model.user_id,
        })
    }
}
