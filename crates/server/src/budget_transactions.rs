//! Budget income/expense API endpoints

use api_types::budget_transaction::{
    BudgetTransactionKind as ApiKind, BudgetTransactionList, BudgetTransactionListResponse,
    BudgetTransactionNew, BudgetTransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{BudgetTransaction, BudgetTransactionDraft, BudgetTransactionKind, MoneyCents, User};

use crate::{ServerError, server::ServerState};

fn map_transaction(tx: BudgetTransaction) -> BudgetTransactionView {
    BudgetTransactionView {
        id: tx.id,
        budget_id: tx.budget_id,
        amount_minor: tx.amount.cents(),
        kind: match tx.kind {
            BudgetTransactionKind::Income => ApiKind::Income,
            BudgetTransactionKind::Expense => ApiKind::Expense,
        },
        category: tx.category,
        description: tx.description,
        date: tx.date,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<BudgetTransactionList>,
) -> Result<Json<BudgetTransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .budget_transactions(&user.username, params.budget_id)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(BudgetTransactionListResponse { transactions }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetTransactionNew>,
) -> Result<(StatusCode, Json<BudgetTransactionView>), ServerError> {
    let draft = BudgetTransactionDraft {
        budget_id: payload.budget_id,
        amount: MoneyCents::new(payload.amount_minor),
        kind: match payload.kind {
            ApiKind::Income => BudgetTransactionKind::Income,
            ApiKind::Expense => BudgetTransactionKind::Expense,
        },
        category: payload.category,
        description: payload.description,
        date: payload
            .date
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc)),
    };
    let tx = state
        .engine
        .add_budget_transaction(&user.username, draft)
        .await?;

    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}
