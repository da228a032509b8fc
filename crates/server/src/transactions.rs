//! Goal transactions API endpoints

use api_types::transaction::{
    TransactionKind as ApiKind, TransactionList, TransactionListResponse, TransactionNew,
    TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{GoalTransaction, GoalTransactionDraft, GoalTransactionKind, MoneyCents, User};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: GoalTransactionKind) -> ApiKind {
    match kind {
        GoalTransactionKind::Deposit => ApiKind::Deposit,
        GoalTransactionKind::Withdrawal => ApiKind::Withdrawal,
    }
}

fn map_transaction(tx: GoalTransaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        goal_id: tx.goal_id,
        amount_minor: tx.amount.cents(),
        kind: map_kind(tx.kind),
        description: tx.description,
        date: tx.date,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .transactions(&user.username, params.goal_id)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

/// Records a deposit or withdrawal and moves the goal balance with it.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let draft = GoalTransactionDraft {
        goal_id: payload.goal_id,
        amount: MoneyCents::new(payload.amount_minor),
        kind: match payload.kind {
            ApiKind::Deposit => GoalTransactionKind::Deposit,
            ApiKind::Withdrawal => GoalTransactionKind::Withdrawal,
        },
        description: payload.description,
        date: payload
            .date
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc)),
    };
    let tx = state.engine.add_transaction(&user.username, draft).await?;

    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}
