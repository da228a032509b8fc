//! Monthly budget API endpoints

use api_types::budget::{BudgetNew, BudgetTier, BudgetUpdate, BudgetView, BudgetsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    Budget, BudgetDraft, BudgetPatch, MoneyCents, User,
    aggregate::{self, BudgetSummary},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_tier(tier: aggregate::BudgetTier) -> BudgetTier {
    match tier {
        aggregate::BudgetTier::Critical => BudgetTier::Critical,
        aggregate::BudgetTier::Elevated => BudgetTier::Elevated,
        aggregate::BudgetTier::Caution => BudgetTier::Caution,
        aggregate::BudgetTier::Nominal => BudgetTier::Nominal,
    }
}

pub(crate) fn map_budget(budget: Budget, summary: BudgetSummary) -> BudgetView {
    BudgetView {
        id: budget.id,
        name: budget.name,
        total_budget_minor: budget.total_budget.cents(),
        total_income_minor: budget.total_income.cents(),
        total_expenses_minor: budget.total_expenses.cents(),
        period: budget.period,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
        remaining_minor: summary.remaining.cents(),
        percent_used: summary.percent_used,
        bar_fill: summary.bar_fill,
        tier: map_tier(summary.tier),
    }
}

fn view(budget: Budget) -> BudgetView {
    let summary = aggregate::budgets::summarize(&budget);
    map_budget(budget, summary)
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetsResponse>, ServerError> {
    let budgets = state
        .engine
        .budgets(&user.username)
        .await?
        .into_iter()
        .map(view)
        .collect();

    Ok(Json(BudgetsResponse { budgets }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let draft = BudgetDraft {
        name: payload.name,
        total_budget: MoneyCents::new(payload.total_budget_minor),
        period: payload.period,
    };
    let budget = state.engine.new_budget(&user.username, draft).await?;

    Ok((StatusCode::CREATED, Json(view(budget))))
}

/// Income and expense totals can't be edited here; they only move with the
/// ledger.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let patch = BudgetPatch {
        name: payload.name,
        total_budget: payload.total_budget_minor.map(MoneyCents::new),
        period: payload.period,
    };
    let budget = state.engine.update_budget(&user.username, id, patch).await?;

    Ok(Json(view(budget)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reconcile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.reconcile_budget(&user.username, id).await?;
    Ok(Json(view(budget)))
}
