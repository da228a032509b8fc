//! Savings goal API endpoints

use api_types::goal::{
    ChartResponse, ChartSlice, GoalNew, GoalSummary, GoalUpdate, GoalView, GoalsResponse,
    ProgressTier,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    GoalDraft, GoalPatch, MoneyCents, SavingsGoal, User,
    aggregate::{self, GoalProgress},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_tier(tier: aggregate::ProgressTier) -> ProgressTier {
    match tier {
        aggregate::ProgressTier::Complete => ProgressTier::Complete,
        aggregate::ProgressTier::OnTrack => ProgressTier::OnTrack,
        aggregate::ProgressTier::Halfway => ProgressTier::Halfway,
        aggregate::ProgressTier::Starting => ProgressTier::Starting,
    }
}

pub(crate) fn map_goal(goal: SavingsGoal, progress: GoalProgress) -> GoalView {
    GoalView {
        id: goal.id,
        name: goal.name,
        target_minor: goal.target_amount.cents(),
        current_minor: goal.current_amount.cents(),
        deadline: goal.deadline,
        category: goal.category,
        description: goal.description,
        created_at: goal.created_at,
        updated_at: goal.updated_at,
        progress: progress.progress,
        completed: progress.completed,
        remaining_minor: progress.remaining.cents(),
        days_remaining: progress.days_remaining,
        deadline_label: progress.deadline_status.to_string(),
        tier: map_tier(progress.tier),
    }
}

pub(crate) fn map_summary(summary: aggregate::GoalSummary) -> GoalSummary {
    GoalSummary {
        total_saved_minor: summary.total_saved.cents(),
        total_target_minor: summary.total_target.cents(),
        savings_rate: summary.savings_rate,
        completed: summary.completed,
        upcoming_deadlines: summary.upcoming_deadlines,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GoalsResponse>, ServerError> {
    let now = Utc::now();
    let goals = state
        .engine
        .goals(&user.username)
        .await?
        .into_iter()
        .map(|goal| {
            let progress = aggregate::goals::goal_progress(&goal, now);
            map_goal(goal, progress)
        })
        .collect();

    Ok(Json(GoalsResponse { goals }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let draft = GoalDraft {
        name: payload.name,
        target_amount: MoneyCents::new(payload.target_minor),
        current_amount: MoneyCents::new(payload.current_minor.unwrap_or(0)),
        deadline: payload.deadline.with_timezone(&Utc),
        category: payload.category,
        description: payload.description,
    };
    let goal = state.engine.new_goal(&user.username, draft).await?;
    let progress = aggregate::goals::goal_progress(&goal, Utc::now());

    Ok((StatusCode::CREATED, Json(map_goal(goal, progress))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalView>, ServerError> {
    let patch = GoalPatch {
        name: payload.name,
        target_amount: payload.target_minor.map(MoneyCents::new),
        current_amount: payload.current_minor.map(MoneyCents::new),
        deadline: payload.deadline.map(|dt| dt.with_timezone(&Utc)),
        category: payload.category,
        description: payload.description.map(Some),
    };
    let goal = state.engine.update_goal(&user.username, id, patch).await?;
    let progress = aggregate::goals::goal_progress(&goal, Utc::now());

    Ok(Json(map_goal(goal, progress)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_goal(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GoalSummary>, ServerError> {
    let goals = state.engine.goals(&user.username).await?;
    let summary = aggregate::goals::summarize(&goals, Utc::now());

    Ok(Json(map_summary(summary)))
}

pub async fn chart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ChartResponse>, ServerError> {
    let goals = state.engine.goals(&user.username).await?;
    let slices = aggregate::goals::chart_slices(&goals)
        .into_iter()
        .map(|slice| ChartSlice {
            goal_id: slice.goal_id,
            name: slice.name,
            current_minor: slice.current.cents(),
            target_minor: slice.target.cents(),
            progress: slice.progress,
        })
        .collect();

    Ok(Json(ChartResponse { slices }))
}
