use api_types::account::AccountView;
use axum::{Extension, Json, extract::State};
use engine::{User, aggregate::AccountOverview};

use crate::{ServerError, server::ServerState};

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<AccountView>, ServerError> {
    let goals = state.engine.goals(&user.username).await?;
    let transactions = state.engine.transactions(&user.username, None).await?;
    let overview = AccountOverview::compute(&user, &goals, &transactions);

    Ok(Json(AccountView {
        username: overview.username,
        display_name: overview.display_name,
        member_since: overview.member_since,
        goal_count: overview.goal_count,
        total_saved_minor: overview.total_saved.cents(),
        completed_goals: overview.completed_goals,
        transaction_count: overview.transaction_count,
    }))
}
