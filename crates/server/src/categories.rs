//! Categories API endpoint.

use api_types::categories::CategoriesResponse;
use axum::Json;
use engine::categories::{EXPENSE_CATEGORIES, GOAL_CATEGORIES};

/// The default category lists offered by the goal and expense forms.
pub async fn get() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        goal: GOAL_CATEGORIES.iter().map(ToString::to_string).collect(),
        expense: EXPENSE_CATEGORIES.iter().map(ToString::to_string).collect(),
    })
}
