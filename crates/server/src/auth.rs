//! Session endpoints.

use api_types::auth::{Me, SessionCreated};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use axum_extra::headers::{
    Authorization, HeaderMapExt,
    authorization::{Basic, Bearer},
};
use engine::{EngineError, User};

use crate::{ServerError, server::ServerState};

/// Exchanges Basic credentials for a session token.
pub async fn sign_in(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SessionCreated>), ServerError> {
    let Some(basic) = headers.typed_get::<Authorization<Basic>>() else {
        return Err(EngineError::Unauthorized("basic credentials required".to_string()).into());
    };

    let token = state
        .engine
        .sign_in(basic.username(), basic.password())
        .await?;

    Ok((StatusCode::CREATED, Json(SessionCreated { token })))
}

pub async fn sign_out(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<StatusCode, ServerError> {
    let Some(bearer) = headers.typed_get::<Authorization<Bearer>>() else {
        return Err(EngineError::Unauthorized("session token required".to_string()).into());
    };

    state.engine.sign_out(bearer.token()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(user): Extension<User>) -> Json<Me> {
    Json(Me {
        username: user.username,
        display_name: user.display_name,
        member_since: user.created_at,
    })
}
