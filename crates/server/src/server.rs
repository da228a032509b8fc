use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::headers::{
    Authorization, HeaderMapExt,
    authorization::{Basic, Bearer},
};

use std::sync::Arc;

use crate::{
    account, auth, budget_transactions, budgets, categories, events, goals, history, transactions,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the caller from either a session token or a username/password
/// pair and stores the [`engine::User`] in the request extensions.
async fn authenticate(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();
    let basic = request.headers().typed_get::<Authorization<Basic>>();

    let user = if let Some(bearer) = bearer {
        state.engine.identity(bearer.token()).await
    } else if let Some(basic) = basic {
        if basic.username().is_empty() || basic.password().is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        state
            .engine
            .authenticate(basic.username(), basic.password())
            .await
    } else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user = user.map_err(|err| match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error during auth: {db_err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::UNAUTHORIZED,
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/goals", get(goals::list).post(goals::create))
        .route("/goals/summary", get(goals::summary))
        .route("/goals/chart", get(goals::chart))
        .route("/goals/{id}", patch(goals::update).delete(goals::delete))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{id}",
            patch(budgets::update).delete(budgets::delete),
        )
        .route("/budgets/{id}/reconcile", post(budgets::reconcile))
        .route(
            "/budgetTransactions",
            get(budget_transactions::list).post(budget_transactions::create),
        )
        .route("/history", get(history::get))
        .route("/account", get(account::get))
        .route("/categories", get(categories::get))
        .route("/events", get(events::stream))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        // Sign-in reads Basic credentials itself; sign-out only needs the token.
        .route(
            "/auth/session",
            post(auth::sign_in).delete(auth::sign_out),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, addr: std::net::SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
