//! Server-sent events carrying the live dashboard.
//!
//! Each connection holds one `Query::All` subscription. Every snapshot it
//! yields is turned into a `dashboard` event computed with the time of
//! delivery.

use std::{convert::Infallible, time::Duration};

use api_types::dashboard::DashboardEvent;
use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::{DateTime, Utc};
use engine::{
    Query, Snapshot, User,
    aggregate::{Dashboard, Records},
};
use futures::{Stream, StreamExt};

use crate::{budgets, goals, history, server::ServerState};

fn dashboard_event(records: Records, now: DateTime<Utc>) -> DashboardEvent {
    let dashboard = Dashboard::compute(&records, now);

    let recent = dashboard
        .recent
        .into_iter()
        .map(|entry| history::map_entry(entry, now, &records.goals, &records.budgets))
        .collect();

    DashboardEvent {
        summary: goals::map_summary(dashboard.summary),
        goals: records
            .goals
            .into_iter()
            .zip(dashboard.goals)
            .map(|(goal, progress)| goals::map_goal(goal, progress))
            .collect(),
        budgets: records
            .budgets
            .into_iter()
            .zip(dashboard.budgets)
            .map(|(budget, summary)| budgets::map_budget(budget, summary))
            .collect(),
        recent,
    }
}

pub async fn stream(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(user_id = %user.username, "dashboard stream opened");

    let snapshots = state
        .engine
        .subscribe(&user.username, Query::All)
        .into_stream();

    let events = snapshots.filter_map(|snapshot| async move {
        match snapshot {
            Ok(Snapshot::All(records)) => {
                let payload = dashboard_event(records, Utc::now());
                match Event::default().event("dashboard").json_data(payload) {
                    Ok(event) => Some(Ok(event)),
                    Err(err) => {
                        tracing::error!("failed to serialize dashboard event: {err}");
                        None
                    }
                }
            }
            Ok(_) => None,
            Err(err) => {
                tracing::error!("failed to refresh dashboard: {err}");
                None
            }
        }
    });

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
