//! Unified transaction history endpoint.

use api_types::history::{
    EntryKind as ApiKind, HistoryEntryView, HistoryQuery, HistoryResponse, HistoryStats,
    ParentKind, TabStat,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use engine::{
    Budget, SavingsGoal, User,
    aggregate::{
        EntryKind, HistoryEntry, HistoryTab, ParentRef, TabStats,
        history::{self, TypeStats},
    },
};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: EntryKind) -> ApiKind {
    match kind {
        EntryKind::Deposit => ApiKind::Deposit,
        EntryKind::Withdrawal => ApiKind::Withdrawal,
        EntryKind::Income => ApiKind::Income,
        EntryKind::Expense => ApiKind::Expense,
    }
}

fn map_stat(stat: TypeStats) -> TabStat {
    TabStat {
        count: stat.count,
        total_minor: stat.total.cents(),
    }
}

fn map_stats(stats: TabStats) -> HistoryStats {
    HistoryStats {
        all: stats.all,
        deposit: map_stat(stats.deposit),
        withdrawal: map_stat(stats.withdrawal),
        budget: stats.budget,
        income: map_stat(stats.income),
        expense: map_stat(stats.expense),
    }
}

pub(crate) fn map_entry(
    entry: HistoryEntry,
    now: DateTime<Utc>,
    goals: &[SavingsGoal],
    budgets: &[Budget],
) -> HistoryEntryView {
    let (parent_kind, parent_id) = match entry.parent {
        ParentRef::Goal(id) => (ParentKind::Goal, id),
        ParentRef::Budget(id) => (ParentKind::Budget, id),
    };

    HistoryEntryView {
        id: entry.id,
        kind: map_kind(entry.kind),
        amount_minor: entry.amount.cents(),
        signed_amount_minor: entry.signed_amount().cents(),
        display_amount: entry.display_amount(),
        date: entry.date,
        relative_date: history::relative_day(entry.date, now).to_string(),
        parent_name: history::parent_label(&entry.parent, goals, budgets).to_string(),
        description: entry.description,
        category: entry.category,
        parent_kind,
        parent_id,
    }
}

/// Returns the merged feed filtered by `tab`, newest first, together with the
/// counters of every tab.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let tab: HistoryTab = params.tab.as_deref().unwrap_or_default().parse()?;
    let records = state.engine.records(&user.username).await?;
    let now = Utc::now();

    let feed = history::merged_feed(&records.transactions, &records.budget_transactions);
    let stats = history::tab_stats(&feed);
    let limit = params.limit.unwrap_or(usize::MAX);

    let entries = history::filter(&feed, tab)
        .into_iter()
        .take(limit)
        .map(|entry| map_entry(entry, now, &records.goals, &records.budgets))
        .collect();

    Ok(Json(HistoryResponse {
        entries,
        stats: map_stats(stats),
    }))
}
