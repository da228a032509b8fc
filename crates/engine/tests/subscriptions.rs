use std::time::Duration;

use chrono::{NaiveDate, Utc};
use futures::StreamExt;
use sea_orm::Database;

use engine::{
    BudgetDraft, BudgetTransactionDraft, BudgetTransactionKind, Engine, GoalDraft,
    GoalTransactionDraft, GoalTransactionKind, MoneyCents, Query, Snapshot, Subscription,
};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.create_user("alice", "password", None).await.unwrap();
    engine.create_user("bob", "password", None).await.unwrap();
    engine
}

fn goal_draft(name: &str) -> GoalDraft {
    GoalDraft {
        name: name.to_string(),
        target_amount: MoneyCents::new(10_000),
        current_amount: MoneyCents::ZERO,
        deadline: Utc::now() + chrono::Duration::days(10),
        category: Some("Car".to_string()),
        description: None,
    }
}

async fn next_goals(sub: &mut Subscription) -> Vec<String> {
    let snapshot = tokio::time::timeout(Duration::from_secs(2), sub.next())
        .await
        .expect("snapshot timed out")
        .expect("subscription closed")
        .unwrap();
    match snapshot {
        Snapshot::Goals(goals) => goals.into_iter().map(|g| g.name).collect(),
        other => panic!("unexpected snapshot: {other:?}"),
    }
}

#[tokio::test]
async fn initial_snapshot_then_one_per_write() {
    let engine = engine().await;
    engine.new_goal("alice", goal_draft("Existing")).await.unwrap();

    let mut sub = engine.subscribe("alice", Query::Goals);
    assert_eq!(next_goals(&mut sub).await, vec!["Existing"]);

    engine.new_goal("alice", goal_draft("Fresh")).await.unwrap();
    let names = next_goals(&mut sub).await;
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Fresh".to_string()));

    sub.unsubscribe();
}

#[tokio::test]
async fn other_users_writes_are_not_delivered() {
    let engine = engine().await;

    let mut sub = engine.subscribe("alice", Query::Goals);
    assert!(next_goals(&mut sub).await.is_empty());

    engine.new_goal("bob", goal_draft("Not yours")).await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
    assert!(pending.is_err(), "no snapshot expected for another user's write");

    engine.new_goal("alice", goal_draft("Mine")).await.unwrap();
    assert_eq!(next_goals(&mut sub).await, vec!["Mine"]);
}

#[tokio::test]
async fn unrelated_collections_do_not_wake_a_query() {
    let engine = engine().await;

    let mut sub = engine.subscribe("alice", Query::Goals);
    next_goals(&mut sub).await;

    engine
        .new_budget(
            "alice",
            BudgetDraft {
                name: "January".to_string(),
                total_budget: MoneyCents::new(5_000),
                period: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
        )
        .await
        .unwrap();

    let pending = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
    assert!(pending.is_err());
}

#[tokio::test]
async fn all_query_streams_every_collection() {
    let engine = engine().await;
    let budget = engine
        .new_budget(
            "alice",
            BudgetDraft {
                name: "January".to_string(),
                total_budget: MoneyCents::new(5_000),
                period: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
        )
        .await
        .unwrap();

    let mut stream = Box::pin(engine.subscribe("alice", Query::All).into_stream());
    let Some(Ok(Snapshot::All(initial))) = stream.next().await else {
        panic!("expected an initial records snapshot");
    };
    assert_eq!(initial.budgets.len(), 1);
    assert!(initial.budget_transactions.is_empty());

    engine
        .add_budget_transaction(
            "alice",
            BudgetTransactionDraft {
                budget_id: budget.id,
                amount: MoneyCents::new(1_500),
                kind: BudgetTransactionKind::Expense,
                category: None,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();

    let next = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("snapshot timed out");
    let Some(Ok(Snapshot::All(records))) = next else {
        panic!("expected a records snapshot");
    };
    assert_eq!(records.budget_transactions.len(), 1);
    assert_eq!(records.budgets[0].total_expenses, MoneyCents::new(1_500));
}

#[tokio::test]
async fn one_write_wakes_an_all_query_once() {
    let engine = engine().await;
    let goal = engine.new_goal("alice", goal_draft("Laptop")).await.unwrap();

    let mut sub = engine.subscribe("alice", Query::All);
    sub.next().await.unwrap().unwrap();

    engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(2_500),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();

    let snapshot = tokio::time::timeout(Duration::from_secs(2), sub.next())
        .await
        .expect("snapshot timed out")
        .expect("subscription closed")
        .unwrap();
    let Snapshot::All(records) = snapshot else {
        panic!("expected a records snapshot");
    };
    assert_eq!(records.transactions.len(), 1);
    assert_eq!(records.goals[0].current_amount, MoneyCents::new(2_500));

    let pending = tokio::time::timeout(Duration::from_millis(100), sub.next()).await;
    assert!(pending.is_err(), "a single write must yield a single snapshot");
}

#[tokio::test]
async fn subscription_outlives_the_engine_handle() {
    let engine = engine().await;
    engine.new_goal("alice", goal_draft("Kept")).await.unwrap();

    let mut sub = engine.subscribe("alice", Query::Goals);
    drop(engine);

    assert_eq!(next_goals(&mut sub).await, vec!["Kept"]);
}
