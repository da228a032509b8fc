use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BudgetDraft, BudgetPatch, BudgetTransactionDraft, BudgetTransactionKind, Engine, EngineError,
    GoalDraft, GoalPatch, GoalTransactionDraft, GoalTransactionKind, MoneyCents,
    aggregate::{self, BudgetTier, HistoryTab, history},
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine.create_user("alice", "password", Some("Alice")).await.unwrap();
    engine.create_user("bob", "hunter2", None).await.unwrap();
    (engine, db)
}

fn goal_draft(name: &str, target: i64, current: i64) -> GoalDraft {
    GoalDraft {
        name: name.to_string(),
        target_amount: MoneyCents::new(target),
        current_amount: MoneyCents::new(current),
        deadline: Utc::now() + Duration::days(60),
        category: None,
        description: None,
    }
}

fn budget_draft(name: &str, total: i64) -> BudgetDraft {
    BudgetDraft {
        name: name.to_string(),
        total_budget: MoneyCents::new(total),
        period: NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
    }
}

#[tokio::test]
async fn new_goal_normalizes_and_defaults() {
    let (engine, _db) = engine_with_db().await;

    let mut draft = goal_draft("  Laptop  ", 50_000_00, 0);
    draft.description = Some("   ".to_string());
    let goal = engine.new_goal("alice", draft).await.unwrap();

    assert_eq!(goal.name, "Laptop");
    assert_eq!(goal.category, "Emergency Fund");
    assert_eq!(goal.description, None);

    let stored = engine.goal("alice", goal.id).await.unwrap();
    assert_eq!(stored.id, goal.id);
    assert_eq!(stored.target_amount, MoneyCents::new(50_000_00));
}

#[tokio::test]
async fn new_goal_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.new_goal("alice", goal_draft(" ", 100, 0)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine.new_goal("alice", goal_draft("Car", 0, 0)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine.new_goal("alice", goal_draft("Car", 100, -1)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn goals_are_scoped_per_user() {
    let (engine, _db) = engine_with_db().await;

    let goal = engine.new_goal("alice", goal_draft("Vacation", 1_000, 0)).await.unwrap();
    engine.new_goal("bob", goal_draft("Car", 1_000, 0)).await.unwrap();

    let alice_goals = engine.goals("alice").await.unwrap();
    assert_eq!(alice_goals.len(), 1);
    assert_eq!(alice_goals[0].name, "Vacation");

    let err = engine.goal("bob", goal.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("goal not exists".to_string()));

    let err = engine.delete_goal("bob", goal.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn goals_are_listed_newest_first() {
    let (engine, _db) = engine_with_db().await;

    engine.new_goal("alice", goal_draft("First", 1_000, 0)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    engine.new_goal("alice", goal_draft("Second", 1_000, 0)).await.unwrap();

    let names: Vec<_> = engine
        .goals("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn update_goal_patches_only_given_fields() {
    let (engine, _db) = engine_with_db().await;

    let mut draft = goal_draft("House", 1_000_000, 10_000);
    draft.description = Some("down payment".to_string());
    let goal = engine.new_goal("alice", draft).await.unwrap();

    let updated = engine
        .update_goal(
            "alice",
            goal.id,
            GoalPatch {
                target_amount: Some(MoneyCents::new(2_000_000)),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "House");
    assert_eq!(updated.target_amount, MoneyCents::new(2_000_000));
    assert_eq!(updated.current_amount, MoneyCents::new(10_000));
    assert_eq!(updated.description, None);
    assert!(updated.updated_at >= goal.updated_at);

    let stored = engine.goal("alice", goal.id).await.unwrap();
    assert_eq!(stored.target_amount, updated.target_amount);
    assert_eq!(stored.description, None);

    let err = engine
        .update_goal("alice", goal.id, GoalPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn deposit_and_withdrawal_move_current_amount() {
    let (engine, _db) = engine_with_db().await;
    let goal = engine.new_goal("alice", goal_draft("Phone", 20_000, 1_000)).await.unwrap();

    let deposit = engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(5_000),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert_eq!(deposit.description, "deposit to Phone");
    assert_eq!(
        engine.goal("alice", goal.id).await.unwrap().current_amount,
        MoneyCents::new(6_000)
    );

    // Larger than the balance: floored at zero, amount recorded as given.
    let withdrawal = engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(9_000),
                kind: GoalTransactionKind::Withdrawal,
                description: Some("repair".to_string()),
                date: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert_eq!(withdrawal.amount, MoneyCents::new(9_000));
    assert_eq!(withdrawal.description, "repair");
    assert_eq!(
        engine.goal("alice", goal.id).await.unwrap().current_amount,
        MoneyCents::ZERO
    );
}

#[tokio::test]
async fn transaction_needs_existing_goal_and_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let goal = engine.new_goal("alice", goal_draft("Bike", 10_000, 0)).await.unwrap();

    let err = engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: Uuid::new_v4(),
                amount: MoneyCents::new(100),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::ZERO,
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Nothing was written by the failed attempts.
    assert!(engine.transactions("alice", None).await.unwrap().is_empty());
    assert_eq!(
        engine.goal("alice", goal.id).await.unwrap().current_amount,
        MoneyCents::ZERO
    );
}

#[tokio::test]
async fn overflowing_deposit_is_rolled_back() {
    let (engine, _db) = engine_with_db().await;
    let goal = engine
        .new_goal("alice", goal_draft("Nest egg", 1, i64::MAX - 5))
        .await
        .unwrap();

    let err = engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(10),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert!(engine.transactions("alice", None).await.unwrap().is_empty());
    assert_eq!(
        engine.goal("alice", goal.id).await.unwrap().current_amount,
        MoneyCents::new(i64::MAX - 5)
    );
}

#[tokio::test]
async fn overflowing_expense_is_rolled_back() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();
    let huge = i64::MAX / 2 + 10;

    let expense = |amount: i64| BudgetTransactionDraft {
        budget_id: budget.id,
        amount: MoneyCents::new(amount),
        kind: BudgetTransactionKind::Expense,
        category: None,
        description: None,
        date: Utc::now(),
    };

    engine.add_budget_transaction("alice", expense(huge)).await.unwrap();
    let err = engine
        .add_budget_transaction("alice", expense(huge))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(engine.budget_transactions("alice", Some(budget.id)).await.unwrap().len(), 1);
    assert_eq!(
        engine.budget("alice", budget.id).await.unwrap().total_expenses,
        MoneyCents::new(huge)
    );
}

#[tokio::test]
async fn transactions_filter_by_goal_and_sort_by_date() {
    let (engine, _db) = engine_with_db().await;
    let a = engine.new_goal("alice", goal_draft("A", 10_000, 0)).await.unwrap();
    let b = engine.new_goal("alice", goal_draft("B", 10_000, 0)).await.unwrap();

    for (goal_id, day) in [(a.id, 3), (b.id, 5), (a.id, 9)] {
        engine
            .add_transaction(
                "alice",
                GoalTransactionDraft {
                    goal_id,
                    amount: MoneyCents::new(100),
                    kind: GoalTransactionKind::Deposit,
                    description: None,
                    date: Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap(),
                },
            )
            .await
            .unwrap();
    }

    let all = engine.transactions("alice", None).await.unwrap();
    let days: Vec<_> = all.iter().map(|t| t.date.format("%d").to_string()).collect();
    assert_eq!(days, vec!["09", "05", "03"]);

    let only_a = engine.transactions("alice", Some(a.id)).await.unwrap();
    assert_eq!(only_a.len(), 2);
    assert!(only_a.iter().all(|t| t.goal_id == a.id));

    assert!(engine.transactions("bob", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_goal_keeps_its_transactions() {
    let (engine, _db) = engine_with_db().await;
    let goal = engine.new_goal("alice", goal_draft("Gift", 5_000, 0)).await.unwrap();
    engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(500),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();

    engine.delete_goal("alice", goal.id).await.unwrap();

    let records = engine.records("alice").await.unwrap();
    assert!(records.goals.is_empty());
    assert_eq!(records.transactions.len(), 1);

    let feed = history::merged_feed(&records.transactions, &records.budget_transactions);
    assert_eq!(
        history::parent_label(&feed[0].parent, &records.goals, &records.budgets),
        history::UNKNOWN_GOAL
    );
}

#[tokio::test]
async fn budget_period_is_first_of_month() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("January", 5_000)).await.unwrap();

    assert_eq!(budget.period, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(budget.total_income, MoneyCents::ZERO);
    assert_eq!(budget.total_expenses, MoneyCents::ZERO);

    let err = engine
        .new_budget("alice", budget_draft("Broken", -1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn expense_updates_accumulator_and_tier() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();

    let expense = engine
        .add_budget_transaction(
            "alice",
            BudgetTransactionDraft {
                budget_id: budget.id,
                amount: MoneyCents::new(1_500),
                kind: BudgetTransactionKind::Expense,
                category: Some("Food".to_string()),
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert_eq!(expense.description, "expense transaction");
    assert_eq!(expense.category.as_deref(), Some("Food"));

    let budget = engine.budget("alice", budget.id).await.unwrap();
    assert_eq!(budget.total_expenses, MoneyCents::new(1_500));
    assert_eq!(budget.total_income, MoneyCents::ZERO);

    let summary = aggregate::budgets::summarize(&budget);
    assert_eq!(summary.remaining, MoneyCents::new(3_500));
    assert_eq!(summary.tier, BudgetTier::Nominal);
}

#[tokio::test]
async fn income_drops_category_and_bumps_income() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();

    let income = engine
        .add_budget_transaction(
            "alice",
            BudgetTransactionDraft {
                budget_id: budget.id,
                amount: MoneyCents::new(800),
                kind: BudgetTransactionKind::Income,
                category: Some("Food".to_string()),
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();
    assert_eq!(income.category, None);
    assert_eq!(income.description, "income transaction");
    assert_eq!(
        engine.budget("alice", budget.id).await.unwrap().total_income,
        MoneyCents::new(800)
    );
}

#[tokio::test]
async fn update_budget_never_touches_totals() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();
    engine
        .add_budget_transaction(
            "alice",
            BudgetTransactionDraft {
                budget_id: budget.id,
                amount: MoneyCents::new(1_000),
                kind: BudgetTransactionKind::Expense,
                category: None,
                description: None,
                date: Utc::now(),
            },
        )
        .await
        .unwrap();

    let updated = engine
        .update_budget(
            "alice",
            budget.id,
            BudgetPatch {
                name: Some("February".to_string()),
                total_budget: Some(MoneyCents::new(1_000)),
                period: Some(NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "February");
    assert_eq!(updated.period, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert_eq!(updated.total_expenses, MoneyCents::new(1_000));
    assert_eq!(aggregate::budgets::percent_used(&updated), 100.0);
}

#[tokio::test]
async fn reconcile_is_a_no_op_without_drift() {
    let (engine, _db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();
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

    let before = engine.budget("alice", budget.id).await.unwrap();
    let after = engine.reconcile_budget("alice", budget.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn reconcile_restores_ledger_sums_after_drift() {
    let (engine, db) = engine_with_db().await;
    let budget = engine.new_budget("alice", budget_draft("Monthly", 5_000)).await.unwrap();
    for (kind, amount) in [
        (BudgetTransactionKind::Expense, 1_200),
        (BudgetTransactionKind::Income, 300),
        (BudgetTransactionKind::Expense, 800),
    ] {
        engine
            .add_budget_transaction(
                "alice",
                BudgetTransactionDraft {
                    budget_id: budget.id,
                    amount: MoneyCents::new(amount),
                    kind,
                    category: None,
                    description: None,
                    date: Utc::now(),
                },
            )
            .await
            .unwrap();
    }

    // Simulate a ledger row removed behind the accumulator's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM budget_transactions WHERE amount_minor = ?",
        vec![800_i64.into()],
    ))
    .await
    .unwrap();
    assert_eq!(
        engine.budget("alice", budget.id).await.unwrap().total_expenses,
        MoneyCents::new(2_000)
    );

    let reconciled = engine.reconcile_budget("alice", budget.id).await.unwrap();
    assert_eq!(reconciled.total_expenses, MoneyCents::new(1_200));
    assert_eq!(reconciled.total_income, MoneyCents::new(300));
    let stored = engine.budget("alice", budget.id).await.unwrap();
    assert_eq!(stored.total_expenses, reconciled.total_expenses);
    assert_eq!(stored.total_income, reconciled.total_income);
}

#[tokio::test]
async fn merged_history_across_collections() {
    let (engine, _db) = engine_with_db().await;
    let goal = engine.new_goal("alice", goal_draft("Laptop", 100_000, 0)).await.unwrap();
    let budget = engine.new_budget("alice", budget_draft("January", 5_000)).await.unwrap();

    engine
        .add_transaction(
            "alice",
            GoalTransactionDraft {
                goal_id: goal.id,
                amount: MoneyCents::new(1_000),
                kind: GoalTransactionKind::Deposit,
                description: None,
                date: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();
    engine
        .add_budget_transaction(
            "alice",
            BudgetTransactionDraft {
                budget_id: budget.id,
                amount: MoneyCents::new(400),
                kind: BudgetTransactionKind::Expense,
                category: None,
                description: None,
                date: Utc.with_ymd_and_hms(2024, 1, 12, 12, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();

    let records = engine.records("alice").await.unwrap();
    let feed = history::merged_feed(&records.transactions, &records.budget_transactions);

    let all = history::filter(&feed, HistoryTab::All);
    assert_eq!(all[0].kind, aggregate::EntryKind::Expense);
    assert_eq!(all[1].kind, aggregate::EntryKind::Deposit);
    assert_eq!(history::filter(&feed, HistoryTab::Budget).len(), 1);
    assert_eq!(
        history::parent_label(&all[0].parent, &records.goals, &records.budgets),
        "January"
    );
}

#[tokio::test]
async fn sessions_sign_in_and_out() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.sign_in("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let token = engine.sign_in("alice", "password").await.unwrap();
    let user = engine.identity(&token).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.display_name.as_deref(), Some("Alice"));

    engine.sign_out(&token).await.unwrap();
    assert!(matches!(
        engine.identity(&token).await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));
    assert!(matches!(
        engine.sign_out(&token).await.unwrap_err(),
        EngineError::Unauthorized(_)
    ));
}

#[tokio::test]
async fn duplicate_user_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.create_user("alice", "other", None).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
}
