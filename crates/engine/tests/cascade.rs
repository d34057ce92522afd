use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    CategoryKind, Currency, Engine, EngineError, NewGoalCmd, NewTransactionCmd, NewWalletCmd,
    TransactionKind, TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn march(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn deleting_a_wallet_reverses_goals_transfers_and_budget() {
    let engine = engine_with_db().await;
    let budget_id = engine
        .new_budget("Main", Some(Currency::Eur))
        .await
        .unwrap();
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(10_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();
    let groceries_id = engine
        .new_category("Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();
    let goal_id = engine
        .new_goal(
            NewGoalCmd::new(
                "March groceries",
                TransactionKind::Expense,
                40_000,
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            )
            .category_ids(vec![groceries_id]),
        )
        .await
        .unwrap();

    engine
        .new_transaction(
            NewTransactionCmd::new(cash_id, TransactionKind::Expense, 4_000, march(10))
                .category_id(groceries_id),
        )
        .await
        .unwrap();
    engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 1_000, march(11)))
        .await
        .unwrap();

    // Cash: 10_000 - 4_000 - 1_000; Bank: 1_000; overall: 6_000; goal: 4_000.
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 5_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 1_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        6_000
    );
    assert_eq!(engine.goal(goal_id).await.unwrap().actual_amount_minor, 4_000);

    engine.delete_wallet(cash_id).await.unwrap();

    assert!(matches!(
        engine.wallet(cash_id).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    // The transfer's far leg is undone.
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 0);
    // The wallet's regular-transaction contribution leaves the aggregate.
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        0
    );
    // The goal no longer counts the deleted expense.
    assert_eq!(engine.goal(goal_id).await.unwrap().actual_amount_minor, 0);
    // The wallet's history is gone with it.
    assert!(engine.wallet_transactions(bank_id).await.unwrap().is_empty());
    assert!(engine.wallet_transfers(bank_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_unflagged_wallet_leaves_the_budget_alone() {
    let engine = engine_with_db().await;
    let budget_id = engine
        .new_budget("Main", Some(Currency::Eur))
        .await
        .unwrap();
    let main_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Main").opening_balance_minor(7_000))
        .await
        .unwrap();
    let side_id = engine
        .new_wallet(
            NewWalletCmd::new(budget_id, "Side")
                .part_of_general_balance(false)
                .opening_balance_minor(3_000),
        )
        .await
        .unwrap();

    engine.delete_wallet(side_id).await.unwrap();

    assert_eq!(engine.wallet(main_id).await.unwrap().balance_minor, 7_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        7_000
    );
}

#[tokio::test]
async fn deleting_a_budget_removes_its_wallets_and_their_goal_contributions() {
    let engine = engine_with_db().await;
    let doomed_id = engine
        .new_budget("Doomed", Some(Currency::Eur))
        .await
        .unwrap();
    let survivor_id = engine
        .new_budget("Survivor", Some(Currency::Eur))
        .await
        .unwrap();

    let doomed_cash = engine
        .new_wallet(NewWalletCmd::new(doomed_id, "Cash").opening_balance_minor(20_000))
        .await
        .unwrap();
    let doomed_bank = engine
        .new_wallet(NewWalletCmd::new(doomed_id, "Bank"))
        .await
        .unwrap();
    let survivor_cash = engine
        .new_wallet(NewWalletCmd::new(survivor_id, "Cash").opening_balance_minor(5_000))
        .await
        .unwrap();

    let groceries_id = engine
        .new_category("Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();
    let goal_id = engine
        .new_goal(
            NewGoalCmd::new(
                "March groceries",
                TransactionKind::Expense,
                40_000,
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            )
            .category_ids(vec![groceries_id]),
        )
        .await
        .unwrap();

    engine
        .new_transaction(
            NewTransactionCmd::new(doomed_cash, TransactionKind::Expense, 2_000, march(5))
                .category_id(groceries_id),
        )
        .await
        .unwrap();
    engine
        .new_transaction(
            NewTransactionCmd::new(survivor_cash, TransactionKind::Expense, 1_000, march(6))
                .category_id(groceries_id),
        )
        .await
        .unwrap();
    engine
        .new_transfer(TransferCmd::new(doomed_cash, doomed_bank, 500, march(7)))
        .await
        .unwrap();
    assert_eq!(engine.goal(goal_id).await.unwrap().actual_amount_minor, 3_000);

    engine.delete_budget(doomed_id).await.unwrap();

    assert!(matches!(
        engine.budget(doomed_id).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(matches!(
        engine.wallet(doomed_cash).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
    assert!(matches!(
        engine.wallet(doomed_bank).await.unwrap_err(),
        EngineError::NotFound(_)
    ));

    // Only the surviving budget's contribution remains on the goal.
    assert_eq!(engine.goal(goal_id).await.unwrap().actual_amount_minor, 1_000);
    assert_eq!(
        engine.wallet(survivor_cash).await.unwrap().balance_minor,
        4_000
    );
    assert_eq!(
        engine
            .budget(survivor_id)
            .await
            .unwrap()
            .overall_balance_minor,
        4_000
    );
}

#[tokio::test]
async fn category_delete_rules_hold_for_system_and_parents() {
    let engine = engine_with_db().await;
    let budget_id = engine
        .new_budget("Main", Some(Currency::Eur))
        .await
        .unwrap();
    let wallet_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash"))
        .await
        .unwrap();

    // Force the System category into existence.
    engine.correct_wallet_balance(wallet_id, 100).await.unwrap();
    let system_id = engine
        .categories()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.kind == CategoryKind::System)
        .unwrap()
        .id;
    assert!(matches!(
        engine.delete_category(system_id).await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));

    let food_id = engine
        .new_category("Food", CategoryKind::Expense, None)
        .await
        .unwrap();
    let snacks_id = engine
        .new_category("Snacks", CategoryKind::Expense, Some(food_id))
        .await
        .unwrap();
    assert!(matches!(
        engine.delete_category(food_id).await.unwrap_err(),
        EngineError::Conflict(_)
    ));

    engine.delete_category(snacks_id).await.unwrap();
    engine.delete_category(food_id).await.unwrap();
}
