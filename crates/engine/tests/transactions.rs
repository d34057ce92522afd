use chrono::{TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    CategoryKind, Currency, Engine, EngineError, NewTransactionCmd, NewWalletCmd, TransactionKind,
    UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn budget_with_wallet(engine: &Engine, opening_minor: i64) -> (Uuid, Uuid) {
    let budget_id = engine
        .new_budget("Main", Some(Currency::Eur))
        .await
        .unwrap();
    let wallet_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(opening_minor))
        .await
        .unwrap();
    (budget_id, wallet_id)
}

#[tokio::test]
async fn income_and_expense_move_wallet_and_budget() {
    let engine = engine_with_db().await;
    let (budget_id, wallet_id) = budget_with_wallet(&engine, 0).await;

    engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Income,
            10_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Expense,
            2_500,
            Utc::now(),
        ))
        .await
        .unwrap();

    let wallet = engine.wallet(wallet_id).await.unwrap();
    assert_eq!(wallet.balance_minor, 7_500);
    let budget = engine.budget(budget_id).await.unwrap();
    assert_eq!(budget.overall_balance_minor, 7_500);
}

#[tokio::test]
async fn expense_update_and_delete_reconcile_exactly() {
    let engine = engine_with_db().await;
    let (budget_id, wallet_id) = budget_with_wallet(&engine, 20_000).await;

    let transaction_id = engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Expense,
            5_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 15_000);

    engine
        .update_transaction(UpdateTransactionCmd::new(transaction_id).amount_minor(8_000))
        .await
        .unwrap();
    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 12_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        12_000
    );

    engine.delete_transaction(transaction_id).await.unwrap();
    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 20_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        20_000
    );
}

#[tokio::test]
async fn unflagged_wallet_leaves_budget_untouched() {
    let engine = engine_with_db().await;
    let budget_id = engine
        .new_budget("Main", Some(Currency::Eur))
        .await
        .unwrap();
    let wallet_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Side").part_of_general_balance(false))
        .await
        .unwrap();

    engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Income,
            4_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 4_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        0
    );
}

#[tokio::test]
async fn transaction_kind_is_immutable() {
    let engine = engine_with_db().await;
    let (_, wallet_id) = budget_with_wallet(&engine, 0).await;

    let transaction_id = engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Income,
            1_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(transaction_id).kind(TransactionKind::Expense))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    // Restating the stored kind is a no-op, not an error.
    engine
        .update_transaction(
            UpdateTransactionCmd::new(transaction_id)
                .kind(TransactionKind::Income)
                .amount_minor(1_500),
        )
        .await
        .unwrap();
    assert_eq!(
        engine.transaction(transaction_id).await.unwrap().amount_minor,
        1_500
    );
}

#[tokio::test]
async fn category_kind_must_match_transaction_kind() {
    let engine = engine_with_db().await;
    let (_, wallet_id) = budget_with_wallet(&engine, 0).await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();

    let err = engine
        .new_transaction(
            NewTransactionCmd::new(wallet_id, TransactionKind::Income, 1_000, Utc::now())
                .category_id(groceries),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    engine
        .new_transaction(
            NewTransactionCmd::new(wallet_id, TransactionKind::Expense, 1_000, Utc::now())
                .category_id(groceries),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let engine = engine_with_db().await;
    let (_, wallet_id) = budget_with_wallet(&engine, 0).await;

    for amount in [0, -100] {
        let err = engine
            .new_transaction(NewTransactionCmd::new(
                wallet_id,
                TransactionKind::Expense,
                amount,
                Utc::now(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}

#[tokio::test]
async fn moving_a_transaction_between_wallets_shifts_both_balances() {
    let engine = engine_with_db().await;
    let (budget_id, cash_id) = budget_with_wallet(&engine, 0).await;
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();

    let occurred_at = Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap();
    let transaction_id = engine
        .new_transaction(NewTransactionCmd::new(
            cash_id,
            TransactionKind::Expense,
            3_000,
            occurred_at,
        ))
        .await
        .unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, -3_000);

    engine
        .update_transaction(UpdateTransactionCmd::new(transaction_id).wallet_id(bank_id))
        .await
        .unwrap();

    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 0);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, -3_000);
    // Both wallets are flagged, so the budget aggregate nets out unchanged.
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        -3_000
    );
}

#[tokio::test]
async fn correct_wallet_balance_records_a_system_transaction() {
    let engine = engine_with_db().await;
    let (budget_id, wallet_id) = budget_with_wallet(&engine, 0).await;

    let correction_id = engine
        .correct_wallet_balance(wallet_id, 12_345)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 12_345);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        12_345
    );

    let correction = engine.transaction(correction_id).await.unwrap();
    assert_eq!(correction.kind, TransactionKind::Income);
    assert_eq!(correction.amount_minor, 12_345);
    let category = engine
        .category(correction.category_id.unwrap())
        .await
        .unwrap();
    assert_eq!(category.kind, CategoryKind::System);
    assert_eq!(category.name, engine::BALANCE_CORRECTION_NAME);

    // Already at the target: nothing to record.
    assert_eq!(
        engine.correct_wallet_balance(wallet_id, 12_345).await.unwrap(),
        None
    );

    // Correcting downwards goes through an expense.
    let downward_id = engine
        .correct_wallet_balance(wallet_id, 10_000)
        .await
        .unwrap()
        .unwrap();
    let downward = engine.transaction(downward_id).await.unwrap();
    assert_eq!(downward.kind, TransactionKind::Expense);
    assert_eq!(downward.amount_minor, 2_345);
    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 10_000);
}

#[tokio::test]
async fn archived_wallets_refuse_new_transactions() {
    let engine = engine_with_db().await;
    let (_, wallet_id) = budget_with_wallet(&engine, 5_000).await;

    engine.set_wallet_archived(wallet_id, true).await.unwrap();
    let err = engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Expense,
            1_000,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    engine.set_wallet_archived(wallet_id, false).await.unwrap();
    engine
        .new_transaction(NewTransactionCmd::new(
            wallet_id,
            TransactionKind::Expense,
            1_000,
            Utc::now(),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_then_recreating_an_identical_transaction_restores_aggregates() {
    let engine = engine_with_db().await;
    let (budget_id, wallet_id) = budget_with_wallet(&engine, 20_000).await;
    let groceries = engine
        .new_category("Groceries", CategoryKind::Expense, None)
        .await
        .unwrap();

    let occurred_at = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
    let transaction_id = engine
        .new_transaction(
            NewTransactionCmd::new(wallet_id, TransactionKind::Expense, 6_000, occurred_at)
                .category_id(groceries),
        )
        .await
        .unwrap();
    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 14_000);

    engine.delete_transaction(transaction_id).await.unwrap();
    engine
        .new_transaction(
            NewTransactionCmd::new(wallet_id, TransactionKind::Expense, 6_000, occurred_at)
                .category_id(groceries),
        )
        .await
        .unwrap();

    assert_eq!(engine.wallet(wallet_id).await.unwrap().balance_minor, 14_000);
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        14_000
    );
}

#[tokio::test]
async fn general_balance_flag_flip_moves_the_whole_balance() {
    let engine = engine_with_db().await;
    let (budget_id, wallet_id) = budget_with_wallet(&engine, 9_000).await;
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        9_000
    );

    engine
        .set_wallet_general_balance(wallet_id, false)
        .await
        .unwrap();
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        0
    );

    engine
        .set_wallet_general_balance(wallet_id, true)
        .await
        .unwrap();
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        9_000
    );
}
