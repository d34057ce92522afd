use chrono::Utc;
use sea_orm::Database;
use uuid::Uuid;

use engine::{Currency, Engine, EngineError, NewWalletCmd, TransferCmd, UpdateTransferCmd};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn new_budget(engine: &Engine, name: &str) -> Uuid {
    engine.new_budget(name, Some(Currency::Eur)).await.unwrap()
}

#[tokio::test]
async fn transfer_is_zero_sum_and_never_touches_the_budget() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let savings_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Savings").opening_balance_minor(50_000))
        .await
        .unwrap();
    let travel_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Travel").part_of_general_balance(false))
        .await
        .unwrap();
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        50_000
    );

    engine
        .new_transfer(TransferCmd::new(savings_id, travel_id, 50_000, Utc::now()))
        .await
        .unwrap();

    assert_eq!(engine.wallet(savings_id).await.unwrap().balance_minor, 0);
    assert_eq!(engine.wallet(travel_id).await.unwrap().balance_minor, 50_000);
    // The money moved between wallets; it was neither earned nor spent.
    assert_eq!(
        engine.budget(budget_id).await.unwrap().overall_balance_minor,
        50_000
    );
}

#[tokio::test]
async fn deleting_a_transfer_reverses_both_legs() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(30_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();

    let transfer_id = engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 12_000, Utc::now()))
        .await
        .unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 18_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 12_000);

    engine.delete_transfer(transfer_id).await.unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 30_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 0);
    assert!(matches!(
        engine.transfer(transfer_id).await.unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[tokio::test]
async fn updating_a_transfer_retargets_and_resizes_the_legs() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(20_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();
    let vault_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Vault"))
        .await
        .unwrap();

    let transfer_id = engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 4_000, Utc::now()))
        .await
        .unwrap();

    // Resize, then point the receiving leg at a different wallet.
    engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).amount_minor(6_000))
        .await
        .unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 14_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 6_000);

    engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).target_wallet_id(vault_id))
        .await
        .unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 14_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 0);
    assert_eq!(engine.wallet(vault_id).await.unwrap().balance_minor, 6_000);
}

#[tokio::test]
async fn updating_a_transfer_rejects_a_retargeted_archived_wallet() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(10_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();
    let frozen_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Frozen"))
        .await
        .unwrap();
    engine.set_wallet_archived(frozen_id, true).await.unwrap();

    let transfer_id = engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 2_000, Utc::now()))
        .await
        .unwrap();

    let err = engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).target_wallet_id(frozen_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    let err = engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).source_wallet_id(frozen_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    // Rejected updates leave every balance where it was.
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 8_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 2_000);
    assert_eq!(engine.wallet(frozen_id).await.unwrap().balance_minor, 0);

    // Resizing the stored legs does not retarget anything, so it still works
    // even after one side is archived.
    engine.set_wallet_archived(bank_id, true).await.unwrap();
    engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).amount_minor(3_000))
        .await
        .unwrap();
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 7_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 3_000);
}

#[tokio::test]
async fn updating_a_transfer_revalidates_the_wallet_pair() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let other_budget_id = new_budget(&engine, "Holidays").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(10_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank"))
        .await
        .unwrap();
    let foreign_id = engine
        .new_wallet(NewWalletCmd::new(other_budget_id, "Cash"))
        .await
        .unwrap();

    let transfer_id = engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 2_000, Utc::now()))
        .await
        .unwrap();

    // Collapsing the pair onto one wallet.
    let err = engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).target_wallet_id(cash_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    // Retargeting across budgets.
    let err = engine
        .update_transfer(UpdateTransferCmd::new(transfer_id).target_wallet_id(foreign_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 8_000);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 2_000);
    assert_eq!(engine.wallet(foreign_id).await.unwrap().balance_minor, 0);
}

#[tokio::test]
async fn transfer_requires_two_distinct_wallets_in_one_budget() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let other_budget_id = new_budget(&engine, "Holidays").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(10_000))
        .await
        .unwrap();
    let foreign_id = engine
        .new_wallet(NewWalletCmd::new(other_budget_id, "Cash"))
        .await
        .unwrap();

    let err = engine
        .new_transfer(TransferCmd::new(cash_id, cash_id, 1_000, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let err = engine
        .new_transfer(TransferCmd::new(cash_id, foreign_id, 1_000, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let err = engine
        .new_transfer(TransferCmd::new(cash_id, foreign_id, 0, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn wallet_transfers_lists_both_directions() {
    let engine = engine_with_db().await;
    let budget_id = new_budget(&engine, "Main").await;
    let cash_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Cash").opening_balance_minor(10_000))
        .await
        .unwrap();
    let bank_id = engine
        .new_wallet(NewWalletCmd::new(budget_id, "Bank").opening_balance_minor(10_000))
        .await
        .unwrap();

    engine
        .new_transfer(TransferCmd::new(cash_id, bank_id, 1_000, Utc::now()).description("to bank"))
        .await
        .unwrap();
    engine
        .new_transfer(TransferCmd::new(bank_id, cash_id, 500, Utc::now()))
        .await
        .unwrap();

    let transfers = engine.wallet_transfers(cash_id).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(engine.wallet(cash_id).await.unwrap().balance_minor, 9_500);
    assert_eq!(engine.wallet(bank_id).await.unwrap().balance_minor, 10_500);
}
