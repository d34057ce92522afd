use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, MoneyCents, NewWalletCmd, ResultEngine, Transaction,
    TransactionKind, Transfer, Wallet,
    util::{ensure_budget_currency, require_name},
};

use super::{
    Engine, Targets, categories::balance_correction_category, goals::reverse_goal_contributions,
    require_budget, require_wallet, with_tx,
};

/// Insert a synthetic correction transaction for `diff_minor` against a
/// wallet. The caller applies the wallet/budget deltas; goals are never
/// touched because goals cannot track the System category.
async fn insert_correction<C: ConnectionTrait>(
    db: &C,
    wallet_id: Uuid,
    diff_minor: i64,
    description: String,
) -> ResultEngine<Transaction> {
    let category = balance_correction_category(db).await?;
    let kind = if diff_minor > 0 {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };
    let transaction = Transaction::new(
        wallet_id,
        Some(category.id),
        kind,
        diff_minor.abs(),
        Some(description),
        Utc::now(),
    );
    let model: crate::transactions::ActiveModel = (&transaction).into();
    model.insert(db).await?;
    Ok(transaction)
}

impl Engine {
    /// Add a new wallet inside a budget.
    ///
    /// A non-zero `opening_balance_minor` is recorded as a correction
    /// transaction under the System category, so the wallet balance stays
    /// fully explained by its transaction history.
    pub async fn new_wallet(&self, cmd: NewWalletCmd) -> ResultEngine<Uuid> {
        let name = require_name(&cmd.name, "wallet")?;
        with_tx!(self, |db_tx| {
            let budget = require_budget(&db_tx, cmd.budget_id).await?;
            if let Some(currency) = cmd.currency {
                ensure_budget_currency(budget.currency, currency)?;
            }

            let exists = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::BudgetId.eq(cmd.budget_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "wallet '{name}' already exists in this budget"
                )));
            }

            let wallet = Wallet::new(
                name.clone(),
                budget.id,
                budget.currency,
                cmd.part_of_general_balance,
                cmd.kind,
            );
            let wallet_id = wallet.id;
            let model: crate::wallets::ActiveModel = (&wallet).into();
            model.insert(&db_tx).await?;

            if cmd.opening_balance_minor != 0 {
                let transaction = insert_correction(
                    &db_tx,
                    wallet_id,
                    cmd.opening_balance_minor,
                    format!("opening balance for wallet '{name}'"),
                )
                .await?;
                let mut targets = Targets::load(&db_tx, [wallet_id]).await?;
                targets.apply_regular(wallet_id, transaction.wallet_delta())?;
                targets.persist(&db_tx).await?;
            }

            Ok(wallet_id)
        })
    }

    /// Force a wallet balance to `target_balance_minor` by recording a
    /// correction transaction for the difference.
    ///
    /// Returns the correction's id, or `None` when the balance already
    /// matches.
    pub async fn correct_wallet_balance(
        &self,
        wallet_id: Uuid,
        target_balance_minor: i64,
    ) -> ResultEngine<Option<Uuid>> {
        with_tx!(self, |db_tx| {
            let mut targets = Targets::load(&db_tx, [wallet_id]).await?;
            let wallet = targets.wallet(wallet_id)?;
            if wallet.status != EntityStatus::Active {
                return Err(EngineError::InvalidArgument(format!(
                    "wallet '{}' is not active",
                    wallet.name
                )));
            }

            let diff_minor = target_balance_minor - wallet.balance_minor;
            if diff_minor == 0 {
                return Ok(None);
            }

            let transaction =
                insert_correction(&db_tx, wallet_id, diff_minor, "balance correction".to_string())
                    .await?;
            targets.apply_regular(wallet_id, transaction.wallet_delta())?;
            targets.persist(&db_tx).await?;

            tracing::debug!(
                wallet = %wallet_id,
                diff_minor,
                "recorded balance correction"
            );
            Ok(Some(transaction.id))
        })
    }

    /// Renames an existing wallet.
    pub async fn rename_wallet(&self, wallet_id: Uuid, new_name: &str) -> ResultEngine<()> {
        let new_name = require_name(new_name, "wallet")?;
        with_tx!(self, |db_tx| {
            let wallet = require_wallet(&db_tx, wallet_id).await?;

            let exists = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::BudgetId.eq(wallet.budget_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(crate::wallets::Column::Id.ne(wallet_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "wallet '{new_name}' already exists in this budget"
                )));
            }

            let active = crate::wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Archives/unarchives an existing wallet. Archived wallets refuse new
    /// transactions but keep their balances and history.
    pub async fn set_wallet_archived(&self, wallet_id: Uuid, archived: bool) -> ResultEngine<()> {
        let status = if archived {
            EntityStatus::Archived
        } else {
            EntityStatus::Active
        };
        with_tx!(self, |db_tx| {
            require_wallet(&db_tx, wallet_id).await?;
            let active = crate::wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Include or exclude a wallet from its budget's overall balance.
    ///
    /// Flipping the flag moves the wallet's whole current balance into or out
    /// of the budget aggregate in the same unit of work, so the aggregate
    /// stays consistent with the flag.
    pub async fn set_wallet_general_balance(
        &self,
        wallet_id: Uuid,
        part_of_general_balance: bool,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let wallet = require_wallet(&db_tx, wallet_id).await?;
            if wallet.part_of_general_balance == part_of_general_balance {
                return Ok(());
            }

            let budget = require_budget(&db_tx, wallet.budget_id).await?;
            let shift = if part_of_general_balance {
                wallet.balance_minor
            } else {
                -wallet.balance_minor
            };

            let active = crate::wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id.to_string()),
                part_of_general_balance: ActiveValue::Set(part_of_general_balance),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let active = crate::budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                overall_balance_minor: ActiveValue::Set(budget.overall_balance_minor + shift),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a wallet and everything that hangs off it, in one unit of
    /// work.
    ///
    /// The cascade reverses the wallet's goal contributions, undoes the far
    /// leg of every transfer the wallet took part in, removes the wallet's
    /// remaining flagged balance from the budget aggregate, then deletes the
    /// transaction, transfer and wallet rows.
    pub async fn delete_wallet(&self, wallet_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let wallet = require_wallet(&db_tx, wallet_id).await?;
            self.cascade_delete_wallet(&db_tx, &wallet).await?;
            Ok(())
        })
    }

    /// Wallet cascade body, shared with the budget cascade.
    pub(crate) async fn cascade_delete_wallet<C: ConnectionTrait>(
        &self,
        db: &C,
        wallet: &Wallet,
    ) -> ResultEngine<()> {
        let id_string = wallet.id.to_string();

        let transaction_models = crate::transactions::Entity::find()
            .filter(crate::transactions::Column::WalletId.eq(id_string.clone()))
            .all(db)
            .await?;
        let transactions: Vec<Transaction> = transaction_models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<_>>()?;

        let transfer_models = crate::transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(crate::transfers::Column::SourceWalletId.eq(id_string.clone()))
                    .add(crate::transfers::Column::TargetWalletId.eq(id_string.clone())),
            )
            .all(db)
            .await?;
        let transfers: Vec<Transfer> = transfer_models
            .into_iter()
            .map(Transfer::try_from)
            .collect::<ResultEngine<_>>()?;

        reverse_goal_contributions(db, &transactions).await?;

        // Undo the far leg of each transfer; the near leg dies with the
        // wallet. `near_leg_reversal` nets the transfer legs back out of the
        // wallet's balance so the budget adjustment below only removes what
        // regular transactions contributed.
        let counterparties: Vec<Uuid> = transfers
            .iter()
            .map(|transfer| {
                if transfer.source_wallet_id == wallet.id {
                    transfer.target_wallet_id
                } else {
                    transfer.source_wallet_id
                }
            })
            .filter(|id| *id != wallet.id)
            .collect();
        let mut targets = Targets::load(db, counterparties).await?;
        let mut near_leg_reversal = 0i64;
        for transfer in &transfers {
            let amount = MoneyCents::new(transfer.amount_minor);
            if transfer.source_wallet_id == wallet.id {
                targets.apply_transfer_leg(transfer.target_wallet_id, -amount)?;
                near_leg_reversal += transfer.amount_minor;
            } else {
                targets.apply_transfer_leg(transfer.source_wallet_id, amount)?;
                near_leg_reversal -= transfer.amount_minor;
            }
        }

        // Transfers never touched the budget aggregate, so the wallet's
        // contribution to it is its balance with the transfer legs undone.
        let contribution_minor = wallet.balance_minor + near_leg_reversal;
        if wallet.part_of_general_balance && contribution_minor != 0 {
            targets.ensure_budget(db, wallet.budget_id).await?;
            targets.apply_budget_delta(wallet.budget_id, MoneyCents::new(-contribution_minor))?;
        }

        crate::transfers::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(crate::transfers::Column::SourceWalletId.eq(id_string.clone()))
                    .add(crate::transfers::Column::TargetWalletId.eq(id_string.clone())),
            )
            .exec(db)
            .await?;
        crate::transactions::Entity::delete_many()
            .filter(crate::transactions::Column::WalletId.eq(id_string.clone()))
            .exec(db)
            .await?;
        crate::wallets::Entity::delete_by_id(id_string)
            .exec(db)
            .await?;
        targets.persist(db).await?;

        tracing::info!(
            wallet = %wallet.id,
            transactions = transactions.len(),
            transfers = transfers.len(),
            "cascade deleted wallet"
        );
        Ok(())
    }

    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, wallet_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| { require_wallet(&db_tx, wallet_id).await })
    }
}
