use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, NewTransactionCmd, ResultEngine, Transaction, TransactionKind,
    UpdateTransactionCmd,
    util::{normalize_optional_text, require_positive_amount},
};

use super::{
    Engine, Targets, goals::adjust_goals, require_category, require_transaction, with_tx,
};

/// Reject categories whose kind does not fit the transaction kind.
async fn check_category<C: sea_orm::ConnectionTrait>(
    db: &C,
    category_id: Uuid,
    kind: TransactionKind,
) -> ResultEngine<()> {
    let category = require_category(db, category_id).await?;
    if !category.kind.accepts(kind) {
        return Err(EngineError::InvalidArgument(format!(
            "category '{}' is {} but the transaction is {}",
            category.name,
            category.kind.as_str(),
            kind.as_str()
        )));
    }
    Ok(())
}

impl Engine {
    /// Record an income or expense against a wallet.
    ///
    /// The wallet balance, the owning budget's overall balance (when the
    /// wallet is flagged) and every matching goal move together, atomically.
    pub async fn new_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Uuid> {
        let amount_minor = require_positive_amount(cmd.amount_minor)?;
        with_tx!(self, |db_tx| {
            let mut targets = Targets::load(&db_tx, [cmd.wallet_id]).await?;
            let wallet = targets.wallet(cmd.wallet_id)?;
            if wallet.status != EntityStatus::Active {
                return Err(EngineError::InvalidArgument(format!(
                    "wallet '{}' is not active",
                    wallet.name
                )));
            }
            if let Some(category_id) = cmd.category_id {
                check_category(&db_tx, category_id, cmd.kind).await?;
            }

            let transaction = Transaction::new(
                cmd.wallet_id,
                cmd.category_id,
                cmd.kind,
                amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                cmd.occurred_at,
            );
            let transaction_id = transaction.id;

            targets.apply_regular(transaction.wallet_id, transaction.wallet_delta())?;

            let model: crate::transactions::ActiveModel = (&transaction).into();
            model.insert(&db_tx).await?;
            adjust_goals(&db_tx, None, Some(&transaction)).await?;
            targets.persist(&db_tx).await?;

            Ok(transaction_id)
        })
    }

    /// Update an existing transaction.
    ///
    /// Unset command fields keep their stored value. The update is applied as
    /// "reverse the old effect, apply the new one", so amount, wallet,
    /// category and date changes all reconcile the aggregates exactly.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = require_transaction(&db_tx, cmd.transaction_id).await?;

            if let Some(kind) = cmd.kind
                && kind != old.kind
            {
                return Err(EngineError::InvalidArgument(
                    "transaction kind is immutable; delete and recreate instead".to_string(),
                ));
            }

            let mut new = old.clone();
            if let Some(amount_minor) = cmd.amount_minor {
                new.amount_minor = require_positive_amount(amount_minor)?;
            }
            if let Some(wallet_id) = cmd.wallet_id {
                new.wallet_id = wallet_id;
            }
            if let Some(category) = cmd.category {
                new.category_id = category;
            }
            if let Some(description) = cmd.description {
                new.description =
                    description.and_then(|text| normalize_optional_text(Some(&text)));
            }
            if let Some(occurred_at) = cmd.occurred_at {
                new.occurred_at = occurred_at;
            }
            new.modified_at = Utc::now();

            let mut targets = Targets::load(&db_tx, [old.wallet_id, new.wallet_id]).await?;
            if new.wallet_id != old.wallet_id {
                let wallet = targets.wallet(new.wallet_id)?;
                if wallet.status != EntityStatus::Active {
                    return Err(EngineError::InvalidArgument(format!(
                        "wallet '{}' is not active",
                        wallet.name
                    )));
                }
            }
            if new.category_id != old.category_id
                && let Some(category_id) = new.category_id
            {
                check_category(&db_tx, category_id, new.kind).await?;
            }

            targets.apply_regular(old.wallet_id, -old.wallet_delta())?;
            targets.apply_regular(new.wallet_id, new.wallet_delta())?;

            let model: crate::transactions::ActiveModel = (&new).into();
            model.update(&db_tx).await?;
            adjust_goals(&db_tx, Some(&old), Some(&new)).await?;
            targets.persist(&db_tx).await?;

            Ok(())
        })
    }

    /// Delete a transaction, reversing its effect on every aggregate.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = require_transaction(&db_tx, transaction_id).await?;

            let mut targets = Targets::load(&db_tx, [old.wallet_id]).await?;
            targets.apply_regular(old.wallet_id, -old.wallet_delta())?;

            crate::transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;
            adjust_goals(&db_tx, Some(&old), None).await?;
            targets.persist(&db_tx).await?;

            Ok(())
        })
    }

    /// Return a transaction snapshot from DB.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            require_transaction(&db_tx, transaction_id).await
        })
    }

    /// List a wallet's transactions, most recent first.
    pub async fn wallet_transactions(&self, wallet_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            super::require_wallet(&db_tx, wallet_id).await?;
            let models = crate::transactions::Entity::find()
                .filter(crate::transactions::Column::WalletId.eq(wallet_id.to_string()))
                .order_by_desc(crate::transactions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }
}
