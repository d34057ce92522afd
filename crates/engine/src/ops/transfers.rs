use sea_orm::{Condition, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, ResultEngine, Transfer, TransferCmd, UpdateTransferCmd,
    rules::transfer_deltas,
    util::{normalize_optional_text, require_positive_amount},
};

use super::{Engine, Targets, with_tx};

pub(crate) async fn require_transfer<C: ConnectionTrait>(
    db: &C,
    transfer_id: Uuid,
) -> ResultEngine<Transfer> {
    let model = crate::transfers::Entity::find_by_id(transfer_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transfer {transfer_id}")))?;
    Transfer::try_from(model)
}

impl Engine {
    /// Move money between two wallets of the same budget.
    ///
    /// Both wallet balances change atomically; the budget overall balance
    /// does not, regardless of how the two wallets are flagged.
    pub async fn new_transfer(&self, cmd: TransferCmd) -> ResultEngine<Uuid> {
        let amount_minor = require_positive_amount(cmd.amount_minor)?;
        if cmd.source_wallet_id == cmd.target_wallet_id {
            return Err(EngineError::InvalidArgument(
                "source and target wallet must differ".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let mut targets =
                Targets::load(&db_tx, [cmd.source_wallet_id, cmd.target_wallet_id]).await?;
            let source = targets.wallet(cmd.source_wallet_id)?;
            let target = targets.wallet(cmd.target_wallet_id)?;
            if source.status != EntityStatus::Active || target.status != EntityStatus::Active {
                return Err(EngineError::InvalidArgument(
                    "both wallets must be active".to_string(),
                ));
            }
            if source.budget_id != target.budget_id {
                return Err(EngineError::InvalidArgument(
                    "transfers must stay within one budget".to_string(),
                ));
            }

            let transfer = Transfer::new(
                cmd.source_wallet_id,
                cmd.target_wallet_id,
                amount_minor,
                normalize_optional_text(cmd.description.as_deref()),
                cmd.occurred_at,
            );
            let transfer_id = transfer.id;

            let (source_delta, target_delta) = transfer_deltas(amount_minor);
            targets.apply_transfer_leg(transfer.source_wallet_id, source_delta)?;
            targets.apply_transfer_leg(transfer.target_wallet_id, target_delta)?;

            let model: crate::transfers::ActiveModel = (&transfer).into();
            model.insert(&db_tx).await?;
            targets.persist(&db_tx).await?;

            Ok(transfer_id)
        })
    }

    /// Update an existing transfer.
    ///
    /// The stored transfer is reversed and the patched one applied, so leg
    /// retargeting and amount changes reconcile every wallet exactly.
    pub async fn update_transfer(&self, cmd: UpdateTransferCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = require_transfer(&db_tx, cmd.transfer_id).await?;

            let mut new = old.clone();
            if let Some(source_wallet_id) = cmd.source_wallet_id {
                new.source_wallet_id = source_wallet_id;
            }
            if let Some(target_wallet_id) = cmd.target_wallet_id {
                new.target_wallet_id = target_wallet_id;
            }
            if let Some(amount_minor) = cmd.amount_minor {
                new.amount_minor = require_positive_amount(amount_minor)?;
            }
            if let Some(description) = cmd.description {
                new.description =
                    description.and_then(|text| normalize_optional_text(Some(&text)));
            }
            if let Some(occurred_at) = cmd.occurred_at {
                new.occurred_at = occurred_at;
            }
            if new.source_wallet_id == new.target_wallet_id {
                return Err(EngineError::InvalidArgument(
                    "source and target wallet must differ".to_string(),
                ));
            }

            let mut targets = Targets::load(
                &db_tx,
                [
                    old.source_wallet_id,
                    old.target_wallet_id,
                    new.source_wallet_id,
                    new.target_wallet_id,
                ],
            )
            .await?;
            {
                let source = targets.wallet(new.source_wallet_id)?;
                let target = targets.wallet(new.target_wallet_id)?;
                if source.budget_id != target.budget_id {
                    return Err(EngineError::InvalidArgument(
                        "transfers must stay within one budget".to_string(),
                    ));
                }
                // A retargeted leg must not route money through an archived
                // wallet; unchanged legs keep working as for any stored
                // transfer.
                if new.source_wallet_id != old.source_wallet_id
                    && source.status != EntityStatus::Active
                {
                    return Err(EngineError::InvalidArgument(format!(
                        "wallet '{}' is not active",
                        source.name
                    )));
                }
                if new.target_wallet_id != old.target_wallet_id
                    && target.status != EntityStatus::Active
                {
                    return Err(EngineError::InvalidArgument(format!(
                        "wallet '{}' is not active",
                        target.name
                    )));
                }
            }

            let (old_source_delta, old_target_delta) = transfer_deltas(old.amount_minor);
            targets.apply_transfer_leg(old.source_wallet_id, -old_source_delta)?;
            targets.apply_transfer_leg(old.target_wallet_id, -old_target_delta)?;
            let (source_delta, target_delta) = transfer_deltas(new.amount_minor);
            targets.apply_transfer_leg(new.source_wallet_id, source_delta)?;
            targets.apply_transfer_leg(new.target_wallet_id, target_delta)?;

            let model: crate::transfers::ActiveModel = (&new).into();
            model.update(&db_tx).await?;
            targets.persist(&db_tx).await?;

            Ok(())
        })
    }

    /// Delete a transfer, reversing both legs.
    pub async fn delete_transfer(&self, transfer_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let transfer = require_transfer(&db_tx, transfer_id).await?;

            let mut targets =
                Targets::load(&db_tx, [transfer.source_wallet_id, transfer.target_wallet_id])
                    .await?;
            let (source_delta, target_delta) = transfer_deltas(transfer.amount_minor);
            targets.apply_transfer_leg(transfer.source_wallet_id, -source_delta)?;
            targets.apply_transfer_leg(transfer.target_wallet_id, -target_delta)?;

            crate::transfers::Entity::delete_by_id(transfer_id.to_string())
                .exec(&db_tx)
                .await?;
            targets.persist(&db_tx).await?;

            Ok(())
        })
    }

    /// Return a transfer snapshot from DB.
    pub async fn transfer(&self, transfer_id: Uuid) -> ResultEngine<Transfer> {
        with_tx!(self, |db_tx| { require_transfer(&db_tx, transfer_id).await })
    }

    /// List the transfers touching a wallet on either side, most recent
    /// first.
    pub async fn wallet_transfers(&self, wallet_id: Uuid) -> ResultEngine<Vec<Transfer>> {
        with_tx!(self, |db_tx| {
            super::require_wallet(&db_tx, wallet_id).await?;
            let id_string = wallet_id.to_string();
            let models = crate::transfers::Entity::find()
                .filter(
                    Condition::any()
                        .add(crate::transfers::Column::SourceWalletId.eq(id_string.clone()))
                        .add(crate::transfers::Column::TargetWalletId.eq(id_string)),
                )
                .order_by_desc(crate::transfers::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Transfer::try_from).collect()
        })
    }
}
