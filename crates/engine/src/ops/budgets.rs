use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Budget, Currency, EngineError, EntityStatus, ResultEngine, Wallet, util::require_name,
};

use super::{Engine, require_budget, require_wallet, with_tx};

impl Engine {
    /// Add a new budget.
    pub async fn new_budget(&self, name: &str, currency: Option<Currency>) -> ResultEngine<Uuid> {
        let name = require_name(name, "budget")?;
        with_tx!(self, |db_tx| {
            // Enforce unique budget names (case-insensitive) to avoid
            // ambiguous name lookups.
            let exists = crate::budgets::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "budget '{name}' already exists"
                )));
            }

            let budget = Budget::new(name, currency.unwrap_or_default());
            let budget_id = budget.id;
            let model: crate::budgets::ActiveModel = (&budget).into();
            model.insert(&db_tx).await?;
            Ok(budget_id)
        })
    }

    /// Renames an existing budget.
    pub async fn rename_budget(&self, budget_id: Uuid, new_name: &str) -> ResultEngine<()> {
        let new_name = require_name(new_name, "budget")?;
        with_tx!(self, |db_tx| {
            require_budget(&db_tx, budget_id).await?;

            let exists = crate::budgets::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(crate::budgets::Column::Id.ne(budget_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "budget '{new_name}' already exists"
                )));
            }

            let active = crate::budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Archives/unarchives an existing budget.
    pub async fn set_budget_archived(&self, budget_id: Uuid, archived: bool) -> ResultEngine<()> {
        let status = if archived {
            EntityStatus::Archived
        } else {
            EntityStatus::Active
        };
        with_tx!(self, |db_tx| {
            require_budget(&db_tx, budget_id).await?;
            let active = crate::budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a budget and all of its wallets, in one unit of work.
    ///
    /// Each wallet is cascaded in turn with a fresh load, since reversing
    /// transfer legs shifts balances between wallets that have not been
    /// processed yet. Goals are global and keep running; they lose the
    /// contributions of the deleted transactions.
    pub async fn delete_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_budget(&db_tx, budget_id).await?;

            let wallet_models = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?;
            let wallet_count = wallet_models.len();
            for model in wallet_models {
                let wallet_id = crate::util::parse_uuid(&model.id, "wallet")?;
                // Reload: an earlier cascade in this loop may have shifted
                // this wallet's balance through a transfer reversal.
                let wallet = require_wallet(&db_tx, wallet_id).await?;
                self.cascade_delete_wallet(&db_tx, &wallet).await?;
            }

            crate::budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                budget = %budget_id,
                wallets = wallet_count,
                "cascade deleted budget"
            );
            Ok(())
        })
    }

    /// Return a budget snapshot from DB.
    pub async fn budget(&self, budget_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| { require_budget(&db_tx, budget_id).await })
    }

    /// List a budget's wallets, ordered by name.
    pub async fn budget_wallets(&self, budget_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            require_budget(&db_tx, budget_id).await?;
            let models = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(crate::wallets::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Wallet::try_from).collect()
        })
    }
}
