use std::collections::HashMap;

use sea_orm::{ActiveValue, ConnectionTrait, DatabaseConnection, prelude::*};
use uuid::Uuid;

use crate::{Budget, Category, EngineError, Goal, MoneyCents, ResultEngine, Transaction, Wallet};

mod budgets;
mod categories;
mod goals;
mod transactions;
mod transfers;
mod wallets;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The consistency engine.
///
/// Stateless apart from the database handle: every operation loads what it
/// needs, computes the aggregate deltas in memory and persists everything in
/// one unit of work.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

/// In-memory working set of the wallets and budgets touched by one mutation.
///
/// Deltas are accumulated here and persisted in a single pass at the end of
/// the unit of work, so a mutation that touches the same budget through two
/// wallets still issues exactly one update per row.
pub(crate) struct Targets {
    wallets: HashMap<Uuid, Wallet>,
    budgets: HashMap<Uuid, Budget>,
}

impl Targets {
    pub(crate) async fn load<C: ConnectionTrait>(
        db: &C,
        wallet_ids: impl IntoIterator<Item = Uuid>,
    ) -> ResultEngine<Targets> {
        let mut wallets = HashMap::new();
        let mut budgets = HashMap::new();
        for wallet_id in wallet_ids {
            if wallets.contains_key(&wallet_id) {
                continue;
            }
            let wallet = require_wallet(db, wallet_id).await?;
            if !budgets.contains_key(&wallet.budget_id) {
                let budget = require_budget(db, wallet.budget_id).await?;
                budgets.insert(budget.id, budget);
            }
            wallets.insert(wallet.id, wallet);
        }
        Ok(Targets { wallets, budgets })
    }

    pub(crate) fn wallet(&self, wallet_id: Uuid) -> ResultEngine<&Wallet> {
        self.wallets
            .get(&wallet_id)
            .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))
    }

    /// Apply a regular-transaction delta: the wallet balance moves, and the
    /// owning budget's overall balance moves too when the wallet is flagged.
    pub(crate) fn apply_regular(&mut self, wallet_id: Uuid, delta: MoneyCents) -> ResultEngine<()> {
        let wallet = self
            .wallets
            .get_mut(&wallet_id)
            .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))?;
        wallet.balance_minor += delta.cents();
        let budget_delta = crate::rules::budget_delta(delta, wallet.part_of_general_balance);
        if !budget_delta.is_zero() {
            let budget_id = wallet.budget_id;
            let budget = self
                .budgets
                .get_mut(&budget_id)
                .ok_or_else(|| EngineError::NotFound(format!("budget {budget_id}")))?;
            budget.overall_balance_minor += budget_delta.cents();
        }
        Ok(())
    }

    /// Apply a transfer leg: only the wallet balance moves. Transfers never
    /// reach the budget overall balance.
    pub(crate) fn apply_transfer_leg(
        &mut self,
        wallet_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<()> {
        let wallet = self
            .wallets
            .get_mut(&wallet_id)
            .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))?;
        wallet.balance_minor += delta.cents();
        Ok(())
    }

    /// Load a budget into the working set if it is not already there.
    pub(crate) async fn ensure_budget<C: ConnectionTrait>(
        &mut self,
        db: &C,
        budget_id: Uuid,
    ) -> ResultEngine<()> {
        if !self.budgets.contains_key(&budget_id) {
            let budget = require_budget(db, budget_id).await?;
            self.budgets.insert(budget.id, budget);
        }
        Ok(())
    }

    /// Apply a delta directly to a budget's overall balance.
    pub(crate) fn apply_budget_delta(
        &mut self,
        budget_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<()> {
        let budget = self
            .budgets
            .get_mut(&budget_id)
            .ok_or_else(|| EngineError::NotFound(format!("budget {budget_id}")))?;
        budget.overall_balance_minor += delta.cents();
        Ok(())
    }

    /// Persist the updated balances, one update per touched row.
    pub(crate) async fn persist<C: ConnectionTrait>(self, db: &C) -> ResultEngine<()> {
        for wallet in self.wallets.values() {
            let active = crate::wallets::ActiveModel {
                id: ActiveValue::Set(wallet.id.to_string()),
                balance_minor: ActiveValue::Set(wallet.balance_minor),
                ..Default::default()
            };
            active.update(db).await?;
        }
        for budget in self.budgets.values() {
            let active = crate::budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                overall_balance_minor: ActiveValue::Set(budget.overall_balance_minor),
                ..Default::default()
            };
            active.update(db).await?;
        }
        Ok(())
    }
}

pub(crate) async fn require_budget<C: ConnectionTrait>(
    db: &C,
    budget_id: Uuid,
) -> ResultEngine<Budget> {
    let model = crate::budgets::Entity::find_by_id(budget_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("budget {budget_id}")))?;
    Budget::try_from(model)
}

pub(crate) async fn require_wallet<C: ConnectionTrait>(
    db: &C,
    wallet_id: Uuid,
) -> ResultEngine<Wallet> {
    let model = crate::wallets::Entity::find_by_id(wallet_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))?;
    Wallet::try_from(model)
}

pub(crate) async fn require_category<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
) -> ResultEngine<Category> {
    let model = crate::categories::Entity::find_by_id(category_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("category {category_id}")))?;
    Category::try_from(model)
}

pub(crate) async fn require_goal<C: ConnectionTrait>(db: &C, goal_id: Uuid) -> ResultEngine<Goal> {
    let model = crate::goals::Entity::find_by_id(goal_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("goal {goal_id}")))?;
    Goal::try_from(model)
}

pub(crate) async fn require_transaction<C: ConnectionTrait>(
    db: &C,
    transaction_id: Uuid,
) -> ResultEngine<Transaction> {
    let model = crate::transactions::Entity::find_by_id(transaction_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction {transaction_id}")))?;
    Transaction::try_from(model)
}
