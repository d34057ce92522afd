//! The module contains the `Wallet` struct and its persistence model.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, EntityStatus, util::parse_uuid};

/// What kind of money container a wallet represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    #[default]
    Cash,
    BankAccount,
    Card,
    Other,
}

impl WalletKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankAccount => "bank_account",
            Self::Card => "card",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for WalletKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "bank_account" => Ok(Self::BankAccount),
            "card" => Ok(Self::Card),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid wallet kind: {other}"
            ))),
        }
    }
}

/// A wallet.
///
/// A wallet is a representation of a real wallet, a bank account or anything
/// else where money is kept. It belongs to exactly one budget, and its
/// `balance_minor` is derived from the transactions and transfers that
/// reference it.
///
/// Wallets flagged `part_of_general_balance` contribute their balance to the
/// owning budget's overall balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    /// Stable identifier, generated once and persisted so the wallet can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub name: String,
    pub balance_minor: i64,
    pub part_of_general_balance: bool,
    pub budget_id: Uuid,
    pub currency: Currency,
    pub status: EntityStatus,
    pub kind: WalletKind,
}

impl Wallet {
    pub fn new(
        name: String,
        budget_id: Uuid,
        currency: Currency,
        part_of_general_balance: bool,
        kind: WalletKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance_minor: 0,
            part_of_general_balance,
            budget_id,
            currency,
            status: EntityStatus::Active,
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance_minor: i64,
    pub part_of_general_balance: bool,
    pub budget_id: String,
    pub currency: String,
    pub status: String,
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Budgets,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            part_of_general_balance: ActiveValue::Set(value.part_of_general_balance),
            budget_id: ActiveValue::Set(value.budget_id.to_string()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet")?,
            name: model.name,
            balance_minor: model.balance_minor,
            part_of_general_balance: model.part_of_general_balance,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            currency: Currency::try_from(model.currency.as_str())?,
            status: EntityStatus::try_from(model.status.as_str())?,
            kind: WalletKind::try_from(model.kind.as_str())?,
        })
    }
}
