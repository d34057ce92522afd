//! Wallet-to-wallet transfers.
//!
//! A transfer moves money between two wallets of the same budget. Both legs
//! are applied atomically, and transfers never touch the budget overall
//! balance: money moving between wallets of one budget is not income or
//! expense, even when only one side is flagged as part of the general
//! balance.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A completed transfer between two wallets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub id: Uuid,
    pub source_wallet_id: Uuid,
    pub target_wallet_id: Uuid,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl Transfer {
    pub fn new(
        source_wallet_id: Uuid,
        target_wallet_id: Uuid,
        amount_minor: i64,
        description: Option<String>,
        occurred_at: DateTimeUtc,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_wallet_id,
            target_wallet_id,
            amount_minor,
            description,
            occurred_at,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub source_wallet_id: String,
    pub target_wallet_id: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::SourceWalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SourceWallet,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::TargetWalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    TargetWallet,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(value: &Transfer) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            source_wallet_id: ActiveValue::Set(value.source_wallet_id.to_string()),
            target_wallet_id: ActiveValue::Set(value.target_wallet_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            description: ActiveValue::Set(value.description.clone()),
            occurred_at: ActiveValue::Set(value.occurred_at),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            source_wallet_id: parse_uuid(&model.source_wallet_id, "wallet")?,
            target_wallet_id: parse_uuid(&model.target_wallet_id, "wallet")?,
            amount_minor: model.amount_minor,
            description: model.description,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
        })
    }
}
