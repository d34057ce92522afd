//! Regular (non-transfer) transactions.
//!
//! A transaction records money entering or leaving a single wallet. Its
//! `kind` fixes the sign of every derived-aggregate delta and is immutable
//! after creation; changing the nature of an entry means deleting it and
//! creating a new one.

use chrono::Utc;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign applied to the transaction amount when it hits a wallet balance.
    #[must_use]
    pub fn sign(self) -> i64 {
        match self {
            Self::Income => 1,
            Self::Expense => -1,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// A regular transaction against a single wallet.
///
/// `amount_minor` is the positive magnitude in minor units; the direction
/// lives in `kind`. `category_id` is optional and may be cleared when the
/// category is later deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

impl Transaction {
    pub fn new(
        wallet_id: Uuid,
        category_id: Option<Uuid>,
        kind: TransactionKind,
        amount_minor: i64,
        description: Option<String>,
        occurred_at: DateTimeUtc,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            category_id,
            kind,
            amount_minor,
            description,
            occurred_at,
            created_at: now,
            modified_at: now,
        }
    }

    /// Signed effect of this transaction on its wallet balance.
    #[must_use]
    pub fn wallet_delta(&self) -> MoneyCents {
        crate::rules::wallet_delta(self.kind, self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(value: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            wallet_id: ActiveValue::Set(value.wallet_id.to_string()),
            category_id: ActiveValue::Set(value.category_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            description: ActiveValue::Set(value.description.clone()),
            occurred_at: ActiveValue::Set(value.occurred_at),
            created_at: ActiveValue::Set(value.created_at),
            modified_at: ActiveValue::Set(value.modified_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
            modified_at: model.modified_at,
        })
    }
}
