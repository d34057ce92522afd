//! The `Budget` owns a collection of wallets and carries the derived
//! overall-balance aggregate.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError, EntityStatus, util::parse_uuid};

/// A budget.
///
/// The budget's `overall_balance_minor` is derived: it equals the sum of
/// `balance_minor` over the budget's wallets flagged
/// `part_of_general_balance`, as maintained by the transaction mutation
/// rules (transfers deliberately never contribute, see `rules`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    /// Stable identifier, generated once and persisted so the budget can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub name: String,
    pub overall_balance_minor: i64,
    pub currency: Currency,
    pub status: EntityStatus,
}

impl Budget {
    pub fn new(name: String, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            overall_balance_minor: 0,
            currency,
            status: EntityStatus::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub overall_balance_minor: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallets::Entity")]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            overall_balance_minor: ActiveValue::Set(value.overall_balance_minor),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            name: model.name,
            overall_balance_minor: model.overall_balance_minor,
            currency: Currency::try_from(model.currency.as_str())?,
            status: EntityStatus::try_from(model.status.as_str())?,
        })
    }
}
