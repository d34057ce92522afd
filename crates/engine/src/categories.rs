//! Category registry.
//!
//! Categories classify regular transactions as income or expense buckets and
//! may form a tree via `parent_id`. The distinguished System category
//! ("Balance correction") backs synthetic adjustment transactions and is
//! never user-deletable.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, EntityStatus, TransactionKind, util::parse_uuid};

/// Internal name of the distinguished System category used for balance
/// corrections.
pub const BALANCE_CORRECTION_NAME: &str = "Balance correction";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
    System,
}

impl CategoryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::System => "system",
        }
    }

    /// Whether a transaction of `kind` may use a category of this kind.
    ///
    /// System categories are exempt from the kind check: they carry synthetic
    /// corrections of either sign.
    #[must_use]
    pub fn accepts(self, kind: TransactionKind) -> bool {
        match self {
            Self::System => true,
            Self::Income => kind == TransactionKind::Income,
            Self::Expense => kind == TransactionKind::Expense,
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "system" => Ok(Self::System),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<Uuid>,
    pub status: EntityStatus,
}

impl Category {
    pub fn new(name: String, kind: CategoryKind, parent_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            parent_id,
            status: EntityStatus::Active,
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.kind == CategoryKind::System
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::goal_categories::Entity")]
    GoalCategories,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::goal_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            status: ActiveValue::Set(value.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            parent_id: model
                .parent_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            status: EntityStatus::try_from(model.status.as_str())?,
        })
    }
}
