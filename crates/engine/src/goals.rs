//! Savings and spending goals.
//!
//! A goal tracks progress toward a target amount over an inclusive date
//! window, counting transactions whose kind matches the goal's kind and whose
//! category belongs to the goal's category set. `actual_amount_minor` is a
//! derived aggregate, maintained incrementally on transaction mutations and
//! recomputed in full when the goal itself changes.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, EntityStatus, Transaction, TransactionKind, util::parse_uuid};

/// A goal over a window of transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    pub planned_amount_minor: i64,
    pub actual_amount_minor: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: EntityStatus,
}

impl Goal {
    pub fn new(
        name: String,
        kind: TransactionKind,
        planned_amount_minor: i64,
        start_date: Date,
        end_date: Date,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            planned_amount_minor,
            actual_amount_minor: 0,
            start_date,
            end_date,
            status: EntityStatus::Active,
        }
    }

    /// Whether `transaction` counts toward this goal, given the goal's
    /// category set.
    ///
    /// All three conditions must hold: the kinds match, the transaction is
    /// categorised under one of the goal's categories, and its date falls in
    /// the inclusive `[start_date, end_date]` window.
    #[must_use]
    pub fn applies_to(&self, transaction: &Transaction, category_ids: &[Uuid]) -> bool {
        if transaction.kind != self.kind {
            return false;
        }
        let Some(category_id) = transaction.category_id else {
            return false;
        };
        if !category_ids.contains(&category_id) {
            return false;
        }
        let date = transaction.occurred_at.date_naive();
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub planned_amount_minor: i64,
    pub actual_amount_minor: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goal_categories::Entity")]
    GoalCategories,
}

impl Related<super::goal_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(value: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            planned_amount_minor: ActiveValue::Set(value.planned_amount_minor),
            actual_amount_minor: ActiveValue::Set(value.actual_amount_minor),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            status: ActiveValue::Set(value.status.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            name: model.name,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            planned_amount_minor: model.planned_amount_minor,
            actual_amount_minor: model.actual_amount_minor,
            start_date: model.start_date,
            end_date: model.end_date,
            status: EntityStatus::try_from(model.status.as_str())?,
        })
    }
}
