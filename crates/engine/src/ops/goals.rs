use std::collections::HashMap;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CategoryKind, EngineError, EntityStatus, Goal, NewGoalCmd, ResultEngine, Transaction,
    UpdateGoalCmd,
    util::{require_name, require_positive_amount},
};

use super::{Engine, require_category, require_goal, with_tx};

/// Load every active goal together with its category set.
pub(crate) async fn load_active_goals<C: ConnectionTrait>(
    db: &C,
) -> ResultEngine<Vec<(Goal, Vec<Uuid>)>> {
    let goal_models = crate::goals::Entity::find()
        .filter(crate::goals::Column::Status.eq(EntityStatus::Active.as_str()))
        .all(db)
        .await?;

    let link_models = crate::goal_categories::Entity::find().all(db).await?;
    let mut sets: HashMap<String, Vec<Uuid>> = HashMap::new();
    for link in link_models {
        sets.entry(link.goal_id)
            .or_default()
            .push(crate::util::parse_uuid(&link.category_id, "category")?);
    }

    let mut goals = Vec::with_capacity(goal_models.len());
    for model in goal_models {
        let set = sets.remove(&model.id).unwrap_or_default();
        goals.push((Goal::try_from(model)?, set));
    }
    Ok(goals)
}

/// Incrementally adjust goal actuals for a transaction mutation.
///
/// `old` is the transaction as stored before the mutation (`None` on create),
/// `new` the transaction as it will be stored (`None` on delete). Each active
/// goal gains the new contribution and loses the old one; goals untouched by
/// both states are left alone.
pub(crate) async fn adjust_goals<C: ConnectionTrait>(
    db: &C,
    old: Option<&Transaction>,
    new: Option<&Transaction>,
) -> ResultEngine<()> {
    for (goal, set) in load_active_goals(db).await? {
        let mut delta = 0i64;
        if let Some(old) = old
            && goal.applies_to(old, &set)
        {
            delta -= old.amount_minor;
        }
        if let Some(new) = new
            && goal.applies_to(new, &set)
        {
            delta += new.amount_minor;
        }
        if delta != 0 {
            let active = crate::goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                actual_amount_minor: ActiveValue::Set(goal.actual_amount_minor + delta),
                ..Default::default()
            };
            active.update(db).await?;
        }
    }
    Ok(())
}

/// Reverse the goal contributions of a batch of transactions about to be
/// deleted. Goals are scanned once, not once per transaction.
pub(crate) async fn reverse_goal_contributions<C: ConnectionTrait>(
    db: &C,
    doomed: &[Transaction],
) -> ResultEngine<()> {
    if doomed.is_empty() {
        return Ok(());
    }
    for (goal, set) in load_active_goals(db).await? {
        let mut delta = 0i64;
        for transaction in doomed {
            if goal.applies_to(transaction, &set) {
                delta -= transaction.amount_minor;
            }
        }
        if delta != 0 {
            let active = crate::goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                actual_amount_minor: ActiveValue::Set(goal.actual_amount_minor + delta),
                ..Default::default()
            };
            active.update(db).await?;
        }
    }
    Ok(())
}

/// Recompute a goal's actual amount from scratch over the stored
/// transactions.
async fn recompute_actual<C: ConnectionTrait>(
    db: &C,
    goal: &Goal,
    category_ids: &[Uuid],
) -> ResultEngine<i64> {
    if category_ids.is_empty() {
        return Ok(0);
    }
    let id_strings: Vec<String> = category_ids.iter().map(ToString::to_string).collect();
    let models = crate::transactions::Entity::find()
        .filter(crate::transactions::Column::Kind.eq(goal.kind.as_str()))
        .filter(crate::transactions::Column::CategoryId.is_in(id_strings))
        .all(db)
        .await?;

    let mut actual = 0i64;
    for model in models {
        let transaction = Transaction::try_from(model)?;
        if goal.applies_to(&transaction, category_ids) {
            actual += transaction.amount_minor;
        }
    }
    Ok(actual)
}

/// Validate a goal's category set: every category must exist, be
/// non-System and match the goal's kind. Returns the deduplicated set.
async fn validate_category_set<C: ConnectionTrait>(
    db: &C,
    goal_kind: crate::TransactionKind,
    category_ids: &[Uuid],
) -> ResultEngine<Vec<Uuid>> {
    let mut set = Vec::with_capacity(category_ids.len());
    for &category_id in category_ids {
        if set.contains(&category_id) {
            continue;
        }
        let category = require_category(db, category_id).await?;
        if category.kind == CategoryKind::System {
            return Err(EngineError::InvalidArgument(format!(
                "category '{}' is a system category and cannot be tracked by a goal",
                category.name
            )));
        }
        if !category.kind.accepts(goal_kind) {
            return Err(EngineError::InvalidArgument(format!(
                "category '{}' is {} but the goal tracks {}",
                category.name,
                category.kind.as_str(),
                goal_kind.as_str()
            )));
        }
        set.push(category_id);
    }
    Ok(set)
}

fn validate_window(start: Date, end: Date) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::InvalidArgument(
            "goal start date is after its end date".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Create a goal and seed its actual amount from the transactions already
    /// stored.
    pub async fn new_goal(&self, cmd: NewGoalCmd) -> ResultEngine<Uuid> {
        let name = require_name(&cmd.name, "goal")?;
        require_positive_amount(cmd.planned_amount_minor)?;
        validate_window(cmd.start_date, cmd.end_date)?;

        with_tx!(self, |db_tx| {
            let set = validate_category_set(&db_tx, cmd.kind, &cmd.category_ids).await?;

            let mut goal = Goal::new(
                name,
                cmd.kind,
                cmd.planned_amount_minor,
                cmd.start_date,
                cmd.end_date,
            );
            goal.actual_amount_minor = recompute_actual(&db_tx, &goal, &set).await?;

            let goal_id = goal.id;
            let model: crate::goals::ActiveModel = (&goal).into();
            model.insert(&db_tx).await?;
            for category_id in &set {
                crate::goal_categories::Model::link(goal_id, *category_id)
                    .insert(&db_tx)
                    .await?;
            }

            tracing::debug!(
                goal = %goal_id,
                actual_minor = goal.actual_amount_minor,
                "seeded goal actual amount"
            );
            Ok(goal_id)
        })
    }

    /// Update a goal's definition.
    ///
    /// Any accepted change invalidates the incremental bookkeeping, so the
    /// actual amount is recomputed in full against the new definition.
    pub async fn update_goal(&self, cmd: UpdateGoalCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let mut goal = require_goal(&db_tx, cmd.goal_id).await?;

            if let Some(name) = &cmd.name {
                goal.name = require_name(name, "goal")?;
            }
            if let Some(kind) = cmd.kind {
                goal.kind = kind;
            }
            if let Some(target) = cmd.planned_amount_minor {
                goal.planned_amount_minor = require_positive_amount(target)?;
            }
            if let Some(start_date) = cmd.start_date {
                goal.start_date = start_date;
            }
            if let Some(end_date) = cmd.end_date {
                goal.end_date = end_date;
            }
            validate_window(goal.start_date, goal.end_date)?;

            let set = match &cmd.category_ids {
                Some(category_ids) => {
                    let set = validate_category_set(&db_tx, goal.kind, category_ids).await?;
                    crate::goal_categories::Entity::delete_many()
                        .filter(
                            crate::goal_categories::Column::GoalId.eq(cmd.goal_id.to_string()),
                        )
                        .exec(&db_tx)
                        .await?;
                    for category_id in &set {
                        crate::goal_categories::Model::link(cmd.goal_id, *category_id)
                            .insert(&db_tx)
                            .await?;
                    }
                    set
                }
                None => {
                    // The kind may have changed, so the existing set must be
                    // re-validated against it.
                    let set = self.goal_category_set(&db_tx, cmd.goal_id).await?;
                    validate_category_set(&db_tx, goal.kind, &set).await?
                }
            };

            goal.actual_amount_minor = recompute_actual(&db_tx, &goal, &set).await?;
            tracing::debug!(
                goal = %goal.id,
                actual_minor = goal.actual_amount_minor,
                "recomputed goal actual amount"
            );

            let model: crate::goals::ActiveModel = (&goal).into();
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a goal. No other aggregate depends on it, so only the goal and
    /// its category links go away.
    pub async fn delete_goal(&self, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id).await?;
            crate::goal_categories::Entity::delete_many()
                .filter(crate::goal_categories::Column::GoalId.eq(goal_id.to_string()))
                .exec(&db_tx)
                .await?;
            crate::goals::Entity::delete_by_id(goal_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Archive or unarchive a goal. Archived goals stop accumulating.
    pub async fn set_goal_archived(&self, goal_id: Uuid, archived: bool) -> ResultEngine<()> {
        let status = if archived {
            EntityStatus::Archived
        } else {
            EntityStatus::Active
        };
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id).await?;
            let active = crate::goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Return a goal snapshot from DB.
    pub async fn goal(&self, goal_id: Uuid) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| { require_goal(&db_tx, goal_id).await })
    }

    /// Return the category ids tracked by a goal.
    pub async fn goal_categories(&self, goal_id: Uuid) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            require_goal(&db_tx, goal_id).await?;
            self.goal_category_set(&db_tx, goal_id).await
        })
    }

    async fn goal_category_set<C: ConnectionTrait>(
        &self,
        db: &C,
        goal_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let links = crate::goal_categories::Entity::find()
            .filter(crate::goal_categories::Column::GoalId.eq(goal_id.to_string()))
            .all(db)
            .await?;
        links
            .into_iter()
            .map(|link| crate::util::parse_uuid(&link.category_id, "category"))
            .collect()
    }
}
