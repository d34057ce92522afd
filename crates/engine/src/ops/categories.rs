use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, ResultEngine,
    categories::BALANCE_CORRECTION_NAME,
    util::require_name,
};

use super::{Engine, require_category, with_tx};

/// Get or lazily create the System category backing balance corrections.
pub(crate) async fn balance_correction_category<C: ConnectionTrait>(
    db: &C,
) -> ResultEngine<Category> {
    let existing = crate::categories::Entity::find()
        .filter(crate::categories::Column::Kind.eq(CategoryKind::System.as_str()))
        .filter(crate::categories::Column::Name.eq(BALANCE_CORRECTION_NAME))
        .one(db)
        .await?;
    if let Some(model) = existing {
        return Category::try_from(model);
    }

    let category = Category::new(
        BALANCE_CORRECTION_NAME.to_string(),
        CategoryKind::System,
        None,
    );
    let model: crate::categories::ActiveModel = (&category).into();
    model.insert(db).await?;
    Ok(category)
}

impl Engine {
    /// Create a category.
    ///
    /// System categories are engine-managed and cannot be created through
    /// this call. A parent, when given, must exist and be of the same kind.
    pub async fn new_category(
        &self,
        name: &str,
        kind: CategoryKind,
        parent_id: Option<Uuid>,
    ) -> ResultEngine<Uuid> {
        let name = require_name(name, "category")?;
        if kind == CategoryKind::System {
            return Err(EngineError::InvalidArgument(
                "system categories are engine-managed".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if let Some(parent_id) = parent_id {
                let parent = require_category(&db_tx, parent_id).await?;
                if parent.kind != kind {
                    return Err(EngineError::InvalidArgument(format!(
                        "parent category '{}' is {}, not {}",
                        parent.name,
                        parent.kind.as_str(),
                        kind.as_str()
                    )));
                }
            }

            let exists = crate::categories::Entity::find()
                .filter(crate::categories::Column::Kind.eq(kind.as_str()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "category '{name}' already exists"
                )));
            }

            let category = Category::new(name, kind, parent_id);
            let category_id = category.id;
            let model: crate::categories::ActiveModel = (&category).into();
            model.insert(&db_tx).await?;
            Ok(category_id)
        })
    }

    /// Renames an existing category. System categories keep their name.
    pub async fn rename_category(&self, category_id: Uuid, new_name: &str) -> ResultEngine<()> {
        let new_name = require_name(new_name, "category")?;
        with_tx!(self, |db_tx| {
            let category = require_category(&db_tx, category_id).await?;
            if category.is_system() {
                return Err(EngineError::InvalidArgument(
                    "system categories cannot be renamed".to_string(),
                ));
            }

            let exists = crate::categories::Entity::find()
                .filter(crate::categories::Column::Kind.eq(category.kind.as_str()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(crate::categories::Column::Id.ne(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "category '{new_name}' already exists"
                )));
            }

            let active = crate::categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a category.
    ///
    /// Blocked for System categories, for categories with children and for
    /// categories tracked by a goal. Otherwise the category's transactions
    /// are left in place with their category cleared; their amounts already
    /// live in the wallet and budget aggregates, so nothing else moves.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = require_category(&db_tx, category_id).await?;
            if category.is_system() {
                return Err(EngineError::InvalidArgument(
                    "system categories cannot be deleted".to_string(),
                ));
            }

            let has_children = crate::categories::Entity::find()
                .filter(crate::categories::Column::ParentId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if has_children {
                return Err(EngineError::Conflict(format!(
                    "category '{}' has child categories",
                    category.name
                )));
            }

            let tracked = crate::goal_categories::Entity::find()
                .filter(crate::goal_categories::Column::CategoryId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if tracked {
                return Err(EngineError::Conflict(format!(
                    "category '{}' is tracked by a goal",
                    category.name
                )));
            }

            let unassigned = crate::transactions::Entity::update_many()
                .col_expr(
                    crate::transactions::Column::CategoryId,
                    Expr::value(Option::<String>::None),
                )
                .filter(crate::transactions::Column::CategoryId.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                category = %category_id,
                transactions = unassigned.rows_affected,
                "unassigned transactions before category delete"
            );

            crate::categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Return a category snapshot from DB.
    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| { require_category(&db_tx, category_id).await })
    }

    /// List all categories, ordered by name.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = crate::categories::Entity::find()
                .order_by_asc(crate::categories::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }
}
