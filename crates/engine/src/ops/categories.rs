use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, budgets, categories, splits};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    pub async fn new_category(&self, user_id: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.reject_duplicate_category_name(&db_tx, user_id, &name, None)
                .await?;
            let category = Category::new(user_id.to_string(), name);
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    /// Returns an owned category by id.
    pub async fn category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id, user_id).await?;
            Category::try_from(model)
        })
    }

    /// Lists the user's categories.
    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        let models: Vec<categories::Model> = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    pub async fn rename_category(
        &self,
        category_id: Uuid,
        user_id: &str,
        name: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id, user_id).await?;
            self.reject_duplicate_category_name(&db_tx, user_id, &name, Some(category_id))
                .await?;
            let model = categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                name: ActiveValue::Set(name),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Category::try_from(model)
        })
    }

    /// Deletes a category, relocating dependents to a replacement.
    ///
    /// Three steps in one transactional unit, in this order:
    ///
    /// 1. every split referencing the category is re-pointed at the
    ///    replacement (so budget aggregation never observes an undercounted
    ///    replacement category),
    /// 2. budgets on the category are dropped — a budget is meaningless
    ///    without its exact category, and silently relocating it would
    ///    double-count against the replacement's own budget,
    /// 3. the category row is removed.
    pub async fn delete_category(
        &self,
        category_id: Uuid,
        replacement_category_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id, user_id).await?;
            self.require_replacement_category(&db_tx, category_id, replacement_category_id, user_id)
                .await?;

            splits::Entity::update_many()
                .col_expr(
                    splits::Column::CategoryId,
                    Expr::value(replacement_category_id.to_string()),
                )
                .filter(splits::Column::CategoryId.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?;

            budgets::Entity::delete_many()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?;

            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn reject_duplicate_category_name(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(categories::Column::Id.ne(id.to_string()));
        }
        if query.one(db_tx).await?.is_some() {
            return Err(EngineError::ConstraintViolation(format!(
                "category '{name}' already exists"
            )));
        }
        Ok(())
    }
}
