use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{Budget, BudgetStatus, EngineError, Money, ResultEngine, budgets};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a budget for one of the user's categories.
    pub async fn new_budget(
        &self,
        user_id: &str,
        category_id: Uuid,
        amount_available: Money,
    ) -> ResultEngine<BudgetStatus> {
        let budget = Budget::new(user_id.to_string(), category_id, amount_available)?;
        with_tx!(self, |db_tx| {
            self.require_referenced_category(&db_tx, category_id, user_id)
                .await?;
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            let amount_spent = self.amount_spent(&db_tx, category_id).await?;
            Ok(BudgetStatus {
                budget,
                amount_spent,
            })
        })
    }

    /// Returns an owned budget with its live spend.
    pub async fn budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<BudgetStatus> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, budget_id, user_id).await?;
            let budget = Budget::try_from(model)?;
            let amount_spent = self.amount_spent(&db_tx, budget.category_id).await?;
            Ok(BudgetStatus {
                budget,
                amount_spent,
            })
        })
    }

    /// Lists the user's budgets, each with its live spend.
    pub async fn budgets(&self, user_id: &str) -> ResultEngine<Vec<BudgetStatus>> {
        with_tx!(self, |db_tx| {
            let models: Vec<budgets::Model> = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let budget = Budget::try_from(model)?;
                let amount_spent = self.amount_spent(&db_tx, budget.category_id).await?;
                out.push(BudgetStatus {
                    budget,
                    amount_spent,
                });
            }
            Ok(out)
        })
    }

    pub async fn set_budget_amount(
        &self,
        budget_id: Uuid,
        user_id: &str,
        amount_available: Money,
    ) -> ResultEngine<BudgetStatus> {
        if !amount_available.is_positive() {
            return Err(EngineError::ConstraintViolation(
                "budget amount must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id, user_id).await?;
            let model = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                amount_available_minor: ActiveValue::Set(amount_available.minor()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            let budget = Budget::try_from(model)?;
            let amount_spent = self.amount_spent(&db_tx, budget.category_id).await?;
            Ok(BudgetStatus {
                budget,
                amount_spent,
            })
        })
    }

    /// Deletes a budget; category and transaction data are untouched.
    pub async fn delete_budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, budget_id, user_id).await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Live spend for a category: the sum of all split amounts referencing
    /// it. Recomputed on every read, never cached.
    async fn amount_spent<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
    ) -> ResultEngine<Money> {
        let backend = db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS spent \
             FROM transaction_categories \
             WHERE category_id = ?",
            [category_id.to_string().into()],
        );
        let row = db.query_one(stmt).await?;
        let minor: i64 = row.and_then(|r| r.try_get("", "spent").ok()).unwrap_or(0);
        Ok(Money::new(minor))
    }
}
