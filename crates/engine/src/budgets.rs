//! Budget primitives.
//!
//! A `Budget` is a spending cap tied to one category. The amount spent
//! against it is **never stored**: it is derived at read time as the sum of
//! all category-split amounts referencing the budget's category, which keeps
//! it consistent with the splits by construction.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub amount_available: Money,
}

impl Budget {
    pub fn new(user_id: String, category_id: Uuid, amount_available: Money) -> ResultEngine<Self> {
        if !amount_available.is_positive() {
            return Err(EngineError::ConstraintViolation(
                "budget amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            amount_available,
        })
    }
}

/// A budget together with its live-computed spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub amount_spent: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount_available_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            category_id: ActiveValue::Set(budget.category_id.to_string()),
            amount_available_minor: ActiveValue::Set(budget.amount_available.minor()),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: model.user_id,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount_available: Money::new(model.amount_available_minor),
        })
    }
}
