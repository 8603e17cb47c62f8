//! Category split primitives.
//!
//! A `CategorySplit` attributes a portion of a transaction's amount to one
//! spending category for budget tracking. Splits are metadata: they never
//! affect account balances, and the amounts of a transaction's splits are
//! not required to sum to the transaction amount.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySplit {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
}

impl CategorySplit {
    pub fn new(transaction_id: Uuid, category_id: Uuid, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            category_id,
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub category_id: String,
    pub amount_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CategorySplit> for ActiveModel {
    fn from(split: &CategorySplit) -> Self {
        Self {
            id: ActiveValue::Set(split.id.to_string()),
            transaction_id: ActiveValue::Set(split.transaction_id.to_string()),
            category_id: ActiveValue::Set(split.category_id.to_string()),
            amount_minor: ActiveValue::Set(split.amount.minor()),
        }
    }
}

impl TryFrom<Model> for CategorySplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "split")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount: Money::new(model.amount_minor),
        })
    }
}
