//! Spending category primitives.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A user-defined spending classification.
///
/// Referenced by transaction category-splits and budgets; deleting one
/// relocates its splits to a replacement and drops its budgets (see
/// `Engine::delete_category`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
}

impl Category {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            user_id: ActiveValue::Set(category.user_id.clone()),
            name: ActiveValue::Set(category.name.clone()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            user_id: model.user_id,
            name: model.name,
        })
    }
}
