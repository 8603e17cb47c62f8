//! Account primitives.
//!
//! An `Account` is a monetary bucket with a currency and a running balance.
//! The stored balance is denormalized: it must always equal the opening
//! balance plus the signed sum of the account's transactions, and only the
//! ledger path in `ops` is allowed to move it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub currency: Currency,
    pub balance: Money,
    pub balance_updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: String,
        name: String,
        currency: Currency,
        opening_balance: Money,
        opened_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if opening_balance.is_negative() {
            return Err(EngineError::ConstraintViolation(
                "opening balance must not be negative".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            currency,
            balance: opening_balance,
            balance_updated_at: opened_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub currency: String,
    pub balance_minor: i64,
    pub balance_updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            balance_minor: ActiveValue::Set(account.balance.minor()),
            balance_updated_at: ActiveValue::Set(account.balance_updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: model.user_id,
            name: model.name,
            currency: Currency::try_from(model.currency.as_str())?,
            balance: Money::new(model.balance_minor),
            balance_updated_at: model.balance_updated_at,
        })
    }
}
