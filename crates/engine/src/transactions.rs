//! Transaction primitives.
//!
//! A `Transaction` is a single income/expense event against one account. Its
//! `amount` is a positive magnitude; the `kind` determines the sign applied
//! to the account balance. The allocation across spending categories lives
//! in the `splits` rows and never touches balances.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, splits::CategorySplit, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Applies the kind's sign convention to a positive magnitude.
    ///
    /// `Income → +amount`, `Expense → -amount`.
    #[must_use]
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::ConstraintViolation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub splits: Vec<CategorySplit>,
}

impl Transaction {
    pub fn new(
        user_id: String,
        account_id: Uuid,
        kind: TransactionKind,
        amount: Money,
        description: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::ConstraintViolation(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            kind,
            amount,
            description,
            created_at,
            splits: Vec::new(),
        })
    }

    /// The transaction's effect on its account balance.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::splits::Entity")]
    Splits,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            account_id: parse_uuid(&model.account_id, "account")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            description: model.description,
            created_at: model.created_at,
            splits: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_follows_kind() {
        assert_eq!(
            TransactionKind::Income.signed(Money::new(500)),
            Money::new(500)
        );
        assert_eq!(
            TransactionKind::Expense.signed(Money::new(500)),
            Money::new(-500)
        );
    }

    #[test]
    fn kind_round_trips_through_storage() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("transfer").is_err());
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        for minor in [0, -100] {
            let err = Transaction::new(
                "alice".to_string(),
                Uuid::new_v4(),
                TransactionKind::Expense,
                Money::new(minor),
                "Lunch".to_string(),
                chrono::Utc::now(),
            )
            .unwrap_err();
            assert_eq!(
                err,
                EngineError::ConstraintViolation("amount must be > 0".to_string())
            );
        }
    }
}
