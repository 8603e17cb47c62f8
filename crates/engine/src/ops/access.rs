use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, budgets, categories, transactions};

use super::Engine;

/// Generates a `require_*` method returning the row only when it exists and
/// belongs to the caller.
macro_rules! impl_require_owned {
    ($fn_name:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(require_account, accounts, "account not exists");
    impl_require_owned!(require_category, categories, "category not exists");
    impl_require_owned!(require_transaction, transactions, "transaction not exists");
    impl_require_owned!(require_budget, budgets, "budget not exists");

    /// Validates a relocation target for account deletion.
    ///
    /// The replacement must differ from the deleted account, exist, and be
    /// owned by the caller; a violation is an `InvalidReference`, never a
    /// silent dangling pointer.
    pub(super) async fn require_replacement_account(
        &self,
        db: &DatabaseTransaction,
        replaced_id: Uuid,
        replacement_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        if replaced_id == replacement_id {
            return Err(EngineError::InvalidReference(
                "replacement account must differ from the deleted account".to_string(),
            ));
        }
        accounts::Entity::find_by_id(replacement_id.to_string())
            .filter(accounts::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidReference("replacement account not exists".to_string())
            })
    }

    /// Validates a relocation target for category deletion.
    pub(super) async fn require_replacement_category(
        &self,
        db: &DatabaseTransaction,
        replaced_id: Uuid,
        replacement_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<categories::Model> {
        if replaced_id == replacement_id {
            return Err(EngineError::InvalidReference(
                "replacement category must differ from the deleted category".to_string(),
            ));
        }
        categories::Entity::find_by_id(replacement_id.to_string())
            .filter(categories::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidReference("replacement category not exists".to_string())
            })
    }

    /// Validates a category referenced by a split line or a budget.
    pub(super) async fn require_referenced_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidReference(format!("category {category_id} not exists"))
            })
    }
}
