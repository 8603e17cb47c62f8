use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, Currency, EngineError, Money, ResultEngine, TransactionKind, accounts, transactions,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Opens a new account for the user.
    pub async fn new_account(
        &self,
        user_id: &str,
        name: &str,
        currency: Currency,
        opening_balance: Money,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        let account = Account::new(
            user_id.to_string(),
            name,
            currency,
            opening_balance,
            Utc::now(),
        )?;
        with_tx!(self, |db_tx| {
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Returns an owned account by id.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            Account::try_from(model)
        })
    }

    /// Lists the user's accounts.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models: Vec<accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    pub async fn rename_account(
        &self,
        account_id: Uuid,
        user_id: &str,
        name: &str,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            let model = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: ActiveValue::Set(name),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Account::try_from(model)
        })
    }

    /// Rewrites the stored balance to an explicit value.
    ///
    /// This is a rebase of the account's opening balance, not a transaction:
    /// existing transactions keep their amounts and the invariant continues
    /// from the new figure.
    pub async fn set_account_balance(
        &self,
        account_id: Uuid,
        user_id: &str,
        balance: Money,
    ) -> ResultEngine<Account> {
        if balance.is_negative() {
            return Err(EngineError::ConstraintViolation(
                "balance must not be negative".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            let model = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                balance_minor: ActiveValue::Set(balance.minor()),
                balance_updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Account::try_from(model)
        })
    }

    /// Deletes an account, relocating its transactions to a replacement.
    ///
    /// All transactions referencing the deleted account are re-homed onto the
    /// replacement in bulk, and the relocated signed sum is transferred to
    /// the replacement's balance so its invariant keeps holding. Fails with
    /// `InsufficientFunds` if the transfer would push the replacement
    /// negative; in that case nothing is applied.
    pub async fn delete_account(
        &self,
        account_id: Uuid,
        replacement_account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            self.require_replacement_account(&db_tx, account_id, replacement_account_id, user_id)
                .await?;

            let tx_models: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut relocated_sum = Money::ZERO;
            for model in &tx_models {
                let kind = TransactionKind::try_from(model.kind.as_str())?;
                relocated_sum = relocated_sum
                    .checked_add(kind.signed(Money::new(model.amount_minor)))
                    .ok_or_else(|| {
                        EngineError::ConstraintViolation("balance overflow".to_string())
                    })?;
            }

            transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::AccountId,
                    Expr::value(replacement_account_id.to_string()),
                )
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .exec(&db_tx)
                .await?;

            if !relocated_sum.is_zero() {
                self.apply_balance_delta(&db_tx, replacement_account_id, user_id, relocated_sum)
                    .await?;
            }

            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
