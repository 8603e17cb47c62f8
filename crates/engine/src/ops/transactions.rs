use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    CategorySplit, CreateTransactionCmd, EngineError, Money, ResultEngine, SplitDraft, Transaction,
    TransactionKind, UpdateTransactionCmd, splits, transactions, util::parse_uuid,
};

use super::{Engine, with_tx};

/// 1-indexed page selector for transaction listings.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Page {
    fn validate(self) -> ResultEngine<()> {
        if self.page == 0 {
            return Err(EngineError::ConstraintViolation(
                "page must be >= 1".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(EngineError::ConstraintViolation(
                "limit must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn validate_splits(drafts: &[SplitDraft]) -> ResultEngine<()> {
    if drafts.is_empty() {
        return Err(EngineError::ConstraintViolation(
            "transaction must have at least one category split".to_string(),
        ));
    }
    for draft in drafts {
        if !draft.amount.is_positive() {
            return Err(EngineError::ConstraintViolation(
                "split amount must be > 0".to_string(),
            ));
        }
    }
    Ok(())
}

impl Engine {
    /// Records a new income/expense transaction with its category splits.
    ///
    /// The account balance is moved through the ledger first; an
    /// `InsufficientFunds` rejection therefore leaves the transaction and
    /// split tables untouched. The whole write is one transactional unit.
    pub async fn new_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        validate_splits(&cmd.splits)?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            for draft in &cmd.splits {
                self.require_referenced_category(&db_tx, draft.category_id, &cmd.user_id)
                    .await?;
            }

            let mut tx = Transaction::new(
                cmd.user_id.clone(),
                cmd.account_id,
                cmd.kind,
                cmd.amount,
                cmd.description.clone(),
                Utc::now(),
            )?;
            self.apply_balance_delta(&db_tx, cmd.account_id, &cmd.user_id, tx.signed_amount())
                .await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            for draft in &cmd.splits {
                let split = CategorySplit::new(tx.id, draft.category_id, draft.amount);
                splits::ActiveModel::from(&split).insert(&db_tx).await?;
                tx.splits.push(split);
            }

            Ok(tx)
        })
    }

    /// Returns an owned transaction with its splits.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            let mut splits_by_tx = self
                .load_splits(&db_tx, std::slice::from_ref(&model.id))
                .await?;
            let mut tx = Transaction::try_from(model)?;
            tx.splits = splits_by_tx
                .remove(&tx.id.to_string())
                .unwrap_or_default();
            Ok(tx)
        })
    }

    /// Lists the user's transactions, newest first.
    pub async fn transactions(&self, user_id: &str, page: Page) -> ResultEngine<Vec<Transaction>> {
        page.validate()?;
        with_tx!(self, |db_tx| {
            let models: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_desc(transactions::Column::CreatedAt)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;

            let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
            let mut splits_by_tx = self.load_splits(&db_tx, &ids).await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let id = model.id.clone();
                let mut tx = Transaction::try_from(model)?;
                tx.splits = splits_by_tx.remove(&id).unwrap_or_default();
                out.push(tx);
            }
            Ok(out)
        })
    }

    /// Replaces a transaction's account, kind, amount and description.
    ///
    /// The old signed delta is reversed and the new one applied atomically;
    /// when the account is unchanged the two collapse into a single combined
    /// delta so no transient negative balance is observed. Splits are
    /// untouched.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::ConstraintViolation(
                "amount must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let existing = self
                .require_transaction(&db_tx, cmd.transaction_id, &cmd.user_id)
                .await?;
            let old_account_id = parse_uuid(&existing.account_id, "account")?;
            let old_kind = TransactionKind::try_from(existing.kind.as_str())?;
            let old_delta = old_kind.signed(Money::new(existing.amount_minor));

            self.require_account(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let new_delta = cmd.kind.signed(cmd.amount);

            if old_account_id == cmd.account_id {
                let combined = new_delta.checked_sub(old_delta).ok_or_else(|| {
                    EngineError::ConstraintViolation("balance overflow".to_string())
                })?;
                if !combined.is_zero() {
                    self.apply_balance_delta(&db_tx, cmd.account_id, &cmd.user_id, combined)
                        .await?;
                }
            } else {
                self.apply_balance_delta(&db_tx, old_account_id, &cmd.user_id, -old_delta)
                    .await?;
                self.apply_balance_delta(&db_tx, cmd.account_id, &cmd.user_id, new_delta)
                    .await?;
            }

            let model = transactions::ActiveModel {
                id: ActiveValue::Set(cmd.transaction_id.to_string()),
                account_id: ActiveValue::Set(cmd.account_id.to_string()),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(cmd.amount.minor()),
                description: ActiveValue::Set(cmd.description.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            let mut splits_by_tx = self
                .load_splits(&db_tx, std::slice::from_ref(&model.id))
                .await?;
            let mut tx = Transaction::try_from(model)?;
            tx.splits = splits_by_tx
                .remove(&tx.id.to_string())
                .unwrap_or_default();
            Ok(tx)
        })
    }

    /// Replaces a transaction's full category allocation.
    ///
    /// Always delete-all-then-insert, never a partial merge; the account
    /// balance is not touched since splits are budget-tracking metadata.
    pub async fn replace_transaction_splits(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        drafts: Vec<SplitDraft>,
    ) -> ResultEngine<Transaction> {
        validate_splits(&drafts)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            for draft in &drafts {
                self.require_referenced_category(&db_tx, draft.category_id, user_id)
                    .await?;
            }

            splits::Entity::delete_many()
                .filter(splits::Column::TransactionId.eq(transaction_id.to_string()))
                .exec(&db_tx)
                .await?;

            let mut tx = Transaction::try_from(model)?;
            for draft in &drafts {
                let split = CategorySplit::new(transaction_id, draft.category_id, draft.amount);
                splits::ActiveModel::from(&split).insert(&db_tx).await?;
                tx.splits.push(split);
            }
            Ok(tx)
        })
    }

    /// Deletes a transaction, reversing its balance effect.
    ///
    /// Symmetric with create: the signed delta is undone through the ledger,
    /// then the splits and the row are removed, all in one transactional
    /// unit.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            let account_id = parse_uuid(&model.account_id, "account")?;
            let kind = TransactionKind::try_from(model.kind.as_str())?;
            let delta = kind.signed(Money::new(model.amount_minor));

            self.apply_balance_delta(&db_tx, account_id, user_id, -delta)
                .await?;

            splits::Entity::delete_many()
                .filter(splits::Column::TransactionId.eq(transaction_id.to_string()))
                .exec(&db_tx)
                .await?;
            transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn load_splits(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_ids: &[String],
    ) -> ResultEngine<HashMap<String, Vec<CategorySplit>>> {
        if transaction_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models: Vec<splits::Model> = splits::Entity::find()
            .filter(splits::Column::TransactionId.is_in(transaction_ids.iter().cloned()))
            .all(db_tx)
            .await?;

        let mut grouped: HashMap<String, Vec<CategorySplit>> = HashMap::new();
        for model in models {
            let key = model.transaction_id.clone();
            grouped
                .entry(key)
                .or_default()
                .push(CategorySplit::try_from(model)?);
        }
        Ok(grouped)
    }
}
