//! Command structs for engine write operations.
//!
//! These types group parameters for transaction writes, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{Money, TransactionKind};

/// One category allocation line of a transaction.
#[derive(Clone, Copy, Debug)]
pub struct SplitDraft {
    pub category_id: Uuid,
    pub amount: Money,
}

impl SplitDraft {
    #[must_use]
    pub fn new(category_id: Uuid, amount: Money) -> Self {
        Self {
            category_id,
            amount,
        }
    }
}

/// Create a transaction with its category splits.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub splits: Vec<SplitDraft>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        kind: TransactionKind,
        amount: Money,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            kind,
            amount,
            description: String::new(),
            splits: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn split(mut self, category_id: Uuid, amount: Money) -> Self {
        self.splits.push(SplitDraft::new(category_id, amount));
        self
    }
}

/// Replace an existing transaction's account, kind, amount and description.
///
/// Splits are untouched; use `Engine::replace_transaction_splits` for the
/// category allocation.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        transaction_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: Money,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            account_id,
            kind,
            amount,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
