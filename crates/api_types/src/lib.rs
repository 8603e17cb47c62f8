//! Request/response types shared by the server and its clients.
//!
//! Amounts cross the wire as integer **minor units** (`*_minor` fields);
//! clients format them for display. Ids are UUIDs serialized as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency of an account. Closed set; there is no conversion between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ron,
    Usd,
    Eur,
    Gbp,
}

/// Kind of a transaction; determines the sign applied to the account balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub currency: Currency,
        /// Opening balance in minor units; must not be negative.
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNameUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalanceUpdate {
        pub balance_minor: i64,
    }

    /// Body of an account delete: where its transactions move to.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountDelete {
        pub replacement_account_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub currency: Currency,
        pub balance_minor: i64,
        pub balance_updated_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNameUpdate {
        pub name: String,
    }

    /// Body of a category delete: where its splits move to.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDelete {
        pub replacement_category_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod transaction {
    use super::*;

    /// One category allocation line.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub category_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: String,
        /// At least one split is required.
        pub categories: Vec<SplitNew>,
    }

    /// Full replacement of a transaction's account, kind, amount and
    /// description. Splits are updated separately.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: String,
    }

    /// Full replacement of a transaction's category allocation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCategoriesUpdate {
        pub categories: Vec<SplitNew>,
    }

    /// Page selector: 1-indexed, defaults page=1 limit=10.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub category_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub categories: Vec<SplitView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category_id: Uuid,
        pub amount_available_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetAmountUpdate {
        pub amount_available_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub amount_available_minor: i64,
        /// Live aggregate over the category's splits; never stored.
        pub amount_spent_minor: i64,
    }
}
