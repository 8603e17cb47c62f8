//! Ledger consistency engine.
//!
//! The engine owns the rules that keep account balances, transaction
//! category-splits and budget spend totals mutually consistent:
//!
//! - an account's stored balance always equals its opening balance plus the
//!   signed sum of its transactions;
//! - deleting an account or category relocates dependent rows to a
//!   caller-supplied replacement instead of orphaning them;
//! - a budget's spend is a live aggregate over split rows, never a stored
//!   value.
//!
//! Every mutation runs inside a single database transaction and every error
//! is classified into an [`EngineError`] kind the HTTP layer can map to a
//! status code.

pub use accounts::Account;
pub use budgets::{Budget, BudgetStatus};
pub use categories::Category;
pub use commands::{CreateTransactionCmd, SplitDraft, UpdateTransactionCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, Page};
pub use splits::CategorySplit;
pub use transactions::{Transaction, TransactionKind};

mod accounts;
mod budgets;
mod categories;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
mod splits;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
