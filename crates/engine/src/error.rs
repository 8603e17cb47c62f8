//! The module contains the errors the engine can return.
//!
//! Every failure a caller can act on is classified into one of the variants
//! below; raw database errors are wrapped in [`Database`] and never carry
//! storage details past this boundary.
//!
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The entity is absent or belongs to another user.
    #[error("not found: {0}")]
    NotFound(String),
    /// The operation would drive an account balance below zero.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// A referenced or replacement entity does not exist or belongs to
    /// another user.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    /// Input violates a domain constraint (non-positive amount, empty split
    /// set, duplicate name, ...).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::ConstraintViolation(a), Self::ConstraintViolation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
