use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, accounts};

use super::Engine;

/// Upper bound on compare-and-swap retries for a single balance write.
///
/// A conflict means another transaction moved the balance between our read
/// and our guarded write; under SQLite the database-level lock makes this
/// unreachable, under stricter backends a couple of retries absorb it.
const BALANCE_CAS_ATTEMPTS: u32 = 3;

impl Engine {
    /// Applies a signed delta to an account balance.
    ///
    /// This is the **only** balance mutation path in the engine: every
    /// transaction write, reversal, and relocation funnels through here so
    /// the balance invariant stays centralized.
    ///
    /// Reads the owned account row, computes `balance + delta`, rejects the
    /// write with `InsufficientFunds` if the result is negative, and persists
    /// the new balance plus a fresh `balance_updated_at` guarded by a
    /// compare-and-swap on the observed balance. Must be called inside the
    /// surrounding operation's DB transaction so the balance write commits or
    /// rolls back together with the rows that caused it.
    pub(super) async fn apply_balance_delta(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
        delta: Money,
    ) -> ResultEngine<Money> {
        for _ in 0..BALANCE_CAS_ATTEMPTS {
            let model = self.require_account(db_tx, account_id, user_id).await?;
            let observed = Money::new(model.balance_minor);
            let new_balance = observed.checked_add(delta).ok_or_else(|| {
                EngineError::ConstraintViolation("balance overflow".to_string())
            })?;
            if new_balance.is_negative() {
                return Err(EngineError::InsufficientFunds(model.name));
            }

            let result = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::BalanceMinor,
                    Expr::value(new_balance.minor()),
                )
                .col_expr(accounts::Column::BalanceUpdatedAt, Expr::value(Utc::now()))
                .filter(accounts::Column::Id.eq(account_id.to_string()))
                .filter(accounts::Column::BalanceMinor.eq(observed.minor()))
                .exec(db_tx)
                .await?;
            if result.rows_affected == 1 {
                return Ok(new_balance);
            }
        }

        Err(EngineError::Database(DbErr::Custom(format!(
            "balance update conflict on account {account_id}"
        ))))
    }
}
