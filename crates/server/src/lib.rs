use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod server;
mod transactions;
mod user;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InvalidReference(_)
        | EngineError::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

// DTO <-> engine mappings. api_types deliberately has no engine dependency,
// so the enum bridging lives here.

fn engine_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Ron => engine::Currency::Ron,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Gbp => engine::Currency::Gbp,
    }
}

fn api_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Ron => api_types::Currency::Ron,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Gbp => api_types::Currency::Gbp,
    }
}

fn engine_kind(kind: api_types::TransactionKind) -> engine::TransactionKind {
    match kind {
        api_types::TransactionKind::Income => engine::TransactionKind::Income,
        api_types::TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}

fn api_kind(kind: engine::TransactionKind) -> api_types::TransactionKind {
    match kind {
        engine::TransactionKind::Income => api_types::TransactionKind::Income,
        engine::TransactionKind::Expense => api_types::TransactionKind::Expense,
    }
}

fn account_view(account: engine::Account) -> api_types::account::AccountView {
    api_types::account::AccountView {
        id: account.id,
        name: account.name,
        currency: api_currency(account.currency),
        balance_minor: account.balance.minor(),
        balance_updated_at: account.balance_updated_at,
    }
}

fn category_view(category: engine::Category) -> api_types::category::CategoryView {
    api_types::category::CategoryView {
        id: category.id,
        name: category.name,
    }
}

fn transaction_view(tx: engine::Transaction) -> api_types::transaction::TransactionView {
    api_types::transaction::TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        kind: api_kind(tx.kind),
        amount_minor: tx.amount.minor(),
        description: tx.description,
        created_at: tx.created_at,
        categories: tx
            .splits
            .into_iter()
            .map(|split| api_types::transaction::SplitView {
                category_id: split.category_id,
                amount_minor: split.amount.minor(),
            })
            .collect(),
    }
}

fn budget_view(status: engine::BudgetStatus) -> api_types::budget::BudgetView {
    api_types::budget::BudgetView {
        id: status.budget.id,
        category_id: status.budget.category_id,
        amount_available_minor: status.budget.amount_available.minor(),
        amount_spent_minor: status.amount_spent.minor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_insufficient_funds_maps_to_400() {
        let res =
            ServerError::from(EngineError::InsufficientFunds("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_invalid_reference_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidReference("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_constraint_violation_maps_to_400() {
        let res =
            ServerError::from(EngineError::ConstraintViolation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_is_opaque_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "secret detail".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
