//! Budget API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::budget::{BudgetAmountUpdate, BudgetNew, BudgetView};
use engine::Money;

use crate::{ServerError, budget_view, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.budgets(&user.username).await?;
    Ok(Json(budgets.into_iter().map(budget_view).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let status = state
        .engine
        .new_budget(
            &user.username,
            payload.category_id,
            Money::new(payload.amount_available_minor),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(budget_view(status))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let status = state.engine.budget(id, &user.username).await?;
    Ok(Json(budget_view(status)))
}

pub async fn set_amount(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetAmountUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let status = state
        .engine
        .set_budget_amount(id, &user.username, Money::new(payload.amount_available_minor))
        .await?;
    Ok(Json(budget_view(status)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
