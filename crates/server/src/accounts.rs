//! Account API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::account::{
    AccountBalanceUpdate, AccountDelete, AccountNameUpdate, AccountNew, AccountView,
};
use engine::Money;

use crate::{ServerError, account_view, engine_currency, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.accounts(&user.username).await?;
    Ok(Json(accounts.into_iter().map(account_view).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .new_account(
            &user.username,
            &payload.name,
            engine_currency(payload.currency),
            Money::new(payload.balance_minor),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, &user.username).await?;
    Ok(Json(account_view(account)))
}

pub async fn rename(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountNameUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .rename_account(id, &user.username, &payload.name)
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn set_balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountBalanceUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .set_account_balance(id, &user.username, Money::new(payload.balance_minor))
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountDelete>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_account(id, payload.replacement_account_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
