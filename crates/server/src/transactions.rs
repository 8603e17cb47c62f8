//! Transaction API endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::transaction::{
    SplitNew, TransactionCategoriesUpdate, TransactionListQuery, TransactionNew, TransactionUpdate,
    TransactionView,
};
use engine::{CreateTransactionCmd, Money, Page, SplitDraft, UpdateTransactionCmd};

use crate::{ServerError, engine_kind, server::ServerState, transaction_view, user};

fn split_drafts(splits: &[SplitNew]) -> Vec<SplitDraft> {
    splits
        .iter()
        .map(|split| SplitDraft::new(split.category_id, Money::new(split.amount_minor)))
        .collect()
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let default = Page::default();
    let page = Page {
        page: query.page.unwrap_or(default.page),
        limit: query.limit.unwrap_or(default.limit),
    };
    let transactions = state.engine.transactions(&user.username, page).await?;
    Ok(Json(
        transactions.into_iter().map(transaction_view).collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = CreateTransactionCmd::new(
        &user.username,
        payload.account_id,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
    )
    .description(payload.description);
    cmd.splits = split_drafts(&payload.categories);

    let tx = state.engine.new_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.username).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let cmd = UpdateTransactionCmd::new(
        &user.username,
        id,
        payload.account_id,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
    )
    .description(payload.description);

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update_categories(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionCategoriesUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .replace_transaction_splits(id, &user.username, split_drafts(&payload.categories))
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
