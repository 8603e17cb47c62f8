//! Category API endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::category::{CategoryDelete, CategoryNameUpdate, CategoryNew, CategoryView};

use crate::{ServerError, category_view, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.categories(&user.username).await?;
    Ok(Json(categories.into_iter().map(category_view).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .new_category(&user.username, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(category_view(category))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id, &user.username).await?;
    Ok(Json(category_view(category)))
}

pub async fn rename(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryNameUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .rename_category(id, &user.username, &payload.name)
        .await?;
    Ok(Json(category_view(category)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryDelete>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_category(id, payload.replacement_category_id, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
