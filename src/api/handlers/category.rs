//! Category endpoints.

use crate::{
    api::{AppState, extract::{ApiJson, ApiPath}},
    core::category,
    entities::category::Model,
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

/// Request body for create and update.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// Category name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /api/categories`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Model>>> {
    Ok(Json(
        category::get_all_active_categories(&state.database).await?,
    ))
}

/// `GET /api/categories/:id`
pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Model>> {
    category::get_category_by_id(&state.database, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("category", id))
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<Model>)> {
    let created =
        category::create_category(&state.database, &request.name, request.description).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/categories/:id`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<Json<Model>> {
    let updated =
        category::update_category(&state.database, id, &request.name, request.description)
            .await?;
    Ok(Json(updated))
}

/// `DELETE /api/categories/:id`
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    category::delete_category(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
