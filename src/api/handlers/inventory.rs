//! Inventory endpoints. Stock changes are sent as deltas and validated server-side
//! against the stored record; clients never submit computed totals.

use crate::{
    api::{AppState, extract::{ApiJson, ApiPath}},
    core::{
        inventory::{self, InventoryInput},
        ledger::{ReconciliationIssue, StockAdjustment},
    },
    entities::inventory::Model,
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

/// `GET /api/inventory`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Model>>> {
    Ok(Json(inventory::list_inventory(&state.database).await?))
}

/// `GET /api/inventory/:id`
pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<Model>> {
    Ok(Json(inventory::get_inventory(&state.database, id).await?))
}

/// `POST /api/inventory`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<InventoryInput>,
) -> Result<(StatusCode, Json<Model>)> {
    let created = inventory::create_inventory(&state.database, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/inventory/:id/adjustments`
pub async fn adjust(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> Result<Json<Model>> {
    let updated = inventory::adjust_stock(
        &state.database,
        id,
        &adjustment,
        state.max_adjust_retries,
    )
    .await?;
    Ok(Json(updated))
}

/// `GET /api/inventory/:id/reconciliation`
pub async fn reconciliation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<ReconciliationIssue>>> {
    Ok(Json(inventory::reconciliation(&state.database, id).await?))
}
