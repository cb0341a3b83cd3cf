//! Discount endpoints. Every response carries a status derived at request time.

use super::TodayQuery;
use crate::{
    api::{AppState, extract::{ApiJson, ApiPath, ApiQuery}},
    core::{
        discount::{self, DiscountInput, DiscountView},
        status,
    },
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

/// `GET /api/discounts[?today=]`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> Result<Json<Vec<DiscountView>>> {
    let today = query.resolve()?;
    Ok(Json(discount::list_discounts(&state.database, today).await?))
}

/// `GET /api/discounts/:id[?today=]`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> Result<Json<DiscountView>> {
    let today = query.resolve()?;
    Ok(Json(discount::get_discount(&state.database, id, today).await?))
}

/// `POST /api/discounts`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<DiscountInput>,
) -> Result<(StatusCode, Json<DiscountView>)> {
    let created = discount::create_discount(&state.database, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DiscountView::at(created, status::today())),
    ))
}

/// `PUT /api/discounts/:id`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<DiscountInput>,
) -> Result<Json<DiscountView>> {
    let updated = discount::update_discount(&state.database, id, &input).await?;
    Ok(Json(DiscountView::at(updated, status::today())))
}

/// `DELETE /api/discounts/:id`
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    discount::delete_discount(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
