//! Coupon endpoints.

use super::TodayQuery;
use crate::{
    api::{AppState, extract::{ApiJson, ApiPath, ApiQuery}},
    core::{
        coupon::{self, CouponInput, CouponView, Redemption, RedemptionRequest},
        status,
    },
    errors::Result,
};
use axum::{Json, extract::State, http::StatusCode};

/// `GET /api/coupons[?today=]`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> Result<Json<Vec<CouponView>>> {
    let today = query.resolve()?;
    Ok(Json(coupon::list_coupons(&state.database, today).await?))
}

/// `GET /api/coupons/:id[?today=]`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> Result<Json<CouponView>> {
    let today = query.resolve()?;
    Ok(Json(coupon::get_coupon(&state.database, id, today).await?))
}

/// `POST /api/coupons`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CouponInput>,
) -> Result<(StatusCode, Json<CouponView>)> {
    let created = coupon::create_coupon(&state.database, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CouponView::at(created, status::today())),
    ))
}

/// `PUT /api/coupons/:id`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<CouponInput>,
) -> Result<Json<CouponView>> {
    let updated = coupon::update_coupon(&state.database, id, &input).await?;
    Ok(Json(CouponView::at(updated, status::today())))
}

/// `DELETE /api/coupons/:id`
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    coupon::delete_coupon(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/coupons/redeem[?today=]`
pub async fn redeem(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TodayQuery>,
    ApiJson(request): ApiJson<RedemptionRequest>,
) -> Result<Json<Redemption>> {
    let today = query.resolve()?;
    Ok(Json(
        coupon::redeem_coupon(&state.database, &request, today).await?,
    ))
}
