//! Health check and the status preview used by promotion forms.

use crate::{
    api::extract::ApiQuery,
    core::status::{self, PromotionStatus},
    errors::Result,
};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Responds with `{"status":"ok"}`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Raw dates as typed into a form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    /// `YYYY-MM-DD`
    pub start: Option<String>,
    /// `YYYY-MM-DD`
    pub end: Option<String>,
    /// Defaults to the current date
    pub today: Option<String>,
}

/// Status badge data for a date range.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Lifecycle status
    pub status: PromotionStatus,
    /// Label used on discount screens
    pub discount_label: &'static str,
    /// Label used on coupon screens
    pub coupon_label: &'static str,
}

/// Derives a status for the dates in the query string.
pub async fn derive_status(ApiQuery(query): ApiQuery<StatusQuery>) -> Result<Json<StatusResponse>> {
    let status = status::derive_status_from_input(
        query.today.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
    )?;

    Ok(Json(StatusResponse {
        status,
        discount_label: status.discount_label(),
        coupon_label: status.coupon_label(),
    }))
}
