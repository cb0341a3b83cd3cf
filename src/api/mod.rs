//! HTTP layer - JSON endpoints consumed by the admin dashboard.
//!
//! Handlers stay thin: they parse the request, call into [`crate::core`], and let
//! [`crate::errors::Error`] turn failures into status codes (see [`error`]).

/// Error to HTTP response mapping
pub mod error;
/// Extractors that report rejections through the crate error type
pub mod extract;
/// Route handlers grouped by resource
pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared data available to all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Retries for contended stock adjustments
    pub max_adjust_retries: u32,
}

impl AppState {
    /// Creates a new `AppState` with the given database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection, max_adjust_retries: u32) -> Self {
        Self {
            database,
            max_adjust_retries,
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    use handlers::{category, coupon, discount, general, inventory};

    Router::new()
        .route("/health", get(general::health))
        .route("/api/status", get(general::derive_status))
        .route(
            "/api/categories",
            get(category::list).post(category::create),
        )
        .route(
            "/api/categories/:id",
            get(category::show)
                .put(category::update)
                .delete(category::delete),
        )
        .route(
            "/api/discounts",
            get(discount::list).post(discount::create),
        )
        .route(
            "/api/discounts/:id",
            get(discount::show)
                .put(discount::update)
                .delete(discount::delete),
        )
        .route("/api/coupons", get(coupon::list).post(coupon::create))
        .route("/api/coupons/redeem", post(coupon::redeem))
        .route(
            "/api/coupons/:id",
            get(coupon::show).put(coupon::update).delete(coupon::delete),
        )
        .route(
            "/api/inventory",
            get(inventory::list).post(inventory::create),
        )
        .route("/api/inventory/:id", get(inventory::show))
        .route("/api/inventory/:id/adjustments", post(inventory::adjust))
        .route(
            "/api/inventory/:id/reconciliation",
            get(inventory::reconciliation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::Result, test_utils::setup_test_db};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Result<Router> {
        let db = setup_test_db().await?;
        Ok(router(AppState::new(db, 3)))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let app = test_app().await?;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_preview() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = send(
            &app,
            "GET",
            "/api/status?start=2024-06-01&end=2024-06-30&today=2024-05-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountLabel"], "Future Plan");
        assert_eq!(body["couponLabel"], "Future");

        let (status, body) = send(&app, "GET", "/api/status?start=2024-06-01&end=soon", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("endDate"));

        Ok(())
    }

    #[tokio::test]
    async fn test_inventory_adjustment_flow() -> Result<()> {
        let app = test_app().await?;

        let (status, created) = send(
            &app,
            "POST",
            "/api/inventory",
            Some(json!({
                "productId": 1,
                "productName": "Linen shirt",
                "stock": 10,
                "sizeStock": { "M": 5 },
                "colorStock": { "Red": 5 },
                "colorSizeStock": { "Red": { "M": 5 } },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "In Stock");
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            "POST",
            &format!("/api/inventory/{id}/adjustments"),
            Some(json!({ "delta": 3, "size": "M", "color": "Red" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["stock"], 13);
        assert_eq!(updated["colorSizeStock"]["Red"]["M"], 8);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/inventory/{id}/adjustments"),
            Some(json!({ "delta": -9, "size": "M", "color": "Red" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Size M stock cannot be reduced below zero!");
        assert_eq!(body["dimension"]["kind"], "size");

        let (status, unchanged) = send(&app, "GET", &format!("/api/inventory/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unchanged, updated);

        let (status, issues) = send(
            &app,
            "GET",
            &format!("/api/inventory/{id}/reconciliation"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(issues, json!([]));

        let (status, _) = send(
            &app,
            "POST",
            "/api/inventory/999/adjustments",
            Some(json!({ "delta": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_requests_are_json_validation_errors() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = send(
            &app,
            "POST",
            "/api/inventory/1/adjustments",
            Some(json!({ "delta": "abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("delta"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/discounts",
            Some(json!({ "name": "Summer", "targetType": "product", "productId": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("percentage"));

        let (status, body) = send(&app, "GET", "/api/inventory/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "GET", "/api/coupons?today=2024-13-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("today"));

        Ok(())
    }

    #[tokio::test]
    async fn test_discount_endpoints() -> Result<()> {
        let app = test_app().await?;

        let (status, _) = send(
            &app,
            "POST",
            "/api/discounts",
            Some(json!({
                "name": "Summer",
                "percentage": 20.0,
                "targetType": "product",
                "productId": 7,
                "startDate": "2024-06-01",
                "endDate": "not a date",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = send(
            &app,
            "POST",
            "/api/discounts",
            Some(json!({
                "name": "Summer",
                "percentage": 20.0,
                "targetType": "product",
                "productId": 7,
                "startDate": "2024-06-01",
                "endDate": "2024-06-30",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/discounts/{id}?today=2024-07-01"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Inactive");
        assert_eq!(body["startDate"], "2024-06-01");

        let (status, _) = send(&app, "DELETE", &format!("/api/discounts/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &format!("/api/discounts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_and_category_endpoints() -> Result<()> {
        let app = test_app().await?;

        let (status, category) = send(
            &app,
            "POST",
            "/api/categories",
            Some(json!({ "name": "Shoes" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/categories",
            Some(json!({ "name": "Shoes" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, coupon) = send(
            &app,
            "POST",
            "/api/coupons",
            Some(json!({
                "code": "shoes10",
                "discountType": "percentage",
                "discount": 10.0,
                "scope": "category",
                "categoryId": category["id"],
                "startDate": "2024-06-01",
                "endDate": "2024-06-30",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(coupon["code"], "SHOES10");

        let (status, body) = send(
            &app,
            "POST",
            "/api/coupons/redeem?today=2024-06-10",
            Some(json!({ "code": "SHOES10", "orderTotal": 50.0, "categoryIds": [category["id"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["discountAmount"], 5.0);

        let (status, _) = send(
            &app,
            "POST",
            "/api/coupons/redeem?today=2024-05-10",
            Some(json!({ "code": "SHOES10", "orderTotal": 50.0, "categoryIds": [category["id"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&app, "GET", "/api/coupons?today=2024-06-10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["usageCount"], 1);
        assert_eq!(body[0]["status"], "Active");

        Ok(())
    }
}
