//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{category, coupon::CouponInput, discount::DiscountInput, inventory},
    entities::{
        self,
        coupon::{CouponScope, DiscountType},
        discount::TargetType,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a `YYYY-MM-DD` literal.
///
/// # Panics
/// Panics on a malformed literal; test input only.
#[allow(clippy::expect_used)]
#[must_use]
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date literal")
}

/// Creates a category with no description.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name, None).await
}

/// Discount input targeting a product for June 2024.
///
/// # Defaults
/// * `percentage`: 20
/// * dates: 2024-06-01 to 2024-06-30
#[must_use]
pub fn product_discount_input(name: &str, product_id: i64) -> DiscountInput {
    DiscountInput {
        name: name.to_string(),
        percentage: 20.0,
        target_type: TargetType::Product,
        product_id: Some(product_id),
        category_id: None,
        start_date: Some("2024-06-01".to_string()),
        end_date: Some("2024-06-30".to_string()),
    }
}

/// Discount input targeting a category for June 2024.
#[must_use]
pub fn category_discount_input(name: &str, category_id: i64) -> DiscountInput {
    DiscountInput {
        target_type: TargetType::Category,
        product_id: None,
        category_id: Some(category_id),
        ..product_discount_input(name, 0)
    }
}

/// General 10% coupon valid in June 2024.
///
/// # Defaults
/// * `usage_limit`: 2
/// * no minimum order amount
#[must_use]
pub fn general_coupon_input(code: &str) -> CouponInput {
    CouponInput {
        code: code.to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount: 10.0,
        scope: CouponScope::General,
        product_id: None,
        category_id: None,
        minimum_order_amount: None,
        usage_limit: Some(2),
        start_date: Some("2024-06-01".to_string()),
        end_date: Some("2024-06-30".to_string()),
    }
}

/// Inventory input with 10 units, 5 of which are tracked as Red / M.
#[must_use]
pub fn red_m_input(product_id: i64) -> inventory::InventoryInput {
    inventory::InventoryInput {
        product_id,
        product_name: format!("Product {product_id}"),
        stock: 10,
        size_stock: BTreeMap::from([("M".to_string(), 5)]),
        color_stock: BTreeMap::from([("Red".to_string(), 5)]),
        color_size_stock: BTreeMap::from([(
            "Red".to_string(),
            BTreeMap::from([("M".to_string(), 5)]),
        )]),
        tags: Vec::new(),
    }
}

/// Creates the [`red_m_input`] record.
pub async fn create_red_m_inventory(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<entities::inventory::Model> {
    inventory::create_inventory(db, &red_m_input(product_id)).await
}
