//! Coupon entity - Code-redeemable discounts with eligibility and usage-limit rules.
//!
//! Like discounts, coupons carry no stored status; it is derived from the date range.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the `discount` value is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percent off the order total
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Fixed amount off the order total
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

/// Which orders the coupon is valid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CouponScope {
    /// Any order
    #[sea_orm(string_value = "general")]
    General,
    /// Orders containing `product_id`
    #[sea_orm(string_value = "product")]
    Product,
    /// Orders containing a product from `category_id`
    #[sea_orm(string_value = "category")]
    Category,
}

/// Coupon database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Redemption code, stored upper-case
    #[sea_orm(unique)]
    pub code: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Interpretation of `discount`
    pub discount_type: DiscountType,
    /// Percent (0 to 100) or fixed amount, depending on `discount_type`
    pub discount: f64,
    /// Eligibility scope
    pub scope: CouponScope,
    /// Required product when `scope` is `Product`
    pub product_id: Option<i64>,
    /// Required category when `scope` is `Category`
    pub category_id: Option<i64>,
    /// Orders below this total are not eligible
    pub minimum_order_amount: Option<f64>,
    /// Maximum number of redemptions, unlimited when `None`
    pub usage_limit: Option<i32>,
    /// Redemptions so far
    pub usage_count: i32,
    /// First day the coupon can be redeemed (inclusive)
    pub start_date: Date,
    /// Last day the coupon can be redeemed (inclusive)
    pub end_date: Date,
    /// When the coupon was created
    pub created_at: DateTime,
    /// When the coupon was last modified
    pub updated_at: DateTime,
}

/// Coupons reference products and categories by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
