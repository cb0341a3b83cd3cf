//! Discount entity - Percentage reductions applied to a product or a category
//! for a calendar date range.
//!
//! The lifecycle status is deliberately absent: it depends on the current date and
//! is derived on every read by [`crate::core::status`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a discount applies to. Exactly one of `product_id` / `category_id` is set,
/// matching this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// A single product
    #[sea_orm(string_value = "product")]
    Product,
    /// Every product in a category
    #[sea_orm(string_value = "category")]
    Category,
}

/// Discount database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    /// Unique identifier for the discount
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Summer Sale")
    pub name: String,
    /// Reduction in percent, 0 to 100
    pub percentage: f64,
    /// Selection mode for the target
    pub target_type: TargetType,
    /// Target product when `target_type` is `Product`
    pub product_id: Option<i64>,
    /// Target category when `target_type` is `Category`
    pub category_id: Option<i64>,
    /// First day the discount applies (inclusive)
    pub start_date: Date,
    /// Last day the discount applies (inclusive)
    pub end_date: Date,
    /// When the discount was created
    pub created_at: DateTime,
    /// When the discount was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Discount and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Category-scoped discounts belong to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
