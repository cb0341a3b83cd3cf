//! Inventory entity - The stock ledger of one product.
//!
//! The three counter maps are stored as JSON documents. `version` is bumped on every
//! stock adjustment and used as a compare-and-swap guard so concurrent adjustments
//! cannot silently overwrite each other.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantity per label (size or color).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StockCounts(pub BTreeMap<String, i64>);

/// Quantity per color, then per size.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StockGrid(pub BTreeMap<String, BTreeMap<String, i64>>);

/// Free-form markers attached to the record, e.g. `"new"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Tags(pub Vec<String>);

/// Stock label displayed on the inventory screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InventoryStatus {
    /// Total stock above zero
    #[sea_orm(string_value = "In Stock")]
    #[serde(rename = "In Stock")]
    InStock,
    /// Total stock exactly zero
    #[sea_orm(string_value = "Out Of Stock")]
    #[serde(rename = "Out Of Stock")]
    OutOfStock,
    /// Freshly created record that has not been adjusted yet
    #[sea_orm(string_value = "Newly Added")]
    #[serde(rename = "Newly Added")]
    NewlyAdded,
}

/// Inventory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product; one ledger per product
    #[sea_orm(unique)]
    pub product_id: i64,
    /// Product name, denormalised for listing
    pub product_name: String,
    /// Total units available
    pub stock: i64,
    /// Units per size label
    #[sea_orm(column_type = "Json")]
    pub size_stock: StockCounts,
    /// Units per color label
    #[sea_orm(column_type = "Json")]
    pub color_stock: StockCounts,
    /// Units per color and size
    #[sea_orm(column_type = "Json")]
    pub color_size_stock: StockGrid,
    /// Markers driving the `Newly Added` state
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    /// Derived stock label
    pub status: InventoryStatus,
    /// Optimistic concurrency counter
    pub version: i32,
    /// When the record was created
    pub created_at: DateTime,
    /// When the record was last modified
    pub updated_at: DateTime,
}

/// Inventory references its product by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
