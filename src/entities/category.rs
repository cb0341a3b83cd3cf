//! Category entity - Product categories that discounts and coupons can target.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Shoes"), unique across the catalogue
    #[sea_orm(unique)]
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Soft delete flag - if true, category is hidden but references stay valid
    pub is_deleted: bool,
    /// When the category was created
    pub created_at: DateTime,
    /// When the category was last modified
    pub updated_at: DateTime,
}

/// Categories are referenced by id only; no declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
