//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{Category, Coupon, Discount, Inventory};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Default database location, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Uses `IF NOT EXISTS` so that restarting against an existing database file is a no-op.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut discount_table = schema.create_table_from_entity(Discount);
    let mut coupon_table = schema.create_table_from_entity(Coupon);
    let mut inventory_table = schema.create_table_from_entity(Inventory);

    db.execute(builder.build(category_table.if_not_exists()))
        .await?;
    db.execute(builder.build(discount_table.if_not_exists()))
        .await?;
    db.execute(builder.build(coupon_table.if_not_exists()))
        .await?;
    db.execute(builder.build(inventory_table.if_not_exists()))
        .await?;

    info!("Database tables ready");
    Ok(())
}

/// Connects to `database_url` and ensures the schema exists.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection> {
    let db = create_connection(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}
