//! Category business logic - Handles all category-related operations.
//!
//! Categories are soft-deleted so that discounts and coupons referencing them keep
//! pointing at a real row.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

const ENTITY: &str = "category";

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }
    Ok(name.to_string())
}

async fn ensure_unique_name<C>(db: &C, name: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Category::find().filter(category::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(category::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::Conflict {
            entity: ENTITY,
            id: name.to_string(),
        });
    }
    Ok(())
}

/// Retrieves all active (non-deleted) categories, ordered alphabetically by name.
pub async fn get_all_active_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::IsDeleted.eq(false))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an active category by id.
pub async fn get_category_by_id<C>(db: &C, category_id: i64) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by exact name, including soft-deleted ones.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category after validating the name.
///
/// # Errors
/// - [`Error::Validation`] for an empty name
/// - [`Error::Conflict`] when the name is already taken
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    description: Option<String>,
) -> Result<category::Model> {
    let name = validate_name(name)?;
    ensure_unique_name(db, &name, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let category = category::ActiveModel {
        name: Set(name),
        description: Set(description),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = category.insert(db).await?;
    info!(category_id = created.id, "Created category '{}'", created.name);
    Ok(created)
}

/// Renames a category and replaces its description.
///
/// # Errors
/// - [`Error::Validation`] for an empty name
/// - [`Error::NotFound`] when the category is missing or deleted
/// - [`Error::Conflict`] when another category already has the name
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    name: &str,
    description: Option<String>,
) -> Result<category::Model> {
    let name = validate_name(name)?;

    let mut category: category::ActiveModel = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, category_id))?
        .into();

    ensure_unique_name(db, &name, Some(category_id)).await?;

    category.name = Set(name);
    category.description = Set(description);
    category.updated_at = Set(chrono::Utc::now().naive_utc());

    category.update(db).await.map_err(Into::into)
}

/// Soft deletes a category.
///
/// # Errors
/// Returns [`Error::NotFound`] when the category is missing or already deleted.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<category::Model> {
    let mut category: category::ActiveModel = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, category_id))?
        .into();

    category.is_deleted = Set(true);
    category.updated_at = Set(chrono::Utc::now().naive_utc());

    let deleted = category.update(db).await?;
    info!(category_id, "Soft-deleted category");
    Ok(deleted)
}

/// Inserts every configured category whose name is not present yet.
///
/// Returns the number of categories created; running it twice creates nothing new.
pub async fn seed_categories(
    db: &DatabaseConnection,
    seeds: &[crate::config::settings::CategoryConfig],
) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if get_category_by_name(db, &seed.name).await?.is_some() {
            continue;
        }
        create_category(db, &seed.name, seed.description.clone()).await?;
        created += 1;
    }
    Ok(created)
}
