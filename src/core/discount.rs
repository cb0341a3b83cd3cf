//! Discount business logic - Handles all discount-related operations.
//!
//! Dates arrive as raw form strings and are parsed here so that a malformed date is a
//! validation error rather than a silently defaulted value. Reads always come back as
//! [`DiscountView`]s whose status is derived for the requested day.

use crate::{
    core::{category::get_category_by_id, status},
    entities::{
        Discount,
        discount::{self, TargetType},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const ENTITY: &str = "discount";

/// Discount fields as submitted by the dashboard form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    /// Display name
    pub name: String,
    /// Percent off, 0 to 100
    pub percentage: f64,
    /// Product or category selection mode
    pub target_type: TargetType,
    /// Required when `target_type` is `product`
    #[serde(default)]
    pub product_id: Option<i64>,
    /// Required when `target_type` is `category`
    #[serde(default)]
    pub category_id: Option<i64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<String>,
}

struct ValidDiscount {
    name: String,
    percentage: f64,
    target_type: TargetType,
    product_id: Option<i64>,
    category_id: Option<i64>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// A discount together with its status on a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountView {
    /// Stored record
    #[serde(flatten)]
    pub discount: discount::Model,
    /// "Active", "Inactive" or "Future Plan"
    pub status: &'static str,
}

impl DiscountView {
    /// Derives the status of `discount` on `today`.
    #[must_use]
    pub fn at(discount: discount::Model, today: NaiveDate) -> Self {
        let status = status::derive_status(today, discount.start_date, discount.end_date);
        Self {
            discount,
            status: status.discount_label(),
        }
    }
}

/// Validates a percentage reduction.
///
/// # Errors
/// Returns [`Error::Validation`] unless `percentage` is finite and within 0 to 100.
pub fn validate_percentage(percentage: f64) -> Result<()> {
    if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
        return Err(Error::validation(format!(
            "Percentage must be between 0 and 100, got {percentage}"
        )));
    }
    Ok(())
}

/// Applies a percentage reduction to `price`, rounded to cents.
#[must_use]
pub fn discounted_price(price: f64, percentage: f64) -> f64 {
    let percentage = percentage.clamp(0.0, 100.0);
    (price * (100.0 - percentage)).round() / 100.0
}

async fn validate<C>(db: &C, input: &DiscountInput) -> Result<ValidDiscount>
where
    C: ConnectionTrait,
{
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Discount name cannot be empty"));
    }
    validate_percentage(input.percentage)?;

    let start_date = status::parse_required_date("startDate", input.start_date.as_deref())?;
    let end_date = status::parse_required_date("endDate", input.end_date.as_deref())?;
    status::validate_date_range(start_date, end_date)?;

    let (product_id, category_id) = match input.target_type {
        TargetType::Product => {
            let product_id = input
                .product_id
                .ok_or_else(|| Error::validation("A product must be selected"))?;
            (Some(product_id), None)
        }
        TargetType::Category => {
            let category_id = input
                .category_id
                .ok_or_else(|| Error::validation("A category must be selected"))?;
            if get_category_by_id(db, category_id).await?.is_none() {
                return Err(Error::validation(format!(
                    "Category {category_id} does not exist"
                )));
            }
            (None, Some(category_id))
        }
    };

    Ok(ValidDiscount {
        name: name.to_string(),
        percentage: input.percentage,
        target_type: input.target_type,
        product_id,
        category_id,
        start_date,
        end_date,
    })
}

/// Lists every discount, newest start date first, with status derived for `today`.
pub async fn list_discounts(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<DiscountView>> {
    let discounts = Discount::find()
        .order_by_desc(discount::Column::StartDate)
        .order_by_asc(discount::Column::Name)
        .all(db)
        .await?;

    Ok(discounts
        .into_iter()
        .map(|discount| DiscountView::at(discount, today))
        .collect())
}

/// Fetches one discount with status derived for `today`.
///
/// # Errors
/// Returns [`Error::NotFound`] when no discount has `discount_id`.
pub async fn get_discount(
    db: &DatabaseConnection,
    discount_id: i64,
    today: NaiveDate,
) -> Result<DiscountView> {
    Discount::find_by_id(discount_id)
        .one(db)
        .await?
        .map(|discount| DiscountView::at(discount, today))
        .ok_or_else(|| Error::not_found(ENTITY, discount_id))
}

/// Discounts that currently apply to a product, directly or through its category.
pub async fn applicable_discounts(
    db: &DatabaseConnection,
    product_id: i64,
    category_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<DiscountView>> {
    let mut target = Condition::any().add(
        Condition::all()
            .add(discount::Column::TargetType.eq(TargetType::Product))
            .add(discount::Column::ProductId.eq(product_id)),
    );
    if let Some(category_id) = category_id {
        target = target.add(
            Condition::all()
                .add(discount::Column::TargetType.eq(TargetType::Category))
                .add(discount::Column::CategoryId.eq(category_id)),
        );
    }

    let discounts = Discount::find()
        .filter(target)
        .filter(discount::Column::StartDate.lte(today))
        .filter(discount::Column::EndDate.gte(today))
        .order_by_desc(discount::Column::Percentage)
        .all(db)
        .await?;

    Ok(discounts
        .into_iter()
        .map(|discount| DiscountView::at(discount, today))
        .collect())
}

/// Creates a discount from form input.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name, out-of-range percentage, missing or
/// malformed dates, an inverted date range, or a missing/unknown target.
#[instrument(skip(db))]
pub async fn create_discount(
    db: &DatabaseConnection,
    input: &DiscountInput,
) -> Result<discount::Model> {
    let valid = validate(db, input).await?;
    let now = chrono::Utc::now().naive_utc();

    let discount = discount::ActiveModel {
        name: Set(valid.name),
        percentage: Set(valid.percentage),
        target_type: Set(valid.target_type),
        product_id: Set(valid.product_id),
        category_id: Set(valid.category_id),
        start_date: Set(valid.start_date),
        end_date: Set(valid.end_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = discount.insert(db).await?;
    info!(discount_id = created.id, "Created discount '{}'", created.name);
    Ok(created)
}

/// Replaces every editable field of a discount.
///
/// # Errors
/// Same validation as [`create_discount`], plus [`Error::NotFound`] for an unknown id.
#[instrument(skip(db))]
pub async fn update_discount(
    db: &DatabaseConnection,
    discount_id: i64,
    input: &DiscountInput,
) -> Result<discount::Model> {
    let mut discount: discount::ActiveModel = Discount::find_by_id(discount_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, discount_id))?
        .into();

    let valid = validate(db, input).await?;

    discount.name = Set(valid.name);
    discount.percentage = Set(valid.percentage);
    discount.target_type = Set(valid.target_type);
    discount.product_id = Set(valid.product_id);
    discount.category_id = Set(valid.category_id);
    discount.start_date = Set(valid.start_date);
    discount.end_date = Set(valid.end_date);
    discount.updated_at = Set(chrono::Utc::now().naive_utc());

    discount.update(db).await.map_err(Into::into)
}

/// Permanently deletes a discount.
///
/// # Errors
/// Returns [`Error::NotFound`] when no discount has `discount_id`.
#[instrument(skip(db))]
pub async fn delete_discount(db: &DatabaseConnection, discount_id: i64) -> Result<()> {
    let result = Discount::delete_by_id(discount_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(ENTITY, discount_id));
    }
    info!(discount_id, "Deleted discount");
    Ok(())
}
