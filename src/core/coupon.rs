//! Coupon business logic - Handles coupon management and redemption.
//!
//! Coupons share the date-driven lifecycle of discounts (with "Future" instead of
//! "Future Plan") and add eligibility rules: scope, minimum order amount and a usage
//! limit. Redemption runs in a transaction and bumps `usage_count` with a guarded
//! `UPDATE ... WHERE usage_count = <read value>`, so two concurrent redemptions cannot
//! both consume the last use.

use crate::{
    core::{
        category::get_category_by_id,
        discount::{discounted_price, validate_percentage},
        status::{self, PromotionStatus},
    },
    entities::{
        Coupon,
        coupon::{self, CouponScope, DiscountType},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

const ENTITY: &str = "coupon";

/// Coupon fields as submitted by the dashboard form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    /// Redemption code; trimmed and upper-cased before storage
    pub code: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Percentage or fixed amount
    pub discount_type: DiscountType,
    /// Percent (0 to 100) or amount
    pub discount: f64,
    /// Eligibility scope
    pub scope: CouponScope,
    /// Required when `scope` is `product`
    #[serde(default)]
    pub product_id: Option<i64>,
    /// Required when `scope` is `category`
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Minimum order total, if any
    #[serde(default)]
    pub minimum_order_amount: Option<f64>,
    /// Maximum redemptions, unlimited when absent
    #[serde(default)]
    pub usage_limit: Option<i32>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: Option<String>,
}

struct ValidCoupon {
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount: f64,
    scope: CouponScope,
    product_id: Option<i64>,
    category_id: Option<i64>,
    minimum_order_amount: Option<f64>,
    usage_limit: Option<i32>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// A coupon together with its status on a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponView {
    /// Stored record
    #[serde(flatten)]
    pub coupon: coupon::Model,
    /// "Active", "Inactive" or "Future"
    pub status: &'static str,
    /// Redemptions left, `None` when unlimited
    pub remaining_uses: Option<i32>,
}

impl CouponView {
    /// Derives the status of `coupon` on `today`.
    #[must_use]
    pub fn at(coupon: coupon::Model, today: NaiveDate) -> Self {
        let status = status::derive_status(today, coupon.start_date, coupon.end_date);
        let remaining_uses = coupon
            .usage_limit
            .map(|limit| (limit - coupon.usage_count).max(0));
        Self {
            coupon,
            status: status.coupon_label(),
            remaining_uses,
        }
    }
}

/// Order details needed to check coupon eligibility.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    /// Code as typed by the customer
    pub code: String,
    /// Order total before the coupon
    pub order_total: f64,
    /// Products in the order
    #[serde(default)]
    pub product_ids: Vec<i64>,
    /// Categories of the products in the order
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    /// Redeemed coupon
    pub coupon_id: i64,
    /// Normalised code
    pub code: String,
    /// Amount taken off the order
    pub discount_amount: f64,
    /// Order total after the coupon
    pub final_total: f64,
    /// Redemptions so far, including this one
    pub usage_count: i32,
}

/// Canonical form of a coupon code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Amount a coupon takes off `order_total`, never more than the total itself.
#[must_use]
pub fn discount_amount(discount_type: DiscountType, discount: f64, order_total: f64) -> f64 {
    let amount = match discount_type {
        DiscountType::Percentage => order_total - discounted_price(order_total, discount),
        DiscountType::Fixed => discount,
    };
    (amount.clamp(0.0, order_total) * 100.0).round() / 100.0
}

fn validate_amount(field: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative number, got {amount}"
        )));
    }
    Ok(())
}

async fn validate<C>(db: &C, input: &CouponInput) -> Result<ValidCoupon>
where
    C: ConnectionTrait,
{
    let code = normalize_code(&input.code);
    if code.is_empty() {
        return Err(Error::validation("Coupon code cannot be empty"));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(Error::validation("Coupon code cannot contain spaces"));
    }

    match input.discount_type {
        DiscountType::Percentage => validate_percentage(input.discount)?,
        DiscountType::Fixed => validate_amount("Discount", input.discount)?,
    }
    if let Some(minimum) = input.minimum_order_amount {
        validate_amount("Minimum order amount", minimum)?;
    }
    if let Some(limit) = input.usage_limit {
        if limit < 1 {
            return Err(Error::validation("Usage limit must be at least 1"));
        }
    }

    let start_date = status::parse_required_date("startDate", input.start_date.as_deref())?;
    let end_date = status::parse_required_date("endDate", input.end_date.as_deref())?;
    status::validate_date_range(start_date, end_date)?;

    let (product_id, category_id) = match input.scope {
        CouponScope::General => (None, None),
        CouponScope::Product => {
            let product_id = input
                .product_id
                .ok_or_else(|| Error::validation("A product must be selected"))?;
            (Some(product_id), None)
        }
        CouponScope::Category => {
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

    Ok(ValidCoupon {
        code,
        description: input.description.clone(),
        discount_type: input.discount_type,
        discount: input.discount,
        scope: input.scope,
        product_id,
        category_id,
        minimum_order_amount: input.minimum_order_amount,
        usage_limit: input.usage_limit,
        start_date,
        end_date,
    })
}

async fn ensure_unique_code<C>(db: &C, code: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Coupon::find().filter(coupon::Column::Code.eq(code));
    if let Some(id) = except_id {
        query = query.filter(coupon::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::Conflict {
            entity: ENTITY,
            id: code.to_string(),
        });
    }
    Ok(())
}

/// Lists every coupon ordered by code, with status derived for `today`.
pub async fn list_coupons(db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<CouponView>> {
    let coupons = Coupon::find()
        .order_by_asc(coupon::Column::Code)
        .all(db)
        .await?;

    Ok(coupons
        .into_iter()
        .map(|coupon| CouponView::at(coupon, today))
        .collect())
}

/// Fetches one coupon with status derived for `today`.
///
/// # Errors
/// Returns [`Error::NotFound`] when no coupon has `coupon_id`.
pub async fn get_coupon(
    db: &DatabaseConnection,
    coupon_id: i64,
    today: NaiveDate,
) -> Result<CouponView> {
    Coupon::find_by_id(coupon_id)
        .one(db)
        .await?
        .map(|coupon| CouponView::at(coupon, today))
        .ok_or_else(|| Error::not_found(ENTITY, coupon_id))
}

/// Finds a coupon by code, case-insensitively.
pub async fn get_coupon_by_code<C>(db: &C, code: &str) -> Result<Option<coupon::Model>>
where
    C: ConnectionTrait,
{
    Coupon::find()
        .filter(coupon::Column::Code.eq(normalize_code(code)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a coupon from form input.
///
/// # Errors
/// - [`Error::Validation`] for any invalid field or date
/// - [`Error::Conflict`] when the code is already in use
#[instrument(skip(db))]
pub async fn create_coupon(db: &DatabaseConnection, input: &CouponInput) -> Result<coupon::Model> {
    let valid = validate(db, input).await?;
    ensure_unique_code(db, &valid.code, None).await?;

    let now = chrono::Utc::now().naive_utc();
    let coupon = coupon::ActiveModel {
        code: Set(valid.code),
        description: Set(valid.description),
        discount_type: Set(valid.discount_type),
        discount: Set(valid.discount),
        scope: Set(valid.scope),
        product_id: Set(valid.product_id),
        category_id: Set(valid.category_id),
        minimum_order_amount: Set(valid.minimum_order_amount),
        usage_limit: Set(valid.usage_limit),
        usage_count: Set(0),
        start_date: Set(valid.start_date),
        end_date: Set(valid.end_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = coupon.insert(db).await?;
    info!(coupon_id = created.id, "Created coupon {}", created.code);
    Ok(created)
}

/// Replaces every editable field of a coupon. The usage count is preserved.
///
/// # Errors
/// Same validation as [`create_coupon`], plus [`Error::NotFound`] for an unknown id and
/// [`Error::Validation`] when the new usage limit is below the uses already consumed.
#[instrument(skip(db))]
pub async fn update_coupon(
    db: &DatabaseConnection,
    coupon_id: i64,
    input: &CouponInput,
) -> Result<coupon::Model> {
    let existing = Coupon::find_by_id(coupon_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, coupon_id))?;

    let valid = validate(db, input).await?;
    ensure_unique_code(db, &valid.code, Some(coupon_id)).await?;

    if let Some(limit) = valid.usage_limit {
        if limit < existing.usage_count {
            return Err(Error::validation(format!(
                "Usage limit {limit} is below the {} uses already redeemed",
                existing.usage_count
            )));
        }
    }

    let mut coupon: coupon::ActiveModel = existing.into();
    coupon.code = Set(valid.code);
    coupon.description = Set(valid.description);
    coupon.discount_type = Set(valid.discount_type);
    coupon.discount = Set(valid.discount);
    coupon.scope = Set(valid.scope);
    coupon.product_id = Set(valid.product_id);
    coupon.category_id = Set(valid.category_id);
    coupon.minimum_order_amount = Set(valid.minimum_order_amount);
    coupon.usage_limit = Set(valid.usage_limit);
    coupon.start_date = Set(valid.start_date);
    coupon.end_date = Set(valid.end_date);
    coupon.updated_at = Set(chrono::Utc::now().naive_utc());

    coupon.update(db).await.map_err(Into::into)
}

/// Permanently deletes a coupon.
///
/// # Errors
/// Returns [`Error::NotFound`] when no coupon has `coupon_id`.
#[instrument(skip(db))]
pub async fn delete_coupon(db: &DatabaseConnection, coupon_id: i64) -> Result<()> {
    let result = Coupon::delete_by_id(coupon_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(ENTITY, coupon_id));
    }
    info!(coupon_id, "Deleted coupon");
    Ok(())
}

fn ineligibility(
    coupon: &coupon::Model,
    request: &RedemptionRequest,
    today: NaiveDate,
) -> Option<String> {
    match status::derive_status(today, coupon.start_date, coupon.end_date) {
        PromotionStatus::Future => return Some(format!("valid from {}", coupon.start_date)),
        PromotionStatus::Inactive => return Some(format!("expired on {}", coupon.end_date)),
        PromotionStatus::Active => {}
    }

    if let Some(limit) = coupon.usage_limit {
        if coupon.usage_count >= limit {
            return Some("usage limit reached".to_string());
        }
    }

    if let Some(minimum) = coupon.minimum_order_amount {
        if request.order_total < minimum {
            return Some(format!("order total must be at least {minimum:.2}"));
        }
    }

    match coupon.scope {
        CouponScope::General => None,
        CouponScope::Product => coupon
            .product_id
            .filter(|id| !request.product_ids.contains(id))
            .map(|id| format!("order does not contain product {id}")),
        CouponScope::Category => coupon
            .category_id
            .filter(|id| !request.category_ids.contains(id))
            .map(|id| format!("order does not contain a product from category {id}")),
    }
}

/// Redeems a coupon against an order on `today`.
///
/// # Errors
/// - [`Error::Validation`] when the order total is negative or not a number
/// - [`Error::NotFound`] when no coupon has the code
/// - [`Error::CouponUnavailable`] when the coupon is not active, used up, or the order
///   does not qualify
/// - [`Error::Conflict`] when a concurrent redemption consumed the use first
#[instrument(skip(db))]
pub async fn redeem_coupon(
    db: &DatabaseConnection,
    request: &RedemptionRequest,
    today: NaiveDate,
) -> Result<Redemption> {
    validate_amount("Order total", request.order_total)?;
    let code = normalize_code(&request.code);

    let txn = db.begin().await?;

    let coupon = get_coupon_by_code(&txn, &code)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, &code))?;

    if let Some(reason) = ineligibility(&coupon, request, today) {
        return Err(Error::CouponUnavailable { code, reason });
    }

    let result = Coupon::update_many()
        .col_expr(
            coupon::Column::UsageCount,
            Expr::col(coupon::Column::UsageCount).add(1),
        )
        .filter(coupon::Column::Id.eq(coupon.id))
        .filter(coupon::Column::UsageCount.eq(coupon.usage_count))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        warn!(coupon_id = coupon.id, "Coupon redeemed concurrently, rejecting");
        return Err(Error::Conflict {
            entity: ENTITY,
            id: code,
        });
    }

    txn.commit().await?;

    let discount = discount_amount(coupon.discount_type, coupon.discount, request.order_total);
    let redemption = Redemption {
        coupon_id: coupon.id,
        code,
        discount_amount: discount,
        final_total: ((request.order_total - discount) * 100.0).round() / 100.0,
        usage_count: coupon.usage_count + 1,
    };
    info!(
        coupon_id = redemption.coupon_id,
        discount = redemption.discount_amount,
        "Redeemed coupon"
    );
    Ok(redemption)
}
