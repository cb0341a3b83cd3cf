//! Lifecycle status for time-bounded promotions (discounts and coupons).
//!
//! Status is never trusted from storage: it is a function of the promotion's date range
//! and the current date, so every read recomputes it. Dates are calendar dates only.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a promotion sits relative to its `[start, end]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionStatus {
    /// `start <= today <= end`
    Active,
    /// `today > end`
    Inactive,
    /// `today < start`
    Future,
}

impl PromotionStatus {
    /// Label shown on discount screens.
    #[must_use]
    pub const fn discount_label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Future => "Future Plan",
        }
    }

    /// Label shown on coupon screens.
    #[must_use]
    pub const fn coupon_label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Future => "Future",
        }
    }
}

/// Derives the status of a promotion on `today`. Both bounds are inclusive.
#[must_use]
pub fn derive_status(today: NaiveDate, start: NaiveDate, end: NaiveDate) -> PromotionStatus {
    if today < start {
        PromotionStatus::Future
    } else if today > end {
        PromotionStatus::Inactive
    } else {
        PromotionStatus::Active
    }
}

/// Current UTC calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date supplied by a form.
///
/// # Errors
/// Returns [`Error::Validation`] naming `field` when the value is blank or malformed.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| Error::validation(format!("{field} '{raw}' is not a valid date: {e}")))
}

/// Parses an optional form field, treating `None` as missing.
///
/// # Errors
/// Returns [`Error::Validation`] when the value is absent, blank or malformed.
pub fn parse_required_date(field: &str, raw: Option<&str>) -> Result<NaiveDate> {
    raw.map_or_else(
        || Err(Error::validation(format!("{field} is required"))),
        |value| parse_date(field, value),
    )
}

/// Rejects ranges that end before they start.
///
/// # Errors
/// Returns [`Error::Validation`] when `end < start`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(Error::validation(format!(
            "endDate {end} must not be before startDate {start}"
        )));
    }
    Ok(())
}

/// Derives a status from raw form input. `today` falls back to the current date.
///
/// Malformed or missing dates are reported, never coerced to [`PromotionStatus::Active`].
///
/// # Errors
/// Returns [`Error::Validation`] for any missing or unparseable date.
pub fn derive_status_from_input(
    today_raw: Option<&str>,
    start_raw: Option<&str>,
    end_raw: Option<&str>,
) -> Result<PromotionStatus> {
    let start = parse_required_date("startDate", start_raw)?;
    let end = parse_required_date("endDate", end_raw)?;
    let today = match today_raw {
        Some(raw) if !raw.trim().is_empty() => parse_date("today", raw)?,
        _ => today(),
    };

    Ok(derive_status(today, start, end))
}
