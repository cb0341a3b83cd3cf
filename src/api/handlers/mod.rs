//! Route handlers organized by resource.

/// Category CRUD
pub mod category;
/// Coupon CRUD and redemption
pub mod coupon;
/// Discount CRUD
pub mod discount;
/// Health check and status preview
pub mod general;
/// Inventory ledgers and stock adjustments
pub mod inventory;

use crate::{core::status, errors::Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Optional `?today=YYYY-MM-DD` override used when previewing statuses.
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    /// Day to derive statuses for; the current date when absent
    pub today: Option<String>,
}

impl TodayQuery {
    /// Resolves the requested day.
    ///
    /// # Errors
    /// Returns a validation error for a malformed date.
    pub fn resolve(&self) -> Result<NaiveDate> {
        match self.today.as_deref() {
            Some(raw) if !raw.trim().is_empty() => status::parse_date("today", raw),
            _ => Ok(status::today()),
        }
    }
}
