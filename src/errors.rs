//! Unified error types and result handling.
//!
//! Core operations return on the first violated precondition, before anything is written,
//! so a caller that sees an `Err` can assume the stored record is untouched.

use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The stock counter a rejected adjustment would have driven below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockDimension {
    /// The product-wide `stock` total
    Total,
    /// One entry of `size_stock`
    Size {
        /// Size label, e.g. `"M"`
        size: String,
    },
    /// One entry of `color_stock`
    Color {
        /// Color label, e.g. `"Red"`
        color: String,
    },
    /// One cell of the `color_size_stock` grid
    Combination {
        /// Color label
        color: String,
        /// Size label
        size: String,
    },
}

impl fmt::Display for StockDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "Stock"),
            Self::Size { size } => write!(f, "Size {size} stock"),
            Self::Color { color } => write!(f, "Color {color} stock"),
            Self::Combination { color, size } => write!(f, "Color {color} / size {size} stock"),
        }
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any error bubbling up from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing user input (dates, names, percentages...)
    #[error("{message}")]
    Validation {
        /// User-facing description of the problem
        message: String,
    },

    /// A stock adjustment would drive a counter below zero
    #[error("{dimension} cannot be reduced below zero!")]
    InsufficientStock {
        /// Which counter failed
        dimension: StockDimension,
        /// Value of that counter before the adjustment
        current: i64,
        /// The rejected delta
        delta: i64,
    },

    /// Referenced record does not exist (or is soft-deleted)
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"inventory"`
        entity: &'static str,
        /// Identifier as supplied by the caller
        id: String,
    },

    /// Unique-key clash or optimistic concurrency retries exhausted
    #[error("{entity} {id} conflicts with existing data")]
    Conflict {
        /// Entity kind
        entity: &'static str,
        /// Identifier as supplied by the caller
        id: String,
    },

    /// Coupon exists but cannot be redeemed right now
    #[error("Coupon {code} cannot be redeemed: {reason}")]
    CouponUnavailable {
        /// Normalised coupon code
        code: String,
        /// Human-readable reason
        reason: String,
    },
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_messages_name_the_dimension() {
        let total = Error::InsufficientStock {
            dimension: StockDimension::Total,
            current: 1,
            delta: -2,
        };
        assert_eq!(total.to_string(), "Stock cannot be reduced below zero!");

        let color = Error::InsufficientStock {
            dimension: StockDimension::Color {
                color: "Red".to_string(),
            },
            current: 0,
            delta: -1,
        };
        assert_eq!(color.to_string(), "Color Red stock cannot be reduced below zero!");

        let combo = Error::InsufficientStock {
            dimension: StockDimension::Combination {
                color: "Red".to_string(),
                size: "M".to_string(),
            },
            current: 0,
            delta: -1,
        };
        assert_eq!(
            combo.to_string(),
            "Color Red / size M stock cannot be reduced below zero!"
        );
    }
}
