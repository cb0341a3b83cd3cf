//! Stock ledger arithmetic - applies a signed quantity delta to the three parallel
//! stock counters of one product.
//!
//! Everything here is pure: [`StockLedger::apply`] returns a new ledger or an error and
//! never touches the input, so a rejected adjustment leaves the caller's record exactly
//! as it was. Persistence and concurrency control live in [`crate::core::inventory`].

use crate::{
    entities::inventory::{InventoryStatus, Tags},
    errors::{Error, Result, StockDimension},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tag marking a record created as a new arrival.
pub const NEW_ARRIVAL_TAG: &str = "new";

/// Quantity per size or per color label.
pub type Counts = BTreeMap<String, i64>;
/// Quantity per color, then per size.
pub type Grid = BTreeMap<String, Counts>;

/// The counters tracking one product's stock at different granularities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLedger {
    /// Total units
    pub stock: i64,
    /// Units per size
    pub size_stock: Counts,
    /// Units per color
    pub color_stock: Counts,
    /// Units per color and size
    pub color_size_stock: Grid,
}

/// A signed quantity change, optionally narrowed to a size and/or color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Positive to add stock, negative to reduce it
    pub delta: i64,
    /// Size selector; blank is treated as absent
    #[serde(default)]
    pub size: Option<String>,
    /// Color selector; blank is treated as absent
    #[serde(default)]
    pub color: Option<String>,
}

impl StockAdjustment {
    /// Adjustment of the total only.
    #[must_use]
    pub const fn total(delta: i64) -> Self {
        Self {
            delta,
            size: None,
            color: None,
        }
    }

    /// Adjustment narrowed to a size and/or color.
    #[must_use]
    pub fn new(delta: i64, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            delta,
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        }
    }
}

/// A counter that disagrees with the sum of its `color_size_stock` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationIssue {
    /// The color or size whose aggregate disagrees
    pub dimension: StockDimension,
    /// Value held in `color_stock` / `size_stock`
    pub recorded: i64,
    /// Sum of the matching grid cells
    pub grid_total: i64,
}

fn selector(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn checked(current: i64, delta: i64, dimension: StockDimension) -> Result<i64> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| Error::validation(format!("{dimension} would overflow")))?;

    if next < 0 {
        return Err(Error::InsufficientStock {
            dimension,
            current,
            delta,
        });
    }
    Ok(next)
}

impl StockLedger {
    /// Applies `adjustment` to every counter it selects.
    ///
    /// Validation runs total, size, color, then the color/size cell; the first counter
    /// that would go negative aborts the whole adjustment. The total is always adjusted.
    /// On success the returned ledger also has a complete color × size grid.
    ///
    /// # Errors
    /// - [`Error::Validation`] when `delta` is zero or a counter would overflow
    /// - [`Error::InsufficientStock`] naming the first counter that would go negative
    pub fn apply(&self, adjustment: &StockAdjustment) -> Result<Self> {
        let delta = adjustment.delta;
        if delta == 0 {
            return Err(Error::validation("Stock adjustment must not be zero"));
        }

        let size = selector(adjustment.size.as_ref());
        let color = selector(adjustment.color.as_ref());

        let stock = checked(self.stock, delta, StockDimension::Total)?;

        let size_count = size
            .map(|size| {
                checked(
                    self.size_stock.get(size).copied().unwrap_or(0),
                    delta,
                    StockDimension::Size {
                        size: size.to_string(),
                    },
                )
            })
            .transpose()?;

        let color_count = color
            .map(|color| {
                checked(
                    self.color_stock.get(color).copied().unwrap_or(0),
                    delta,
                    StockDimension::Color {
                        color: color.to_string(),
                    },
                )
            })
            .transpose()?;

        let cell_count = match (color, size) {
            (Some(color), Some(size)) => Some(checked(
                self.cell(color, size),
                delta,
                StockDimension::Combination {
                    color: color.to_string(),
                    size: size.to_string(),
                },
            )?),
            _ => None,
        };

        // All checks passed; commit every touched counter.
        let mut next = self.clone();
        next.stock = stock;
        if let (Some(size), Some(count)) = (size, size_count) {
            next.size_stock.insert(size.to_string(), count);
        }
        if let (Some(color), Some(count)) = (color, color_count) {
            next.color_stock.insert(color.to_string(), count);
        }
        if let (Some(color), Some(size), Some(count)) = (color, size, cell_count) {
            next.color_size_stock
                .entry(color.to_string())
                .or_default()
                .insert(size.to_string(), count);
        }
        next.fill_grid();

        Ok(next)
    }

    /// Current value of one grid cell, zero when absent.
    #[must_use]
    pub fn cell(&self, color: &str, size: &str) -> i64 {
        self.color_size_stock
            .get(color)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Every size label mentioned by any counter.
    #[must_use]
    pub fn known_sizes(&self) -> BTreeSet<String> {
        self.size_stock
            .keys()
            .chain(self.color_size_stock.values().flat_map(BTreeMap::keys))
            .cloned()
            .collect()
    }

    /// Every color label mentioned by any counter.
    #[must_use]
    pub fn known_colors(&self) -> BTreeSet<String> {
        self.color_stock
            .keys()
            .chain(self.color_size_stock.keys())
            .cloned()
            .collect()
    }

    /// Ensures every known color has a cell for every known size, inserting zeros.
    pub fn fill_grid(&mut self) {
        let sizes = self.known_sizes();
        if sizes.is_empty() {
            return;
        }

        for color in self.known_colors() {
            let row = self.color_size_stock.entry(color).or_default();
            for size in &sizes {
                row.entry(size.clone()).or_insert(0);
            }
        }
    }

    /// Returns the ledger with [`StockLedger::fill_grid`] applied.
    #[must_use]
    pub fn with_complete_grid(mut self) -> Self {
        self.fill_grid();
        self
    }

    /// Rejects ledgers holding any negative counter.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming the first negative counter.
    pub fn validate_non_negative(&self) -> Result<()> {
        let negative = |dimension: StockDimension| {
            Err(Error::validation(format!("{dimension} must not be negative")))
        };

        if self.stock < 0 {
            return negative(StockDimension::Total);
        }
        if let Some((size, _)) = self.size_stock.iter().find(|(_, count)| **count < 0) {
            return negative(StockDimension::Size { size: size.clone() });
        }
        if let Some((color, _)) = self.color_stock.iter().find(|(_, count)| **count < 0) {
            return negative(StockDimension::Color {
                color: color.clone(),
            });
        }
        for (color, sizes) in &self.color_size_stock {
            if let Some((size, _)) = sizes.iter().find(|(_, count)| **count < 0) {
                return negative(StockDimension::Combination {
                    color: color.clone(),
                    size: size.clone(),
                });
            }
        }
        Ok(())
    }

    /// Lists colors and sizes whose aggregate counter disagrees with the grid.
    ///
    /// Only meaningful when the grid is tracked; an empty grid yields no issues.
    #[must_use]
    pub fn reconciliation_issues(&self) -> Vec<ReconciliationIssue> {
        if self.color_size_stock.is_empty() {
            return Vec::new();
        }

        let mut issues = Vec::new();

        for color in self.known_colors() {
            let recorded = self.color_stock.get(&color).copied().unwrap_or(0);
            let grid_total: i64 = self
                .color_size_stock
                .get(&color)
                .map(|sizes| sizes.values().sum())
                .unwrap_or(0);
            if recorded != grid_total {
                issues.push(ReconciliationIssue {
                    dimension: StockDimension::Color { color },
                    recorded,
                    grid_total,
                });
            }
        }

        for size in self.known_sizes() {
            let recorded = self.size_stock.get(&size).copied().unwrap_or(0);
            let grid_total: i64 = self
                .color_size_stock
                .values()
                .filter_map(|sizes| sizes.get(&size))
                .sum();
            if recorded != grid_total {
                issues.push(ReconciliationIssue {
                    dimension: StockDimension::Size { size },
                    recorded,
                    grid_total,
                });
            }
        }

        issues
    }
}

/// Status of a freshly created record.
#[must_use]
pub fn status_on_create(stock: i64, tags: &Tags) -> InventoryStatus {
    if tags.0.iter().any(|tag| tag == NEW_ARRIVAL_TAG) {
        InventoryStatus::NewlyAdded
    } else {
        status_after_adjustment(stock)
    }
}

/// Status after a successful adjustment. Never returns `NewlyAdded`.
#[must_use]
pub const fn status_after_adjustment(stock: i64) -> InventoryStatus {
    if stock == 0 {
        InventoryStatus::OutOfStock
    } else {
        InventoryStatus::InStock
    }
}

/// Drops the new-arrival marker once the record has been adjusted.
#[must_use]
pub fn clear_new_arrival(tags: &Tags) -> Tags {
    Tags(
        tags.0
            .iter()
            .filter(|tag| tag.as_str() != NEW_ARRIVAL_TAG)
            .cloned()
            .collect(),
    )
}
