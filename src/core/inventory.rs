//! Inventory business logic - Stock ledgers and server-side stock adjustments.
//!
//! Adjustments are never computed by the client. [`adjust_stock`] reads the current
//! record inside a transaction, runs the pure [`StockLedger::apply`] check, and writes
//! every counter, the status, the tags and a bumped `version` in a single
//! `UPDATE ... WHERE version = <read version>`. A lost race re-reads and retries.

use crate::{
    core::ledger::{
        self, Counts, Grid, ReconciliationIssue, StockAdjustment, StockLedger,
    },
    entities::{
        Inventory,
        inventory::{self, StockCounts, StockGrid, Tags},
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

const ENTITY: &str = "inventory";

/// Fields for stocking a product for the first time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInput {
    /// Owning product
    pub product_id: i64,
    /// Product name shown in listings
    pub product_name: String,
    /// Initial total
    #[serde(default)]
    pub stock: i64,
    /// Initial units per size
    #[serde(default)]
    pub size_stock: Counts,
    /// Initial units per color
    #[serde(default)]
    pub color_stock: Counts,
    /// Initial units per color and size
    #[serde(default)]
    pub color_size_stock: Grid,
    /// Markers; include `"new"` to start as Newly Added
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Extracts the stock counters of a stored record.
#[must_use]
pub fn ledger_of(record: &inventory::Model) -> StockLedger {
    StockLedger {
        stock: record.stock,
        size_stock: record.size_stock.0.clone(),
        color_stock: record.color_stock.0.clone(),
        color_size_stock: record.color_size_stock.0.clone(),
    }
}

/// Lists every inventory record ordered by product name.
pub async fn list_inventory(db: &DatabaseConnection) -> Result<Vec<inventory::Model>> {
    Inventory::find()
        .order_by_asc(inventory::Column::ProductName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches one inventory record.
///
/// # Errors
/// Returns [`Error::NotFound`] when no record has `inventory_id`.
pub async fn get_inventory<C>(db: &C, inventory_id: i64) -> Result<inventory::Model>
where
    C: ConnectionTrait,
{
    Inventory::find_by_id(inventory_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, inventory_id))
}

/// Finds the inventory record of a product, if it has been stocked.
pub async fn get_inventory_by_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<inventory::Model>> {
    Inventory::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates the inventory record of a product.
///
/// The initial grid is completed with zeros and the status derived from the total and
/// the `"new"` tag.
///
/// # Errors
/// - [`Error::Validation`] for a blank product name or any negative counter
/// - [`Error::Conflict`] when the product already has a record
#[instrument(skip(db))]
pub async fn create_inventory(
    db: &DatabaseConnection,
    input: &InventoryInput,
) -> Result<inventory::Model> {
    let product_name = input.product_name.trim();
    if product_name.is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }

    let ledger = StockLedger {
        stock: input.stock,
        size_stock: input.size_stock.clone(),
        color_stock: input.color_stock.clone(),
        color_size_stock: input.color_size_stock.clone(),
    };
    ledger.validate_non_negative()?;
    let ledger = ledger.with_complete_grid();

    if get_inventory_by_product(db, input.product_id).await?.is_some() {
        return Err(Error::Conflict {
            entity: ENTITY,
            id: input.product_id.to_string(),
        });
    }

    let tags = Tags(input.tags.clone());
    let status = ledger::status_on_create(ledger.stock, &tags);
    let now = chrono::Utc::now().naive_utc();

    let record = inventory::ActiveModel {
        product_id: Set(input.product_id),
        product_name: Set(product_name.to_string()),
        stock: Set(ledger.stock),
        size_stock: Set(StockCounts(ledger.size_stock)),
        color_stock: Set(StockCounts(ledger.color_stock)),
        color_size_stock: Set(StockGrid(ledger.color_size_stock)),
        tags: Set(tags),
        status: Set(status),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = record.insert(db).await?;
    info!(
        inventory_id = created.id,
        product_id = created.product_id,
        status = ?created.status,
        "Created inventory record"
    );
    Ok(created)
}

/// Writes `next` over `record` only if nobody changed it since it was read.
///
/// Returns `false` when the stored `version` no longer matches `record.version`.
pub async fn write_if_unchanged<C>(
    db: &C,
    record: &inventory::Model,
    next: StockLedger,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let changes = inventory::ActiveModel {
        id: NotSet,
        stock: Set(next.stock),
        size_stock: Set(StockCounts(next.size_stock)),
        color_stock: Set(StockCounts(next.color_stock)),
        color_size_stock: Set(StockGrid(next.color_size_stock)),
        tags: Set(ledger::clear_new_arrival(&record.tags)),
        status: Set(ledger::status_after_adjustment(next.stock)),
        version: Set(record.version + 1),
        updated_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let result = Inventory::update_many()
        .set(changes)
        .filter(inventory::Column::Id.eq(record.id))
        .filter(inventory::Column::Version.eq(record.version))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Applies a stock adjustment to one record, all-or-nothing.
///
/// `max_retries` bounds how many times a lost compare-and-swap is retried against a
/// fresh read.
///
/// # Errors
/// - [`Error::NotFound`] when no record has `inventory_id`
/// - [`Error::Validation`] for a zero delta
/// - [`Error::InsufficientStock`] naming the counter that would go negative
/// - [`Error::Conflict`] when every attempt lost a race
#[instrument(skip(db))]
pub async fn adjust_stock(
    db: &DatabaseConnection,
    inventory_id: i64,
    adjustment: &StockAdjustment,
    max_retries: u32,
) -> Result<inventory::Model> {
    adjust_stock_from(db, inventory_id, adjustment, max_retries, |record| record).await
}

/// The retry loop behind [`adjust_stock`]. `snapshot` sees each record as read, before
/// the ledger is applied to it.
async fn adjust_stock_from<F>(
    db: &DatabaseConnection,
    inventory_id: i64,
    adjustment: &StockAdjustment,
    max_retries: u32,
    mut snapshot: F,
) -> Result<inventory::Model>
where
    F: FnMut(inventory::Model) -> inventory::Model,
{
    for attempt in 0..=max_retries {
        let txn = db.begin().await?;

        let record = snapshot(get_inventory(&txn, inventory_id).await?);
        let next = ledger_of(&record).apply(adjustment)?;

        if write_if_unchanged(&txn, &record, next).await? {
            let updated = get_inventory(&txn, inventory_id).await?;
            txn.commit().await?;
            info!(
                inventory_id,
                delta = adjustment.delta,
                stock = updated.stock,
                status = ?updated.status,
                "Adjusted stock"
            );
            return Ok(updated);
        }

        txn.rollback().await?;
        debug!(inventory_id, attempt, "Inventory changed concurrently, retrying");
    }

    warn!(inventory_id, max_retries, "Giving up on contended stock adjustment");
    Err(Error::Conflict {
        entity: ENTITY,
        id: inventory_id.to_string(),
    })
}

/// Reports counters of a record that disagree with its color × size grid.
///
/// # Errors
/// Returns [`Error::NotFound`] when no record has `inventory_id`.
pub async fn reconciliation(
    db: &DatabaseConnection,
    inventory_id: i64,
) -> Result<Vec<ReconciliationIssue>> {
    let record = get_inventory(db, inventory_id).await?;
    Ok(ledger_of(&record).reconciliation_issues())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::inventory::InventoryStatus;
    use crate::errors::StockDimension;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_inventory_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = red_m_input(1);
        input.product_name = " ".to_string();
        let result = create_inventory(&db, &input).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let mut input = red_m_input(1);
        input.color_stock.insert("Blue".to_string(), -1);
        let result = create_inventory(&db, &input).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_inventory() -> Result<()> {
        let db = setup_test_db().await?;

        let record = create_red_m_inventory(&db, 1).await?;
        assert_eq!(record.stock, 10);
        assert_eq!(record.status, InventoryStatus::InStock);
        assert_eq!(record.version, 0);

        let result = create_inventory(&db, &red_m_input(1)).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        let mut input = red_m_input(2);
        input.tags = vec!["new".to_string()];
        let fresh = create_inventory(&db, &input).await?;
        assert_eq!(fresh.status, InventoryStatus::NewlyAdded);

        let mut input = red_m_input(3);
        input.stock = 0;
        input.size_stock.clear();
        input.color_stock.clear();
        input.color_size_stock.clear();
        let empty = create_inventory(&db, &input).await?;
        assert_eq!(empty.status, InventoryStatus::OutOfStock);

        assert_eq!(list_inventory(&db).await?.len(), 3);
        assert!(get_inventory_by_product(&db, 2).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_stock_commits_every_counter() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        let updated = adjust_stock(
            &db,
            record.id,
            &StockAdjustment::new(3, Some("M"), Some("Red")),
            3,
        )
        .await?;

        assert_eq!(updated.stock, 13);
        assert_eq!(updated.size_stock.0.get("M"), Some(&8));
        assert_eq!(updated.color_stock.0.get("Red"), Some(&8));
        assert_eq!(updated.color_size_stock.0["Red"].get("M"), Some(&8));
        assert_eq!(updated.version, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_adjustment_leaves_record_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        let err = adjust_stock(
            &db,
            record.id,
            &StockAdjustment::new(-6, Some("M"), Some("Red")),
            3,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                dimension: StockDimension::Size { .. },
                ..
            }
        ));

        let stored = get_inventory(&db, record.id).await?;
        assert_eq!(stored, record);

        let err = adjust_stock(&db, record.id, &StockAdjustment::total(-11), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock {
                dimension: StockDimension::Total,
                ..
            }
        ));
        assert_eq!(get_inventory(&db, record.id).await?, record);

        Ok(())
    }

    #[tokio::test]
    async fn test_status_transitions() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = red_m_input(1);
        input.tags = vec!["new".to_string(), "summer".to_string()];
        let record = create_inventory(&db, &input).await?;
        assert_eq!(record.status, InventoryStatus::NewlyAdded);

        let sold_out = adjust_stock(
            &db,
            record.id,
            &StockAdjustment::new(-5, Some("M"), Some("Red")),
            3,
        )
        .await?;
        assert_eq!(sold_out.stock, 5);
        assert_eq!(sold_out.status, InventoryStatus::InStock);
        assert_eq!(sold_out.tags, Tags(vec!["summer".to_string()]));

        let empty = adjust_stock(&db, record.id, &StockAdjustment::total(-5), 3).await?;
        assert_eq!(empty.stock, 0);
        assert_eq!(empty.status, InventoryStatus::OutOfStock);

        let restocked = adjust_stock(&db, record.id, &StockAdjustment::total(2), 3).await?;
        assert_eq!(restocked.status, InventoryStatus::InStock);

        Ok(())
    }

    #[tokio::test]
    async fn test_new_combination_fills_grid() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        let updated = adjust_stock(
            &db,
            record.id,
            &StockAdjustment::new(2, Some("L"), Some("Blue")),
            3,
        )
        .await?;

        let grid = &updated.color_size_stock.0;
        assert_eq!(grid["Red"].get("L"), Some(&0));
        assert_eq!(grid["Blue"].get("M"), Some(&0));
        assert_eq!(grid["Blue"].get("L"), Some(&2));

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        adjust_stock(&db, record.id, &StockAdjustment::total(1), 0).await?;

        // `record` still carries version 0, the stored row is at version 1
        let next = ledger_of(&record).apply(&StockAdjustment::total(5))?;
        assert!(!write_if_unchanged(&db, &record, next).await?);
        assert_eq!(get_inventory(&db, record.id).await?.stock, 11);

        Ok(())
    }

    #[tokio::test]
    async fn test_contended_adjustment_gives_up_with_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        // Every read looks one version behind the stored row, so every write loses
        let mut attempts = 0;
        let result = adjust_stock_from(&db, record.id, &StockAdjustment::total(2), 3, |mut seen| {
            attempts += 1;
            seen.version -= 1;
            seen
        })
        .await;

        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        assert_eq!(attempts, 4);

        let stored = get_inventory(&db, record.id).await?;
        assert_eq!(stored.stock, 10);
        assert_eq!(stored.version, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_adjustment_recovers_after_lost_race() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;

        // Only the first read is stale
        let mut attempts = 0;
        let updated = adjust_stock_from(&db, record.id, &StockAdjustment::total(2), 3, |mut seen| {
            attempts += 1;
            if attempts == 1 {
                seen.version -= 1;
            }
            seen
        })
        .await?;

        assert_eq!(attempts, 2);
        assert_eq!(updated.stock, 12);
        assert_eq!(updated.version, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_record() -> Result<()> {
        let db = setup_test_db().await?;

        let result = adjust_stock(&db, 42, &StockAdjustment::total(1), 3).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        let result = reconciliation(&db, 42).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_reconciliation_reports_drift() -> Result<()> {
        let db = setup_test_db().await?;
        let record = create_red_m_inventory(&db, 1).await?;
        assert!(reconciliation(&db, record.id).await?.is_empty());

        adjust_stock(&db, record.id, &StockAdjustment::new(2, None, Some("Red")), 3).await?;
        let issues = reconciliation(&db, record.id).await?;
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].dimension,
            StockDimension::Color {
                color: "Red".to_string()
            }
        );

        Ok(())
    }
}
