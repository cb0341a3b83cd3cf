/// Category management with soft delete
pub mod category;

/// Coupon management and redemption
pub mod coupon;

/// Discount management and price calculation
pub mod discount;

/// Inventory records and concurrency-safe stock adjustments
pub mod inventory;

/// Pure stock ledger arithmetic over total, size, color and color/size counters
pub mod ledger;

/// Date-driven lifecycle status for discounts and coupons
pub mod status;
