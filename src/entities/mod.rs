//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables backing the admin dashboard.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod coupon;
pub mod discount;
pub mod inventory;

// Re-export specific types to avoid conflicts
pub use category::Entity as Category;
pub use coupon::Entity as Coupon;
pub use discount::Entity as Discount;
pub use inventory::Entity as Inventory;
