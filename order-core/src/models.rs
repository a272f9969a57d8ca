//! Persistent records
//!
//! Stored as JSON values in redb. Orders embed their lines, so a line can
//! never outlive its order and both are read in one lookup.

use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;

/// Catalog row. `name` is unique across the catalog; `price` is the current
/// unit price in minor units and may change through admin updates without
/// touching existing order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: i64,
}

/// Order row. Line order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOrder {
    pub id: u64,
    pub user_id: u64,
    pub status: OrderStatus,
    /// Creation time, epoch millis UTC
    pub created_at: i64,
    pub lines: Vec<StoredLine>,
}

/// Immutable order line holding the price snapshot captured at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLine {
    pub product_id: u64,
    pub quantity: u32,
    pub unit_price: i64,
}
