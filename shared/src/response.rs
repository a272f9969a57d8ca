//! Result shapes returned by the core
//!
//! Plain values; mapping them onto transport responses (status codes,
//! envelopes) is the surrounding layer's job.

use crate::order::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One materialized order line with its creation-time price snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineView {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price captured when the order was created, in minor units.
    /// Later catalog price changes do not affect it.
    pub unit_price: i64,
    pub line_total: i64,
}

/// Full order detail, lines always eagerly materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: u64,
    pub user_id: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

impl OrderDetail {
    pub fn total_amount(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}

/// Current stock quantity for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockView {
    pub product_id: u64,
    pub quantity: i64,
}

/// Catalog row as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub product_id: u64,
    pub name: String,
    /// Current unit price in minor units
    pub price: i64,
}

/// Offset pagination envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Keyset pagination envelope
///
/// `next_cursor_id` is the identity of the last returned item; feed it back
/// as the cursor of the next call. `None` means the page was empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub next_cursor_id: Option<u64>,
}
