//! Request shapes accepted by the core
//!
//! The surrounding layer deserializes transport payloads into these types;
//! the core re-validates the business rules (non-empty line list, positive
//! quantities, page size bounds) and reports violations as typed errors.

use crate::order::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One requested line of a new order
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItemLine {
    pub product_id: u64,
    pub quantity: u32,
}

/// Payload for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemLine>,
}

/// Signed stock adjustment (positive = restock, negative = draw down)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockAdjustRequest {
    pub product_id: u64,
    pub delta: i64,
}

/// Absolute stock overwrite
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockSetRequest {
    pub product_id: u64,
    pub quantity: i64,
}

/// Conjunctive order search predicates
///
/// Absent fields are omitted from the query, not defaulted. Both time
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OrderSearchQuery {
    pub user_id: Option<u64>,
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Sortable fields of the order listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    CreatedAt,
    Id,
}

/// One sort key; identity descending is always applied as the final
/// tie-break regardless of the keys given here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    #[serde(default)]
    pub ascending: bool,
}

impl SortKey {
    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            ascending: false,
        }
    }

    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            ascending: true,
        }
    }
}

/// Offset pagination parameters (`page` is zero-based)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u64,
    pub size: u64,
    #[serde(default)]
    pub sort: Vec<SortKey>,
}

impl PageQuery {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }
}

/// Keyset pagination parameters
///
/// `cursor_id` absent means "start at the newest order"; otherwise only
/// orders with identity strictly below the cursor are returned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CursorQuery {
    pub cursor_id: Option<u64>,
    pub size: u64,
}

impl CursorQuery {
    pub fn first(size: u64) -> Self {
        Self {
            cursor_id: None,
            size,
        }
    }

    pub fn after(cursor_id: u64, size: u64) -> Self {
        Self {
            cursor_id: Some(cursor_id),
            size,
        }
    }
}
