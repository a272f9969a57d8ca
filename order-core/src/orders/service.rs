//! Order lifecycle
//!
//! State machine:
//!
//! ```text
//! PENDING --approve--> APPROVED   (terminal)
//! PENDING --cancel---> CANCELLED  (terminal)
//! ```
//!
//! Stock commits at creation time: `create` reserves every line inside the
//! same transaction that persists the order, `cancel` releases every line
//! inside the same transaction that flips the status, and `approve` never
//! touches stock at all.

use crate::common::error::{CoreError, CoreResult};
use crate::common::require_elevated;
use crate::models::{StoredLine, StoredOrder};
use crate::orders::{page, search};
use crate::stock::ledger::StockLedger;
use crate::store::Store;
use shared::auth::Principal;
use shared::order::OrderStatus;
use shared::request::{CreateOrderRequest, CursorQuery, OrderSearchQuery, PageQuery};
use shared::response::{CursorPage, OrderDetail, PageResponse};

#[derive(Clone)]
pub struct OrderService {
    store: Store,
    ledger: StockLedger,
}

impl OrderService {
    pub fn new(store: Store, ledger: StockLedger) -> Self {
        Self { store, ledger }
    }

    /// Create an order owned by `user_id`.
    ///
    /// Lines naming the same product are aggregated (quantities summed,
    /// first occurrence keeps its position) before reservation, so one
    /// order issues at most one reservation per product. Either every
    /// reservation succeeds and the order lands in `PENDING`, or nothing
    /// changes.
    pub fn create(&self, user_id: u64, req: &CreateOrderRequest) -> CoreResult<OrderDetail> {
        let requested = aggregate_lines(&req.items)?;

        let product_ids: Vec<u64> = requested.iter().map(|(id, _)| *id).collect();
        let _guards = self
            .ledger
            .locks()
            .acquire_many(&product_ids, self.ledger.lock_wait())?;

        // Any error before commit drops the transaction: no partial stock
        // mutation, no order row.
        let txn = self.store.begin_write()?;

        let mut lines = Vec::with_capacity(requested.len());
        let mut total: i64 = 0;
        for (product_id, quantity) in &requested {
            let product = self
                .store
                .get_product_txn(&txn, *product_id)?
                .ok_or_else(|| CoreError::NotFound(format!("product {product_id}")))?;

            // Reject orders whose amounts cannot be represented, before
            // anything commits.
            let line_total = product
                .price
                .checked_mul(i64::from(*quantity))
                .ok_or_else(|| {
                    CoreError::InvalidArgument(format!(
                        "line total overflows for product {product_id}"
                    ))
                })?;
            total = total.checked_add(line_total).ok_or_else(|| {
                CoreError::InvalidArgument("order total overflows".to_string())
            })?;

            self.ledger
                .reserve_txn(&txn, *product_id, i64::from(*quantity))?;

            lines.push(StoredLine {
                product_id: *product_id,
                quantity: *quantity,
                unit_price: product.price,
            });
        }

        let order = StoredOrder {
            id: self.store.next_order_id(&txn)?,
            user_id,
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now().timestamp_millis(),
            lines,
        };
        self.store.put_order(&txn, &order)?;
        self.store.commit(txn)?;

        tracing::info!(
            order_id = order.id,
            user_id,
            line_count = order.lines.len(),
            "order created"
        );
        Ok(self.store.materialize_one(order)?)
    }

    /// Approve a pending order. MANAGER/ADMIN only; performs no stock
    /// mutation — stock was committed at creation time.
    pub fn approve(&self, order_id: u64, principal: &Principal) -> CoreResult<OrderDetail> {
        require_elevated(principal)?;

        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("order {order_id}")))?;

        if !order.status.can_transition_to(OrderStatus::Approved) {
            return Err(CoreError::InvalidStateTransition {
                order_id,
                current: order.status,
            });
        }

        order.status = OrderStatus::Approved;
        self.store.put_order(&txn, &order)?;
        self.store.commit(txn)?;

        tracing::info!(order_id, approver = principal.user_id, "order approved");
        Ok(self.store.materialize_one(order)?)
    }

    /// Cancel a pending order, returning every reserved quantity to stock.
    /// The releases and the status flip commit together.
    pub fn cancel(&self, order_id: u64, principal: &Principal) -> CoreResult<OrderDetail> {
        // First pass without locks: learn which rows to lock, and fail fast
        // on orders already terminal.
        let existing = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("order {order_id}")))?;
        if !existing.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(CoreError::InvalidStateTransition {
                order_id,
                current: existing.status,
            });
        }

        let product_ids: Vec<u64> = existing.lines.iter().map(|l| l.product_id).collect();
        let _guards = self
            .ledger
            .locks()
            .acquire_many(&product_ids, self.ledger.lock_wait())?;

        let txn = self.store.begin_write()?;

        // Re-read under the write transaction: a concurrent approve or
        // cancel may have won since the first pass, and exactly one caller
        // may move the order out of PENDING.
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CoreError::NotFound(format!("order {order_id}")))?;
        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(CoreError::InvalidStateTransition {
                order_id,
                current: order.status,
            });
        }

        for line in &order.lines {
            self.ledger
                .release_txn(&txn, line.product_id, i64::from(line.quantity))?;
        }

        order.status = OrderStatus::Cancelled;
        self.store.put_order(&txn, &order)?;
        self.store.commit(txn)?;

        tracing::info!(order_id, caller = principal.user_id, "order cancelled");
        Ok(self.store.materialize_one(order)?)
    }

    /// Filtered historical search, newest first.
    pub fn search(&self, query: &OrderSearchQuery) -> CoreResult<Vec<OrderDetail>> {
        search::execute(&self.store, query)
    }

    /// Offset-paged listing.
    pub fn list_page(&self, query: &PageQuery) -> CoreResult<PageResponse<OrderDetail>> {
        page::list_page(&self.store, query)
    }

    /// Keyset-paged listing.
    pub fn list_by_cursor(&self, query: &CursorQuery) -> CoreResult<CursorPage<OrderDetail>> {
        page::list_by_cursor(&self.store, query)
    }
}

/// Validate and aggregate requested lines, preserving first-occurrence
/// order of products.
fn aggregate_lines(items: &[shared::request::OrderItemLine]) -> CoreResult<Vec<(u64, u32)>> {
    if items.is_empty() {
        return Err(CoreError::InvalidArgument(
            "order must contain at least one line".to_string(),
        ));
    }

    let mut aggregated: Vec<(u64, u32)> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(CoreError::InvalidArgument(format!(
                "quantity must be positive for product {}",
                item.product_id
            )));
        }
        match aggregated.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, qty)) => {
                *qty = qty.checked_add(item.quantity).ok_or_else(|| {
                    CoreError::InvalidArgument(format!(
                        "total quantity overflows for product {}",
                        item.product_id
                    ))
                })?;
            }
            None => aggregated.push((item.product_id, item.quantity)),
        }
    }
    Ok(aggregated)
}
