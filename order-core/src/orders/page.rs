//! Pagination over the order listing
//!
//! Two retrieval modes over the same total order:
//!
//! - **Offset**: page/size with totals. Cost grows with offset depth;
//!   meant for shallow, UI-facing paging.
//! - **Keyset**: seeks by an id boundary instead of a row offset, so cost
//!   is independent of depth. Because a forward cursor only ever looks
//!   backward in identity order, pages already issued never shift when
//!   newer orders are inserted between calls.
//!
//! Both modes break ties on id descending, so no item is skipped or
//! duplicated across consecutive pages.

use crate::common::error::{CoreError, CoreResult};
use crate::models::StoredOrder;
use crate::store::Store;
use shared::request::{CursorQuery, PageQuery, SortField, SortKey};
use shared::response::{CursorPage, OrderDetail, PageResponse};
use std::cmp::Ordering;

pub const MAX_PAGE_SIZE: u64 = 100;

fn check_size(size: u64) -> CoreResult<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(CoreError::InvalidArgument(format!(
            "page size must be in 1..={MAX_PAGE_SIZE}, got {size}"
        )));
    }
    Ok(())
}

fn sort_orders(orders: &mut [StoredOrder], keys: &[SortKey]) {
    orders.sort_by(|a, b| {
        for key in keys {
            let ord = match key.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Id => a.id.cmp(&b.id),
            };
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        // Fixed final tie-break, shared with keyset mode.
        b.id.cmp(&a.id)
    });
}

/// Offset mode: returns the requested page plus totals.
pub fn list_page(store: &Store, query: &PageQuery) -> CoreResult<PageResponse<OrderDetail>> {
    check_size(query.size)?;

    let mut orders = store.orders_snapshot()?;
    sort_orders(&mut orders, &query.sort);

    let total_items = orders.len() as u64;
    let total_pages = total_items.div_ceil(query.size);

    let start = query.page.saturating_mul(query.size);
    let page_orders: Vec<StoredOrder> = orders
        .into_iter()
        .skip(start as usize)
        .take(query.size as usize)
        .collect();

    Ok(PageResponse {
        items: store.materialize(page_orders)?,
        page: query.page,
        size: query.size,
        total_items,
        total_pages,
    })
}

/// Keyset mode: items strictly below the cursor id, newest first.
pub fn list_by_cursor(store: &Store, query: &CursorQuery) -> CoreResult<CursorPage<OrderDetail>> {
    check_size(query.size)?;

    let (orders, has_next) = store.orders_below(query.cursor_id, query.size as usize)?;
    let next_cursor_id = orders.last().map(|o| o.id);

    Ok(CursorPage {
        items: store.materialize(orders)?,
        has_next,
        next_cursor_id,
    })
}
