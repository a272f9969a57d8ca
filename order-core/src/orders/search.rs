//! Dynamic order search
//!
//! One query is built from zero or more independent predicates; only the
//! predicates whose filter is present are added, and they combine
//! conjunctively. The ordering clause is fixed regardless of which filters
//! applied: creation time descending, then id descending, a total order
//! that stays stable when many orders share a timestamp.

use crate::common::error::CoreResult;
use crate::models::StoredOrder;
use crate::store::Store;
use shared::request::OrderSearchQuery;
use shared::response::OrderDetail;

type Predicate = Box<dyn Fn(&StoredOrder) -> bool>;

fn build_predicates(query: &OrderSearchQuery) -> Vec<Predicate> {
    let mut predicates: Vec<Predicate> = Vec::new();

    if let Some(user_id) = query.user_id {
        predicates.push(Box::new(move |o| o.user_id == user_id));
    }
    if let Some(status) = query.status {
        predicates.push(Box::new(move |o| o.status == status));
    }
    if let Some(from) = query.from {
        let from = from.timestamp_millis();
        predicates.push(Box::new(move |o| o.created_at >= from));
    }
    if let Some(to) = query.to {
        let to = to.timestamp_millis();
        predicates.push(Box::new(move |o| o.created_at <= to));
    }

    predicates
}

/// Run the search; lines and product names are materialized in the same
/// retrieval, never one query per order.
pub fn execute(store: &Store, query: &OrderSearchQuery) -> CoreResult<Vec<OrderDetail>> {
    let predicates = build_predicates(query);

    let mut orders = store.orders_snapshot()?;
    orders.retain(|order| predicates.iter().all(|p| p(order)));
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    tracing::debug!(matched = orders.len(), "order search executed");
    Ok(store.materialize(orders)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    fn order(id: u64, user_id: u64, status: OrderStatus, created_at: i64) -> StoredOrder {
        StoredOrder {
            id,
            user_id,
            status,
            created_at,
            lines: Vec::new(),
        }
    }

    fn matches(query: &OrderSearchQuery, order: &StoredOrder) -> bool {
        build_predicates(query).iter().all(|p| p(order))
    }

    #[test]
    fn no_filters_matches_everything() {
        let query = OrderSearchQuery::default();
        assert!(matches(&query, &order(1, 7, OrderStatus::Pending, 100)));
        assert!(matches(&query, &order(2, 8, OrderStatus::Cancelled, 200)));
    }

    #[test]
    fn filters_are_conjunctive() {
        let query = OrderSearchQuery {
            user_id: Some(7),
            status: Some(OrderStatus::Approved),
            ..Default::default()
        };
        assert!(matches(&query, &order(1, 7, OrderStatus::Approved, 100)));
        assert!(!matches(&query, &order(2, 7, OrderStatus::Pending, 100)));
        assert!(!matches(&query, &order(3, 8, OrderStatus::Approved, 100)));
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let from = chrono::DateTime::from_timestamp_millis(100).unwrap();
        let to = chrono::DateTime::from_timestamp_millis(200).unwrap();
        let query = OrderSearchQuery {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };

        assert!(!matches(&query, &order(1, 7, OrderStatus::Pending, 99)));
        assert!(matches(&query, &order(2, 7, OrderStatus::Pending, 100)));
        assert!(matches(&query, &order(3, 7, OrderStatus::Pending, 200)));
        assert!(!matches(&query, &order(4, 7, OrderStatus::Pending, 201)));
    }
}
