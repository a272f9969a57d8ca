//! Per-product row lock registry
//!
//! Stock rows are the single point of contention in the system, so
//! exclusivity is keyed by product id: orders touching disjoint products
//! never serialize against each other, orders touching the same product do.
//!
//! A guard is released only when dropped, which happens on every exit path
//! of the surrounding unit of work. Waits are bounded; exceeding the bound
//! surfaces a retryable contention error instead of deadlocking.

use crate::common::error::{CoreError, CoreResult};
use dashmap::DashMap;
use parking_lot::{Mutex, RawMutex, lock_api::ArcMutexGuard};
use std::sync::Arc;
use std::time::Duration;

/// Exclusive hold over one product row; dropping it releases the row.
pub type RowGuard = ArcMutexGuard<RawMutex, ()>;

#[derive(Clone, Default)]
pub struct ProductLocks {
    inner: Arc<DashMap<u64, Arc<Mutex<()>>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the row lock for one product, waiting at most `wait`.
    pub fn acquire(&self, product_id: u64, wait: Duration) -> CoreResult<RowGuard> {
        let cell = self
            .inner
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        match cell.try_lock_arc_for(wait) {
            Some(guard) => Ok(guard),
            None => {
                tracing::warn!(product_id, wait_ms = wait.as_millis() as u64, "lock wait exceeded");
                Err(CoreError::Contention(product_id))
            }
        }
    }

    /// Acquire several product rows at once.
    ///
    /// Ids are deduplicated and taken in ascending order so that two
    /// multi-product units of work can never deadlock against each other.
    pub fn acquire_many(&self, product_ids: &[u64], wait: Duration) -> CoreResult<Vec<RowGuard>> {
        let mut ids = product_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id, wait)?);
        }
        Ok(guards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(50);

    #[test]
    fn contended_row_times_out() {
        let locks = ProductLocks::new();
        let held = locks.acquire(1, WAIT).unwrap();

        let err = locks.acquire(1, WAIT).err().unwrap();
        assert!(matches!(err, CoreError::Contention(1)));
        assert!(err.is_retryable());

        drop(held);
        assert!(locks.acquire(1, WAIT).is_ok());
    }

    #[test]
    fn unrelated_rows_do_not_serialize() {
        let locks = ProductLocks::new();
        let _a = locks.acquire(1, WAIT).unwrap();
        assert!(locks.acquire(2, WAIT).is_ok());
    }

    #[test]
    fn acquire_many_dedups_ids() {
        let locks = ProductLocks::new();
        // Duplicate ids in one request must not self-deadlock.
        let guards = locks.acquire_many(&[3, 1, 3, 2, 1], WAIT).unwrap();
        assert_eq!(guards.len(), 3);
    }
}
