//! Stock ledger
//!
//! Every quantity mutation goes through here. The invariant is that a
//! stock row never goes below zero at any observable point: the product
//! row lock is held across the whole read-check-write, and the write
//! itself happens inside one transaction. A bare read-then-write without
//! the held lock would reintroduce the lost-update race this exists to
//! prevent.

use crate::common::error::{CoreError, CoreResult};
use crate::common::require_elevated;
use crate::stock::locks::ProductLocks;
use crate::store::Store;
use redb::WriteTransaction;
use shared::auth::Principal;
use shared::response::StockView;
use std::time::Duration;

#[derive(Clone)]
pub struct StockLedger {
    store: Store,
    locks: ProductLocks,
    lock_wait: Duration,
}

impl StockLedger {
    pub fn new(store: Store, locks: ProductLocks, lock_wait: Duration) -> Self {
        Self {
            store,
            locks,
            lock_wait,
        }
    }

    pub(crate) fn locks(&self) -> &ProductLocks {
        &self.locks
    }

    pub(crate) fn lock_wait(&self) -> Duration {
        self.lock_wait
    }

    // ========== In-Transaction Primitives ==========
    //
    // Used by the order lifecycle so that reservations and releases commit
    // together with the order row. Caller must hold the row lock for every
    // product it touches.

    /// Decrement available quantity (within transaction).
    pub(crate) fn reserve_txn(
        &self,
        txn: &WriteTransaction,
        product_id: u64,
        quantity: i64,
    ) -> CoreResult<i64> {
        self.apply_delta(txn, product_id, -quantity)
    }

    /// Increment available quantity (within transaction).
    pub(crate) fn release_txn(
        &self,
        txn: &WriteTransaction,
        product_id: u64,
        quantity: i64,
    ) -> CoreResult<i64> {
        self.apply_delta(txn, product_id, quantity)
    }

    fn apply_delta(&self, txn: &WriteTransaction, product_id: u64, delta: i64) -> CoreResult<i64> {
        let current = self
            .store
            .stock_get_txn(txn, product_id)?
            .ok_or_else(|| CoreError::NotFound(format!("stock row for product {product_id}")))?;

        // `current` is never negative, so only a positive delta can
        // overflow the addition.
        let next = current.checked_add(delta).ok_or_else(|| {
            CoreError::InvalidArgument(format!(
                "stock delta {delta} overflows quantity {current} for product {product_id}"
            ))
        })?;
        if next < 0 {
            return Err(CoreError::InsufficientStock {
                product_id,
                available: current,
                requested: delta.saturating_neg(),
            });
        }

        self.store.stock_put_txn(txn, product_id, next)?;
        Ok(next)
    }

    // ========== Standalone Operations ==========

    /// Reserve `quantity` units as its own unit of work.
    pub fn reserve(&self, product_id: u64, quantity: u32) -> CoreResult<StockView> {
        self.mutate(product_id, -i64::from(quantity))
    }

    /// Return `quantity` units as its own unit of work.
    pub fn release(&self, product_id: u64, quantity: u32) -> CoreResult<StockView> {
        self.mutate(product_id, i64::from(quantity))
    }

    /// Apply a signed delta. MANAGER/ADMIN only.
    pub fn adjust(
        &self,
        product_id: u64,
        delta: i64,
        principal: &Principal,
    ) -> CoreResult<StockView> {
        require_elevated(principal)?;
        let view = self.mutate(product_id, delta)?;
        tracing::info!(product_id, delta, quantity = view.quantity, "stock adjusted");
        Ok(view)
    }

    /// Overwrite the quantity. MANAGER/ADMIN only.
    pub fn set(
        &self,
        product_id: u64,
        quantity: i64,
        principal: &Principal,
    ) -> CoreResult<StockView> {
        require_elevated(principal)?;
        if quantity < 0 {
            return Err(CoreError::InvalidArgument(format!(
                "stock quantity must be non-negative, got {quantity}"
            )));
        }

        let _guard = self.locks.acquire(product_id, self.lock_wait)?;
        let txn = self.store.begin_write()?;
        if self.store.stock_get_txn(&txn, product_id)?.is_none() {
            return Err(CoreError::NotFound(format!(
                "stock row for product {product_id}"
            )));
        }
        self.store.stock_put_txn(&txn, product_id, quantity)?;
        self.store.commit(txn)?;

        tracing::info!(product_id, quantity, "stock set");
        Ok(StockView {
            product_id,
            quantity,
        })
    }

    /// Non-blocking snapshot read; takes no row lock.
    pub fn get(&self, product_id: u64) -> CoreResult<StockView> {
        let quantity = self
            .store
            .stock_get(product_id)?
            .ok_or_else(|| CoreError::NotFound(format!("stock row for product {product_id}")))?;
        Ok(StockView {
            product_id,
            quantity,
        })
    }

    fn mutate(&self, product_id: u64, delta: i64) -> CoreResult<StockView> {
        let _guard = self.locks.acquire(product_id, self.lock_wait)?;

        // Any error below drops the transaction uncommitted: rollback.
        let txn = self.store.begin_write()?;
        let quantity = self.apply_delta(&txn, product_id, delta)?;
        self.store.commit(txn)?;

        Ok(StockView {
            product_id,
            quantity,
        })
    }
}
