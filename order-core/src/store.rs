//! redb-backed storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `u64` | JSON `Product` | catalog rows |
//! | `product_names` | `&str` | `u64` | unique-name index |
//! | `stock` | `u64` product id | `i64` quantity | one row per product |
//! | `orders` | `u64` | JSON `StoredOrder` | orders with embedded lines |
//! | `sequence_counter` | `&str` | `u64` | id allocation |
//!
//! Every multi-step write runs inside one [`WriteTransaction`]: commit
//! publishes the whole unit of work, dropping the transaction without
//! committing publishes nothing. Identity keys are allocated from the
//! sequence table inside the same transaction as the row they identify, so
//! an aborted create leaves no gap-visible state behind.

use crate::common::error::{StorageError, StorageResult};
use crate::models::{Product, StoredOrder};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::response::{OrderDetail, OrderLineView};
use std::path::Path;
use std::sync::Arc;

const PRODUCTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("products");
const PRODUCT_NAMES_TABLE: TableDefinition<&str, u64> = TableDefinition::new("product_names");
const STOCK_TABLE: TableDefinition<u64, i64> = TableDefinition::new("stock");
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const PRODUCT_SEQ_KEY: &str = "product_seq";
const ORDER_SEQ_KEY: &str = "order_seq";

/// Storage handle; cheap to clone, safe to share across threads.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path.
    ///
    /// redb commits with immediate durability by default; a committed unit
    /// of work survives process death, and the file is always left in a
    /// consistent state.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Create all tables up front so later read transactions never see
        // a missing table.
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(PRODUCTS_TABLE)?;
            let _ = txn.open_table(PRODUCT_NAMES_TABLE)?;
            let _ = txn.open_table(STOCK_TABLE)?;
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(SEQUENCE_TABLE)?;
        }
        txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction (the unit of work).
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Commit a unit of work.
    pub fn commit(&self, txn: WriteTransaction) -> StorageResult<()> {
        Ok(txn.commit()?)
    }

    // ========== Sequence Operations ==========

    fn next_id(&self, txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Allocate the next product id (within transaction).
    pub fn next_product_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, PRODUCT_SEQ_KEY)
    }

    /// Allocate the next order id (within transaction).
    pub fn next_order_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, ORDER_SEQ_KEY)
    }

    // ========== Product Operations ==========

    /// Insert a product and register its name in the unique-name index.
    pub fn insert_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let value = serde_json::to_vec(product)?;
        let mut products = txn.open_table(PRODUCTS_TABLE)?;
        products.insert(product.id, value.as_slice())?;
        drop(products);

        let mut names = txn.open_table(PRODUCT_NAMES_TABLE)?;
        names.insert(product.name.as_str(), product.id)?;
        Ok(())
    }

    /// Overwrite a product, moving its name index entry when renamed.
    pub fn update_product(
        &self,
        txn: &WriteTransaction,
        product: &Product,
        previous_name: &str,
    ) -> StorageResult<()> {
        let value = serde_json::to_vec(product)?;
        let mut products = txn.open_table(PRODUCTS_TABLE)?;
        products.insert(product.id, value.as_slice())?;
        drop(products);

        if previous_name != product.name {
            let mut names = txn.open_table(PRODUCT_NAMES_TABLE)?;
            names.remove(previous_name)?;
            names.insert(product.name.as_str(), product.id)?;
        }
        Ok(())
    }

    /// Look up the owner of a product name (within transaction).
    pub fn product_id_by_name(
        &self,
        txn: &WriteTransaction,
        name: &str,
    ) -> StorageResult<Option<u64>> {
        let table = txn.open_table(PRODUCT_NAMES_TABLE)?;
        Ok(table.get(name)?.map(|g| g.value()))
    }

    /// Read a product inside a write transaction.
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: u64,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        table
            .get(product_id)?
            .map(|g| serde_json::from_slice(g.value()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Snapshot read of a product.
    pub fn get_product(&self, product_id: u64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        table
            .get(product_id)?
            .map(|g| serde_json::from_slice(g.value()))
            .transpose()
            .map_err(StorageError::from)
    }

    // ========== Stock Operations ==========

    /// Read one stock quantity inside a write transaction.
    pub fn stock_get_txn(
        &self,
        txn: &WriteTransaction,
        product_id: u64,
    ) -> StorageResult<Option<i64>> {
        let table = txn.open_table(STOCK_TABLE)?;
        Ok(table.get(product_id)?.map(|g| g.value()))
    }

    /// Overwrite one stock quantity inside a write transaction.
    pub fn stock_put_txn(
        &self,
        txn: &WriteTransaction,
        product_id: u64,
        quantity: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(STOCK_TABLE)?;
        table.insert(product_id, quantity)?;
        Ok(())
    }

    /// Non-blocking snapshot read of one stock quantity.
    pub fn stock_get(&self, product_id: u64) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STOCK_TABLE)?;
        Ok(table.get(product_id)?.map(|g| g.value()))
    }

    // ========== Order Operations ==========

    /// Insert or overwrite an order row.
    pub fn put_order(&self, txn: &WriteTransaction, order: &StoredOrder) -> StorageResult<()> {
        let value = serde_json::to_vec(order)?;
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.insert(order.id, value.as_slice())?;
        Ok(())
    }

    /// Read one order inside a write transaction.
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StorageResult<Option<StoredOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        table
            .get(order_id)?
            .map(|g| serde_json::from_slice(g.value()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Snapshot read of one order.
    pub fn get_order(&self, order_id: u64) -> StorageResult<Option<StoredOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        table
            .get(order_id)?
            .map(|g| serde_json::from_slice(g.value()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Full scan of the orders table, ascending id order.
    ///
    /// Search and offset paging filter and re-sort this snapshot; keyset
    /// paging uses [`Store::orders_below`] instead to stay depth-independent.
    pub fn orders_snapshot(&self) -> StorageResult<Vec<StoredOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Up to `limit` orders with id strictly below `cursor` (all ids when
    /// absent), newest id first. The second element reports whether more
    /// rows remain past the returned page.
    ///
    /// A bounded reverse range scan over the key space: cost depends on the
    /// page size, not on how deep the cursor already is.
    pub fn orders_below(
        &self,
        cursor: Option<u64>,
        limit: usize,
    ) -> StorageResult<(Vec<StoredOrder>, bool)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let range = match cursor {
            Some(cursor) => table.range(..cursor)?,
            None => table.range::<u64>(..)?,
        };

        let mut orders = Vec::with_capacity(limit);
        let mut has_next = false;
        for result in range.rev() {
            let (_key, value) = result?;
            if orders.len() == limit {
                has_next = true;
                break;
            }
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok((orders, has_next))
    }

    // ========== Materialization ==========

    /// Resolve product names for a batch of orders in one read transaction,
    /// preserving input order. Point lookups against the products table —
    /// no per-order round trip.
    pub fn materialize(&self, orders: Vec<StoredOrder>) -> StorageResult<Vec<OrderDetail>> {
        let read_txn = self.db.begin_read()?;
        let products = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let mut lines = Vec::with_capacity(order.lines.len());
            for line in &order.lines {
                let product: Product = products
                    .get(line.product_id)?
                    .map(|g| serde_json::from_slice(g.value()))
                    .transpose()?
                    .ok_or_else(|| {
                        StorageError::Integrity(format!(
                            "order {} references missing product {}",
                            order.id, line.product_id
                        ))
                    })?;
                let line_total = line
                    .unit_price
                    .checked_mul(i64::from(line.quantity))
                    .ok_or_else(|| {
                        StorageError::Integrity(format!(
                            "order {} line total overflows for product {}",
                            order.id, line.product_id
                        ))
                    })?;
                lines.push(OrderLineView {
                    product_id: line.product_id,
                    product_name: product.name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total,
                });
            }

            let created_at =
                chrono::DateTime::from_timestamp_millis(order.created_at).ok_or_else(|| {
                    StorageError::Integrity(format!(
                        "order {} has invalid timestamp {}",
                        order.id, order.created_at
                    ))
                })?;

            details.push(OrderDetail {
                order_id: order.id,
                user_id: order.user_id,
                status: order.status,
                created_at,
                lines,
            });
        }
        Ok(details)
    }

    /// [`Store::materialize`] for a single order.
    pub fn materialize_one(&self, order: StoredOrder) -> StorageResult<OrderDetail> {
        let order_id = order.id;
        self.materialize(vec![order])?
            .pop()
            .ok_or_else(|| StorageError::Integrity(format!("order {order_id} vanished")))
    }
}
