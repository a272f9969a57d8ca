//! Aggregated service state
//!
//! Wires the storage handle, the lock registry, and the services together.
//! The surrounding layer holds one `AppState` (it is cheap to clone) and
//! calls into the services from its request handlers.

use crate::catalog::ProductCatalog;
use crate::common::error::{CoreResult, StorageError};
use crate::config::Config;
use crate::orders::service::OrderService;
use crate::stock::ledger::StockLedger;
use crate::stock::locks::ProductLocks;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub catalog: ProductCatalog,
    pub stock: StockLedger,
    pub orders: OrderService,
}

impl AppState {
    pub fn open(config: &Config) -> CoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(StorageError::from)?;
        let store = Store::open(config.db_path())?;

        let locks = ProductLocks::new();
        let stock = StockLedger::new(store.clone(), locks, config.lock_wait);
        let orders = OrderService::new(store.clone(), stock.clone());
        let catalog = ProductCatalog::new(store.clone());

        tracing::info!(db_path = %config.db_path().display(), "order core ready");
        Ok(Self {
            store,
            catalog,
            stock,
            orders,
        })
    }
}
