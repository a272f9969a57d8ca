//! Inventory-consistent order processing core
//!
//! Accepts multi-line purchase orders against a shared stock of products,
//! guarantees that concurrent orders never drive any product's stock below
//! zero, drives each order through its lifecycle, and serves filtered,
//! paginated historical queries.
//!
//! # Architecture
//!
//! ```text
//! create / approve / cancel           search / pages
//!          │                                │
//!          ▼                                ▼
//!    OrderService ──────┐           search / page modules
//!          │            │                   │
//!          ▼            ▼                   │
//!    StockLedger   ProductCatalog           │
//!          │            │                   │
//!          └──────┬─────┴───────────────────┘
//!                 ▼
//!               Store (redb, transactional)
//! ```
//!
//! Write paths acquire the per-product row locks first, then perform every
//! read-check-write inside a single redb write transaction: commit publishes
//! the whole unit of work, dropping the transaction publishes nothing.

pub mod catalog;
pub mod common;
pub mod config;
pub mod models;
pub mod orders;
pub mod state;
pub mod stock;
pub mod store;

pub use catalog::ProductCatalog;
pub use common::error::{CoreError, CoreResult, StorageError, StorageResult};
pub use config::Config;
pub use orders::service::OrderService;
pub use state::AppState;
pub use stock::ledger::StockLedger;
pub use stock::locks::ProductLocks;
pub use store::Store;
