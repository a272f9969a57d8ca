//! Order domain
//!
//! - **service**: lifecycle (create, approve, cancel) and search entry point
//! - **search**: dynamic multi-predicate historical queries
//! - **page**: offset and keyset pagination over the order listing

pub mod page;
pub mod search;
pub mod service;
