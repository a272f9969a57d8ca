//! Shared types for the order processing core
//!
//! Transport-agnostic domain enums and request/response shapes, consumed by
//! both the core and the surrounding service layer. Nothing in here touches
//! storage or concurrency; these are plain data carriers.

pub mod auth;
pub mod order;
pub mod request;
pub mod response;
