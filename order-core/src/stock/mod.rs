//! Stock domain: per-product row locks and the quantity ledger

pub mod ledger;
pub mod locks;
