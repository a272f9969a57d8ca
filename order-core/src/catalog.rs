//! Product catalog
//!
//! Admin-facing product management. Creating a product also creates its
//! stock row at quantity zero in the same transaction, so a stock row
//! exists for every product from the moment it is visible.

use crate::common::error::{CoreError, CoreResult};
use crate::common::require_admin;
use crate::models::Product;
use crate::store::Store;
use shared::auth::Principal;
use shared::response::ProductView;

const MAX_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct ProductCatalog {
    store: Store,
}

impl ProductCatalog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn check_name(name: &str) -> CoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "product name must not be blank".to_string(),
            ));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(CoreError::InvalidArgument(format!(
                "product name must be at most {MAX_NAME_LEN} bytes"
            )));
        }
        Ok(())
    }

    /// Register a product. ADMIN only.
    pub fn create(&self, name: &str, price: i64, principal: &Principal) -> CoreResult<ProductView> {
        require_admin(principal)?;
        Self::check_name(name)?;
        if price < 0 {
            return Err(CoreError::InvalidArgument(format!(
                "price must be non-negative, got {price}"
            )));
        }

        let txn = self.store.begin_write()?;
        if self.store.product_id_by_name(&txn, name)?.is_some() {
            return Err(CoreError::InvalidArgument(format!(
                "product name already in use: {name}"
            )));
        }

        let product = Product {
            id: self.store.next_product_id(&txn)?,
            name: name.to_string(),
            price,
        };
        self.store.insert_product(&txn, &product)?;
        // Stock row is born with its product.
        self.store.stock_put_txn(&txn, product.id, 0)?;
        self.store.commit(txn)?;

        tracing::info!(product_id = product.id, name, price, "product created");
        Ok(ProductView {
            product_id: product.id,
            name: product.name,
            price: product.price,
        })
    }

    /// Update name and/or price. ADMIN only. A payload that changes nothing
    /// is rejected rather than silently accepted.
    pub fn update(
        &self,
        product_id: u64,
        name: Option<&str>,
        price: Option<i64>,
        principal: &Principal,
    ) -> CoreResult<ProductView> {
        require_admin(principal)?;
        if name.is_none() && price.is_none() {
            return Err(CoreError::InvalidArgument(
                "nothing to update".to_string(),
            ));
        }

        let txn = self.store.begin_write()?;
        let mut product = self
            .store
            .get_product_txn(&txn, product_id)?
            .ok_or_else(|| CoreError::NotFound(format!("product {product_id}")))?;

        let name_changed = name.is_some_and(|n| n != product.name);
        let price_changed = price.is_some_and(|p| p != product.price);
        if !name_changed && !price_changed {
            return Err(CoreError::InvalidArgument(
                "no changes requested".to_string(),
            ));
        }

        let previous_name = product.name.clone();
        if let Some(new_name) = name.filter(|_| name_changed) {
            Self::check_name(new_name)?;
            if self
                .store
                .product_id_by_name(&txn, new_name)?
                .is_some_and(|owner| owner != product_id)
            {
                return Err(CoreError::InvalidArgument(format!(
                    "product name already in use: {new_name}"
                )));
            }
            product.name = new_name.to_string();
        }
        if let Some(new_price) = price.filter(|_| price_changed) {
            if new_price < 0 {
                return Err(CoreError::InvalidArgument(format!(
                    "price must be non-negative, got {new_price}"
                )));
            }
            product.price = new_price;
        }

        self.store.update_product(&txn, &product, &previous_name)?;
        self.store.commit(txn)?;

        tracing::info!(product_id, "product updated");
        Ok(ProductView {
            product_id: product.id,
            name: product.name,
            price: product.price,
        })
    }

    /// Look up one product.
    pub fn get(&self, product_id: u64) -> CoreResult<ProductView> {
        let product = self
            .store
            .get_product(product_id)?
            .ok_or_else(|| CoreError::NotFound(format!("product {product_id}")))?;
        Ok(ProductView {
            product_id: product.id,
            name: product.name,
            price: product.price,
        })
    }
}
