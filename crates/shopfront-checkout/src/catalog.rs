//! # Product Catalog
//!
//! Barcode lookup and stock bookkeeping behind a trait seam.
//!
//! ```text
//! ┌──────────────────┐   find_by_barcode    ┌─────────────────────────┐
//! │ CheckoutSession  │ ───────────────────► │ impl ProductCatalog     │
//! │                  │   find_by_id         │  • InMemoryCatalog      │
//! │                  │ ───────────────────► │  • hosted document store│
//! │                  │   adjust_stock       │    (external)           │
//! │                  │ ───────────────────► │                         │
//! └──────────────────┘                      └─────────────────────────┘
//! ```

use std::collections::HashMap;

use shopfront_core::validation::validate_barcode;
use shopfront_core::{CoreError, CoreResult, Product};
use tracing::debug;

/// Lookup and inventory operations the checkout needs from product storage.
pub trait ProductCatalog {
    /// Finds a product by its barcode.
    ///
    /// Returns `CoreError::BarcodeNotFound` for unknown codes.
    fn find_by_barcode(&self, barcode: &str) -> CoreResult<Product>;

    /// Finds a product by id.
    fn find_by_id(&self, id: &str) -> CoreResult<Product>;

    /// Adds `delta` to the product's stock and returns the new level.
    ///
    /// Products that do not track inventory are left untouched and report
    /// `None`.
    fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<Option<i64>>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, Product>,
    by_barcode: HashMap<String, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of products.
    pub fn with_products<I>(products: I) -> Self
    where
        I: IntoIterator<Item = Product>,
    {
        let mut catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Inserts or replaces a product, re-indexing its barcode.
    pub fn insert(&mut self, product: Product) {
        if let Some(previous) = self.products.get(&product.id) {
            if let Some(code) = &previous.barcode {
                self.by_barcode.remove(code);
            }
        }
        if let Some(code) = &product.barcode {
            self.by_barcode.insert(code.clone(), product.id.clone());
        }
        self.products.insert(product.id.clone(), product);
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find_by_barcode(&self, barcode: &str) -> CoreResult<Product> {
        let barcode = barcode.trim();
        validate_barcode(barcode)?;

        self.by_barcode
            .get(barcode)
            .and_then(|id| self.products.get(id))
            .cloned()
            .ok_or_else(|| CoreError::BarcodeNotFound(barcode.to_string()))
    }

    fn find_by_id(&self, id: &str) -> CoreResult<Product> {
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<Option<i64>> {
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if !product.track_inventory {
            return Ok(None);
        }

        let current = product.current_stock.unwrap_or(0);
        let updated = current + delta;
        if updated < 0 && !product.allow_negative_stock {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: current,
                requested: -delta,
            });
        }

        product.current_stock = Some(updated);
        debug!(sku = %product.sku, from = current, to = updated, "Stock adjusted");
        Ok(Some(updated))
    }
}
