//! # Checkout Session
//!
//! Owns the invoice draft currently open on the form.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` by [`SessionState`] because:
//! 1. The scan listener feeds barcodes from the keyboard path
//! 2. Form edits arrive from the UI path
//! 3. Only one of them should modify the draft at a time
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Draft Operations                                     │
//! │                                                                         │
//! │  Operator Action          Session Method          Draft Change          │
//! │  ───────────────          ──────────────          ────────────          │
//! │                                                                         │
//! │  Scan barcode ───────────► scan_barcode() ──────► line qty += 1        │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ───► items[i].qty = n     │
//! │                                                                         │
//! │  Edit discount / total ──► apply_edit() ────────► totals re-derived    │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► items.remove(i)      │
//! │                                                                         │
//! │  Generate Invoice ───────► submit() ────────────► Invoice + new draft  │
//! │                                                                         │
//! │  NOTE: every line change re-derives totals from the current discount %. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use shopfront_core::totals::TotalsEdit;
use shopfront_core::validation::{validate_line_count, validate_quantity, validate_submission};
use shopfront_core::{
    CoreError, Customer, EditedField, Invoice, InvoiceKind, InvoiceTotals, LineItem, Product,
    TaxRate, TotalsEngine, MAX_ITEM_QUANTITY, MAX_LINE_ITEMS,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};

/// The invoice draft and the catalog it sells from.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product increases quantity)
/// - Quantity is always 1..=999 (setting 0 removes the line)
/// - At most 100 lines
/// - The tax rate is fixed for the lifetime of the session
#[derive(Debug)]
pub struct CheckoutSession<C> {
    catalog: C,
    kind: InvoiceKind,
    customer: Customer,
    engine: TotalsEngine,
    next_number: u64,
}

impl<C: ProductCatalog> CheckoutSession<C> {
    /// Opens an empty draft with a fixed tax rate.
    pub fn new(catalog: C, kind: InvoiceKind, tax_rate: TaxRate) -> Self {
        info!(%kind, tax_rate = %tax_rate.percentage(), "Checkout session opened");
        CheckoutSession {
            catalog,
            kind,
            customer: Customer::default(),
            engine: TotalsEngine::new(tax_rate),
            next_number: 1,
        }
    }

    /// Opens a draft of the configured default kind.
    pub fn from_config(catalog: C, config: &CheckoutConfig) -> Self {
        let kind = config.default_kind();
        Self::new(catalog, kind, config.tax_rate_for(kind))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.engine.tax_rate()
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn items(&self) -> &[LineItem] {
        self.engine.items()
    }

    /// Current derived totals.
    pub fn totals(&self) -> InvoiceTotals {
        self.engine.totals()
    }

    pub fn last_edited(&self) -> EditedField {
        self.engine.last_edited()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.items().is_empty()
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut C {
        &mut self.catalog
    }

    // =========================================================================
    // Line Operations
    // =========================================================================

    /// Looks up a scanned barcode and adds one unit of the product.
    pub fn scan_barcode(&mut self, barcode: &str) -> CheckoutResult<InvoiceTotals> {
        let product = self.catalog.find_by_barcode(barcode)?;
        debug!(barcode = %barcode, product_id = %product.id, "Barcode resolved");
        self.add_product(&product, 1)
    }

    /// Adds a product or increases its quantity if already on the draft.
    ///
    /// ## Returns
    /// - `Ok(totals)` with the re-derived totals
    /// - `Err` if the product is inactive, the quantity would exceed 999,
    ///   the draft is full, or stock does not cover the new quantity
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> CheckoutResult<InvoiceTotals> {
        if !product.is_active {
            return Err(CoreError::ProductInactive(product.id.clone()).into());
        }
        validate_quantity(quantity)?;

        self.engine.update_line_items(|items| {
            let existing = items
                .iter_mut()
                .find(|item| item.product_id.as_deref() == Some(product.id.as_str()));

            if let Some(item) = existing {
                let new_qty = item.quantity.saturating_add(quantity);
                if new_qty > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: new_qty,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                check_stock(product, new_qty)?;
                item.quantity = new_qty;
                return Ok(());
            }

            validate_line_count(items.len()).map_err(|_| CoreError::DraftTooLarge {
                max: MAX_LINE_ITEMS,
            })?;
            check_stock(product, quantity)?;
            items.push(LineItem::from_product(product, quantity));
            Ok(())
        })?;

        debug!(product_id = %product.id, quantity, "Product added to draft");
        Ok(self.engine.totals())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - If quantity is 0: removes the line
    /// - If the product is not on the draft: `ItemNotInDraft`
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> CheckoutResult<InvoiceTotals> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        if !self
            .engine
            .items()
            .iter()
            .any(|item| item.product_id.as_deref() == Some(product_id))
        {
            return Err(CoreError::ItemNotInDraft(product_id.to_string()).into());
        }

        let product = self.catalog.find_by_id(product_id)?;
        check_stock(&product, quantity)?;

        self.engine.update_line_items(|items| {
            for item in items
                .iter_mut()
                .filter(|item| item.product_id.as_deref() == Some(product_id))
            {
                item.quantity = quantity;
            }
        });

        Ok(self.engine.totals())
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CheckoutResult<InvoiceTotals> {
        let removed = self.engine.update_line_items(|items| {
            let before = items.len();
            items.retain(|item| item.product_id.as_deref() != Some(product_id));
            items.len() != before
        });

        if !removed {
            return Err(CoreError::ItemNotInDraft(product_id.to_string()).into());
        }

        debug!(product_id = %product_id, "Line removed");
        Ok(self.engine.totals())
    }

    // =========================================================================
    // Form Fields
    // =========================================================================

    /// Applies a discount or grand-total edit from the form.
    pub fn apply_edit(&mut self, edit: TotalsEdit) -> InvoiceTotals {
        self.engine.apply(edit)
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = customer;
    }

    /// Discards the draft: lines, discount, and customer.
    pub fn clear(&mut self) {
        self.engine.reset();
        self.customer = Customer::default();
        debug!("Draft cleared");
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Finalizes the draft into an [`Invoice`] and opens a fresh draft.
    ///
    /// ## Submission Flow
    /// ```text
    /// validate customer + lines ──► check stock for every line
    ///                                        │
    ///                                        ▼
    ///                               decrement tracked stock
    ///                                        │
    ///                                        ▼
    ///                         Invoice { id, number, totals, ... }
    ///                                        │
    ///                                        ▼
    ///                                  draft cleared
    /// ```
    ///
    /// On error the draft is left exactly as it was.
    pub fn submit(&mut self) -> CheckoutResult<Invoice> {
        let items = self.engine.items().to_vec();
        validate_submission(&self.customer, &items)?;

        let mut sold = Vec::new();
        for item in &items {
            if let Some(product_id) = &item.product_id {
                let product = self.catalog.find_by_id(product_id)?;
                check_stock(&product, item.quantity)?;
                sold.push((product_id.clone(), i64::from(item.quantity)));
            }
        }

        // Stock was checked above; a failure here leaves the catalog half updated
        for (product_id, quantity) in &sold {
            self.catalog.adjust_stock(product_id, -quantity).map_err(|e| {
                CheckoutError::Internal(format!("stock update for {} failed: {}", product_id, e))
            })?;
        }

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            number: format!("INV-{:06}", self.next_number),
            kind: self.kind,
            customer: Customer::new(self.customer.name.trim(), self.customer.phone.trim()),
            items,
            totals: self.engine.totals(),
            issued_at: Utc::now(),
        };
        self.next_number += 1;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            lines = invoice.items.len(),
            grand_total = %invoice.totals.grand_total,
            "Invoice submitted"
        );

        self.clear();
        Ok(invoice)
    }
}

fn check_stock(product: &Product, quantity: u32) -> Result<(), CoreError> {
    let requested = i64::from(quantity);
    if product.can_sell(requested) {
        return Ok(());
    }
    Err(CoreError::InsufficientStock {
        sku: product.sku.clone(),
        available: product.current_stock.unwrap_or(0),
        requested,
    })
}

// =============================================================================
// Shared State
// =============================================================================

/// Shared handle to a checkout session.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<CheckoutSession>>`:
/// - `Arc`: the scan callback and the form both hold a handle
/// - `Mutex`: only one of them modifies the draft at a time
///
/// A poisoned lock is recovered: the draft is plain data and every
/// operation leaves it consistent before it can panic.
#[derive(Debug)]
pub struct SessionState<C> {
    session: Arc<Mutex<CheckoutSession<C>>>,
}

impl<C> Clone for SessionState<C> {
    fn clone(&self) -> Self {
        SessionState {
            session: Arc::clone(&self.session),
        }
    }
}

impl<C: ProductCatalog> SessionState<C> {
    pub fn new(session: CheckoutSession<C>) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_session(|s| s.totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CheckoutSession<C>) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.scan_barcode("8901234567890"))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CheckoutSession<C>) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}
