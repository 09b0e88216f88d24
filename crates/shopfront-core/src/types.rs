//! # Domain Types
//!
//! Core domain types used throughout Shopfront POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    LineItem     │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  product_id     │   │  id (UUID)      │       │
//! │  │  sku, barcode   │──►│  description    │──►│  number         │       │
//! │  │  unit_price     │   │  quantity       │   │  customer       │       │
//! │  │  current_stock  │   │  unit_price     │   │  totals         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  InvoiceKind    │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  fraction       │   │  Retail   (5%)  │   │  name           │       │
//! │  │  0.18 = 18%     │   │  TaxInvoice(18%)│   │  phone          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A draft invoice owns its line items exclusively. Line items are snapshots:
//! a later price change in the catalog does not move an item already added.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::totals::InvoiceTotals;

// =============================================================================
// Tax Rate
// =============================================================================

/// A flat tax rate stored as a fraction (0.05 = 5%).
///
/// ## Why one rate per invoice?
/// The shop charges a single flat rate per document type. The rate is fixed
/// when a draft is opened and is never an operator-editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a tax rate from a fraction (0.18 for 18%).
    #[inline]
    pub const fn from_fraction(fraction: Decimal) -> Self {
        TaxRate(fraction)
    }

    /// Creates a tax rate from a percentage (18 for 18%).
    pub fn from_percentage(pct: Decimal) -> Self {
        TaxRate(pct / Decimal::ONE_HUNDRED)
    }

    /// Returns the rate as a fraction.
    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    /// Returns `1 + rate`, the factor from post-discount subtotal to grand total.
    #[inline]
    pub fn gross_multiplier(&self) -> Decimal {
        Decimal::ONE + self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Invoice Kind
// =============================================================================

/// Document type of an invoice; each kind carries its own flat tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Counter sale bill.
    #[default]
    Retail,
    /// Full tax invoice for registered buyers.
    TaxInvoice,
}

impl InvoiceKind {
    /// Rate used when the deployment does not configure one.
    pub fn default_tax_rate(&self) -> TaxRate {
        match self {
            InvoiceKind::Retail => TaxRate::from_fraction(Decimal::new(5, 2)),
            InvoiceKind::TaxInvoice => TaxRate::from_fraction(Decimal::new(18, 2)),
        }
    }

    /// Title printed at the top of the rendered document.
    pub fn title(&self) -> &'static str {
        match self {
            InvoiceKind::Retail => "Retail Invoice",
            InvoiceKind::TaxInvoice => "Tax Invoice",
        }
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceKind::Retail => write!(f, "retail"),
            InvoiceKind::TaxInvoice => write!(f, "tax-invoice"),
        }
    }
}

impl FromStr for InvoiceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" | "bill" => Ok(InvoiceKind::Retail),
            "tax-invoice" | "tax_invoice" | "tax" => Ok(InvoiceKind::TaxInvoice),
            other => Err(ValidationError::InvalidFormat {
                field: "invoice kind".to_string(),
                reason: format!("unknown kind '{}', expected retail or tax-invoice", other),
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of an invoice draft: quantity × unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Catalog product this line was created from, if any.
    pub product_id: Option<String>,

    /// Text printed on the invoice row.
    pub description: String,

    /// Units sold.
    pub quantity: u32,

    /// Price per unit at the time the line was added (frozen).
    #[ts(as = "String")]
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a free-text line. Negative prices are clamped to zero.
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        LineItem {
            product_id: None,
            description: description.into(),
            quantity,
            unit_price: Money::from_decimal(unit_price.max(Decimal::ZERO)),
        }
    }

    /// Creates a line from a catalog product, freezing its current price.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        LineItem {
            product_id: Some(product.id.clone()),
            description: product.name.clone(),
            quantity,
            unit_price: product.unit_price.max(Money::zero()),
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be looked up by barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier assigned by the document store.
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on the invoice.
    pub name: String,

    /// Current selling price.
    #[ts(as = "String")]
    pub unit_price: Money,

    /// Whether to track inventory for this product.
    pub track_inventory: bool,

    /// Allow selling when stock is zero or negative.
    pub allow_negative_stock: bool,

    /// Current stock level.
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,
}

impl Product {
    /// Checks if product can be sold (in stock or doesn't track inventory).
    pub fn can_sell(&self, quantity: i64) -> bool {
        if !self.track_inventory {
            return true;
        }

        let stock = self.current_stock.unwrap_or(0);
        if stock >= quantity {
            return true;
        }

        self.allow_negative_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Buyer details captured on the invoice form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Customer {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A submitted invoice: the frozen result of a validated draft.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Human-readable number printed on the document.
    pub number: String,
    pub kind: InvoiceKind,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
