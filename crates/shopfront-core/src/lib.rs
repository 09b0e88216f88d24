//! # shopfront-core: Pure Business Logic for Shopfront POS
//!
//! This crate holds the two pieces of the checkout flow where a logic bug
//! produces wrong money or wrong data rather than wrong pixels: the invoice
//! totals engine and the barcode scanner keystroke filter. Everything here is
//! deterministic and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shopfront POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Checkout / Inventory UI                        │   │
//! │  │    Invoice dialog ──► Discount fields ──► Scan input field      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopfront-checkout                              │   │
//! │  │    session, catalog, listener, document export, config          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopfront-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  totals   │  │  scanner  │  │   money   │  │ validation│  │   │
//! │  │   │  Engine   │  │ ScanFilter│  │   Money   │  │  submit   │  │   │
//! │  │   │  Totals   │  │ KeyEvent  │  │  TaxRate  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`totals`] - Financial derivation engine (subtotal → discount → tax → total)
//! - [`scanner`] - Scanner burst vs. human typing disambiguation
//! - [`money`] - Decimal money type, rounded only for display
//! - [`types`] - Domain types (LineItem, Product, TaxRate, InvoiceKind)
//! - [`validation`] - Submission-time rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use shopfront_core::{LineItem, TaxRate, TotalsEngine};
//!
//! let mut engine = TotalsEngine::new(TaxRate::from_percentage(Decimal::new(5, 0)));
//! engine.set_line_items(vec![LineItem::new("Rice 5kg", 1, Decimal::from(1000))]);
//! let totals = engine.set_discount_percentage(Decimal::from(10));
//!
//! assert_eq!(totals.grand_total.amount(), Decimal::from(945));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod scanner;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use scanner::{Key, KeyDisposition, KeyEvent, Modifiers, ScanFilter, ScanState, ScannerConfig};
pub use totals::{EditedField, InvoiceTotals, TotalsEdit, TotalsEngine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines on one invoice draft.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// A scanner that double-fires, or a cashier typing 1000 instead of 10,
/// should hit a wall instead of producing a four-digit line.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Default maximum gap between two keystrokes of the same scan burst.
pub const DEFAULT_MAX_KEY_GAP_MS: u64 = 50;

/// Shortest buffer accepted as a barcode (a buffer must exceed 3 characters).
pub const DEFAULT_MIN_BARCODE_LEN: usize = 4;

/// Number of digits in a valid customer phone number.
pub const PHONE_DIGITS: usize = 10;
