//! # Shopfront Checkout
//!
//! The thin orchestration layer around `shopfront-core`: configuration,
//! product lookup, the open invoice draft, the scan listener, and document
//! export.
//!
//! ## Module Organization
//! ```text
//! shopfront_checkout/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── config.rs       ◄─── TOML + environment configuration
//! ├── catalog.rs      ◄─── ProductCatalog trait + in-memory catalog
//! ├── session.rs      ◄─── Invoice draft + shared SessionState
//! ├── listener.rs     ◄─── InputSurface + ScanGuard
//! ├── document.rs     ◄─── Invoice rows/layout + CSV sink
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! ├── error.rs        ◄─── CheckoutError + ErrorCode
//! └── bin/quote.rs    ◄─── Totals calculator CLI
//! ```
//!
//! ## Wiring a Checkout Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CheckoutConfig::load ──► CheckoutSession::from_config ──► SessionState │
//! │          │                                                      │       │
//! │          ▼                                                      │       │
//! │  InputSurface::attach(scanner_config, |code| ───────────────────┘       │
//! │          │              state.with_session_mut(|s| s.scan_barcode(code)))│
//! │          ▼                                                              │
//! │  ScanGuard (dropped when the form closes)                               │
//! │                                                                         │
//! │  "Generate Invoice" ──► submit() ──► InvoiceDocument ──► DocumentSink   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod listener;
pub mod session;
pub mod telemetry;

pub use catalog::{InMemoryCatalog, ProductCatalog};
pub use config::{CheckoutConfig, ScannerSettings, StoreSettings, TaxSettings};
pub use document::{CsvSink, DocumentSink, InvoiceDocument, ItemRow, Layout, SummaryRow};
pub use error::{CheckoutError, CheckoutResult, ErrorCode, ErrorResponse};
pub use listener::{InputSurface, ScanGuard};
pub use session::{CheckoutSession, SessionState};
pub use telemetry::init_tracing;
