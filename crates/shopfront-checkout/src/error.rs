//! # Checkout Error Type
//!
//! Unified error type for the checkout layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopfront POS                          │
//! │                                                                         │
//! │  Invoice form                 Checkout layer                            │
//! │  ────────────                 ──────────────                            │
//! │                                                                         │
//! │  scan / submit                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CheckoutSession / CheckoutConfig / InputSurface / CsvSink       │  │
//! │  │  Result<T, CheckoutError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Core error? ──── CoreError::BarcodeNotFound ─────┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Config error? ── CheckoutError::InvalidConfig ── ErrorResponse ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "No product with barcode 890..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals engine and the scan filter never fail; everything that can
//! fail lives around them.

use serde::Serialize;
use shopfront_core::CoreError;
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout error type covering every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Business rule or validation failure from the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Listener Errors
    // =========================================================================
    /// A scan listener is already bound to this input surface.
    #[error("Input surface '{0}' already has a scan listener attached")]
    SurfaceBusy(String),

    // =========================================================================
    // Export Errors
    // =========================================================================
    /// The document sink rejected the invoice.
    #[error("Failed to export invoice: {0}")]
    ExportFailed(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<shopfront_core::ValidationError> for CheckoutError {
    fn from(err: shopfront_core::ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CheckoutError {
    fn from(err: toml::ser::Error) -> Self {
        CheckoutError::ConfigSaveFailed(err.to_string())
    }
}

impl From<csv::Error> for CheckoutError {
    fn from(err: csv::Error) -> Self {
        CheckoutError::ExportFailed(err.to_string())
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Machine-readable error codes for the invoice form.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (e.code) {
///   case 'NOT_FOUND':
///     flashScanField('Unknown barcode');
///     break;
///   case 'VALIDATION_ERROR':
///     showForm(e.message);
///     break;
///   default:
///     showError('An error occurred');
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown barcode, product or line.
    NotFound,

    /// Input validation failed.
    ValidationError,

    /// Not enough stock to sell the requested quantity.
    InsufficientStock,

    /// Configuration could not be loaded, saved or validated.
    ConfigError,

    /// Another scan listener owns the input surface.
    SurfaceBusy,

    /// Document export failed.
    ExportError,

    /// Inconsistent state the operator cannot fix.
    Internal,
}

impl CheckoutError {
    /// Maps the error onto its machine-readable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::Core(core) => match core {
                CoreError::BarcodeNotFound(_)
                | CoreError::ProductNotFound(_)
                | CoreError::ItemNotInDraft(_) => ErrorCode::NotFound,
                CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                CoreError::ProductInactive(_)
                | CoreError::DraftTooLarge { .. }
                | CoreError::QuantityTooLarge { .. }
                | CoreError::Validation(_) => ErrorCode::ValidationError,
            },
            CheckoutError::InvalidConfig(_)
            | CheckoutError::ConfigLoadFailed(_)
            | CheckoutError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
            CheckoutError::SurfaceBusy(_) => ErrorCode::SurfaceBusy,
            CheckoutError::ExportFailed(_) => ErrorCode::ExportError,
            CheckoutError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Returns true if the operator can fix this by editing the form.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::NotFound | ErrorCode::ValidationError | ErrorCode::InsufficientStock
        )
    }
}

// =============================================================================
// Serializable Response
// =============================================================================

/// What the invoice form receives when an operation fails.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "No product with barcode 8901234567890"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&CheckoutError> for ErrorResponse {
    fn from(err: &CheckoutError) -> Self {
        let code = err.code();
        if code == ErrorCode::Internal {
            tracing::error!("Internal checkout error: {}", err);
        }
        ErrorResponse {
            code,
            message: err.to_string(),
        }
    }
}

impl From<CheckoutError> for ErrorResponse {
    fn from(err: CheckoutError) -> Self {
        ErrorResponse::from(&err)
    }
}
