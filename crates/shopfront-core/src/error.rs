//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core errors (this file)                                     │
//! │  ├── CoreError        - Draft/catalog rule violations                  │
//! │  └── ValidationError  - Submission-time input failures                 │
//! │                                                                         │
//! │  shopfront-checkout errors (separate crate)                            │
//! │  └── CheckoutError    - Config, listener, export + wrapped CoreError   │
//! │                                                                         │
//! │  NOT errors: totals edits and keystrokes. The totals engine clamps    │
//! │  every input and the scanner filter only classifies.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while building or submitting a draft.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product is registered under the scanned or typed barcode.
    #[error("No product with barcode {0}")]
    BarcodeNotFound(String),

    /// Product id is not known to the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is no longer sold.
    #[error("Product {0} is not available for sale")]
    ProductInactive(String),

    /// The draft has no line for this product.
    #[error("Product {0} is not on the invoice")]
    ItemNotInDraft(String),

    /// Insufficient stock to complete sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "8901234" three times
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "RICE-5KG", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Only 2 RICE-5KG in stock"
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Draft has reached the maximum number of lines.
    #[error("Invoice cannot have more than {max} lines")]
    DraftTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised only at the submission boundary, never from the totals engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "RICE-5KG".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for RICE-5KG: available 2, requested 3"
        );

        let err = CoreError::BarcodeNotFound("8901234".to_string());
        assert_eq!(err.to_string(), "No product with barcode 8901234");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer name".to_string(),
        };
        assert_eq!(err.to_string(), "customer name is required");

        let err = ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be exactly 10 digits".to_string(),
        };
        assert_eq!(err.to_string(), "phone has invalid format: must be exactly 10 digits");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
