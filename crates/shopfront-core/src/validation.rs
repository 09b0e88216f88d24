//! # Validation Module
//!
//! Submission-time validation for Shopfront POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  While editing (totals engine)                                         │
//! │  └── NO validation errors: every value is clamped into range           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  On submit (THIS MODULE)                                               │
//! │  ├── Customer name present                                             │
//! │  ├── Phone is exactly 10 digits                                        │
//! │  └── At least one line, each with positive quantity and price          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Document store (external)                                             │
//! │  └── Whatever the hosted store enforces                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfront_core::validation::{validate_phone, validate_quantity};
//!
//! assert!(validate_phone("9876543210").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, LineItem, TaxRate};
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, PHONE_DIGITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_BARCODE_LEN: usize = 64;

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates the customer name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty
/// - Exactly 10 ASCII digits, nothing else
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("98765 43210").is_err());
/// assert!(validate_phone("+919876543210").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: format!("must be exactly {} digits", PHONE_DIGITS),
        });
    }

    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY as i64,
        });
    }

    Ok(())
}

/// Validates a unit price at submission: free lines are rejected.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit price".to_string(),
        });
    }

    Ok(())
}

/// Validates the number of lines on a draft before adding one more.
pub fn validate_line_count(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "invoice lines".to_string(),
            min: 0,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates the complete line list.
///
/// ## Rules
/// - At least one line
/// - Every line has a positive quantity (≤ 999) and a positive price
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "line items".to_string(),
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        validate_unit_price(item.unit_price)?;
    }

    Ok(())
}

/// Runs every submission rule, returning the first failure.
///
/// ## User Workflow
/// ```text
/// Cashier presses "Generate Invoice"
///      │
///      ▼
/// validate_submission(customer, items) ← THIS FUNCTION
///      │
///      ├── name empty?        → "customer name is required"
///      ├── phone not 10 digits→ "phone has invalid format: ..."
///      ├── no lines?          → "line items is required"
///      │
///      └── OK → invoice is finalized
/// ```
pub fn validate_submission(customer: &Customer, items: &[LineItem]) -> ValidationResult<()> {
    validate_customer_name(&customer.name)?;
    validate_phone(&customer.phone)?;
    validate_line_items(items)
}

// =============================================================================
// Catalog / Config Validators
// =============================================================================

/// Validates a barcode typed or scanned for lookup.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace or control characters
pub fn validate_barcode(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if code.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a configured tax rate: 0% to 100%.
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    let pct = rate.percentage();
    if pct.is_sign_negative() || pct > rust_decimal::Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "tax rate %".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Asha Traders").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone(" 9876543210 ").is_ok());

        assert_eq!(
            validate_phone(""),
            Err(ValidationError::Required {
                field: "phone".to_string()
            })
        );
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432101").is_err());
        assert!(validate_phone("98765abcde").is_err());
        assert!(validate_phone("९८७६५४३२१०").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[]).is_err());
        assert!(validate_line_items(&[LineItem::new("Tea", 1, Decimal::from(10))]).is_ok());
        assert!(validate_line_items(&[LineItem::new("Tea", 0, Decimal::from(10))]).is_err());
        assert!(validate_line_items(&[LineItem::new("Tea", 1, Decimal::ZERO)]).is_err());
    }

    #[test]
    fn test_validate_submission_order() {
        let items = vec![LineItem::new("Tea", 1, Decimal::from(10))];

        let err = validate_submission(&Customer::new("", "123"), &items).unwrap_err();
        assert!(matches!(err, ValidationError::Required { ref field } if field == "customer name"));

        let err = validate_submission(&Customer::new("Asha", "123"), &items).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "phone"));

        let err = validate_submission(&Customer::new("Asha", "9876543210"), &[]).unwrap_err();
        assert!(matches!(err, ValidationError::Required { ref field } if field == "line items"));

        assert!(validate_submission(&Customer::new("Asha", "9876543210"), &items).is_ok());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901234567890").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("89 01").is_err());
        assert!(validate_barcode(&"1".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(0).is_ok());
        assert!(validate_line_count(MAX_LINE_ITEMS - 1).is_ok());
        assert!(validate_line_count(MAX_LINE_ITEMS).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(TaxRate::from_fraction(Decimal::new(18, 2))).is_ok());
        assert!(validate_tax_rate(TaxRate::zero()).is_ok());
        assert!(validate_tax_rate(TaxRate::from_fraction(Decimal::new(101, 2))).is_err());
        assert!(validate_tax_rate(TaxRate::from_fraction(Decimal::new(-1, 2))).is_err());
    }
}
