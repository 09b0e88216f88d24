//! # Invoice Totals Engine
//!
//! Keeps subtotal, discount percentage, discount amount, tax and grand total
//! consistent no matter which of the three editable fields the operator
//! touched last.
//!
//! ## Formula Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Forward derivation                                 │
//! │                                                                         │
//! │  line items ──► subtotal = Σ(quantity × unit_price)                    │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  discount_amount = subtotal × discount_percentage / 100                │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  post_discount   = subtotal − discount_amount                          │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  tax_amount      = post_discount × TAX_RATE                            │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  grand_total     = post_discount + tax_amount                          │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                      Entry points                                       │
//! │                                                                         │
//! │  set_discount_percentage(p) ── clamp [0,100] ──────────► forward       │
//! │  set_discount_amount(a) ────── clamp [0,subtotal] ─► p = a/subtotal×100│
//! │  set_grand_total(t) ────────── clamp ≥ 0 ──► p = (1 − t/(s×(1+r)))×100 │
//! │                                              clamp [0,100] ─► forward  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Error States
//! Every input is clamped into the feasible range. A cashier half-way through
//! typing "12.5" must never be blocked on "12." being invalid; hard validation
//! happens at submission (see [`crate::validation`]).
//!
//! An infeasible grand total (above `subtotal × (1 + rate)`, or negative)
//! yields the nearest feasible state, and `grand_total` reports what the
//! invoice will actually charge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LineItem, TaxRate};

// =============================================================================
// Edit Tags
// =============================================================================

/// Which control field the operator edited last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EditedField {
    #[default]
    DiscountPercentage,
    DiscountAmount,
    GrandTotal,
}

/// A scalar edit tagged with the field it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TotalsEdit {
    DiscountPercentage(Decimal),
    DiscountAmount(Decimal),
    GrandTotal(Decimal),
}

impl TotalsEdit {
    /// Returns the field this edit anchors on.
    pub fn field(&self) -> EditedField {
        match self {
            TotalsEdit::DiscountPercentage(_) => EditedField::DiscountPercentage,
            TotalsEdit::DiscountAmount(_) => EditedField::DiscountAmount,
            TotalsEdit::GrandTotal(_) => EditedField::GrandTotal,
        }
    }

    /// Builds an edit from raw field text, coercing junk to zero.
    pub fn from_input(field: EditedField, raw: &str) -> Self {
        let value = parse_edit_input(raw);
        match field {
            EditedField::DiscountPercentage => TotalsEdit::DiscountPercentage(value),
            EditedField::DiscountAmount => TotalsEdit::DiscountAmount(value),
            EditedField::GrandTotal => TotalsEdit::GrandTotal(value),
        }
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// Derived totals of an invoice draft, ready for display binding.
///
/// Values are unrounded; round with [`Money::rounded`] or `Display` at the
/// presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    #[ts(as = "String")]
    pub subtotal: Money,
    /// Always within [0, 100].
    #[ts(as = "String")]
    pub discount_percentage: Decimal,
    #[ts(as = "String")]
    pub discount_amount: Money,
    #[ts(as = "String")]
    pub tax_amount: Money,
    #[ts(as = "String")]
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Subtotal minus discount: the tax base.
    pub fn post_discount(&self) -> Money {
        self.subtotal - self.discount_amount
    }

    /// Checks if every figure is zero.
    pub fn is_zero(&self) -> bool {
        self.subtotal.is_zero()
            && self.discount_percentage.is_zero()
            && self.discount_amount.is_zero()
            && self.tax_amount.is_zero()
            && self.grand_total.is_zero()
    }
}

// =============================================================================
// Totals Engine
// =============================================================================

/// Reactive derivation of [`InvoiceTotals`] from line items and one anchor.
///
/// Each setter fully recomputes before returning, so callers never observe a
/// half-updated state. The tax rate is fixed for the engine's lifetime.
///
/// ## User Workflow
/// ```text
/// Operator types "10" in Discount %     → set_discount_percentage(10)
/// Operator types "100" in Discount amt  → set_discount_amount(100)
/// Operator types "945" in Grand Total   → set_grand_total(945)
///                                            │
///                                            ▼
///                      all five fields re-rendered from the returned totals
/// ```
#[derive(Debug, Clone)]
pub struct TotalsEngine {
    tax_rate: TaxRate,
    items: Vec<LineItem>,
    totals: InvoiceTotals,
    last_edited: EditedField,
}

impl TotalsEngine {
    /// Creates an engine with no line items and all-zero totals.
    pub fn new(tax_rate: TaxRate) -> Self {
        TotalsEngine {
            tax_rate,
            items: Vec::new(),
            totals: InvoiceTotals::default(),
            last_edited: EditedField::default(),
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn last_edited(&self) -> EditedField {
        self.last_edited
    }

    /// Replaces the line items and re-derives from the current percentage.
    pub fn set_line_items(&mut self, items: Vec<LineItem>) -> InvoiceTotals {
        self.items = items;
        self.refresh_from_items()
    }

    /// Mutates the line items in place, then re-derives like
    /// [`TotalsEngine::set_line_items`].
    pub fn update_line_items<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Vec<LineItem>) -> R,
    {
        let result = f(&mut self.items);
        self.refresh_from_items();
        result
    }

    /// Sets the discount percentage, clamped into [0, 100].
    pub fn set_discount_percentage(&mut self, pct: Decimal) -> InvoiceTotals {
        let pct = clamp_percentage(pct);
        self.last_edited = EditedField::DiscountPercentage;
        self.totals = derive_forward(self.totals.subtotal, pct, self.tax_rate);
        debug!(discount_percentage = %pct, grand_total = %self.totals.grand_total, "Discount percentage set");
        self.totals
    }

    /// Sets an absolute discount, clamped into [0, subtotal].
    ///
    /// A zero subtotal makes this a no-op.
    pub fn set_discount_amount(&mut self, amount: Decimal) -> InvoiceTotals {
        let subtotal = self.totals.subtotal;
        if subtotal.is_zero() {
            debug!("Ignoring discount amount on empty invoice");
            return self.totals;
        }

        let amount = Money::from_decimal(amount).clamp_between(Money::zero(), subtotal);
        let pct = amount.amount() / subtotal.amount() * Decimal::ONE_HUNDRED;
        let post_discount = subtotal - amount;
        let tax_amount = post_discount.calculate_tax(self.tax_rate);

        self.last_edited = EditedField::DiscountAmount;
        self.totals = InvoiceTotals {
            subtotal,
            discount_percentage: clamp_percentage(pct),
            discount_amount: amount,
            tax_amount,
            grand_total: post_discount + tax_amount,
        };
        debug!(discount_amount = %amount, discount_percentage = %pct, "Discount amount set");
        self.totals
    }

    /// Solves for the discount that produces `target` as the grand total.
    ///
    /// A zero subtotal makes this a no-op. Unreachable targets settle on the
    /// nearest feasible total, which is what `grand_total` then reports.
    pub fn set_grand_total(&mut self, target: Decimal) -> InvoiceTotals {
        let subtotal = self.totals.subtotal;
        if subtotal.is_zero() {
            debug!("Ignoring grand total on empty invoice");
            return self.totals;
        }

        let gross = subtotal.amount() * self.tax_rate.gross_multiplier();
        // Keeps target / gross within [0, 1]
        let feasible = target.max(Decimal::ZERO).min(gross);
        let pct = if gross.is_zero() {
            Decimal::ZERO
        } else {
            (Decimal::ONE - feasible / gross) * Decimal::ONE_HUNDRED
        };
        let pct = clamp_percentage(pct);

        self.last_edited = EditedField::GrandTotal;
        self.totals = derive_forward(subtotal, pct, self.tax_rate);
        debug!(
            requested = %target,
            actual = %self.totals.grand_total,
            discount_percentage = %pct,
            "Grand total set"
        );
        self.totals
    }

    /// Dispatches a tagged edit to the matching setter.
    pub fn apply(&mut self, edit: TotalsEdit) -> InvoiceTotals {
        match edit {
            TotalsEdit::DiscountPercentage(pct) => self.set_discount_percentage(pct),
            TotalsEdit::DiscountAmount(amount) => self.set_discount_amount(amount),
            TotalsEdit::GrandTotal(target) => self.set_grand_total(target),
        }
    }

    /// Drops all line items and the discount.
    pub fn reset(&mut self) {
        self.items.clear();
        self.totals = InvoiceTotals::default();
        self.last_edited = EditedField::default();
    }

    fn refresh_from_items(&mut self) -> InvoiceTotals {
        let subtotal: Money = self.items.iter().map(LineItem::line_total).sum();
        self.totals = derive_forward(subtotal, self.totals.discount_percentage, self.tax_rate);
        debug!(
            lines = self.items.len(),
            subtotal = %subtotal,
            grand_total = %self.totals.grand_total,
            "Line items recomputed"
        );
        self.totals
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Runs the forward chain from subtotal and a (clamped) percentage.
fn derive_forward(subtotal: Money, pct: Decimal, rate: TaxRate) -> InvoiceTotals {
    let discount_amount = subtotal.percentage_of(pct);
    let post_discount = subtotal - discount_amount;
    let tax_amount = post_discount.calculate_tax(rate);

    InvoiceTotals {
        subtotal,
        discount_percentage: pct,
        discount_amount,
        tax_amount,
        grand_total: post_discount + tax_amount,
    }
}

/// Clamps a percentage into [0, 100].
pub fn clamp_percentage(pct: Decimal) -> Decimal {
    pct.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

/// Parses raw field text leniently.
///
/// Thousands separators and surrounding whitespace are ignored; anything
/// that still fails to parse (`""`, `"-"`, `"12a"`) becomes zero.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use shopfront_core::totals::parse_edit_input;
///
/// assert_eq!(parse_edit_input(" 1,250.50 "), Decimal::new(125050, 2));
/// assert_eq!(parse_edit_input("12."), Decimal::from(12));
/// assert_eq!(parse_edit_input("abc"), Decimal::ZERO);
/// ```
pub fn parse_edit_input(raw: &str) -> Decimal {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);
    Decimal::from_str(cleaned).unwrap_or(Decimal::ZERO)
}

// =============================================================================
// Unit Tests
// =============================================================================
