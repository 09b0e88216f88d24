//! # Invoice Document
//!
//! Turns a submitted [`Invoice`] into display-ready rows for an external
//! renderer (PDF generator, printer, spreadsheet).
//!
//! ```text
//! Invoice ──► InvoiceDocument::from_invoice ──► InvoiceDocument
//!                                                 ├── Layout (title, columns, symbol)
//!                                                 ├── ItemRow × n
//!                                                 └── SummaryRow × 4
//!                                                        │
//!                                                        ▼
//!                                            impl DocumentSink (CsvSink, ...)
//! ```
//!
//! This is the only place amounts are rounded to two decimals.

use std::io::Write;

use chrono::SecondsFormat;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shopfront_core::money::DISPLAY_SCALE;
use shopfront_core::Invoice;
use tracing::debug;

use crate::config::StoreSettings;
use crate::error::{CheckoutError, CheckoutResult};

/// Column headers of the item table, in order.
pub const ITEM_COLUMNS: [&str; 5] = ["#", "Description", "Qty", "Unit Price", "Amount"];

/// Presentation metadata the renderer needs besides the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub title: String,
    pub store_name: String,
    pub columns: Vec<String>,
    pub currency_symbol: String,
}

/// One row of the item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    /// 1-based position on the invoice.
    pub index: usize,
    pub description: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// One labelled amount under the item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// A rendered-ready invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub layout: Layout,
    pub number: String,
    pub issued_at: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<ItemRow>,
    pub summary: Vec<SummaryRow>,
}

impl InvoiceDocument {
    /// Builds the document for an invoice.
    pub fn from_invoice(invoice: &Invoice, store: &StoreSettings) -> Self {
        let layout = Layout {
            title: invoice.kind.title().to_string(),
            store_name: store.name.clone(),
            columns: ITEM_COLUMNS.iter().map(|c| c.to_string()).collect(),
            currency_symbol: store.currency_symbol.clone(),
        };

        let items = invoice
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemRow {
                index: i + 1,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                line_total: item.line_total().to_string(),
            })
            .collect();

        let totals = &invoice.totals;
        let summary = vec![
            SummaryRow {
                label: "Subtotal".to_string(),
                value: totals.subtotal.to_string(),
            },
            SummaryRow {
                label: format!("Discount ({}%)", format_decimal(totals.discount_percentage)),
                value: totals.discount_amount.to_string(),
            },
            SummaryRow {
                label: "Tax".to_string(),
                value: totals.tax_amount.to_string(),
            },
            SummaryRow {
                label: "Grand Total".to_string(),
                value: totals.grand_total.to_string(),
            },
        ];

        InvoiceDocument {
            layout,
            number: invoice.number.clone(),
            issued_at: invoice.issued_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            customer_name: invoice.customer.name.clone(),
            customer_phone: invoice.customer.phone.clone(),
            items,
            summary,
        }
    }
}

fn format_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}", rounded)
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination for finished invoice documents.
pub trait DocumentSink {
    fn write_document(&mut self, document: &InvoiceDocument) -> CheckoutResult<()>;
}

/// Writes documents as CSV: a header block, the item table, then the summary.
///
/// ```text
/// Tax Invoice,Asha General Store
/// Invoice,INV-000001
/// Date,2026-10-19T09:30:00Z
/// Customer,Asha,9876543210
/// #,Description,Qty,Unit Price (₹),Amount (₹)
/// 1,Basmati Rice 5kg,2,499.00,998.00
/// Subtotal,998.00
/// ...
/// ```
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new().flexible(true).from_writer(inner);
        CsvSink { writer }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> CheckoutResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| CheckoutError::ExportFailed(e.error().to_string()))
    }
}

impl<W: Write> DocumentSink for CsvSink<W> {
    fn write_document(&mut self, document: &InvoiceDocument) -> CheckoutResult<()> {
        let layout = &document.layout;
        let w = &mut self.writer;

        w.write_record([layout.title.as_str(), layout.store_name.as_str()])?;
        w.write_record(["Invoice", document.number.as_str()])?;
        w.write_record(["Date", document.issued_at.as_str()])?;
        w.write_record([
            "Customer",
            document.customer_name.as_str(),
            document.customer_phone.as_str(),
        ])?;

        let header: Vec<String> = layout
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                if i >= 3 {
                    format!("{} ({})", column, layout.currency_symbol)
                } else {
                    column.clone()
                }
            })
            .collect();
        w.write_record(&header)?;

        for row in &document.items {
            w.write_record([
                row.index.to_string(),
                row.description.clone(),
                row.quantity.to_string(),
                row.unit_price.clone(),
                row.line_total.clone(),
            ])?;
        }

        for row in &document.summary {
            w.write_record([row.label.as_str(), row.value.as_str()])?;
        }

        w.flush()
            .map_err(|e| CheckoutError::ExportFailed(e.to_string()))?;
        debug!(number = %document.number, rows = document.items.len(), "Invoice written as CSV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shopfront_core::{Customer, InvoiceKind, InvoiceTotals, LineItem, Money, TotalsEngine};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn invoice() -> Invoice {
        let mut engine = TotalsEngine::new(InvoiceKind::TaxInvoice.default_tax_rate());
        engine.set_line_items(vec![
            LineItem::new("Basmati Rice 5kg", 2, d("499")),
            LineItem::new("Green Tea", 1, d("120.50")),
        ]);
        engine.set_discount_percentage(d("12.5"));

        Invoice {
            id: "00000000-0000-4000-8000-000000000000".to_string(),
            number: "INV-000042".to_string(),
            kind: InvoiceKind::TaxInvoice,
            customer: Customer::new("Asha", "9876543210"),
            items: engine.items().to_vec(),
            totals: engine.totals(),
            issued_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_layout_and_rows() {
        let store = StoreSettings {
            name: "Asha General Store".to_string(),
            currency_symbol: "₹".to_string(),
        };
        let doc = InvoiceDocument::from_invoice(&invoice(), &store);

        assert_eq!(doc.layout.title, "Tax Invoice");
        assert_eq!(doc.layout.columns.len(), 5);
        assert_eq!(doc.issued_at, "2026-10-19T09:30:00Z");

        assert_eq!(doc.items[0].index, 1);
        assert_eq!(doc.items[0].unit_price, "499.00");
        assert_eq!(doc.items[0].line_total, "998.00");
        assert_eq!(doc.items[1].unit_price, "120.50");

        // 1118.50 - 12.5% = 978.6875; tax 176.16375; total 1154.85125
        let values: Vec<&str> = doc.summary.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["1118.50", "139.81", "176.16", "1154.85"]);
        assert_eq!(doc.summary[1].label, "Discount (12.50%)");
    }

    #[test]
    fn test_empty_totals_format() {
        let mut inv = invoice();
        inv.items.clear();
        inv.totals = InvoiceTotals::default();

        let doc = InvoiceDocument::from_invoice(&inv, &StoreSettings::default());
        assert!(doc.items.is_empty());
        assert!(doc.summary.iter().all(|r| r.value == "0.00"));
        assert_eq!(doc.summary[1].label, "Discount (0.00%)");
    }

    #[test]
    fn test_csv_sink() {
        let doc = InvoiceDocument::from_invoice(&invoice(), &StoreSettings::default());
        let mut sink = CsvSink::new(Vec::new());
        sink.write_document(&doc).unwrap();

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Tax Invoice,Shopfront");
        assert_eq!(lines[1], "Invoice,INV-000042");
        assert_eq!(lines[3], "Customer,Asha,9876543210");
        assert_eq!(lines[4], "#,Description,Qty,Unit Price (₹),Amount (₹)");
        assert_eq!(lines[5], "1,Basmati Rice 5kg,2,499.00,998.00");
        assert_eq!(lines[6], "2,Green Tea,1,120.50,120.50");
        assert_eq!(lines.last(), Some(&"Grand Total,1154.85"));
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn test_money_display_uses_bankers_rounding() {
        assert_eq!(Money::from_decimal(d("0.125")).to_string(), "0.12");
        assert_eq!(format_decimal(d("0.135")), "0.14");
    }
}
