//! End-to-end checkout: scanner keystrokes → catalog → draft → submit → CSV.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use shopfront_checkout::{
    CheckoutConfig, CheckoutSession, CsvSink, DocumentSink, ErrorCode, InMemoryCatalog,
    InputSurface, InvoiceDocument, ProductCatalog, SessionState,
};
use shopfront_core::{
    Customer, EditedField, InvoiceKind, KeyDisposition, KeyEvent, Money, Product, TotalsEdit,
};

fn product(id: &str, barcode: &str, name: &str, price_minor: i64, stock: Option<i64>) -> Product {
    Product {
        id: id.to_string(),
        sku: id.to_uppercase(),
        barcode: Some(barcode.to_string()),
        name: name.to_string(),
        unit_price: Money::from_minor(price_minor),
        track_inventory: stock.is_some(),
        allow_negative_stock: false,
        current_stock: stock,
        is_active: true,
    }
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_products(vec![
        product("rice-5kg", "8901234567890", "Basmati Rice 5kg", 49900, Some(10)),
        product("tea-250g", "8901000000001", "Green Tea 250g", 12050, None),
    ])
}

fn tax_invoice_config() -> CheckoutConfig {
    let mut config = CheckoutConfig::default();
    config.tax.default_kind = InvoiceKind::TaxInvoice;
    config.store.name = "Asha General Store".to_string();
    config
}

/// Types `code` as a scanner would (10 ms apart) and terminates with Enter.
fn scan(surface: &InputSurface, code: &str, start: Instant) -> KeyDisposition {
    let mut t = start;
    for c in code.chars() {
        assert_eq!(surface.dispatch(&KeyEvent::char(c, t)), KeyDisposition::PassThrough);
        t += Duration::from_millis(10);
    }
    surface.dispatch(&KeyEvent::enter(t))
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn scanned_checkout_produces_invoice_and_csv() {
    let config = tax_invoice_config();
    let state = SessionState::new(CheckoutSession::from_config(catalog(), &config));
    let surface = InputSurface::new("invoice-form");
    let errors = Arc::new(Mutex::new(Vec::new()));

    let feed = state.clone();
    let failed = Arc::clone(&errors);
    let guard = surface
        .attach(config.scanner_config(), move |code| {
            if let Err(e) = feed.with_session_mut(|s| s.scan_barcode(code)) {
                failed.lock().unwrap().push(e.code());
            }
        })
        .unwrap();

    let t0 = Instant::now();
    assert!(scan(&surface, "8901234567890", t0).suppresses_default());
    assert!(scan(&surface, "8901234567890", t0 + Duration::from_secs(2)).suppresses_default());
    assert!(scan(&surface, "8901000000001", t0 + Duration::from_secs(4)).suppresses_default());
    assert!(scan(&surface, "0000000000000", t0 + Duration::from_secs(6)).suppresses_default());
    assert_eq!(*errors.lock().unwrap(), vec![ErrorCode::NotFound]);

    // Operator types a target grand total into the form.
    let totals = state.with_session_mut(|s| {
        s.set_customer(Customer::new("Ravi Kumar", "9123456780"));
        s.apply_edit(TotalsEdit::from_input(EditedField::GrandTotal, "1,200"))
    });
    // 2 × 499.00 + 120.50 = 1118.50 → 1319.83 gross; 1200 needs ~9.08% off
    assert_eq!(totals.subtotal, Money::from_minor(111850));
    assert_eq!(totals.grand_total.rounded(), Money::from_minor(120000));
    assert_eq!(state.with_session(|s| s.last_edited()), EditedField::GrandTotal);

    let invoice = state.with_session_mut(|s| s.submit()).unwrap();
    drop(guard);
    assert!(!surface.is_attached());

    assert_eq!(invoice.kind, InvoiceKind::TaxInvoice);
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].quantity, 2);
    assert_eq!(
        state.with_session(|s| s.catalog().find_by_id("rice-5kg").unwrap().current_stock),
        Some(8)
    );
    assert!(state.with_session(|s| s.is_empty()));

    let document = InvoiceDocument::from_invoice(&invoice, &config.store);
    let mut sink = CsvSink::new(Vec::new());
    sink.write_document(&document).unwrap();
    let csv = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    assert!(csv.starts_with("Tax Invoice,Asha General Store\n"));
    assert!(csv.contains("1,Basmati Rice 5kg,2,499.00,998.00\n"));
    assert!(csv.contains("2,Green Tea 250g,1,120.50,120.50\n"));
    assert!(csv.contains("Subtotal,1118.50\n"));
    assert!(csv.ends_with("Grand Total,1200.00\n"));
}

#[test]
fn typing_in_form_fields_is_not_intercepted() {
    let config = CheckoutConfig::default();
    let state = SessionState::new(CheckoutSession::from_config(catalog(), &config));
    let surface = InputSurface::new("invoice-form");

    let feed = state.clone();
    let _guard = surface
        .attach(config.scanner_config(), move |code| {
            let _ = feed.with_session_mut(|s| s.scan_barcode(code));
        })
        .unwrap();

    // A human typing the phone number: ~150 ms between keys.
    let mut t = Instant::now();
    for c in "9123456780".chars() {
        assert_eq!(surface.dispatch(&KeyEvent::char(c, t)), KeyDisposition::PassThrough);
        t += Duration::from_millis(150);
    }
    assert_eq!(surface.dispatch(&KeyEvent::enter(t)), KeyDisposition::PassThrough);

    assert!(state.with_session(|s| s.is_empty()));
}

#[test]
fn failed_submission_keeps_draft() {
    let config = CheckoutConfig::default();
    let mut session = CheckoutSession::from_config(catalog(), &config);
    assert_eq!(session.kind(), InvoiceKind::Retail);

    session.scan_barcode("8901000000001").unwrap();
    session.apply_edit(TotalsEdit::DiscountAmount(d("20.50")));
    session.set_customer(Customer::new("Ravi Kumar", "91234"));

    let err = session.submit().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let totals = session.totals();
    assert_eq!(session.items().len(), 1);
    assert_eq!(totals.discount_amount, Money::from_minor(2050));
    // (120.50 - 20.50) × 1.05
    assert_eq!(totals.grand_total, Money::from_minor(10500));
    assert_eq!(session.catalog().find_by_id("tea-250g").unwrap().current_stock, None);
}
