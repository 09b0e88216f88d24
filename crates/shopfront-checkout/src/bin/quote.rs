//! # Invoice Quote
//!
//! Prints the derived totals for a set of lines without opening a draft.
//!
//! ## Usage
//! ```bash
//! # Two lines on a retail bill
//! cargo run -p shopfront-checkout --bin quote -- 2x499 1x120.50
//!
//! # Tax invoice, 10% off
//! cargo run -p shopfront-checkout --bin quote -- --kind tax-invoice --discount-pct 10 2x499
//!
//! # What discount gives a round 1000?
//! cargo run -p shopfront-checkout --bin quote -- --kind tax-invoice --total 1000 2x499
//! ```
//!
//! Tax rates come from the checkout config (`--config PATH`, else the
//! platform config file, else built-in defaults).

use std::env;
use std::path::PathBuf;

use rust_decimal::{Decimal, RoundingStrategy};
use shopfront_checkout::{init_tracing, CheckoutConfig};
use shopfront_core::money::DISPLAY_SCALE;
use shopfront_core::validation::validate_quantity;
use shopfront_core::{EditedField, InvoiceKind, LineItem, TotalsEdit, TotalsEngine};
use tracing::debug;

/// Largest unit price accepted on the command line.
const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Default, PartialEq)]
struct QuoteArgs {
    kind: Option<InvoiceKind>,
    edit: Option<TotalsEdit>,
    config: Option<PathBuf>,
    lines: Vec<(u32, Decimal)>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<QuoteArgs, String> {
    let mut parsed = QuoteArgs::default();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--kind" | "-k" | "--discount-pct" | "--discount-amount" | "--total" | "--config"
            | "-c" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} needs a value", arg))?;
                i += 1;

                match arg {
                    "--kind" | "-k" => {
                        parsed.kind = Some(value.parse().map_err(|e| format!("{}", e))?);
                    }
                    "--config" | "-c" => parsed.config = Some(PathBuf::from(value)),
                    _ => {
                        if parsed.edit.is_some() {
                            return Err(
                                "use only one of --discount-pct, --discount-amount, --total".into(),
                            );
                        }
                        let amount = parse_decimal(value)?;
                        parsed.edit = Some(match arg {
                            "--discount-pct" => TotalsEdit::DiscountPercentage(amount),
                            "--discount-amount" => TotalsEdit::DiscountAmount(amount),
                            _ => TotalsEdit::GrandTotal(amount),
                        });
                    }
                }
            }
            "--help" | "-h" => parsed.help = true,
            other if other.starts_with('-') => return Err(format!("unknown option {}", other)),
            line => parsed.lines.push(parse_line(line)?),
        }
        i += 1;
    }

    Ok(parsed)
}

/// Parses `QTYxPRICE`, e.g. `3x49.90`.
fn parse_line(raw: &str) -> Result<(u32, Decimal), String> {
    let (qty, price) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("line '{}' is not QTYxPRICE", raw))?;

    let qty: u32 = qty
        .trim()
        .parse()
        .ok()
        .filter(|q| validate_quantity(*q).is_ok())
        .ok_or_else(|| format!("bad quantity in '{}'", raw))?;

    let price = parse_decimal(price)?;
    if price.is_sign_negative() || price > MAX_UNIT_PRICE {
        return Err(format!("bad price in '{}'", raw));
    }
    Ok((qty, price))
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))
}

fn print_help() {
    println!("Shopfront POS Invoice Quote");
    println!();
    println!("Usage: quote [OPTIONS] QTYxPRICE...");
    println!();
    println!("Options:");
    println!("  -k, --kind <KIND>            retail | tax-invoice (default: from config)");
    println!("      --discount-pct <P>       Discount percentage");
    println!("      --discount-amount <A>    Absolute discount");
    println!("      --total <T>              Target grand total (derives the discount)");
    println!("  -c, --config <PATH>          Config file (default: platform config dir)");
    println!("  -h, --help                   Show this help message");
}

fn pct(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven)
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;

    if args.help || args.lines.is_empty() {
        print_help();
        return Ok(());
    }

    let config = CheckoutConfig::load(args.config)?;
    let kind = args.kind.unwrap_or_else(|| config.default_kind());
    let tax_rate = config.tax_rate_for(kind);
    debug!(%kind, tax_rate = %tax_rate.percentage(), lines = args.lines.len(), "Quoting");

    let mut engine = TotalsEngine::new(tax_rate);
    let items: Vec<LineItem> = args
        .lines
        .iter()
        .enumerate()
        .map(|(i, (qty, price))| LineItem::new(format!("Line {}", i + 1), *qty, *price))
        .collect();
    engine.set_line_items(items);

    if let Some(edit) = args.edit {
        engine.apply(edit);
    }

    let symbol = &config.store.currency_symbol;
    println!("{} ({}% tax)", kind.title(), pct(tax_rate.percentage()));
    println!("{}", "=".repeat(40));
    for item in engine.items() {
        println!(
            "  {:<10} {:>4} x {:>10} = {:>10}",
            item.description,
            item.quantity,
            item.unit_price.to_string(),
            item.line_total().to_string()
        );
    }
    println!("{}", "-".repeat(40));

    let totals = engine.totals();
    println!("  {:<20} {} {:>12}", "Subtotal", symbol, totals.subtotal.to_string());
    println!(
        "  {:<20} {} {:>12}",
        format!("Discount ({}%)", pct(totals.discount_percentage)),
        symbol,
        totals.discount_amount.to_string()
    );
    println!("  {:<20} {} {:>12}", "Tax", symbol, totals.tax_amount.to_string());
    println!("  {:<20} {} {:>12}", "Grand Total", symbol, totals.grand_total.to_string());

    if let Some(TotalsEdit::GrandTotal(requested)) = args.edit {
        if engine.last_edited() == EditedField::GrandTotal
            && totals.grand_total.rounded().amount() != requested
        {
            println!();
            println!("  note: {} {} is not reachable; nearest total shown", symbol, requested);
        }
    }

    Ok(())
}
