//! Manual pairing walkthrough against the in-memory matcher

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use expense_reconcile::utils::{init_tracing, MemoryMatcher, DEFAULT_LOG_FILTER};
use expense_reconcile::{ActualExpense, DragEvent, ReconciliationSession, Resolution};
use std::str::FromStr;

fn report_item(day: u32, vendor: &str, price: &str) -> Result<ActualExpense, Box<dyn std::error::Error>> {
    Ok(ActualExpense {
        description: format!("{} | Baker College | 11/{:02}/2025", vendor, day),
        activity: "6653".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 11, day).ok_or("bad date")?,
        price: BigDecimal::from_str(price)?,
        vendor: vendor.to_string(),
        receipts: Vec::new(),
        flyer: None,
        needs_affidavit: false,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(DEFAULT_LOG_FILTER);
    println!("🧾 Expense Reconcile - Manual Pairing Example\n");

    let matcher = MemoryMatcher::with_report(vec![
        report_item(2, "TRADER JOE'S #512", "25.25")?,
        report_item(4, "TARGET 00012", "9.99")?,
        report_item(19, "H-E-B #44", "55.98")?,
    ]);

    let mut session = ReconciliationSession::new("https://docs.google.com/spreadsheets/d/example/edit");
    session.set_cardholder_name("Gavin Firestone (Treasurer)");
    session.set_start_date(NaiveDate::from_ymd_opt(2025, 11, 1));
    session.set_expected_text(
        "11/1/25 - Trader Joe's - $25.25\n\
         11/3/25 - Target - $9.99\n\
         11/19/25 - $55.98 - HEB\n\
         11/20/25 - Trader Joe's - Store - $5",
    );

    let report = session.parse_report();
    println!(
        "📋 Parsed {} of {} lines",
        report.expenses.len(),
        report.considered()
    );
    for dropped in &report.dropped {
        println!("  ✗ line {}: {} ({})", dropped.line_number, dropped.text, dropped.reason);
    }
    println!();

    session.submit(&matcher).await?;
    let review = session.review_mut().ok_or("no results")?;

    let slots: Vec<_> = review.pairing().expected_items().into_iter().map(|e| e.key).collect();
    let items: Vec<_> = review.pairing().actual_items().into_iter().map(|a| a.key).collect();

    println!("🖱️  Dragging report items onto expected slots...");
    for (slot, item) in slots.iter().zip(items.iter()) {
        review.handle(DragEvent::PickUp(item.clone()));
        review.handle(DragEvent::Drop(slot.clone()));
    }
    println!();

    for row in review.pairing().resolved_view() {
        match row.resolution {
            Resolution::Paired(actual) => println!(
                "  ✓ {} {} ${} ↔ {}",
                row.expected.date, row.expected.vendor, row.expected.price, actual.item.vendor
            ),
            Resolution::Open => println!(
                "  … {} {} ${} still open",
                row.expected.date, row.expected.vendor, row.expected.price
            ),
        }
    }

    let summary = review.summary();
    println!(
        "\n📊 matched: {}, paired: {}, open: {}, extra: {}",
        summary.matched, summary.manually_paired, summary.open_expected, summary.remaining_actual
    );

    Ok(())
}
