//! Reconcile against a running matcher service configured from settings

use expense_reconcile::utils::init_tracing;
use expense_reconcile::{HttpMatcher, ReconciliationSession, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;
    init_tracing(&settings.log.filter);
    println!("🌐 Expense Reconcile - Matcher at {}\n", settings.matcher.base_url);

    let client = HttpMatcher::from_settings(&settings.matcher)?;
    let health = client.health().await?;
    println!("💓 Service status: {}", health.status);

    let mut session = ReconciliationSession::from_settings(&settings.matcher);
    session.set_cardholder_name("Gavin Firestone (Treasurer)");
    session.set_start_date(chrono::NaiveDate::from_ymd_opt(2025, 11, 1));
    session.set_expected_text(
        "11/1/25 - Trader Joe's - $25.25\n\
         11/3/25 - Target - $9.99\n\
         11/16/25 - $214.20 - Burger Chan",
    );

    if let Err(err) = session.submit(&client).await {
        println!("❌ {}", session.error_banner().unwrap_or("Reconciliation failed"));
        return Err(err.into());
    }

    let review = session.review().ok_or("no results")?;
    let summary = review.summary();
    println!(
        "📊 matched: {}, open: {}, extra: {}",
        summary.matched, summary.open_expected, summary.remaining_actual
    );

    Ok(())
}
