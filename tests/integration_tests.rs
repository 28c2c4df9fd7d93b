//! Integration tests for expense-reconcile

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use expense_reconcile::{
    utils::MemoryMatcher, ActualExpense, DragEvent, DragOutcome, ExpectedExpense, MatchedPair,
    ReconcileResponse, ReconciliationSession, Resolution, SessionPhase,
};
use std::str::FromStr;

const SHEET: &str = "https://docs.google.com/spreadsheets/d/1DVerqZwwyPQY0aLVS2PI_5GItN-5f3uQex4JoJ_RLbE/edit";

const EXPECTED_EXPENSES: &str = "
    11/1/25 - Trader Joe's - $25.25
    11/3/25 - Target - $9.99
    11/16/25 - $214.20 - Burger Chan
    11/30/25 - Custom Ink - $1,075.50
";

fn report_item(day: u32, vendor: &str, price: &str) -> ActualExpense {
    ActualExpense {
        description: format!("Gavin Firestone | Baker College | 11/{:02}/2025 | {}", day, vendor),
        activity: "6653".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
        price: BigDecimal::from_str(price).unwrap(),
        vendor: vendor.to_string(),
        receipts: vec![format!("https://drive.example.com/{}", day)],
        flyer: None,
        needs_affidavit: false,
    }
}

fn session() -> ReconciliationSession {
    let mut session = ReconciliationSession::new(SHEET);
    session.set_cardholder_name("Gavin Firestone (Treasurer)");
    session.set_start_date(NaiveDate::from_ymd_opt(2025, 11, 1));
    session.set_expected_text(EXPECTED_EXPENSES);
    session
}

#[tokio::test]
async fn test_single_gesture_resolves_last_open_item() {
    let expected = ExpectedExpense::new(
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        "Target",
        BigDecimal::from_str("9.99").unwrap(),
    );
    let actual = report_item(2, "Target", "9.99");

    let matcher = MemoryMatcher::new();
    matcher.push_response(ReconcileResponse {
        matched: Vec::new(),
        unmatched_expected: vec![expected.clone()],
        unmatched_actual: vec![actual.clone()],
    });

    let mut session = session();
    session.submit(&matcher).await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Reviewing);

    let review = session.review().unwrap();
    let slot = review.pairing().expected_items()[0].key.clone();
    let item = review.pairing().available_actuals()[0].key.clone();

    session.handle_drag(DragEvent::PickUp(item.clone()));
    let outcome = session.handle_drag(DragEvent::Drop(slot.clone()));
    assert!(matches!(outcome, DragOutcome::Placed { displaced: None, .. }));

    let review = session.review().unwrap();
    let view = review.pairing().resolved_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].expected, &expected);
    match &view[0].resolution {
        Resolution::Paired(paired) => {
            assert_eq!(paired.key, item);
            assert_eq!(paired.item, actual);
        }
        Resolution::Open => panic!("expected item should be paired"),
    }
    assert!(review.pairing().available_actuals().is_empty());
}

#[tokio::test]
async fn test_full_session_with_default_matcher() {
    let matcher = MemoryMatcher::with_report(vec![
        report_item(2, "TRADER JOE'S #512", "25.25"),
        report_item(4, "TARGET 00012", "9.99"),
        report_item(17, "Burger Chan", "214.20"),
    ]);

    let mut session = session();
    session.submit(&matcher).await.unwrap();

    let sent = matcher.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].expected_expenses, EXPECTED_EXPENSES);
    assert_eq!(sent[0].sheet_link, SHEET);

    let review = session.review_mut().unwrap();
    let summary = review.summary();
    assert_eq!(summary.matched, 0);
    assert_eq!(summary.open_expected, 4);
    assert_eq!(summary.remaining_actual, 3);

    // Pair every report item with the expected item at the same position.
    let slots: Vec<_> = review.pairing().expected_items().into_iter().map(|e| e.key).collect();
    let items: Vec<_> = review.pairing().actual_items().into_iter().map(|a| a.key).collect();
    for (slot, item) in slots.iter().zip(items.iter()) {
        review.handle(DragEvent::PickUp(item.clone()));
        review.handle(DragEvent::Drop(slot.clone()));
    }

    let summary = review.summary();
    assert_eq!(summary.manually_paired, 3);
    assert_eq!(summary.open_expected, 1);
    assert_eq!(summary.remaining_actual, 0);

    // Dragging the Target item onto the Trader Joe's slot leaves the
    // Target slot filled too; the engine reports both deterministically.
    review.handle(DragEvent::PickUp(items[1].clone()));
    let outcome = review.handle(DragEvent::Drop(slots[0].clone()));
    assert_eq!(
        outcome,
        DragOutcome::Placed {
            expected: slots[0].clone(),
            actual: items[1].clone(),
            displaced: Some(items[0].clone()),
        }
    );
    let available: Vec<_> = review
        .pairing()
        .available_actuals()
        .into_iter()
        .map(|a| a.key)
        .collect();
    assert_eq!(available, vec![items[0].clone()]);

    // Removing a pairing twice is the same as once.
    review.pairing_mut().unpair(&slots[1]);
    let once = review.pairing().state().clone();
    review.pairing_mut().unpair(&slots[1]);
    assert_eq!(review.pairing().state(), &once);
}

#[tokio::test]
async fn test_server_matches_are_kept_apart_from_manual_pairings() {
    let matched_expected = ExpectedExpense::new(
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        "Trader Joe's",
        BigDecimal::from_str("25.25").unwrap(),
    );
    let matcher = MemoryMatcher::new();
    matcher.push_response(ReconcileResponse {
        matched: vec![MatchedPair {
            expected: matched_expected,
            actual: report_item(2, "Trader Joe's", "25.25"),
        }],
        unmatched_expected: Vec::new(),
        unmatched_actual: vec![report_item(9, "Amazon", "12.00")],
    });

    let mut session = session();
    session.submit(&matcher).await.unwrap();

    let review = session.review().unwrap();
    assert_eq!(review.matched().len(), 1);
    assert!(review.pairing().resolved_view().is_empty());
    assert_eq!(review.pairing().available_actuals().len(), 1);
}

#[tokio::test]
async fn test_failed_submission_then_retry() {
    let matcher = MemoryMatcher::new();
    matcher.push_failure(expense_reconcile::ClientError::Unparsable {
        operation: expense_reconcile::Operation::Reconcile,
        status: 500,
        status_line: "500 Internal Server Error".to_string(),
    });

    let mut session = session();
    assert!(session.submit(&matcher).await.is_err());
    assert_eq!(
        session.error_banner(),
        Some("Reconciliation failed (500 Internal Server Error)")
    );

    session.dismiss_error();
    assert_eq!(session.phase(), SessionPhase::Editing);
    assert!(session.preview().is_empty());

    session.set_cardholder_name("Gavin Firestone (Treasurer)");
    session.set_start_date(NaiveDate::from_ymd_opt(2025, 11, 1));
    session.set_expected_text("11/3/25 - Target - $9.99");
    session.submit(&matcher).await.unwrap();
    assert_eq!(session.review().unwrap().summary().open_expected, 1);
}

#[test]
fn test_parse_report_counts_dropped_lines() {
    let mut session = session();
    session.set_expected_text(format!("{}\n11/5/25 - Trader Joe's - Store - $5\nhello", EXPECTED_EXPENSES));

    let report = session.parse_report();
    assert_eq!(report.expenses.len(), 4);
    assert_eq!(report.dropped_count(), 2);
    assert_eq!(report.considered(), 6);
}
