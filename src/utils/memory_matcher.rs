//! In-memory matcher implementation for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::parser::parse_expected_expenses;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Inner {
    stock: Vec<ActualExpense>,
    scripted: VecDeque<Result<ReconcileResponse, ClientError>>,
    affidavit_failures: VecDeque<ClientError>,
    requests: Vec<ReconcileRequest>,
    affidavit_requests: Vec<AffidavitRequest>,
}

/// In-memory stand-in for the remote matcher and affidavit service.
///
/// Scripted outcomes are returned first, in order. Without a script every
/// parsed expected expense and every stocked report item comes back
/// unmatched; no automatic matching is attempted.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatcher {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryMatcher {
    /// Create a new memory matcher with an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory matcher whose report holds `items`
    pub fn with_report(items: Vec<ActualExpense>) -> Self {
        let matcher = Self::new();
        matcher.lock().stock = items;
        matcher
    }

    /// Queue a response for the next reconcile call
    pub fn push_response(&self, response: ReconcileResponse) {
        self.lock().scripted.push_back(Ok(response));
    }

    /// Queue a failure for the next reconcile call
    pub fn push_failure(&self, error: ClientError) {
        self.lock().scripted.push_back(Err(error));
    }

    /// Queue a failure for the next affidavit request
    pub fn push_affidavit_failure(&self, error: ClientError) {
        self.lock().affidavit_failures.push_back(error);
    }

    /// Reconcile requests received so far
    pub fn requests(&self) -> Vec<ReconcileRequest> {
        self.lock().requests.clone()
    }

    /// Affidavit requests received so far
    pub fn affidavit_requests(&self) -> Vec<AffidavitRequest> {
        self.lock().affidavit_requests.clone()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        *self.lock() = Inner::default();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteMatcher for MemoryMatcher {
    async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileResponse, ClientError> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());

        if let Some(outcome) = inner.scripted.pop_front() {
            return outcome;
        }

        Ok(ReconcileResponse {
            matched: Vec::new(),
            unmatched_expected: parse_expected_expenses(&request.expected_expenses),
            unmatched_actual: inner
                .stock
                .iter()
                .filter(|item| item.date >= request.start_date)
                .cloned()
                .collect(),
        })
    }
}

#[async_trait]
impl AffidavitService for MemoryMatcher {
    async fn generate_affidavit(
        &self,
        request: &AffidavitRequest,
    ) -> Result<AffidavitDocument, ClientError> {
        let mut inner = self.lock();
        inner.affidavit_requests.push(request.clone());

        if let Some(error) = inner.affidavit_failures.pop_front() {
            return Err(error);
        }

        let body = format!(
            "%PDF-1.4\n% affidavit: {} {} {} {}\n",
            request.cardholder_name, request.vendor, request.price, request.date
        );
        Ok(AffidavitDocument {
            file_name: request.file_name(),
            bytes: body.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn report_item(day: u32) -> ActualExpense {
        ActualExpense {
            description: String::new(),
            activity: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            price: BigDecimal::from(10),
            vendor: "HEB".to_string(),
            receipts: Vec::new(),
            flyer: None,
            needs_affidavit: false,
        }
    }

    fn request(text: &str) -> ReconcileRequest {
        ReconcileRequest {
            cardholder_name: "Tori Xiao (EVP)".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 5).unwrap(),
            expected_expenses: text.to_string(),
            sheet_link: "https://example.com/sheet".to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_response_leaves_everything_unmatched() {
        let matcher = MemoryMatcher::with_report(vec![report_item(1), report_item(9)]);
        let response = matcher
            .reconcile(&request("11/6/25 - HEB - $10\nbad line"))
            .await
            .unwrap();

        assert!(response.matched.is_empty());
        assert_eq!(response.unmatched_expected.len(), 1);
        assert_eq!(response.unmatched_actual, vec![report_item(9)]);
        assert_eq!(matcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_outcomes_come_first() {
        let matcher = MemoryMatcher::new();
        matcher.push_failure(ClientError::transport("connection reset"));
        matcher.push_response(ReconcileResponse::default());

        let first = matcher.reconcile(&request("")).await;
        assert_eq!(first, Err(ClientError::Transport("connection reset".to_string())));
        assert_eq!(matcher.reconcile(&request("")).await, Ok(ReconcileResponse::default()));

        matcher.clear();
        assert!(matcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_affidavit_document() {
        let matcher = MemoryMatcher::new();
        let expense = ExpectedExpense::new(
            NaiveDate::from_ymd_opt(2025, 11, 16).unwrap(),
            "Burger Chan",
            BigDecimal::from(214),
        );
        let document = matcher
            .generate_affidavit(&AffidavitRequest::for_expense(&expense, "Alex Rubio (President)"))
            .await
            .unwrap();

        assert_eq!(document.file_name, "affidavit_Burger_Chan_2025-11-16.pdf");
        assert!(document.bytes.starts_with(b"%PDF"));
        assert_eq!(matcher.affidavit_requests().len(), 1);
    }
}
