//! Reconciliation session that drives a submission through to manual review

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::parser::{self, ParseReport};
use crate::reconciliation::downloads::DownloadTracker;
use crate::reconciliation::drag::{DragController, DragEvent, DragOutcome};
use crate::reconciliation::pairing::PairingEngine;
use crate::settings::MatcherSettings;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation;

/// Fields of the submission form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseForm {
    pub cardholder_name: String,
    pub start_date: Option<NaiveDate>,
    pub expected_text: String,
}

/// Counts shown above the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub matched: usize,
    pub manually_paired: usize,
    pub open_expected: usize,
    pub remaining_actual: usize,
}

/// Results of one matcher response together with the user's manual pairings
#[derive(Debug, Clone)]
pub struct Review {
    matched: Vec<MatchedPair>,
    pairing: PairingEngine,
    drag: DragController,
}

impl Review {
    pub fn new(response: ReconcileResponse) -> Self {
        let pairing = PairingEngine::from_response(&response);
        Self {
            matched: response.matched,
            pairing,
            drag: DragController::new(),
        }
    }

    /// Pairs resolved by the remote matcher
    pub fn matched(&self) -> &[MatchedPair] {
        &self.matched
    }

    pub fn pairing(&self) -> &PairingEngine {
        &self.pairing
    }

    pub fn pairing_mut(&mut self) -> &mut PairingEngine {
        &mut self.pairing
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Feed one gesture event into the pairing engine
    pub fn handle(&mut self, event: DragEvent) -> DragOutcome {
        self.drag.handle(event, &mut self.pairing)
    }

    pub fn summary(&self) -> ReviewSummary {
        let resolved = self.pairing.resolved_view();
        let open_expected = resolved.iter().filter(|row| row.resolution.is_open()).count();
        ReviewSummary {
            matched: self.matched.len(),
            manually_paired: resolved.len() - open_expected,
            open_expected,
            remaining_actual: self.pairing.available_actuals().len(),
        }
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Editing,
    Submitting,
    Reviewing(Box<Review>),
    Failed { message: String, status: u16 },
}

/// Coarse state of a session, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Submitting,
    Reviewing,
    Failed,
}

/// One reconciliation session: form, submission, results and manual review.
///
/// All state is ephemeral and discarded on [`ReconciliationSession::reset`].
#[derive(Debug, Clone)]
pub struct ReconciliationSession {
    id: Uuid,
    sheet_link: String,
    form: ExpenseForm,
    phase: Phase,
    downloads: DownloadTracker,
}

impl ReconciliationSession {
    /// Create a new session reconciling against the given purchase sheet
    pub fn new(sheet_link: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sheet_link: sheet_link.into(),
            form: ExpenseForm::default(),
            phase: Phase::Editing,
            downloads: DownloadTracker::new(),
        }
    }

    /// Create a session for the sheet named in the matcher settings
    pub fn from_settings(settings: &MatcherSettings) -> Self {
        Self::new(settings.sheet_link.clone())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form(&self) -> &ExpenseForm {
        &self.form
    }

    pub fn set_cardholder_name(&mut self, name: impl Into<String>) {
        self.form.cardholder_name = name.into();
    }

    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.form.start_date = start_date;
    }

    pub fn set_expected_text(&mut self, text: impl Into<String>) {
        self.form.expected_text = text.into();
    }

    /// Expected expenses as currently parsed from the form text
    pub fn preview(&self) -> Vec<ExpectedExpense> {
        parser::parse_expected_expenses(&self.form.expected_text)
    }

    /// Parse diagnostics for the form text
    pub fn parse_report(&self) -> ParseReport {
        parser::parse_with_report(&self.form.expected_text)
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase {
            Phase::Editing => SessionPhase::Editing,
            Phase::Submitting => SessionPhase::Submitting,
            Phase::Reviewing(_) => SessionPhase::Reviewing,
            Phase::Failed { .. } => SessionPhase::Failed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    /// Validate the form and enter the pending state.
    ///
    /// Fails with [`ReconcileError::SubmissionPending`] while another
    /// submission is in flight. Any previous review is discarded.
    pub fn begin_submission(&mut self) -> ReconcileResult<ReconcileRequest> {
        if self.is_pending() {
            return Err(ReconcileError::SubmissionPending);
        }

        validation::validate_cardholder_name(&self.form.cardholder_name)?;
        let start_date = validation::validate_start_date(self.form.start_date)?;
        validation::validate_expected_text(&self.form.expected_text)?;
        validation::validate_sheet_link(&self.sheet_link)?;

        let request = ReconcileRequest {
            cardholder_name: self.form.cardholder_name.clone(),
            start_date,
            expected_expenses: self.form.expected_text.clone(),
            sheet_link: self.sheet_link.clone(),
        };

        tracing::info!(session = %self.id, cardholder = %request.cardholder_name, "submitting reconciliation");
        self.phase = Phase::Submitting;
        Ok(request)
    }

    /// Record the outcome of the pending submission.
    ///
    /// Outcomes arriving while nothing is pending are ignored.
    pub fn complete_submission(&mut self, outcome: Result<ReconcileResponse, ClientError>) {
        if !self.is_pending() {
            tracing::warn!(session = %self.id, "ignoring reconciliation outcome with no pending submission");
            return;
        }

        self.phase = match outcome {
            Ok(response) => {
                tracing::info!(
                    session = %self.id,
                    matched = response.matched.len(),
                    unmatched_expected = response.unmatched_expected.len(),
                    unmatched_actual = response.unmatched_actual.len(),
                    "reconciliation completed"
                );
                Phase::Reviewing(Box::new(Review::new(response)))
            }
            Err(err) => {
                tracing::info!(session = %self.id, status = err.status_code(), error = %err, "reconciliation failed");
                Phase::Failed {
                    message: err.to_string(),
                    status: err.status_code(),
                }
            }
        };
    }

    /// Give up on the pending submission and return to the form.
    ///
    /// Returns `false` when nothing was pending. A later outcome for the
    /// abandoned request is ignored like any other stale completion.
    pub fn abort_submission(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        tracing::info!(session = %self.id, "reconciliation submission abandoned");
        self.phase = Phase::Editing;
        true
    }

    /// Submit the form to `matcher` and wait for the outcome.
    ///
    /// Dropping the returned future mid-request leaves the session pending;
    /// call [`ReconciliationSession::abort_submission`] to submit again.
    pub async fn submit<M>(&mut self, matcher: &M) -> ReconcileResult<()>
    where
        M: RemoteMatcher + ?Sized,
    {
        let request = self.begin_submission()?;
        let outcome = matcher.reconcile(&request).await;
        let failure = outcome.as_ref().err().cloned();
        self.complete_submission(outcome);

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn review(&self) -> Option<&Review> {
        match &self.phase {
            Phase::Reviewing(review) => Some(&**review),
            _ => None,
        }
    }

    pub fn review_mut(&mut self) -> Option<&mut Review> {
        match &mut self.phase {
            Phase::Reviewing(review) => Some(&mut **review),
            _ => None,
        }
    }

    /// Feed a gesture event to the active review; ignored without one
    pub fn handle_drag(&mut self, event: DragEvent) -> DragOutcome {
        match self.review_mut() {
            Some(review) => review.handle(event),
            None => DragOutcome::Ignored,
        }
    }

    /// Message for the error banner, if the last submission failed
    pub fn error_banner(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Status of the last failure; `0` for network failures
    pub fn error_status(&self) -> Option<u16> {
        match &self.phase {
            Phase::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Dismiss the error banner, returning to an empty form
    pub fn dismiss_error(&mut self) {
        self.reset();
    }

    /// Start over: clears the form, results, pairings and downloads
    pub fn reset(&mut self) {
        let previous = self.id;
        self.id = Uuid::new_v4();
        self.form = ExpenseForm::default();
        self.phase = Phase::Editing;
        self.downloads.clear();
        tracing::info!(previous = %previous, session = %self.id, "reconciliation session reset");
    }

    /// Client-parsed expected expenses an affidavit can be generated for
    pub fn affidavit_candidates(&self) -> Vec<Keyed<ExpectedExpense>> {
        let expenses = self.preview();
        keyed(&expenses).map(|expense| expense.cloned()).collect()
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    /// Start an affidavit download for the candidate `key`.
    ///
    /// Returns `None` when the key is unknown or a download for it is
    /// already running.
    pub fn begin_download(&mut self, key: &ExpenseKey) -> Option<AffidavitRequest> {
        let candidate = self
            .affidavit_candidates()
            .into_iter()
            .find(|candidate| &candidate.key == key)?;

        if !self.downloads.download_start(key.clone()) {
            return None;
        }

        Some(AffidavitRequest::for_expense(
            &candidate.item,
            self.form.cardholder_name.clone(),
        ))
    }

    pub fn finish_download(&mut self, key: &ExpenseKey) {
        self.downloads.download_end(key);
    }

    /// Generate the affidavit for candidate `key` through `service`.
    ///
    /// Returns `Ok(None)` when there is nothing to download.
    pub async fn download_affidavit<A>(
        &mut self,
        service: &A,
        key: &ExpenseKey,
    ) -> ReconcileResult<Option<AffidavitDocument>>
    where
        A: AffidavitService + ?Sized,
    {
        validation::validate_cardholder_name(&self.form.cardholder_name)?;
        let Some(request) = self.begin_download(key) else {
            return Ok(None);
        };

        let outcome = service.generate_affidavit(&request).await;
        self.finish_download(key);

        match outcome {
            Ok(document) => Ok(Some(document)),
            Err(err) => {
                tracing::warn!(vendor = %request.vendor, error = %err, "affidavit generation failed");
                Err(err.into())
            }
        }
    }
}
