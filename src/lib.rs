//! # Expense Reconcile
//!
//! Reconciles a list of expected purchases, typed or pasted as free text,
//! against the transactions of an expense report.
//!
//! ## Features
//!
//! - **Tolerant parsing**: `MM/DD/YY - Vendor - $Price` lines in either value order, bad lines dropped
//! - **Manual pairing**: resolve items the remote matcher left unmatched, one-to-one
//! - **Drag adapter**: two-event (pick-up / drop) bridge from any gesture source
//! - **Sessions**: submission lifecycle, error banner, affidavit downloads
//! - **Remote services**: trait-based seams with an HTTP client and an in-memory stand-in
//!
//! ## Quick Start
//!
//! ```rust
//! use expense_reconcile::{parse_expected_expenses, PairingEngine, ReconcileResponse};
//!
//! let expected = parse_expected_expenses("11/1/25 - Trader Joe's - $25.25\n11/3/25 - $9.99 - Target");
//! assert_eq!(expected.len(), 2);
//!
//! // Normally this comes back from the remote matcher.
//! let response = ReconcileResponse {
//!     unmatched_expected: expected,
//!     ..Default::default()
//! };
//! let engine = PairingEngine::from_response(&response);
//! assert_eq!(engine.resolved_view().len(), 2);
//! ```

pub mod client;
pub mod parser;
pub mod reconciliation;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use client::HttpMatcher;
pub use parser::{parse_expected_expenses, parse_with_report, ParseReport};
pub use reconciliation::*;
pub use settings::Settings;
pub use traits::*;
pub use types::*;
