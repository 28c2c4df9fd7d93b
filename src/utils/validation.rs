//! Validation utilities for the submission form

use chrono::NaiveDate;
use reqwest::Url;

use crate::types::*;

/// Validate that a cardholder name was chosen
pub fn validate_cardholder_name(name: &str) -> ReconcileResult<()> {
    if name.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Cardholder name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a start date was chosen
pub fn validate_start_date(start_date: Option<NaiveDate>) -> ReconcileResult<NaiveDate> {
    start_date.ok_or_else(|| ReconcileError::Validation("Start date is required".to_string()))
}

/// Validate that some expected-expense text was entered
pub fn validate_expected_text(text: &str) -> ReconcileResult<()> {
    if text.trim().is_empty() {
        return Err(ReconcileError::Validation(
            "Expected expenses cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate that the sheet link is an absolute http(s) URL
pub fn validate_sheet_link(link: &str) -> ReconcileResult<()> {
    let url = Url::parse(link.trim())
        .map_err(|err| ReconcileError::Validation(format!("Invalid sheet link: {}", err)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ReconcileError::Validation(format!(
            "Sheet link must use http or https, not '{}'",
            other
        ))),
    }
}
