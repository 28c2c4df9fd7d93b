//! Parser for free-text expected-expense lists
//!
//! Each non-blank line holds one purchase in either of two field orders:
//!
//! ```text
//! 11/16/25 - Cheesecake - $138.36
//! 11/16/25 - $214.20 - Burger Chan
//! ```
//!
//! Lines that cannot be parsed are dropped; parsing never fails as a whole.

pub mod fields;

pub use fields::LineRejection;

use serde::{Deserialize, Serialize};

use crate::types::ExpectedExpense;

/// A line that was left out of the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedLine {
    /// 1-based line number in the original text
    pub line_number: usize,
    /// The trimmed line
    pub text: String,
    /// Human-readable reason
    pub reason: String,
}

/// Parse outcome with diagnostics about dropped lines
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseReport {
    /// Successfully parsed expenses, in input order
    pub expenses: Vec<ExpectedExpense>,
    /// Non-blank lines that were dropped
    pub dropped: Vec<DroppedLine>,
}

impl ParseReport {
    /// Number of non-blank lines that were considered
    pub fn considered(&self) -> usize {
        self.expenses.len() + self.dropped.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Parse a block of text into expected expenses, silently dropping bad lines
pub fn parse_expected_expenses(text: &str) -> Vec<ExpectedExpense> {
    parse_with_report(text).expenses
}

/// Parse a block of text, keeping track of every dropped line
pub fn parse_with_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(expense) => report.expenses.push(expense),
            Err(rejection) => {
                tracing::debug!(line_number = index + 1, %rejection, "dropping expense line");
                report.dropped.push(DroppedLine {
                    line_number: index + 1,
                    text: line.to_string(),
                    reason: rejection.to_string(),
                });
            }
        }
    }

    report
}

/// Parse a single `date - vendor - price` (or `date - price - vendor`) line
pub fn parse_line(line: &str) -> Result<ExpectedExpense, LineRejection> {
    let parts: Vec<&str> = line.trim().split('-').map(str::trim).collect();
    let [date, first, second] = parts.as_slice() else {
        return Err(LineRejection::FieldCount(parts.len()));
    };

    let date = fields::parse_short_date(date)?;

    // The field carrying the sigil is the price; otherwise the last field is.
    let (price, vendor) = if fields::is_price_field(first) {
        (*first, *second)
    } else {
        (*second, *first)
    };

    let price = fields::parse_price(price)?;

    Ok(ExpectedExpense {
        date,
        vendor: vendor.to_string(),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn expected(y: i32, m: u32, d: u32, vendor: &str, price: &str) -> ExpectedExpense {
        ExpectedExpense::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            vendor,
            BigDecimal::from_str(price).unwrap(),
        )
    }

    #[test]
    fn test_vendor_then_price() {
        let parsed = parse_expected_expenses("11/1/25 - Trader Joe's - $25.25");
        assert_eq!(parsed, vec![expected(2025, 11, 1, "Trader Joe's", "25.25")]);
    }

    #[test]
    fn test_field_order_is_commutative() {
        let a = parse_expected_expenses("11/1/25 - Trader Joe's - $25.25");
        let b = parse_expected_expenses("11/1/25 - $25.25 - Trader Joe's");
        assert_eq!(a, b);
    }

    #[test]
    fn test_century_pivot_boundary() {
        let parsed = parse_expected_expenses("1/2/49 - A - $1\n1/2/50 - B - $2");
        assert_eq!(parsed[0].date, NaiveDate::from_ymd_opt(2049, 1, 2).unwrap());
        assert_eq!(parsed[1].date, NaiveDate::from_ymd_opt(1950, 1, 2).unwrap());
    }

    #[test]
    fn test_extra_dash_drops_line() {
        assert!(parse_expected_expenses("11/1/25 - Trader Joe's - Store - $5").is_empty());
        assert!(parse_expected_expenses("11/1/25 - Target").is_empty());
    }

    #[test]
    fn test_blank_lines_and_whitespace_are_ignored() {
        let text = "\n\n   11/3/25 - Target - $9.99   \n\t\n\r\n 11/9/25 - Target - $40.81\r\n";
        let parsed = parse_expected_expenses(text);
        assert_eq!(
            parsed,
            vec![
                expected(2025, 11, 3, "Target", "9.99"),
                expected(2025, 11, 9, "Target", "40.81"),
            ]
        );
    }

    #[test]
    fn test_order_and_duplicates_are_preserved() {
        let text = "11/9/25 - Target - $9.99\n11/3/25 - Target - $9.99\n11/9/25 - Target - $9.99";
        let parsed = parse_expected_expenses(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], parsed[2]);
        assert_eq!(parsed[1].date, NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
    }

    #[test]
    fn test_bad_lines_do_not_stop_parsing() {
        let text = "garbage\n11/30/25 - Custom Ink - $1,075.50\n99/99/99 - X - $1\n11/18/25 - HEB - $abc";
        let report = parse_with_report(text);
        assert_eq!(report.expenses, vec![expected(2025, 11, 30, "Custom Ink", "1075.50")]);
        assert_eq!(report.considered(), 4);
        assert_eq!(report.dropped_count(), 3);
        assert_eq!(report.dropped[0].line_number, 1);
        assert_eq!(report.dropped[2].line_number, 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_price_without_sigil_in_last_field() {
        let parsed = parse_expected_expenses("11/3/25 - Target - 9.99");
        assert_eq!(parsed, vec![expected(2025, 11, 3, "Target", "9.99")]);
    }

    #[test]
    fn test_trailing_text_after_price_is_ignored() {
        let parsed = parse_expected_expenses("11/1/25 - X - $25.25 USD\n11/3/25 - $9.99ea - Target");
        assert_eq!(
            parsed,
            vec![
                expected(2025, 11, 1, "X", "25.25"),
                expected(2025, 11, 3, "Target", "9.99"),
            ]
        );
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(
            parse_line("11/1/25 - a - b - c"),
            Err(LineRejection::FieldCount(4))
        );
        assert!(matches!(parse_line("11-1-25 - x"), Err(LineRejection::FieldCount(4))));
        assert!(matches!(parse_line("1/1 - a - $1"), Err(LineRejection::Date(_))));
        assert!(matches!(parse_line("1/1/25 - a - b"), Err(LineRejection::Price(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_expected_expenses("").is_empty());
        assert!(parse_with_report("   \n  ").is_clean());
    }
}
