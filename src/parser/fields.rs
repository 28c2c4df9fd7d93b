//! Field-level parsing for expected-expense lines

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use std::str::FromStr;

/// Currency sigil that marks the price field
pub const CURRENCY_SIGIL: char = '$';

/// Two-digit years at or above this map to the 1900s, below it to the 2000s
pub const CENTURY_PIVOT: i32 = 50;

/// Why a single line was left out of the parse result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineRejection {
    #[error("expected 3 dash-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid date '{0}', expected MM/DD/YY")]
    Date(String),
    #[error("invalid price '{0}'")]
    Price(String),
}

/// Expand a two-digit year using the century pivot
pub fn expand_year(two_digit: i32) -> i32 {
    if two_digit >= CENTURY_PIVOT {
        1900 + two_digit
    } else {
        2000 + two_digit
    }
}

/// Parse an `MM/DD/YY` date token.
///
/// Month and day take one or two digits, the year exactly two.
pub fn parse_short_date(token: &str) -> Result<NaiveDate, LineRejection> {
    let reject = || LineRejection::Date(token.to_string());

    let parts: Vec<&str> = token.trim().split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(reject());
    };

    let month = numeric_token(month, 1..=2).ok_or_else(reject)?;
    let day = numeric_token(day, 1..=2).ok_or_else(reject)?;
    let year = numeric_token(year, 2..=2).ok_or_else(reject)?;

    NaiveDate::from_ymd_opt(expand_year(year as i32), month, day).ok_or_else(reject)
}

fn numeric_token(token: &str, digits: std::ops::RangeInclusive<usize>) -> Option<u32> {
    let token = token.trim();
    if !digits.contains(&token.len()) || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Whether a value field is the price field
pub fn is_price_field(field: &str) -> bool {
    field.starts_with(CURRENCY_SIGIL)
}

/// Parse a price field: sigils and thousands separators are stripped first.
///
/// Only the leading decimal number counts, so `$25.25 USD` reads as 25.25.
/// Prices too large to travel as a JSON number are rejected.
pub fn parse_price(field: &str) -> Result<BigDecimal, LineRejection> {
    let reject = || LineRejection::Price(field.to_string());

    let cleaned: String = field
        .chars()
        .filter(|c| *c != CURRENCY_SIGIL && *c != ',')
        .collect();

    let number = leading_decimal(cleaned.trim()).ok_or_else(reject)?;
    let price = BigDecimal::from_str(&number).map_err(|_| reject())?;
    match price.to_f64() {
        Some(value) if value.is_finite() => Ok(price),
        _ => Err(reject()),
    }
}

/// The longest decimal number at the start of `text`, in canonical form
fn leading_decimal(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count()
    };

    let mut pos = 0;
    let sign = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            "-"
        }
        Some(b'+') => {
            pos += 1;
            ""
        }
        _ => "",
    };

    let int_len = digits_from(pos);
    let integer = &text[pos..pos + int_len];
    pos += int_len;

    let mut fraction = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_len = digits_from(pos + 1);
        fraction = &text[pos + 1..pos + 1 + frac_len];
        pos += 1 + frac_len;
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut number = format!("{}{}", sign, if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        number.push('.');
        number.push_str(fraction);
    }

    // An exponent only counts when digits follow it.
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        let exp_sign = match bytes.get(exp) {
            Some(b'-') => {
                exp += 1;
                "-"
            }
            Some(b'+') => {
                exp += 1;
                ""
            }
            _ => "",
        };
        let exp_len = digits_from(exp);
        if exp_len > 0 {
            number.push('e');
            number.push_str(exp_sign);
            number.push_str(&text[exp..exp + exp_len]);
        }
    }

    Some(number)
}
