//! Core types and data structures for expense reconciliation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A purchase the cardholder expects to find on the expense report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedExpense {
    /// Purchase date
    pub date: NaiveDate,
    /// Vendor name, taken verbatim from the input
    pub vendor: String,
    /// Purchase amount
    #[serde(with = "amount")]
    pub price: BigDecimal,
}

impl ExpectedExpense {
    /// Create a new expected expense
    pub fn new(date: NaiveDate, vendor: impl Into<String>, price: BigDecimal) -> Self {
        Self {
            date,
            vendor: vendor.into(),
            price,
        }
    }
}

/// A transaction line from the expense report ("report item")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualExpense {
    /// Report description line
    pub description: String,
    /// Program/activity code the purchase is booked against
    pub activity: String,
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction amount
    #[serde(with = "amount")]
    pub price: BigDecimal,
    /// Vendor as recorded on the report
    pub vendor: String,
    /// Receipt links, in report order
    #[serde(default)]
    pub receipts: Vec<String>,
    /// Optional event flyer link; an empty string on the wire means none
    #[serde(default, with = "optional_link")]
    pub flyer: Option<String>,
    /// Whether the purchase needs an affidavit in place of a receipt
    #[serde(default, alias = "needsAffidavit")]
    pub needs_affidavit: bool,
}

/// An expected/actual pair already resolved by the remote matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub expected: ExpectedExpense,
    pub actual: ActualExpense,
}

/// Request sent to the remote matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Cardholder whose transactions are reconciled
    pub cardholder_name: String,
    /// Earliest transaction date to consider
    pub start_date: NaiveDate,
    /// Raw expected-expense text, one purchase per line
    pub expected_expenses: String,
    /// Link to the purchase sheet backing the expense report
    pub sheet_link: String,
}

/// Partition returned by the remote matcher
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub matched: Vec<MatchedPair>,
    pub unmatched_expected: Vec<ExpectedExpense>,
    pub unmatched_actual: Vec<ActualExpense>,
}

/// Request for a filled affidavit document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffidavitRequest {
    pub vendor: String,
    #[serde(with = "amount")]
    pub price: BigDecimal,
    pub date: NaiveDate,
    pub cardholder_name: String,
}

impl AffidavitRequest {
    /// Build the request for one expected expense
    pub fn for_expense(expense: &ExpectedExpense, cardholder_name: impl Into<String>) -> Self {
        Self {
            vendor: expense.vendor.clone(),
            price: expense.price.clone(),
            date: expense.date,
            cardholder_name: cardholder_name.into(),
        }
    }

    /// Download file name for the generated document
    pub fn file_name(&self) -> String {
        affidavit_file_name(&self.vendor, self.date)
    }
}

/// A generated affidavit, ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffidavitDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `affidavit_{vendor}_{date}.pdf`, with whitespace runs in the vendor replaced by `_`
pub fn affidavit_file_name(vendor: &str, date: NaiveDate) -> String {
    let vendor = vendor.split_whitespace().collect::<Vec<_>>().join("_");
    format!("affidavit_{}_{}.pdf", vendor, date.format("%Y-%m-%d"))
}

/// Health status reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Locally derived identity of an expected or actual item.
///
/// Built from `(date, vendor, price, position)` so that otherwise identical
/// purchases in one collection stay distinct. Only meaningful for the
/// collection snapshot it was derived from; never sent to the remote matcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseKey(String);

impl ExpenseKey {
    /// Derive the key for an item at `position` in its collection
    pub fn derive(date: NaiveDate, vendor: &str, price: &BigDecimal, position: usize) -> Self {
        Self(format!(
            "{}|{}|{}|{}",
            date.format("%Y-%m-%d"),
            vendor,
            price.normalized(),
            position
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Records that can be keyed by their position in a collection
pub trait Keyable {
    fn key_at(&self, position: usize) -> ExpenseKey;
}

impl Keyable for ExpectedExpense {
    fn key_at(&self, position: usize) -> ExpenseKey {
        ExpenseKey::derive(self.date, &self.vendor, &self.price, position)
    }
}

impl Keyable for ActualExpense {
    fn key_at(&self, position: usize) -> ExpenseKey {
        ExpenseKey::derive(self.date, &self.vendor, &self.price, position)
    }
}

/// A record together with its derived key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub key: ExpenseKey,
    pub item: T,
}

impl<T: Clone> Keyed<&T> {
    /// Detach from the borrowed collection
    pub fn cloned(&self) -> Keyed<T> {
        Keyed {
            key: self.key.clone(),
            item: self.item.clone(),
        }
    }
}

/// Key every item of a collection by its position
pub fn keyed<T: Keyable>(items: &[T]) -> impl Iterator<Item = Keyed<&T>> + '_ {
    items.iter().enumerate().map(|(position, item)| Keyed {
        key: item.key_at(position),
        item,
    })
}

/// HTTP status reported for failures where no response arrived at all
pub const NETWORK_FAILURE_STATUS: u16 = 0;

/// Remote call that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reconcile,
    Affidavit,
    Health,
}

impl Operation {
    /// Generic user-facing message when the service gives no usable detail
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Reconcile => "Reconciliation failed",
            Operation::Affidavit => "Affidavit generation failed",
            Operation::Health => "Health check failed",
        }
    }
}

/// Failure of a call to the remote matcher or affidavit service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Non-success status with a structured `{detail}` body
    #[error("{detail}")]
    Detail { status: u16, detail: String },
    /// Non-success status whose body could not be read as `{detail}`
    #[error("{} ({status_line})", .operation.fallback_message())]
    Unparsable {
        operation: Operation,
        status: u16,
        status_line: String,
    },
    /// No usable response at all
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    /// Build a transport failure, falling back to a generic message
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            ClientError::Transport("Network error".to_string())
        } else {
            ClientError::Transport(message)
        }
    }

    /// HTTP status of the failure; `0` when no response arrived
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::Detail { status, .. } | ClientError::Unparsable { status, .. } => *status,
            ClientError::Transport(_) => NETWORK_FAILURE_STATUS,
        }
    }
}

/// Errors that can occur while driving a reconciliation session
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("A reconciliation is already in progress")]
    SubmissionPending,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Exact decimal amounts carried as JSON numbers.
///
/// Numbers are read through their shortest decimal rendering so `9.99`
/// stays `9.99` rather than its binary expansion.
pub(crate) mod amount {
    use bigdecimal::{BigDecimal, ToPrimitive};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.to_f64() {
            Some(number) if number.is_finite() => serializer.serialize_f64(number),
            _ => Err(serde::ser::Error::custom(format!(
                "amount {} is not representable",
                value
            ))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = BigDecimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal amount")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<BigDecimal, E> {
            if !value.is_finite() {
                return Err(E::custom("amount must be finite"));
            }
            BigDecimal::from_str(&value.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<BigDecimal, E> {
            BigDecimal::from_str(value.trim()).map_err(E::custom)
        }
    }
}

/// Optional links where the wire format uses `""` for "none"
pub(crate) mod optional_link {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|link| !link.trim().is_empty()))
    }
}
