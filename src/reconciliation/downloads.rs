//! In-flight affidavit downloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::ExpenseKey;

/// Expected items whose affidavit is currently being generated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTracker {
    in_flight: BTreeSet<ExpenseKey>,
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a download as started; `false` if one is already running for `key`
    pub fn download_start(&mut self, key: ExpenseKey) -> bool {
        self.in_flight.insert(key)
    }

    /// Mark a download as finished, whatever its outcome
    pub fn download_end(&mut self, key: &ExpenseKey) {
        self.in_flight.remove(key);
    }

    pub fn is_downloading(&self, key: &ExpenseKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}
