//! Manual pairing of unmatched expected items against unmatched report items

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Manual assignments, keyed by expected-item key.
///
/// Each expected key holds at most one actual item. Keeping an actual item in
/// at most one slot is the caller's job: only offer items from
/// [`PairingEngine::available_actuals`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairingState {
    assignments: BTreeMap<ExpenseKey, Keyed<ActualExpense>>,
}

impl PairingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `actual` to `expected`, returning the item it displaced
    pub fn pair(
        &mut self,
        expected: ExpenseKey,
        actual: Keyed<ActualExpense>,
    ) -> Option<Keyed<ActualExpense>> {
        self.assignments.insert(expected, actual)
    }

    /// Remove the assignment for `expected`, if any
    pub fn unpair(&mut self, expected: &ExpenseKey) -> Option<Keyed<ActualExpense>> {
        self.assignments.remove(expected)
    }

    pub fn assignment(&self, expected: &ExpenseKey) -> Option<&Keyed<ActualExpense>> {
        self.assignments.get(expected)
    }

    /// Whether the actual item with this key sits in any slot
    pub fn is_placed(&self, actual: &ExpenseKey) -> bool {
        self.assignments.values().any(|placed| &placed.key == actual)
    }

    /// Expected keys currently holding the actual item with this key
    pub fn slots_holding(&self, actual: &ExpenseKey) -> Vec<&ExpenseKey> {
        self.assignments
            .iter()
            .filter(|(_, placed)| &placed.key == actual)
            .map(|(expected, _)| expected)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExpenseKey, &Keyed<ActualExpense>)> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
    }
}

/// How one unmatched expected item currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Still waiting for a report item
    Open,
    /// Manually paired by the user
    Paired(&'a Keyed<ActualExpense>),
}

impl Resolution<'_> {
    pub fn is_open(&self) -> bool {
        matches!(self, Resolution::Open)
    }
}

/// One row of [`PairingEngine::resolved_view`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpected<'a> {
    pub key: ExpenseKey,
    pub expected: &'a ExpectedExpense,
    pub resolution: Resolution<'a>,
}

/// Pairing engine over the matcher's unmatched collections.
///
/// The server collections are never mutated; every view is recomputed from
/// them and the current [`PairingState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingEngine {
    unmatched_expected: Vec<ExpectedExpense>,
    unmatched_actual: Vec<ActualExpense>,
    state: PairingState,
}

impl PairingEngine {
    /// Create an engine with no manual pairings
    pub fn new(unmatched_expected: Vec<ExpectedExpense>, unmatched_actual: Vec<ActualExpense>) -> Self {
        Self {
            unmatched_expected,
            unmatched_actual,
            state: PairingState::new(),
        }
    }

    /// Create an engine for the unmatched parts of a matcher response
    pub fn from_response(response: &ReconcileResponse) -> Self {
        Self::new(
            response.unmatched_expected.clone(),
            response.unmatched_actual.clone(),
        )
    }

    /// Assign `actual` to the expected slot `expected`.
    ///
    /// Replaces any previous occupant of the slot, which becomes available
    /// again and is returned. Availability of `actual` is not checked.
    pub fn pair(
        &mut self,
        expected: ExpenseKey,
        actual: Keyed<ActualExpense>,
    ) -> Option<Keyed<ActualExpense>> {
        tracing::debug!(expected = %expected, actual = %actual.key, "manual pairing");
        let displaced = self.state.pair(expected, actual);
        if let Some(previous) = &displaced {
            tracing::debug!(actual = %previous.key, "returned to available pool");
        }
        displaced
    }

    /// Clear the slot `expected`; a no-op when it is empty or unknown
    pub fn unpair(&mut self, expected: &ExpenseKey) -> Option<Keyed<ActualExpense>> {
        let removed = self.state.unpair(expected);
        if removed.is_some() {
            tracing::debug!(expected = %expected, "manual pairing removed");
        }
        removed
    }

    /// Unmatched report items not placed in any slot
    pub fn available_actuals(&self) -> Vec<Keyed<&ActualExpense>> {
        keyed(&self.unmatched_actual)
            .filter(|actual| !self.state.is_placed(&actual.key))
            .collect()
    }

    /// Every unmatched expected item with its current resolution
    pub fn resolved_view(&self) -> Vec<ResolvedExpected<'_>> {
        keyed(&self.unmatched_expected)
            .map(|expected| {
                let resolution = match self.state.assignment(&expected.key) {
                    Some(actual) => Resolution::Paired(actual),
                    None => Resolution::Open,
                };
                ResolvedExpected {
                    key: expected.key,
                    expected: expected.item,
                    resolution,
                }
            })
            .collect()
    }

    /// Unmatched expected items with their keys
    pub fn expected_items(&self) -> Vec<Keyed<&ExpectedExpense>> {
        keyed(&self.unmatched_expected).collect()
    }

    /// All unmatched report items with their keys, placed or not
    pub fn actual_items(&self) -> Vec<Keyed<&ActualExpense>> {
        keyed(&self.unmatched_actual).collect()
    }

    /// Look up an unmatched report item by key
    pub fn find_actual(&self, key: &ExpenseKey) -> Option<Keyed<ActualExpense>> {
        keyed(&self.unmatched_actual)
            .find(|actual| &actual.key == key)
            .map(|actual| actual.cloned())
    }

    /// Whether `key` names one of the unmatched expected items
    pub fn has_expected(&self, key: &ExpenseKey) -> bool {
        keyed(&self.unmatched_expected).any(|expected| &expected.key == key)
    }

    pub fn state(&self) -> &PairingState {
        &self.state
    }

    /// Drop every manual pairing
    pub fn reset(&mut self) {
        self.state.clear();
    }
}
