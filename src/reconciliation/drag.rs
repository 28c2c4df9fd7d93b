//! Two-event adapter between a drag gesture source and the pairing engine

use serde::{Deserialize, Serialize};

use crate::reconciliation::pairing::PairingEngine;
use crate::types::*;

/// Gesture events the pairing engine cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragEvent {
    /// An available report item was picked up
    PickUp(ExpenseKey),
    /// The held item was dropped onto an expected slot
    Drop(ExpenseKey),
    /// The gesture ended outside any slot
    Cancel,
}

/// What a handled event did to the pairing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// An item is now held
    Holding(ExpenseKey),
    /// The held item was placed; `displaced` went back to the pool
    Placed {
        expected: ExpenseKey,
        actual: ExpenseKey,
        displaced: Option<ExpenseKey>,
    },
    /// Nothing changed
    Ignored,
}

/// Tracks the item currently held by a drag gesture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragController {
    held: Option<ExpenseKey>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<&ExpenseKey> {
        self.held.as_ref()
    }

    /// Start dragging the report item with key `actual`
    pub fn pick_up(&mut self, actual: ExpenseKey) -> DragOutcome {
        self.held = Some(actual.clone());
        DragOutcome::Holding(actual)
    }

    /// Drop the held item onto the expected slot `expected`.
    ///
    /// Unknown keys and drops with nothing held change nothing. The held item
    /// is released either way.
    pub fn drop_on(&mut self, expected: ExpenseKey, engine: &mut PairingEngine) -> DragOutcome {
        let Some(held) = self.held.take() else {
            return DragOutcome::Ignored;
        };

        if !engine.has_expected(&expected) {
            tracing::debug!(expected = %expected, "drop target is not an open slot");
            return DragOutcome::Ignored;
        }

        let Some(actual) = engine.find_actual(&held) else {
            tracing::debug!(actual = %held, "dragged item is not in the report snapshot");
            return DragOutcome::Ignored;
        };

        let displaced = engine.pair(expected.clone(), actual);
        DragOutcome::Placed {
            expected,
            actual: held,
            displaced: displaced.map(|previous| previous.key),
        }
    }

    pub fn cancel(&mut self) -> DragOutcome {
        self.held = None;
        DragOutcome::Ignored
    }

    /// Dispatch one gesture event
    pub fn handle(&mut self, event: DragEvent, engine: &mut PairingEngine) -> DragOutcome {
        match event {
            DragEvent::PickUp(actual) => self.pick_up(actual),
            DragEvent::Drop(expected) => self.drop_on(expected, engine),
            DragEvent::Cancel => self.cancel(),
        }
    }
}
