use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::expression::domain::expression_signal::ExpressionSignal;

/// An expression started or stopped being held.
#[derive(Clone, Debug, PartialEq)]
pub struct HoldChange {
    pub expression: String,
    pub held: bool,
    pub at: Duration,
}

#[derive(Default)]
struct HoldState {
    held: bool,
    last_sample: Option<Duration>,
}

/// Follows the held state of a fixed set of expressions.
///
/// The state is sampled at most once per `sample_interval`, so a flickering
/// signal cannot toggle playback on every frame. Only transitions are
/// reported. Expressions outside the set are ignored.
pub struct HoldTracker {
    sample_interval: Duration,
    states: BTreeMap<String, HoldState>,
}

impl HoldTracker {
    pub fn new(expressions: BTreeSet<String>, sample_interval: Duration) -> Self {
        Self {
            sample_interval,
            states: expressions
                .into_iter()
                .map(|e| (e, HoldState::default()))
                .collect(),
        }
    }

    pub fn tracks(&self, expression: &str) -> bool {
        self.states.contains_key(expression)
    }

    pub fn is_held(&self, expression: &str) -> bool {
        self.states.get(expression).is_some_and(|s| s.held)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn observe(&mut self, signal: &ExpressionSignal, now: Duration) -> Option<HoldChange> {
        let interval = self.sample_interval;
        let state = self.states.get_mut(&signal.name)?;

        if matches!(state.last_sample, Some(at) if now.saturating_sub(at) < interval) {
            return None;
        }
        state.last_sample = Some(now);

        if state.held == signal.active {
            return None;
        }
        state.held = signal.active;
        Some(HoldChange {
            expression: signal.name.clone(),
            held: signal.active,
            at: now,
        })
    }
}
