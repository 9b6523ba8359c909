use std::collections::HashMap;
use std::time::Duration;

use crate::expression::domain::expression_signal::ExpressionSignal;

/// Debounce phase of a single expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerPhase {
    /// Not fired within the cooldown window; the next active signal fires.
    Idle,
    /// Fired less than one cooldown ago; active signals are swallowed.
    Cooling,
}

/// Emitted once per qualifying activation of an expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FireEvent {
    pub expression: String,
    /// Stream time at which the expression fired.
    pub at: Duration,
    pub raw_metric: f64,
}

/// Per-expression cooldown state machine.
///
/// Time is supplied by the caller on every observation, so the engine holds
/// no clock and Cooling → Idle is evaluated lazily: an expression is Idle
/// again once `now - last_fired >= cooldown`. Inactive signals never change
/// state. Expression names seen for the first time start Idle.
pub struct TriggerEngine {
    cooldown: Duration,
    last_fired: HashMap<String, Option<Duration>>,
}

impl TriggerEngine {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Feed one signal; returns a fire event if it qualifies.
    pub fn observe(&mut self, signal: &ExpressionSignal, now: Duration) -> Option<FireEvent> {
        let cooldown = self.cooldown;
        let last = self.last_fired.entry(signal.name.clone()).or_insert(None);

        if !signal.active {
            return None;
        }
        if matches!(*last, Some(at) if now.saturating_sub(at) < cooldown) {
            return None;
        }

        *last = Some(now);
        Some(FireEvent {
            expression: signal.name.clone(),
            at: now,
            raw_metric: signal.raw_metric,
        })
    }

    /// Feed all signals from one frame, in order.
    pub fn process(&mut self, signals: &[ExpressionSignal], now: Duration) -> Vec<FireEvent> {
        signals
            .iter()
            .filter_map(|s| self.observe(s, now))
            .collect()
    }

    pub fn phase(&self, expression: &str, now: Duration) -> TriggerPhase {
        match self.last_fired.get(expression).copied().flatten() {
            Some(at) if now.saturating_sub(at) < self.cooldown => TriggerPhase::Cooling,
            _ => TriggerPhase::Idle,
        }
    }

    pub fn last_fired(&self, expression: &str) -> Option<Duration> {
        self.last_fired.get(expression).copied().flatten()
    }

    /// Whether the engine has observed this expression at all.
    pub fn is_tracked(&self, expression: &str) -> bool {
        self.last_fired.contains_key(expression)
    }
}
