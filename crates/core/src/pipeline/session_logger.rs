use std::collections::BTreeMap;
use std::time::Instant;

use crate::trigger::domain::hold_tracker::HoldChange;
use crate::trigger::domain::trigger_engine::FireEvent;

/// Cross-cutting observer for frame loop events.
///
/// Keeps the loop free of reporting concerns so the CLI and tests can
/// observe a session without changing the orchestration code.
pub trait SessionLogger: Send {
    /// Record one pulled frame and whether it contained a usable face.
    fn frame(&mut self, face_detected: bool);

    /// Record an expression that passed the cooldown.
    fn fired(&mut self, event: &FireEvent);

    /// Record a held expression starting or stopping. Default: no-op.
    fn held(&mut self, _change: &HoldChange) {}

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _face_detected: bool) {}
    fn fired(&mut self, _event: &FireEvent) {}
}

/// Counts frames and fires, and logs a summary through the `log` facade.
pub struct LogSessionLogger {
    start_time: Instant,
    frames: usize,
    faceless_frames: usize,
    fires: BTreeMap<String, usize>,
    holds: BTreeMap<String, usize>,
}

impl LogSessionLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            frames: 0,
            faceless_frames: 0,
            fires: BTreeMap::new(),
            holds: BTreeMap::new(),
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn faceless_frames(&self) -> usize {
        self.faceless_frames
    }

    pub fn fires_for(&self, expression: &str) -> usize {
        self.fires.get(expression).copied().unwrap_or(0)
    }

    /// Number of times the expression started being held.
    pub fn holds_for(&self, expression: &str) -> usize {
        self.holds.get(expression).copied().unwrap_or(0)
    }

    /// Returns the formatted summary, or `None` if no frame was seen.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames, {} without a face, {elapsed:.1}s):",
            self.frames, self.faceless_frames
        )];

        if self.fires.is_empty() && self.holds.is_empty() {
            lines.push("  no expressions triggered".to_string());
        }
        for (expression, count) in &self.fires {
            lines.push(format!("  {expression:14}: {count} trigger(s)"));
        }
        for (expression, count) in &self.holds {
            lines.push(format!("  {expression:14}: held {count} time(s)"));
        }

        if elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames as f64 / elapsed
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLogger for LogSessionLogger {
    fn frame(&mut self, face_detected: bool) {
        self.frames += 1;
        if !face_detected {
            self.faceless_frames += 1;
        }
    }

    fn fired(&mut self, event: &FireEvent) {
        *self.fires.entry(event.expression.clone()).or_default() += 1;
        log::debug!(
            "{} fired at {:.2}s (metric {:.3})",
            event.expression,
            event.at.as_secs_f64(),
            event.raw_metric
        );
    }

    fn held(&mut self, change: &HoldChange) {
        if change.held {
            *self.holds.entry(change.expression.clone()).or_default() += 1;
        }
        log::debug!(
            "{} {} at {:.2}s",
            change.expression,
            if change.held { "held" } else { "released" },
            change.at.as_secs_f64()
        );
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
