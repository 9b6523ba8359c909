use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::action::domain::action_sink::ActionSink;
use crate::expression::domain::expression_classifier::ExpressionClassifier;
use crate::landmarks::domain::capture_error::CaptureError;
use crate::landmarks::domain::landmark_source::{LandmarkSource, SourceEvent};
use crate::pipeline::session_logger::SessionLogger;
use crate::shared::landmark_frame::LandmarkFrame;
use crate::trigger::domain::hold_tracker::HoldTracker;
use crate::trigger::domain::trigger_engine::{FireEvent, TriggerEngine};

/// Time base of a session, chosen by its first face frame.
#[derive(Clone, Copy, Debug)]
enum SessionClock {
    /// Frame timestamps. A later frame without one reuses the last stream time.
    Stream,
    /// Wall time since the first face frame. Later timestamps are ignored.
    Wall(Instant),
}

/// The frame loop: source → classifier → trigger engine → action sink.
///
/// Runs until the source reports `Quit`, the cancellation flag is set, or
/// the source fails. The sink is shut down on every exit path so in-flight
/// playback never outlives the session.
///
/// Expressions followed by the hold tracker bypass the trigger engine and
/// reach the sink as hold changes instead of fire events.
///
/// The first face frame fixes the clock: stream time if it carries a
/// timestamp, wall time otherwise. Mixing the two would make cooldowns
/// compare unrelated instants.
pub struct ExpressionTriggerUseCase {
    source: Box<dyn LandmarkSource>,
    classifier: Box<dyn ExpressionClassifier>,
    engine: TriggerEngine,
    holds: Option<HoldTracker>,
    sink: Box<dyn ActionSink>,
    logger: Box<dyn SessionLogger>,
    cancelled: Arc<AtomicBool>,
    clock: Option<SessionClock>,
    last_now: Duration,
}

impl ExpressionTriggerUseCase {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        classifier: Box<dyn ExpressionClassifier>,
        engine: TriggerEngine,
        sink: Box<dyn ActionSink>,
        logger: Box<dyn SessionLogger>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            classifier,
            engine,
            holds: None,
            sink,
            logger,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            clock: None,
            last_now: Duration::ZERO,
        }
    }

    /// Routes the tracker's expressions to hold changes. An empty tracker
    /// is dropped.
    pub fn with_hold_tracker(mut self, holds: HoldTracker) -> Self {
        self.holds = (!holds.is_empty()).then_some(holds);
        self
    }

    pub fn run(&mut self) -> Result<(), CaptureError> {
        log::info!(
            "Watching for expressions ({:.1}s cooldown)",
            self.engine.cooldown().as_secs_f64()
        );
        let result = self.run_loop();

        self.sink.shutdown();
        self.logger.summary();
        result
    }

    fn run_loop(&mut self) -> Result<(), CaptureError> {
        while !self.cancelled.load(Ordering::Relaxed) {
            match self.source.next_frame()? {
                SourceEvent::Quit => {
                    log::info!("Landmark stream ended");
                    break;
                }
                SourceEvent::NoFace => self.logger.frame(false),
                SourceEvent::Face(frame) => {
                    self.logger.frame(true);
                    let now = self.frame_time(&frame);
                    self.process_frame(&frame, now);
                }
            }
        }
        Ok(())
    }

    fn frame_time(&mut self, frame: &LandmarkFrame) -> Duration {
        let clock = *self.clock.get_or_insert_with(|| match frame.timestamp() {
            Some(_) => {
                log::debug!("Using stream timestamps");
                SessionClock::Stream
            }
            None => {
                log::debug!("Frames carry no timestamp; using wall time");
                SessionClock::Wall(Instant::now())
            }
        });

        let now = match clock {
            SessionClock::Stream => frame.timestamp().unwrap_or(self.last_now),
            SessionClock::Wall(origin) => origin.elapsed(),
        };
        self.last_now = now;
        now
    }

    /// Classifies one frame, forwards hold changes, dispatches every
    /// expression that fires, and returns the fire events.
    pub fn process_frame(&mut self, frame: &LandmarkFrame, now: Duration) -> Vec<FireEvent> {
        let signals = self.classifier.classify(frame);

        let mut triggered = Vec::with_capacity(signals.len());
        for signal in signals {
            match self.holds.as_mut() {
                Some(holds) if holds.tracks(&signal.name) => {
                    if let Some(change) = holds.observe(&signal, now) {
                        self.logger.held(&change);
                        self.sink.hold(&change);
                    }
                }
                _ => triggered.push(signal),
            }
        }

        let fired = self.engine.process(&triggered, now);
        for event in &fired {
            self.logger.fired(event);
            self.sink.dispatch(event);
        }
        fired
    }

    pub fn engine(&self) -> &TriggerEngine {
        &self.engine
    }
}
