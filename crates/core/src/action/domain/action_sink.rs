use crate::trigger::domain::hold_tracker::HoldChange;
use crate::trigger::domain::trigger_engine::FireEvent;

/// Receives fire events and hold changes from the frame loop.
///
/// This is a port: the loop does not know whether actions run inline or on
/// a background worker. Both calls must return promptly and must not fail;
/// action errors are logged by the implementation.
pub trait ActionSink: Send {
    fn dispatch(&mut self, event: &FireEvent);

    fn hold(&mut self, change: &HoldChange);

    /// Stops any in-flight playback and releases executor resources.
    fn shutdown(&mut self);
}
