use std::path::Path;

use crate::action::domain::dispatch_error::DispatchError;

/// Opens a URL in an external application, best-effort.
pub trait UrlOpener: Send {
    fn open_url(&mut self, url: &str) -> Result<(), DispatchError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Play the file once.
    Once,
    /// Repeat the file until stopped, where the player supports it.
    Loop,
}

/// Starts playback of a local audio file.
pub trait AudioPlayer: Send {
    fn play(
        &mut self,
        path: &Path,
        mode: PlaybackMode,
    ) -> Result<Box<dyn PlaybackHandle>, DispatchError>;
}

/// A playback started by an [`AudioPlayer`].
pub trait PlaybackHandle: Send {
    /// Stops playback. Calling it on a finished playback is a no-op.
    fn stop(&mut self);

    /// Suspends playback so that `resume` continues from the same position.
    fn pause(&mut self) -> Result<(), DispatchError>;

    fn resume(&mut self) -> Result<(), DispatchError>;

    /// True until the playback finishes or is stopped. A paused playback
    /// is still playing.
    fn is_playing(&mut self) -> bool;

    fn is_paused(&self) -> bool;
}
