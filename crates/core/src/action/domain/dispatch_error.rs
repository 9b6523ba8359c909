use std::path::PathBuf;

use thiserror::Error;

/// Failures while carrying out a configured action.
///
/// None of these are fatal: the dispatcher logs them and the frame loop
/// keeps running.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("media file not found: {0}")]
    MissingMedia(PathBuf),
    #[error("no audio player available (tried {tried})")]
    NoAudioPlayer { tried: String },
    #[error("failed to start {program} for {path}: {source}")]
    PlaybackStart {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to {action} {program}: {reason}")]
    PlaybackControl {
        program: String,
        action: &'static str,
        reason: String,
    },
    #[error("failed to open {url} in browser: {source}")]
    BrowserLaunch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
