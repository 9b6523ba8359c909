//! Executors that log what they would do instead of doing it.

use std::path::Path;

use crate::action::domain::dispatch_error::DispatchError;
use crate::action::domain::media_executor::{
    AudioPlayer, PlaybackHandle, PlaybackMode, UrlOpener,
};

pub struct DryRunUrlOpener;

impl UrlOpener for DryRunUrlOpener {
    fn open_url(&mut self, url: &str) -> Result<(), DispatchError> {
        log::info!("[dry run] would open {url}");
        Ok(())
    }
}

/// Still checks that the media file exists, so configuration mistakes
/// surface the same way they would for real playback.
pub struct DryRunAudioPlayer;

impl AudioPlayer for DryRunAudioPlayer {
    fn play(
        &mut self,
        path: &Path,
        mode: PlaybackMode,
    ) -> Result<Box<dyn PlaybackHandle>, DispatchError> {
        if !path.is_file() {
            return Err(DispatchError::MissingMedia(path.to_path_buf()));
        }
        match mode {
            PlaybackMode::Once => log::info!("[dry run] would play {}", path.display()),
            PlaybackMode::Loop => log::info!("[dry run] would loop {}", path.display()),
        }
        Ok(Box::new(DryRunPlayback {
            playing: true,
            paused: false,
        }))
    }
}

pub struct DryRunPlayback {
    playing: bool,
    paused: bool,
}

impl PlaybackHandle for DryRunPlayback {
    fn stop(&mut self) {
        if self.playing {
            log::info!("[dry run] would stop playback");
            self.playing = false;
            self.paused = false;
        }
    }

    fn pause(&mut self) -> Result<(), DispatchError> {
        if self.playing && !self.paused {
            log::info!("[dry run] would pause playback");
            self.paused = true;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), DispatchError> {
        if self.paused {
            log::info!("[dry run] would resume playback");
            self.paused = false;
        }
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        self.playing
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
