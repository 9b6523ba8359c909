use std::io::ErrorKind;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::action::domain::dispatch_error::DispatchError;
use crate::action::domain::media_executor::{AudioPlayer, PlaybackHandle, PlaybackMode};
use crate::shared::constants::AUDIO_PLAYERS;

/// A command-line player: program, leading arguments, and the extra
/// arguments that make it repeat the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerCandidate {
    command: Vec<String>,
    loop_args: Vec<String>,
}

impl PlayerCandidate {
    pub fn new<S: AsRef<str>>(command: &[S]) -> Self {
        Self {
            command: command.iter().map(|s| s.as_ref().to_string()).collect(),
            loop_args: Vec::new(),
        }
    }

    pub fn looping<S: AsRef<str>>(mut self, loop_args: &[S]) -> Self {
        self.loop_args = loop_args.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn can_loop(&self) -> bool {
        !self.loop_args.is_empty()
    }

    /// Arguments after the program name, media path last.
    fn args(&self, path: &Path, mode: PlaybackMode) -> Vec<String> {
        let mut args: Vec<String> = self.command.iter().skip(1).cloned().collect();
        if mode == PlaybackMode::Loop {
            args.extend(self.loop_args.iter().cloned());
        }
        args.push(path.display().to_string());
        args
    }
}

/// Plays audio by spawning the first command-line player that exists.
///
/// A candidate that is not installed is skipped; any other spawn failure is
/// reported. Looped playback on a player without a loop flag plays once.
pub struct ProcessAudioPlayer {
    candidates: Vec<PlayerCandidate>,
}

impl ProcessAudioPlayer {
    pub fn new() -> Self {
        Self::with_candidates(
            AUDIO_PLAYERS
                .iter()
                .map(|p| {
                    let mut command = vec![p.program];
                    command.extend_from_slice(p.args);
                    PlayerCandidate::new(&command[..]).looping(p.loop_args)
                })
                .collect(),
        )
    }

    pub fn with_candidates(candidates: Vec<PlayerCandidate>) -> Self {
        Self {
            candidates: candidates
                .into_iter()
                .filter(|c| !c.program().is_empty())
                .collect(),
        }
    }

    fn tried(&self) -> String {
        self.candidates
            .iter()
            .map(PlayerCandidate::program)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ProcessAudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for ProcessAudioPlayer {
    fn play(
        &mut self,
        path: &Path,
        mode: PlaybackMode,
    ) -> Result<Box<dyn PlaybackHandle>, DispatchError> {
        if !path.is_file() {
            return Err(DispatchError::MissingMedia(path.to_path_buf()));
        }

        for candidate in &self.candidates {
            let program = candidate.program();
            let spawned = Command::new(program)
                .args(candidate.args(path, mode))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(child) => {
                    if mode == PlaybackMode::Loop && !candidate.can_loop() {
                        log::debug!("{program} cannot loop; playing once");
                    }
                    log::info!("Playing {} with {program}", path.display());
                    return Ok(Box::new(ChildPlayback {
                        child,
                        program: program.to_string(),
                        paused: false,
                    }));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("{program} not available");
                }
                Err(source) => {
                    return Err(DispatchError::PlaybackStart {
                        program: program.to_string(),
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        Err(DispatchError::NoAudioPlayer {
            tried: self.tried(),
        })
    }
}

/// A running player process. Killed on `stop` or drop.
///
/// Pausing suspends the process with SIGSTOP and resuming continues it with
/// SIGCONT, both sent through the system `kill` command.
pub struct ChildPlayback {
    child: Child,
    program: String,
    paused: bool,
}

impl ChildPlayback {
    #[cfg(unix)]
    fn signal(&self, signal: &str, action: &'static str) -> Result<(), DispatchError> {
        let status = Command::new("kill")
            .arg(signal)
            .arg(self.child.id().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.control_error(action, e.to_string()))?;
        if !status.success() {
            return Err(self.control_error(action, format!("kill exited with {status}")));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn signal(&self, _signal: &str, action: &'static str) -> Result<(), DispatchError> {
        Err(self.control_error(action, "not supported on this platform".to_string()))
    }

    fn control_error(&self, action: &'static str, reason: String) -> DispatchError {
        DispatchError::PlaybackControl {
            program: self.program.clone(),
            action,
            reason,
        }
    }
}

impl PlaybackHandle for ChildPlayback {
    fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        // SIGKILL also ends a suspended process
        if let Err(e) = self.child.kill() {
            log::warn!("Failed to stop {}: {e}", self.program);
            return;
        }
        // Reap so the process does not linger as a zombie
        let _ = self.child.wait();
        self.paused = false;
        log::debug!("Stopped {}", self.program);
    }

    fn pause(&mut self) -> Result<(), DispatchError> {
        if self.paused || !self.is_playing() {
            return Ok(());
        }
        self.signal("-STOP", "pause")?;
        self.paused = true;
        log::debug!("Paused {}", self.program);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), DispatchError> {
        if !self.paused {
            return Ok(());
        }
        self.signal("-CONT", "resume")?;
        self.paused = false;
        log::debug!("Resumed {}", self.program);
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Drop for ChildPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}
