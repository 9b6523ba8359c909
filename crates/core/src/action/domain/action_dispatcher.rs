use std::path::Path;

use crate::action::domain::action_descriptor::{ActionKind, ActionTable};
use crate::action::domain::action_sink::ActionSink;
use crate::action::domain::dispatch_error::DispatchError;
use crate::action::domain::media_executor::{
    AudioPlayer, PlaybackHandle, PlaybackMode, UrlOpener,
};
use crate::trigger::domain::hold_tracker::HoldChange;
use crate::trigger::domain::trigger_engine::FireEvent;

/// What a dispatch actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    OpenedUrl,
    StartedPlayback,
    Paused,
    Resumed,
    /// The expression has no action for this kind of event.
    Inert,
}

struct ActivePlayback {
    expression: String,
    handle: Box<dyn PlaybackHandle>,
}

/// Runs the configured action for each fired or held expression.
///
/// At most one local playback is alive. A new playback replaces the
/// current one, which is stopped only after the new one has started, so a
/// misconfigured file never interrupts what is already playing.
///
/// `hold_local` playback loops while its expression is held. Releasing the
/// expression pauses it, and holding it again resumes from the same spot
/// unless another playback replaced it in the meantime.
pub struct ActionDispatcher {
    actions: ActionTable,
    opener: Box<dyn UrlOpener>,
    player: Box<dyn AudioPlayer>,
    playback: Option<ActivePlayback>,
}

impl ActionDispatcher {
    pub fn new(
        actions: ActionTable,
        opener: Box<dyn UrlOpener>,
        player: Box<dyn AudioPlayer>,
    ) -> Self {
        Self {
            actions,
            opener,
            player,
            playback: None,
        }
    }

    pub fn try_dispatch(&mut self, event: &FireEvent) -> Result<DispatchOutcome, DispatchError> {
        let Some(kind) = self.actions.get(&event.expression).map(|d| d.kind.clone()) else {
            return Ok(DispatchOutcome::Inert);
        };

        match kind {
            ActionKind::PlayYoutube { url } => {
                self.opener.open_url(&url)?;
                Ok(DispatchOutcome::OpenedUrl)
            }
            ActionKind::PlayLocal { path } => {
                self.replace_playback(&event.expression, &path, PlaybackMode::Once)?;
                Ok(DispatchOutcome::StartedPlayback)
            }
            // Held actions follow hold changes, not fire events
            ActionKind::HoldLocal { .. } => Ok(DispatchOutcome::Inert),
        }
    }

    pub fn try_hold(&mut self, change: &HoldChange) -> Result<DispatchOutcome, DispatchError> {
        let path = match self.actions.get(&change.expression).map(|d| &d.kind) {
            Some(ActionKind::HoldLocal { path }) => path.clone(),
            _ => return Ok(DispatchOutcome::Inert),
        };

        let owned = self.owns_live_playback(&change.expression);
        match (change.held, owned) {
            (true, true) => {
                if let Some(playback) = self.playback.as_mut() {
                    playback.handle.resume()?;
                }
                Ok(DispatchOutcome::Resumed)
            }
            (true, false) => {
                self.replace_playback(&change.expression, &path, PlaybackMode::Loop)?;
                Ok(DispatchOutcome::StartedPlayback)
            }
            (false, true) => {
                let paused = match self.playback.as_mut() {
                    Some(playback) => playback.handle.pause(),
                    None => Ok(()),
                };
                if let Err(e) = paused {
                    // Never leave held music running after release
                    self.stop_playback();
                    return Err(e);
                }
                Ok(DispatchOutcome::Paused)
            }
            (false, false) => Ok(DispatchOutcome::Inert),
        }
    }

    pub fn is_playing(&mut self) -> bool {
        self.playback
            .as_mut()
            .is_some_and(|p| p.handle.is_playing())
    }

    pub fn is_paused(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| p.handle.is_paused())
    }

    pub fn stop_playback(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            playback.handle.stop();
        }
    }

    fn replace_playback(
        &mut self,
        expression: &str,
        path: &Path,
        mode: PlaybackMode,
    ) -> Result<(), DispatchError> {
        let handle = self.player.play(path, mode)?;
        self.stop_playback();
        self.playback = Some(ActivePlayback {
            expression: expression.to_string(),
            handle,
        });
        Ok(())
    }

    fn owns_live_playback(&mut self, expression: &str) -> bool {
        self.playback
            .as_mut()
            .is_some_and(|p| p.expression == expression && p.handle.is_playing())
    }

    fn description(&self, expression: &str) -> String {
        self.actions
            .get(expression)
            .map(|d| d.description.clone())
            .unwrap_or_default()
    }
}

impl ActionSink for ActionDispatcher {
    fn dispatch(&mut self, event: &FireEvent) {
        let description = self.description(&event.expression);

        match self.try_dispatch(event) {
            Ok(DispatchOutcome::Inert) => {
                log::debug!("No fire action configured for '{}'", event.expression);
            }
            Ok(_) => {
                log::info!("Triggered: {} -> {description}", event.expression);
            }
            Err(e) => {
                log::warn!("Action for '{}' failed: {e}", event.expression);
            }
        }
    }

    fn hold(&mut self, change: &HoldChange) {
        let description = self.description(&change.expression);

        match self.try_hold(change) {
            Ok(DispatchOutcome::Inert) => {
                log::debug!("No hold action configured for '{}'", change.expression);
            }
            Ok(DispatchOutcome::Paused) => {
                log::info!("Released: {} -> music paused", change.expression);
            }
            Ok(DispatchOutcome::Resumed) => {
                log::info!("Holding: {} -> music resumed", change.expression);
            }
            Ok(_) => {
                log::info!("Holding: {} -> {description}", change.expression);
            }
            Err(e) => {
                log::warn!("Hold action for '{}' failed: {e}", change.expression);
            }
        }
    }

    fn shutdown(&mut self) {
        self.stop_playback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::domain::action_descriptor::ActionDescriptor;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // ─── Fakes ───

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeOpener {
        log: Log,
        fail: bool,
    }

    impl UrlOpener for FakeOpener {
        fn open_url(&mut self, url: &str) -> Result<(), DispatchError> {
            self.log.lock().unwrap().push(format!("open {url}"));
            if self.fail {
                return Err(DispatchError::BrowserLaunch {
                    url: url.to_string(),
                    source: std::io::Error::other("no browser"),
                });
            }
            Ok(())
        }
    }

    struct FakePlayer {
        log: Log,
        can_pause: bool,
    }

    impl AudioPlayer for FakePlayer {
        fn play(
            &mut self,
            path: &Path,
            mode: PlaybackMode,
        ) -> Result<Box<dyn PlaybackHandle>, DispatchError> {
            if path.to_string_lossy().contains("missing") {
                return Err(DispatchError::MissingMedia(path.to_path_buf()));
            }
            let verb = match mode {
                PlaybackMode::Once => "play",
                PlaybackMode::Loop => "loop",
            };
            self.log
                .lock()
                .unwrap()
                .push(format!("{verb} {}", path.display()));
            Ok(Box::new(FakePlayback {
                name: path.display().to_string(),
                log: self.log.clone(),
                playing: true,
                paused: false,
                can_pause: self.can_pause,
            }))
        }
    }

    struct FakePlayback {
        name: String,
        log: Log,
        playing: bool,
        paused: bool,
        can_pause: bool,
    }

    impl FakePlayback {
        fn record(&self, entry: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{entry} {}", self.name));
        }
    }

    impl PlaybackHandle for FakePlayback {
        fn stop(&mut self) {
            if self.playing {
                self.playing = false;
                self.paused = false;
                self.record("stop");
            }
        }

        fn pause(&mut self) -> Result<(), DispatchError> {
            if !self.can_pause {
                return Err(DispatchError::PlaybackControl {
                    program: "fake".into(),
                    action: "pause",
                    reason: "unsupported".into(),
                });
            }
            self.paused = true;
            self.record("pause");
            Ok(())
        }

        fn resume(&mut self) -> Result<(), DispatchError> {
            self.paused = false;
            self.record("resume");
            Ok(())
        }

        fn is_playing(&mut self) -> bool {
            self.playing
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    fn table() -> ActionTable {
        ActionTable::new([
            ActionDescriptor {
                expression: "eyebrow_raise".into(),
                kind: ActionKind::PlayYoutube {
                    url: "https://youtu.be/x".into(),
                },
                description: "video".into(),
            },
            ActionDescriptor {
                expression: "wink".into(),
                kind: ActionKind::PlayLocal {
                    path: PathBuf::from("wink.mp3"),
                },
                description: "music".into(),
            },
            ActionDescriptor {
                expression: "blink".into(),
                kind: ActionKind::PlayLocal {
                    path: PathBuf::from("blink.mp3"),
                },
                description: "more music".into(),
            },
            ActionDescriptor {
                expression: "smile".into(),
                kind: ActionKind::HoldLocal {
                    path: PathBuf::from("smile.mp3"),
                },
                description: "music while smiling".into(),
            },
            ActionDescriptor {
                expression: "frown".into(),
                kind: ActionKind::PlayLocal {
                    path: PathBuf::from("missing.mp3"),
                },
                description: "broken".into(),
            },
        ])
    }

    fn dispatcher_with(fail_open: bool, can_pause: bool) -> (ActionDispatcher, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let d = ActionDispatcher::new(
            table(),
            Box::new(FakeOpener {
                log: log.clone(),
                fail: fail_open,
            }),
            Box::new(FakePlayer {
                log: log.clone(),
                can_pause,
            }),
        );
        (d, log)
    }

    fn dispatcher(fail_open: bool) -> (ActionDispatcher, Log) {
        dispatcher_with(fail_open, true)
    }

    fn fire(expression: &str) -> FireEvent {
        FireEvent {
            expression: expression.to_string(),
            at: Duration::ZERO,
            raw_metric: 0.0,
        }
    }

    fn hold(expression: &str, held: bool) -> HoldChange {
        HoldChange {
            expression: expression.to_string(),
            held,
            at: Duration::ZERO,
        }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    // ─── Fire events ───

    #[test]
    fn test_youtube_action_opens_url() {
        let (mut d, log) = dispatcher(false);
        let outcome = d.try_dispatch(&fire("eyebrow_raise")).unwrap();
        assert_eq!(outcome, DispatchOutcome::OpenedUrl);
        assert_eq!(entries(&log), vec!["open https://youtu.be/x"]);
    }

    #[test]
    fn test_local_action_starts_playback() {
        let (mut d, log) = dispatcher(false);
        let outcome = d.try_dispatch(&fire("wink")).unwrap();
        assert_eq!(outcome, DispatchOutcome::StartedPlayback);
        assert!(d.is_playing());
        assert_eq!(entries(&log), vec!["play wink.mp3"]);
    }

    #[test]
    fn test_new_local_playback_replaces_previous() {
        let (mut d, log) = dispatcher(false);
        d.try_dispatch(&fire("wink")).unwrap();
        d.try_dispatch(&fire("blink")).unwrap();
        d.try_dispatch(&fire("wink")).unwrap();
        assert_eq!(
            entries(&log),
            vec![
                "play wink.mp3",
                "play blink.mp3",
                "stop wink.mp3",
                "play wink.mp3",
                "stop blink.mp3",
            ]
        );
    }

    #[test]
    fn test_missing_media_keeps_current_playback() {
        let (mut d, log) = dispatcher(false);
        d.try_dispatch(&fire("wink")).unwrap();

        let err = d.try_dispatch(&fire("frown")).unwrap_err();

        assert!(matches!(err, DispatchError::MissingMedia(_)));
        assert!(d.is_playing());
        assert_eq!(entries(&log), vec!["play wink.mp3"]);
    }

    #[test]
    fn test_url_does_not_interrupt_playback() {
        let (mut d, _log) = dispatcher(false);
        d.try_dispatch(&fire("wink")).unwrap();
        d.try_dispatch(&fire("eyebrow_raise")).unwrap();
        assert!(d.is_playing());
    }

    #[test]
    fn test_unknown_expression_is_inert() {
        let (mut d, log) = dispatcher(false);
        let outcome = d.try_dispatch(&fire("tongue_out")).unwrap();
        assert_eq!(outcome, DispatchOutcome::Inert);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_fire_for_held_action_is_inert() {
        let (mut d, log) = dispatcher(false);
        assert_eq!(
            d.try_dispatch(&fire("smile")).unwrap(),
            DispatchOutcome::Inert
        );
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_missing_media_is_an_error_but_sink_survives() {
        let (mut d, _log) = dispatcher(false);
        let err = d.try_dispatch(&fire("frown")).unwrap_err();
        assert!(matches!(err, DispatchError::MissingMedia(_)));

        // Through the sink interface the error is only logged
        d.dispatch(&fire("frown"));
        d.dispatch(&fire("wink"));
        assert!(d.is_playing());
    }

    #[test]
    fn test_browser_failure_is_contained() {
        let (mut d, log) = dispatcher(true);
        assert!(d.try_dispatch(&fire("eyebrow_raise")).is_err());
        d.dispatch(&fire("eyebrow_raise"));
        assert_eq!(entries(&log).len(), 2);
    }

    // ─── Hold changes ───

    #[test]
    fn test_hold_loops_pauses_and_resumes() {
        let (mut d, log) = dispatcher(false);

        assert_eq!(
            d.try_hold(&hold("smile", true)).unwrap(),
            DispatchOutcome::StartedPlayback
        );
        assert_eq!(
            d.try_hold(&hold("smile", false)).unwrap(),
            DispatchOutcome::Paused
        );
        assert!(d.is_paused());
        assert!(d.is_playing());
        assert_eq!(
            d.try_hold(&hold("smile", true)).unwrap(),
            DispatchOutcome::Resumed
        );
        assert!(!d.is_paused());

        assert_eq!(
            entries(&log),
            vec!["loop smile.mp3", "pause smile.mp3", "resume smile.mp3"]
        );
    }

    #[test]
    fn test_release_without_playback_is_inert() {
        let (mut d, log) = dispatcher(false);
        assert_eq!(
            d.try_hold(&hold("smile", false)).unwrap(),
            DispatchOutcome::Inert
        );
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_hold_for_fire_action_is_inert() {
        let (mut d, log) = dispatcher(false);
        assert_eq!(
            d.try_hold(&hold("wink", true)).unwrap(),
            DispatchOutcome::Inert
        );
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_fire_playback_replaces_paused_hold() {
        let (mut d, log) = dispatcher(false);
        d.try_hold(&hold("smile", true)).unwrap();
        d.try_hold(&hold("smile", false)).unwrap();
        d.try_dispatch(&fire("wink")).unwrap();

        // Holding again starts over since the paused loop was replaced
        assert_eq!(
            d.try_hold(&hold("smile", true)).unwrap(),
            DispatchOutcome::StartedPlayback
        );
        assert_eq!(
            entries(&log),
            vec![
                "loop smile.mp3",
                "pause smile.mp3",
                "play wink.mp3",
                "stop smile.mp3",
                "loop smile.mp3",
                "stop wink.mp3",
            ]
        );
    }

    #[test]
    fn test_release_stops_when_pause_unsupported() {
        let (mut d, log) = dispatcher_with(false, false);
        d.try_hold(&hold("smile", true)).unwrap();

        assert!(d.try_hold(&hold("smile", false)).is_err());

        assert!(!d.is_playing());
        assert_eq!(entries(&log), vec!["loop smile.mp3", "stop smile.mp3"]);
    }

    #[test]
    fn test_hold_through_sink_interface() {
        let (mut d, log) = dispatcher(false);
        d.hold(&hold("smile", true));
        d.hold(&hold("smile", false));
        d.hold(&hold("frown", true));
        assert_eq!(entries(&log), vec!["loop smile.mp3", "pause smile.mp3"]);
    }

    // ─── Shutdown ───

    #[test]
    fn test_shutdown_stops_playback() {
        let (mut d, log) = dispatcher(false);
        d.dispatch(&fire("wink"));
        d.shutdown();
        assert!(!d.is_playing());
        assert_eq!(entries(&log), vec!["play wink.mp3", "stop wink.mp3"]);
    }

    #[test]
    fn test_shutdown_stops_paused_hold() {
        let (mut d, log) = dispatcher(false);
        d.hold(&hold("smile", true));
        d.hold(&hold("smile", false));
        d.shutdown();
        assert!(!d.is_playing());
        assert_eq!(entries(&log).last().unwrap(), "stop smile.mp3");
    }

    #[test]
    fn test_shutdown_without_playback_is_noop() {
        let (mut d, log) = dispatcher(false);
        d.shutdown();
        assert!(entries(&log).is_empty());
    }
}
