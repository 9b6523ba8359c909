use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::action::domain::action_sink::ActionSink;
use crate::trigger::domain::hold_tracker::HoldChange;
use crate::trigger::domain::trigger_engine::FireEvent;

enum DispatchCommand {
    Fire(FireEvent),
    Hold(HoldChange),
    Shutdown,
}

/// Runs another sink on a dedicated worker thread.
///
/// `dispatch` only enqueues the event, so browser launches and player
/// start-up never stall the frame loop. Events are handled in order. The
/// wrapped sink, and any playback it owns, lives on the worker.
pub struct BackgroundDispatcher {
    tx: Option<Sender<DispatchCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundDispatcher {
    pub fn spawn(mut inner: Box<dyn ActionSink>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<DispatchCommand>();

        let handle = thread::Builder::new()
            .name("action-dispatch".into())
            .spawn(move || {
                for command in rx {
                    match command {
                        DispatchCommand::Fire(event) => inner.dispatch(&event),
                        DispatchCommand::Hold(change) => inner.hold(&change),
                        DispatchCommand::Shutdown => break,
                    }
                }
                inner.shutdown();
            });

        match handle {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                log::error!("Failed to start action worker, actions are disabled: {e}");
                Self {
                    tx: None,
                    handle: None,
                }
            }
        }
    }

    fn send(&self, command: DispatchCommand, expression: &str) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(command).is_err() {
            log::warn!("Action worker has stopped; dropping '{expression}'");
        }
    }
}

impl ActionSink for BackgroundDispatcher {
    fn dispatch(&mut self, event: &FireEvent) {
        self.send(DispatchCommand::Fire(event.clone()), &event.expression);
    }

    fn hold(&mut self, change: &HoldChange) {
        self.send(DispatchCommand::Hold(change.clone()), &change.expression);
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(DispatchCommand::Shutdown);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Action worker panicked");
            }
        }
    }
}

impl Drop for BackgroundDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
