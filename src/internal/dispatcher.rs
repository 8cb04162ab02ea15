//! The internal dispatcher run loop (§4.2.1). Grounded on the teacher's
//! `runtime/worker.rs`: a single `recv_timeout` loop draining one channel,
//! generalized here to also carry `MediaSourceListener` refresh callbacks
//! instead of requiring a second channel.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

pub(crate) use super::state::DispatcherDeps;
use super::state::InternalState;

use super::commands::{InternalEvent, Update};

pub(crate) fn run_loop(
    deps: DispatcherDeps,
    event_sender: mpsc::Sender<InternalEvent>,
    receiver: mpsc::Receiver<InternalEvent>,
    updates: mpsc::Sender<Update>,
    tick: Duration,
) {
    let mut state = InternalState::new(deps, event_sender);

    loop {
        match receiver.recv_timeout(tick) {
            Ok(event) => {
                if let Some(update) = state.handle_event(event) {
                    if updates.send(update).is_err() {
                        break;
                    }
                }
                if state.released {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(update) = state.tick(tick) {
                    if updates.send(update).is_err() {
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("internal playback thread exiting");
}
