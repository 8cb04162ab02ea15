//! Internal dispatcher thread spawn/join, grounded on the teacher's
//! `runtime/thread.rs` handle-owning wrapper.

use std::sync::mpsc;
use std::thread::JoinHandle;

use super::commands::{Command, InternalEvent, Update};
use super::dispatcher::{run_loop, DispatcherDeps};

pub(crate) struct InternalThread {
    sender: mpsc::Sender<InternalEvent>,
    pub(crate) updates: mpsc::Receiver<Update>,
    handle: Option<JoinHandle<()>>,
}

impl InternalThread {
    pub(crate) fn spawn(deps: DispatcherDeps) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (update_tx, update_rx) = mpsc::channel();
        let tick = deps.config.dispatcher_tick;
        let source_event_sender = command_tx.clone();

        let handle = std::thread::Builder::new()
            .name("player-internal".into())
            .spawn(move || run_loop(deps, source_event_sender, command_rx, update_tx, tick))
            .expect("failed to spawn internal playback thread");

        Self { sender: command_tx, updates: update_rx, handle: Some(handle) }
    }

    pub(crate) fn send(&self, command: Command) {
        let _ = self.sender.send(InternalEvent::Command(command));
    }
}

impl Drop for InternalThread {
    fn drop(&mut self) {
        let _ = self.sender.send(InternalEvent::Command(Command::Release));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
