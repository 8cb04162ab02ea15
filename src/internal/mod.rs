//! The internal playback dispatcher: a dedicated thread owning playlist,
//! shuffle order, and playback-state mutation, reachable from the facade
//! only through [`commands::Command`]/[`commands::Update`] (§4.2).

mod commands;
mod dispatcher;
mod state;
mod thread;

pub(crate) use commands::{Command, InternalEvent, OpId, Update};
pub(crate) use state::DispatcherDeps;
pub(crate) use thread::InternalThread;
