//! Listener dispatch (§4.4).

mod dispatcher;
mod events;

pub use dispatcher::ListenerDispatcher;
pub use events::{PlayerEvent, PlayerListener};
