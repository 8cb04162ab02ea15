//! A thread-coordinated player-state machine: an application-facing facade
//! backed by a dedicated internal dispatcher thread, tracking a mutable
//! playlist of lazily-prepared media sources against a single authoritative
//! playback position/state snapshot (§1-§2).
//!
//! The coordinator depends only on small capability traits for the parts it
//! does not implement itself — demuxing/decoding, track selection,
//! bandwidth estimation, buffering policy (§6). Callers supply their own
//! implementations; this crate owns only the state machine, playlist/
//! timeline bookkeeping, listener dispatch, and player-message routing.

pub mod capabilities;
pub mod error;
pub mod listener;
pub mod message;
pub mod playback_info;
pub mod player;
pub mod playlist;
pub mod state;
pub mod timeline;

mod internal;

#[cfg(test)]
mod test_support;

pub use error::PlayerError;
pub use player::Player;
