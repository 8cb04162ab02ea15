//! Error taxonomy for the player-state coordinator.

use std::fmt::{Display, Formatter};

/// Errors surfaced by the facade, either synchronously at the call boundary
/// or asynchronously through [`crate::playback_info::PlaybackInfo::playback_error`].
#[derive(Debug, Clone)]
pub enum PlayerError {
    /// A window/media-item index argument was out of range.
    InvalidIndex { index: usize, len: usize },
    /// A `seek_to` target window does not exist in the current timeline.
    IllegalSeekPosition { window_index: usize, window_count: usize },
    /// A half-open range argument (`from..to`) was malformed for the current playlist length.
    InvalidRange { from: usize, to: usize, len: usize },
    /// An error originating inside a `MediaSource` (network, parse, I/O).
    SourceError(String),
    /// A decoder init or runtime failure reported by a `Renderer`.
    RendererError(String),
    /// An invariant violation inside the internal dispatch loop.
    UnexpectedState(String),
    /// A facade operation was called after `release()`.
    Released,
}

impl Display for PlayerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndex { index, len } => {
                write!(f, "invalid index {} (len {})", index, len)
            }
            Self::IllegalSeekPosition { window_index, window_count } => write!(
                f,
                "illegal seek position: window {} (window count {})",
                window_index, window_count
            ),
            Self::InvalidRange { from, to, len } => {
                write!(f, "invalid range {}..{} (len {})", from, to, len)
            }
            Self::SourceError(msg) => write!(f, "source error: {}", msg),
            Self::RendererError(msg) => write!(f, "renderer error: {}", msg),
            Self::UnexpectedState(msg) => write!(f, "unexpected internal state: {}", msg),
            Self::Released => write!(f, "player has been released"),
        }
    }
}

impl std::error::Error for PlayerError {}
