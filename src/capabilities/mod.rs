//! External collaborator capabilities (§6). The coordinator depends only on
//! these small trait surfaces; concrete implementations (codecs, DRM,
//! bandwidth estimation, load control, data sources) are out of scope.

mod media_source;
mod renderer;
mod track_selector;

pub use media_source::{MediaSource, MediaSourceListener};
pub use renderer::{Renderer, RendererMessageType, TrackType};
pub use track_selector::{TrackGroup, TrackGroupArray, TrackInfo, TrackSelection, TrackSelector, TrackSelectorResult};

/// Opaque capability the dispatcher is constructed with but never calls into
/// directly; its behavior (load control policy) is out of scope (§6).
pub trait LoadControl: Send + Sync {}

/// Opaque capability, same treatment as [`LoadControl`] (§6).
pub trait BandwidthMeter: Send + Sync {}

/// Opaque capability, same treatment as [`LoadControl`] (§6).
pub trait Clock: Send + Sync {
    fn now_us(&self) -> i64;
}

/// A [`Clock`] backed by the system monotonic clock, used when the embedding
/// application does not supply one.
#[derive(Debug, Default)]
pub struct SystemClock {
    start: std::sync::OnceLock<std::time::Instant>,
}

impl Clock for SystemClock {
    fn now_us(&self) -> i64 {
        let start = self.start.get_or_init(std::time::Instant::now);
        start.elapsed().as_micros() as i64
    }
}
