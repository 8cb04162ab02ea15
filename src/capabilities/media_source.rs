//! The `MediaSource` capability (§6): the only way the coordinator learns
//! about a playlist item's real timeline. Concrete media-source types
//! (DASH/HLS/SS/progressive/RTSP) are out of scope; callers hand in their own
//! implementation.

use std::sync::Arc;

use crate::error::PlayerError;
use crate::timeline::{MediaPeriodId, Timeline};

/// A playable source. Produces `Timeline` updates asynchronously via the
/// [`MediaSourceListener`] handed to [`MediaSource::prepare`].
pub trait MediaSource: Send + Sync {
    /// Begin preparing this source. The source must eventually call
    /// [`MediaSourceListener::on_source_info_refreshed`] at least once (it
    /// may call it repeatedly for dynamic/live content).
    fn prepare(&self, listener: Arc<dyn MediaSourceListener>);

    /// Surface any deferred preparation error without blocking.
    fn maybe_throw_source_error(&self) -> Result<(), PlayerError>;

    /// Instantiate the period identified by `id` for reading.
    fn create_period(&self, id: &MediaPeriodId);

    /// Release resources associated with a previously created period.
    fn release_period(&self, id: &MediaPeriodId);

    /// Release all resources held by this source.
    fn release(&self);
}

/// Callback surface a `MediaSource` uses to report its timeline.
pub trait MediaSourceListener: Send + Sync {
    fn on_source_info_refreshed(&self, timeline: Timeline);
}
