//! `MediaSourceHolder`: a playlist entry owning one `MediaSource`.

use std::sync::Arc;

use crate::capabilities::MediaSource;
use crate::timeline::Timeline;

/// Owns one `MediaSource` plus a bit indicating whether it has been lazily
/// prepared. A holder's identity (`uid`) is stable across position in the
/// playlist; reordering moves holders, it does not recreate them (§3).
#[derive(Clone)]
pub struct MediaSourceHolder {
    pub(crate) uid: u64,
    pub(crate) source: Arc<dyn MediaSource>,
    pub(crate) is_prepared: bool,
    /// Last real timeline reported by this holder's source, if any.
    pub(crate) timeline: Option<Timeline>,
}

impl MediaSourceHolder {
    pub fn new(uid: u64, source: Arc<dyn MediaSource>) -> Self {
        Self { uid, source, is_prepared: false, timeline: None }
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn source(&self) -> &Arc<dyn MediaSource> {
        &self.source
    }

    pub fn is_prepared(&self) -> bool {
        self.is_prepared
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub(crate) fn mark_prepared(&mut self, timeline: Timeline) {
        self.is_prepared = true;
        self.timeline = Some(timeline);
    }
}

impl std::fmt::Debug for MediaSourceHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSourceHolder")
            .field("uid", &self.uid)
            .field("is_prepared", &self.is_prepared)
            .finish()
    }
}
