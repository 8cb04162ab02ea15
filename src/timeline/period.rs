//! Period identity and attributes.

use serde::{Deserialize, Serialize};

/// Stable opaque identity for a period within a timeline.
///
/// Scoped to the [`crate::playlist::MediaSourceHolder`] that produced it (by
/// holder uid) plus the period's index within that holder's own timeline, so
/// the uid survives playlist reordering (the holder moves, it is never
/// recreated) but is never reused across distinct holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodUid {
    pub holder_uid: u64,
    pub period_index_in_holder: usize,
}

/// Ad-break playback state attached to a period, when applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdPlaybackState {
    pub ad_group_count: u32,
    pub played_ad_groups: Vec<u32>,
}

impl AdPlaybackState {
    pub const NONE: AdPlaybackState = AdPlaybackState { ad_group_count: 0, played_ad_groups: Vec::new() };
}

/// A contiguous media region with a stable identity; the unit of scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub uid: PeriodUid,
    /// Duration in microseconds, or `None` if not yet known (`UNSET`).
    pub duration_us: Option<i64>,
    /// Offset of this period's start within its window, in microseconds.
    pub position_in_window_us: i64,
    pub ad_playback_state: Option<AdPlaybackState>,
}

impl Period {
    /// Equality used for timeline-identity comparisons: everything except
    /// the uid, which distinguishes "same content, different instance" from
    /// "same timeline" (§3).
    pub fn same_content(&self, other: &Period) -> bool {
        self.duration_us == other.duration_us
            && self.position_in_window_us == other.position_in_window_us
            && self.ad_playback_state == other.ad_playback_state
    }
}
