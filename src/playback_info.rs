//! `PlaybackInfo`: the authoritative playback snapshot produced by the
//! internal dispatcher (§3). Immutable; every change produces a fresh value.

use serde::{Deserialize, Serialize};

use crate::capabilities::{TrackGroupArray, TrackSelectorResult};
use crate::error::PlayerError;
use crate::state::PlaybackState;
use crate::timeline::{MediaPeriodId, PeriodUid, Timeline};

/// Snapshot produced by the internal dispatcher and consumed by the facade.
/// `PlayerError` does not derive `Serialize`/`Deserialize` (it wraps
/// arbitrary `String` causes, which is fine for `Display`/`Debug` but not
/// worth round-tripping); the snapshot carries only its rendered message for
/// serialization purposes via [`PlaybackInfo::error_message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackInfo {
    pub timeline: Timeline,
    pub media_period_id: MediaPeriodId,
    pub position_us: i64,
    pub content_position_us: i64,
    pub playback_state: PlaybackState,
    #[serde(skip)]
    pub playback_error: Option<PlayerError>,
    pub is_loading: bool,
    pub track_groups: TrackGroupArray,
    pub track_selector_result: TrackSelectorResult,
    pub loading_media_period_id: MediaPeriodId,
    pub buffered_position_us: i64,
    pub total_buffered_duration_us: i64,
}

impl PlaybackInfo {
    /// The dummy snapshot a [`crate::player::Player`] is constructed with,
    /// before the internal dispatcher has produced anything real.
    pub fn dummy() -> Self {
        let period_id = MediaPeriodId {
            period_uid: PeriodUid { holder_uid: 0, period_index_in_holder: 0 },
            window_sequence_number: 0,
            ad_group_index: None,
            ad_index_in_ad_group: None,
        };
        Self {
            timeline: Timeline::EMPTY,
            media_period_id: period_id.clone(),
            position_us: 0,
            content_position_us: 0,
            playback_state: PlaybackState::Idle,
            playback_error: None,
            is_loading: false,
            track_groups: TrackGroupArray::EMPTY,
            track_selector_result: TrackSelectorResult::NONE,
            loading_media_period_id: period_id,
            buffered_position_us: 0,
            total_buffered_duration_us: 0,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.playback_error.as_ref().map(|e| e.to_string())
    }
}
