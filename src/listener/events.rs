//! Listener surface and the sub-event ordering within one `PlaybackInfo`
//! update (§4.4, §6).

use crate::capabilities::{TrackGroupArray, TrackSelectorResult};
use crate::error::PlayerError;
use crate::state::{DiscontinuityReason, PlaybackState, TimelineChangeReason};
use crate::timeline::Timeline;

/// One listener sub-event, in the fixed dispatch order of §4.4 item 2.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    TimelineChanged(Timeline, TimelineChangeReason),
    PositionDiscontinuity(DiscontinuityReason),
    PlayerError(PlayerError),
    TracksChanged(TrackGroupArray, TrackSelectorResult),
    LoadingChanged(bool),
    PlayerStateChanged { play_when_ready: bool, state: PlaybackState },
    IsPlayingChanged(bool),
    SeekProcessed,
}

/// Listener callbacks, one per [`PlayerEvent`] variant. All methods have a
/// no-op default so implementors only override what they observe (mirrors
/// the teacher's `Renderer`-style capability traits with default bodies
/// where a no-op is a valid implementation).
pub trait PlayerListener: Send + Sync {
    fn on_timeline_changed(&self, _timeline: &Timeline, _reason: TimelineChangeReason) {}
    fn on_position_discontinuity(&self, _reason: DiscontinuityReason) {}
    fn on_player_error(&self, _error: &PlayerError) {}
    fn on_tracks_changed(&self, _groups: &TrackGroupArray, _selections: &TrackSelectorResult) {}
    fn on_loading_changed(&self, _is_loading: bool) {}
    fn on_player_state_changed(&self, _play_when_ready: bool, _state: PlaybackState) {}
    fn on_is_playing_changed(&self, _is_playing: bool) {}
    fn on_seek_processed(&self) {}
}

pub(crate) fn dispatch_to(listener: &dyn PlayerListener, event: &PlayerEvent) {
    match event {
        PlayerEvent::TimelineChanged(timeline, reason) => listener.on_timeline_changed(timeline, *reason),
        PlayerEvent::PositionDiscontinuity(reason) => listener.on_position_discontinuity(*reason),
        PlayerEvent::PlayerError(error) => listener.on_player_error(error),
        PlayerEvent::TracksChanged(groups, selections) => listener.on_tracks_changed(groups, selections),
        PlayerEvent::LoadingChanged(is_loading) => listener.on_loading_changed(*is_loading),
        PlayerEvent::PlayerStateChanged { play_when_ready, state } => {
            listener.on_player_state_changed(*play_when_ready, *state)
        }
        PlayerEvent::IsPlayingChanged(is_playing) => listener.on_is_playing_changed(*is_playing),
        PlayerEvent::SeekProcessed => listener.on_seek_processed(),
    }
}
