//! Playback state machine and small playback-configuration value types.

use serde::{Deserialize, Serialize};

/// The four states of the player-state machine (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Repeat-mode applied when advancing past a window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    Off,
    One,
    All,
}

/// Playback speed/pitch, applied by the internal dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParameters {
    pub speed: f32,
    pub pitch: f32,
}

impl Default for PlaybackParameters {
    fn default() -> Self {
        Self { speed: 1.0, pitch: 1.0 }
    }
}

/// Tolerance window the internal engine may use when resolving a seek to a
/// nearby sync point instead of the exact requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekParameters {
    pub tolerance_before_us: i64,
    pub tolerance_after_us: i64,
}

impl SeekParameters {
    pub const EXACT: SeekParameters = SeekParameters { tolerance_before_us: 0, tolerance_after_us: 0 };
}

impl Default for SeekParameters {
    fn default() -> Self {
        Self::EXACT
    }
}

/// Construction-time configuration for [`crate::player::Player`].
///
/// Grounded on `PlaybackBufferSettings` (`playback/engine/state.rs` in the
/// teacher): a plain `Default`-able settings struct threaded through at
/// construction and read by both threads.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub initial_repeat_mode: RepeatMode,
    pub initial_shuffle_mode: bool,
    pub initial_playback_parameters: PlaybackParameters,
    pub initial_seek_parameters: SeekParameters,
    pub foreground_mode: bool,
    /// Poll interval used by the internal dispatcher's run loop (§4.2.1).
    pub dispatcher_tick: std::time::Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_repeat_mode: RepeatMode::Off,
            initial_shuffle_mode: false,
            initial_playback_parameters: PlaybackParameters::default(),
            initial_seek_parameters: SeekParameters::default(),
            foreground_mode: true,
            dispatcher_tick: std::time::Duration::from_millis(20),
        }
    }
}

/// Reason reported alongside a `onTimelineChanged` listener callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineChangeReason {
    PlaylistChanged,
    SourceUpdate,
}

/// Reason reported alongside a `onPositionDiscontinuity` listener callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscontinuityReason {
    PeriodTransition,
    Seek,
    SeekAdjustment,
    AdInsertion,
    Internal,
}
