//! Shared fakes for the scenario tests in this directory (§8). Richer than
//! `src/test_support.rs`'s unit-test fakes: these actually report timelines,
//! track groups, and end-of-stream so a [`playcore::Player`] can be driven
//! through real state transitions.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use playcore::capabilities::{
    MediaSource, MediaSourceListener, Renderer, RendererMessageType, TrackGroupArray, TrackSelector, TrackSelectorResult, TrackType,
};
use playcore::error::PlayerError;
use playcore::player::Player;
use playcore::state::PlaybackState;
use playcore::timeline::{MediaPeriodId, Period, PeriodUid, Timeline, Window};

/// A `MediaSource` with a fixed duration, reporting its single-period
/// timeline either synchronously or after a short delay (to exercise the
/// suppression protocol for a source replaced before it reports).
pub struct FakeMediaSource {
    duration_us: i64,
    delay: Option<Duration>,
    prepared: AtomicBool,
    /// Set once this source should start reporting an error from
    /// `maybe_throw_source_error` (§7's asynchronous error path).
    erroring: AtomicBool,
}

impl FakeMediaSource {
    pub fn new(duration_us: i64) -> Arc<Self> {
        Arc::new(Self { duration_us, delay: None, prepared: AtomicBool::new(false), erroring: AtomicBool::new(false) })
    }

    pub fn with_delay(duration_us: i64, delay: Duration) -> Arc<Self> {
        Arc::new(Self { duration_us, delay: Some(delay), prepared: AtomicBool::new(false), erroring: AtomicBool::new(false) })
    }

    /// Start failing `maybe_throw_source_error`, as if the source hit a
    /// runtime I/O error after having prepared successfully (§7).
    pub fn start_erroring(&self) {
        self.erroring.store(true, Ordering::SeqCst);
    }

    fn timeline(&self) -> Timeline {
        Timeline::new(
            vec![Window {
                is_seekable: true,
                is_dynamic: false,
                default_position_us: 0,
                duration_us: Some(self.duration_us),
                first_period_index: 0,
                last_period_index: 0,
                position_in_first_period_us: 0,
            }],
            vec![Period {
                uid: PeriodUid { holder_uid: 0, period_index_in_holder: 0 },
                duration_us: Some(self.duration_us),
                position_in_window_us: 0,
                ad_playback_state: None,
            }],
        )
    }
}

impl MediaSource for FakeMediaSource {
    fn prepare(&self, listener: Arc<dyn MediaSourceListener>) {
        self.prepared.store(true, Ordering::SeqCst);
        let timeline = self.timeline();
        match self.delay {
            Some(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    listener.on_source_info_refreshed(timeline);
                });
            }
            None => listener.on_source_info_refreshed(timeline),
        }
    }

    fn maybe_throw_source_error(&self) -> Result<(), PlayerError> {
        if self.erroring.load(Ordering::SeqCst) {
            Err(PlayerError::SourceError("fake source failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn create_period(&self, _id: &MediaPeriodId) {}

    fn release_period(&self, _id: &MediaPeriodId) {}

    fn release(&self) {}
}

/// A no-op renderer, recording every message it is handed.
pub struct FakeRenderer {
    track_type: TrackType,
    messages: Mutex<Vec<i32>>,
}

impl FakeRenderer {
    pub fn new(track_type: TrackType) -> Arc<Self> {
        Arc::new(Self { track_type, messages: Mutex::new(Vec::new()) })
    }
}

impl Renderer for FakeRenderer {
    fn track_type(&self) -> TrackType {
        self.track_type
    }

    fn supports_format(&self, _format: &str) -> bool {
        true
    }

    fn enable(&self) {}
    fn start(&self) {}
    fn stop(&self) {}
    fn disable(&self) {}
    fn reset_position(&self, _position_us: i64) {}

    fn is_ended(&self) -> bool {
        false
    }

    fn handle_message(&self, message_type: RendererMessageType, _payload: &(dyn Any + Send + Sync)) {
        if let RendererMessageType::Custom(code) = message_type {
            self.messages.lock().unwrap().push(code);
        }
    }
}

/// A `TrackSelector` that always selects nothing; tests only assert it was
/// invoked, not on its output shape.
#[derive(Default)]
pub struct FakeTrackSelector {
    pub invocations: std::sync::atomic::AtomicUsize,
}

impl TrackSelector for FakeTrackSelector {
    fn select_tracks(
        &self,
        _renderer_capabilities: &[TrackType],
        _track_groups: &TrackGroupArray,
        _period_id: &MediaPeriodId,
        _timeline: &Timeline,
    ) -> TrackSelectorResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        TrackSelectorResult::NONE
    }

    fn on_selection_activated(&self, _info: &TrackSelectorResult) {}
}

pub fn fake_track_selector() -> Arc<FakeTrackSelector> {
    Arc::new(FakeTrackSelector::default())
}

/// Poll `condition` until it is true or `timeout` elapses, in the style of
/// the teacher's `wait_for_audio_heard` (`playback/player/controls.rs`).
pub fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if condition() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_state(player: &Player, state: PlaybackState, timeout: Duration) -> bool {
    wait_until(|| player.playback_state() == state, timeout)
}
