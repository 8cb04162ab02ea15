//! [`Player`]: the application-facing facade (§4.1). Construction spawns the
//! internal dispatcher thread (§4.2); every mutating method forwards a
//! command to it and, where the operation has an externally visible effect,
//! predicts that effect synchronously via [`masking::FacadeState`] so the
//! very next getter call already reflects it.

mod controls;
mod masking;
mod messages;
mod playlist_ops;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use crate::capabilities::{BandwidthMeter, Clock, LoadControl, Renderer, SystemClock, TrackSelector};
use crate::error::PlayerError;
use crate::internal::{Command, DispatcherDeps, InternalThread, Update};
use crate::listener::{ListenerDispatcher, PlayerEvent, PlayerListener};
use crate::playback_info::PlaybackInfo;
use crate::playlist::HolderUidGenerator;
use crate::state::{PlayerConfig, TimelineChangeReason};
use crate::timeline::Timeline;

use masking::FacadeState;

pub struct Player {
    internal: InternalThread,
    listeners: ListenerDispatcher,
    state: Mutex<FacadeState>,
    uids: HolderUidGenerator,
    next_op_id: AtomicU64,
    next_message_sequence: AtomicU64,
    creation_thread: ThreadId,
    released: AtomicBool,
}

impl Player {
    /// Construct a player using the system monotonic clock and no
    /// `LoadControl`/`BandwidthMeter` (neither capability is consulted by
    /// the coordinator itself; see §6).
    pub fn new(config: PlayerConfig, track_selector: Arc<dyn TrackSelector>, renderers: Vec<Arc<dyn Renderer>>) -> Self {
        Self::with_capabilities(config, track_selector, renderers, Arc::new(SystemClock::default()), None, None)
    }

    pub fn with_capabilities(
        config: PlayerConfig,
        track_selector: Arc<dyn TrackSelector>,
        renderers: Vec<Arc<dyn Renderer>>,
        clock: Arc<dyn Clock>,
        load_control: Option<Arc<dyn LoadControl>>,
        bandwidth_meter: Option<Arc<dyn BandwidthMeter>>,
    ) -> Self {
        let uids = HolderUidGenerator::new();
        let mut state = FacadeState::new();
        state.repeat_mode = config.initial_repeat_mode;
        state.shuffle_mode_enabled = config.initial_shuffle_mode;

        let deps = DispatcherDeps { config, track_selector, renderers, uids: uids.clone(), clock, load_control, bandwidth_meter };
        let internal = InternalThread::spawn(deps);

        Self {
            internal,
            listeners: ListenerDispatcher::new(),
            state: Mutex::new(state),
            uids,
            next_op_id: AtomicU64::new(0),
            next_message_sequence: AtomicU64::new(0),
            creation_thread: std::thread::current().id(),
            released: AtomicBool::new(false),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn PlayerListener>) {
        self.listeners.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn PlayerListener>) {
        self.listeners.remove_listener(listener);
    }

    pub fn current_timeline(&self) -> Timeline {
        self.drain_updates();
        self.state.lock().unwrap().timeline()
    }

    pub fn playback_state(&self) -> crate::state::PlaybackState {
        self.drain_updates();
        self.state.lock().unwrap().playback_state
    }

    pub fn play_when_ready(&self) -> bool {
        self.state.lock().unwrap().play_when_ready
    }

    pub fn is_playing(&self) -> bool {
        self.drain_updates();
        self.state.lock().unwrap().is_playing()
    }

    pub fn current_window_index(&self) -> usize {
        self.drain_updates();
        self.state.lock().unwrap().window_index
    }

    pub fn current_position_ms(&self) -> i64 {
        self.drain_updates();
        self.state.lock().unwrap().position_us / 1_000
    }

    pub fn content_position_ms(&self) -> i64 {
        self.drain_updates();
        self.state.lock().unwrap().content_position_us / 1_000
    }

    pub fn playback_error(&self) -> Option<PlayerError> {
        self.drain_updates();
        self.state.lock().unwrap().playback_error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.drain_updates();
        self.state.lock().unwrap().is_loading
    }

    pub fn repeat_mode(&self) -> crate::state::RepeatMode {
        self.state.lock().unwrap().repeat_mode
    }

    pub fn shuffle_mode_enabled(&self) -> bool {
        self.state.lock().unwrap().shuffle_mode_enabled
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        self.drain_updates();
        self.state.lock().unwrap().snapshot()
    }

    pub(crate) fn next_op_id(&self) -> crate::internal::OpId {
        crate::internal::OpId(self.next_op_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn next_message_sequence(&self) -> u64 {
        self.next_message_sequence.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn uids(&self) -> &HolderUidGenerator {
        &self.uids
    }

    pub(crate) fn send(&self, command: Command) {
        self.check_thread();
        self.internal.send(command);
    }

    /// Panics in debug builds, logs in release (§5.1): every mutating call
    /// must originate from the thread that constructed the player.
    fn check_thread(&self) {
        let current = std::thread::current().id();
        if current != self.creation_thread {
            debug_assert!(false, "Player accessed from a thread other than the one that created it");
            log::warn!("Player accessed from thread {current:?}, expected {:?}", self.creation_thread);
        }
    }

    fn require_not_released(&self) -> Result<(), PlayerError> {
        if self.released.load(Ordering::SeqCst) {
            Err(PlayerError::Released)
        } else {
            Ok(())
        }
    }

    /// Drain every [`Update`] currently buffered from the internal thread,
    /// reconciling facade state and firing listener events for each in
    /// order (§4.2, §4.4).
    pub(crate) fn drain_updates(&self) {
        while let Ok(update) = self.internal.updates.try_recv() {
            self.apply_update(update);
        }
    }

    fn apply_update(&self, update: Update) {
        let events = {
            let mut guard = self.state.lock().unwrap();
            let before = guard.snapshot();
            let was_playing = guard.is_playing();

            guard.reconcile(&update);

            let after = guard.snapshot();
            let is_playing = guard.is_playing();
            let play_when_ready = guard.play_when_ready;

            build_events(&before, &after, was_playing, is_playing, play_when_ready, &update)
        };
        self.listeners.notify(events);
    }
}

fn build_events(
    before: &PlaybackInfo,
    after: &PlaybackInfo,
    was_playing: bool,
    is_playing: bool,
    play_when_ready: bool,
    update: &Update,
) -> Vec<PlayerEvent> {
    let mut events = Vec::new();

    if !before.timeline.same_content(&after.timeline) {
        let reason = update.timeline_change_reason.unwrap_or(TimelineChangeReason::SourceUpdate);
        events.push(PlayerEvent::TimelineChanged(after.timeline.clone(), reason));
    }
    if let Some(reason) = update.discontinuity_reason {
        events.push(PlayerEvent::PositionDiscontinuity(reason));
    }
    if let Some(error) = &after.playback_error {
        if before.error_message() != after.error_message() {
            events.push(PlayerEvent::PlayerError(error.clone()));
        }
    }
    if before.track_groups != after.track_groups || before.track_selector_result != after.track_selector_result {
        events.push(PlayerEvent::TracksChanged(after.track_groups.clone(), after.track_selector_result.clone()));
    }
    if before.is_loading != after.is_loading {
        events.push(PlayerEvent::LoadingChanged(after.is_loading));
    }
    if before.playback_state != after.playback_state {
        events.push(PlayerEvent::PlayerStateChanged { play_when_ready, state: after.playback_state });
    }
    if was_playing != is_playing {
        events.push(PlayerEvent::IsPlayingChanged(is_playing));
    }
    if update.seek_processed {
        events.push(PlayerEvent::SeekProcessed);
    }

    events
}

impl Drop for Player {
    fn drop(&mut self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.internal.send(Command::Release);
        }
    }
}
