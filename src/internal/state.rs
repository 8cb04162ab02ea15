//! Internal dispatcher state machine: owns the playlist, shuffle order, and
//! playback position, and turns commands/source refreshes into
//! [`PlaybackInfo`] updates (§4.2, §4.6).

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::capabilities::{
    BandwidthMeter, Clock, LoadControl, MediaSource, MediaSourceListener, Renderer, RendererMessageType, TrackGroupArray,
    TrackSelector,
};
use crate::error::PlayerError;
use crate::message::{MessageTarget, PlayerMessage};
use crate::message::MessageRouter;
use crate::playback_info::PlaybackInfo;
use crate::playlist::{HolderUidGenerator, Playlist};
use crate::state::{
    DiscontinuityReason, PlaybackParameters, PlaybackState, PlayerConfig, RepeatMode, SeekParameters, TimelineChangeReason,
};
use crate::timeline::{remap_moved_index, DefaultShuffleOrder, MediaPeriodId, PeriodUid, RandomShuffleOrder, ShuffleOrder, Timeline};

use super::commands::{Command, InternalEvent, Update};

/// Everything the dispatcher thread needs at construction, bundled so
/// [`super::thread::InternalThread::spawn`] takes one argument.
pub(crate) struct DispatcherDeps {
    pub(crate) config: PlayerConfig,
    pub(crate) track_selector: Arc<dyn TrackSelector>,
    pub(crate) renderers: Vec<Arc<dyn Renderer>>,
    pub(crate) uids: HolderUidGenerator,
    pub(crate) clock: Arc<dyn Clock>,
    #[allow(dead_code)]
    pub(crate) load_control: Option<Arc<dyn LoadControl>>,
    #[allow(dead_code)]
    pub(crate) bandwidth_meter: Option<Arc<dyn BandwidthMeter>>,
}

/// Bridges a `MediaSource`'s async timeline callback back onto the
/// dispatcher's single event channel (§4.2.1).
struct SourceListenerBridge {
    holder_uid: u64,
    sender: mpsc::Sender<InternalEvent>,
}

impl MediaSourceListener for SourceListenerBridge {
    fn on_source_info_refreshed(&self, timeline: Timeline) {
        let _ = self.sender.send(InternalEvent::SourceRefreshed { holder_uid: self.holder_uid, timeline });
    }
}

pub(crate) struct InternalState {
    playlist: Playlist,
    uids: HolderUidGenerator,
    shuffle_order: Box<dyn ShuffleOrder>,
    shuffle_mode_enabled: bool,
    repeat_mode: RepeatMode,
    play_when_ready: bool,
    playback_parameters: PlaybackParameters,
    #[allow(dead_code)]
    seek_parameters: SeekParameters,
    #[allow(dead_code)]
    foreground_mode: bool,
    playback_state: PlaybackState,
    window_index: usize,
    media_period_id: MediaPeriodId,
    next_window_sequence_number: u64,
    position_us: i64,
    content_position_us: i64,
    playback_error: Option<PlayerError>,
    track_groups: TrackGroupArray,
    track_selector_result: crate::capabilities::TrackSelectorResult,
    track_selector: Arc<dyn TrackSelector>,
    renderers: Vec<Arc<dyn Renderer>>,
    message_router: MessageRouter,
    prepare_requested: HashSet<u64>,
    event_sender: mpsc::Sender<InternalEvent>,
    #[allow(dead_code)]
    clock: Arc<dyn Clock>,
    pub(crate) released: bool,
}

impl InternalState {
    pub(crate) fn new(deps: DispatcherDeps, event_sender: mpsc::Sender<InternalEvent>) -> Self {
        let period_id = MediaPeriodId {
            period_uid: PeriodUid { holder_uid: 0, period_index_in_holder: 0 },
            window_sequence_number: 0,
            ad_group_index: None,
            ad_index_in_ad_group: None,
        };
        Self {
            playlist: Playlist::new(),
            uids: deps.uids,
            shuffle_order: Box::new(DefaultShuffleOrder::new(0)),
            shuffle_mode_enabled: deps.config.initial_shuffle_mode,
            repeat_mode: deps.config.initial_repeat_mode,
            play_when_ready: false,
            playback_parameters: deps.config.initial_playback_parameters,
            seek_parameters: deps.config.initial_seek_parameters,
            foreground_mode: deps.config.foreground_mode,
            playback_state: PlaybackState::Idle,
            window_index: 0,
            media_period_id: period_id.clone(),
            next_window_sequence_number: 1,
            position_us: 0,
            content_position_us: 0,
            playback_error: None,
            track_groups: TrackGroupArray::EMPTY,
            track_selector_result: crate::capabilities::TrackSelectorResult::NONE,
            track_selector: deps.track_selector,
            renderers: deps.renderers,
            message_router: MessageRouter::new(),
            prepare_requested: HashSet::new(),
            event_sender,
            clock: deps.clock,
            released: false,
        }
    }

    pub(crate) fn handle_event(&mut self, event: InternalEvent) -> Option<Update> {
        match event {
            InternalEvent::Command(command) => self.handle_command(command),
            InternalEvent::SourceRefreshed { holder_uid, timeline } => self.handle_source_refreshed(holder_uid, timeline),
        }
    }

    pub(crate) fn tick(&mut self, tick: Duration) -> Option<Update> {
        if let Some(update) = self.check_source_errors() {
            return Some(update);
        }
        if self.playback_state != PlaybackState::Ready || !self.play_when_ready {
            return None;
        }
        let timeline = self.current_timeline();
        let window = timeline.window(self.window_index)?;
        let advance_us = (tick.as_micros() as f64 * self.playback_parameters.speed as f64) as i64;
        let old_ms = self.position_us / 1000;
        self.position_us += advance_us;
        self.content_position_us += advance_us;

        let mut discontinuity = None;
        if let Some(duration_us) = window.duration_us {
            if self.position_us >= duration_us {
                match self.next_window(self.window_index, &timeline) {
                    Some(next) => {
                        self.window_index = next;
                        self.position_us = 0;
                        self.content_position_us = 0;
                        self.media_period_id = self.allocate_media_period_id(next);
                        discontinuity = Some(DiscontinuityReason::PeriodTransition);
                        self.playback_state = if self.current_holder_prepared() {
                            PlaybackState::Ready
                        } else {
                            PlaybackState::Buffering
                        };
                        if self.playback_state == PlaybackState::Ready {
                            self.refresh_track_selection();
                        }
                    }
                    None => self.playback_state = PlaybackState::Ended,
                }
            }
        }

        let new_ms = self.position_us / 1000;
        let due = self.message_router.advance_position(self.window_index, old_ms, new_ms);
        self.deliver_due_messages(due);

        Some(Update {
            info: self.snapshot(),
            acks: 0,
            discontinuity_reason: discontinuity,
            seek_processed: false,
            timeline_change_reason: None,
        })
    }

    fn handle_command(&mut self, command: Command) -> Option<Update> {
        match command {
            Command::Prepare(_) => {
                self.do_prepare();
                if let Some(update) = self.check_source_errors() {
                    return Some(update);
                }
                Some(self.make_update(None, false))
            }
            Command::SetMediaItems { sources, reset_position, start_window, start_position_ms, .. } => {
                self.message_router.clear();
                let old = self.playlist.replace_all(sources, &self.uids);
                for holder in old {
                    holder.source().release();
                }
                self.prepare_requested.clear();
                self.shuffle_order = self.fresh_shuffle_order(self.playlist.len());
                let old_window_index = self.window_index;

                if reset_position {
                    self.window_index = start_window.unwrap_or(0).min(self.playlist.len().saturating_sub(1));
                    self.position_us = start_position_ms * 1_000;
                    self.content_position_us = self.position_us;
                } else {
                    self.window_index = self.window_index.min(self.playlist.len().saturating_sub(1));
                }
                self.media_period_id = self.allocate_media_period_id(self.window_index);

                if self.playlist.is_empty() {
                    self.playback_state = PlaybackState::Ended;
                } else if self.playback_state != PlaybackState::Idle {
                    self.playback_state = PlaybackState::Buffering;
                    self.ensure_holders_preparing();
                }

                let discontinuity =
                    if reset_position || self.window_index != old_window_index { Some(DiscontinuityReason::Internal) } else { None };
                Some(self.make_update_with_reason(discontinuity, false, Some(TimelineChangeReason::PlaylistChanged)))
            }
            Command::AddMediaItems { index, sources, .. } => {
                let count = sources.len();
                match self.playlist.insert_range_at(index, sources, &self.uids) {
                    Ok(()) => {
                        self.shuffle_order = self.shuffle_order.clone_and_insert(index, count);
                        if index <= self.window_index {
                            self.window_index += count;
                        }
                        if self.playback_state != PlaybackState::Idle {
                            self.ensure_holders_preparing();
                        }
                    }
                    Err(err) => self.playback_error = Some(err),
                }
                Some(self.make_update_with_reason(None, false, Some(TimelineChangeReason::PlaylistChanged)))
            }
            Command::RemoveMediaItems { from, to, .. } => match self.playlist.remove_range(from, to) {
                Ok(removed) => {
                    self.shuffle_order = self.shuffle_order.clone_and_remove(from, to);
                    let removed_current = self.window_index >= from && self.window_index < to;
                    let discontinuity = if removed_current {
                        if self.playlist.is_empty() {
                            self.playback_state = PlaybackState::Ended;
                            self.window_index = 0;
                        } else {
                            self.window_index = from.min(self.playlist.len() - 1);
                            self.position_us = 0;
                            self.content_position_us = 0;
                            self.media_period_id = self.allocate_media_period_id(self.window_index);
                        }
                        self.message_router.clear();
                        Some(DiscontinuityReason::Internal)
                    } else {
                        if self.window_index >= to {
                            self.window_index -= to - from;
                        }
                        None
                    };
                    for holder in removed {
                        holder.source().release();
                    }
                    Some(self.make_update_with_reason(discontinuity, false, Some(TimelineChangeReason::PlaylistChanged)))
                }
                Err(err) => {
                    self.playback_error = Some(err);
                    Some(self.make_update(None, false))
                }
            },
            Command::MoveMediaItems { from, to, new_from, .. } => {
                let count = to.saturating_sub(from);
                let clamped_new_from = new_from.min(self.playlist.len().saturating_sub(count));
                match self.playlist.move_range(from, to, new_from) {
                    Ok(()) => {
                        self.shuffle_order = self.shuffle_order.clone_and_move(from, to, clamped_new_from);
                        self.window_index = remap_moved_index(self.window_index, from, to, clamped_new_from, count);
                        Some(self.make_update_with_reason(None, false, Some(TimelineChangeReason::PlaylistChanged)))
                    }
                    Err(err) => {
                        self.playback_error = Some(err);
                        Some(self.make_update(None, false))
                    }
                }
            }
            Command::SeekTo { window_index, position_ms, .. } => {
                let timeline = self.current_timeline();
                if !self.playlist.is_empty() && window_index >= self.playlist.len() {
                    self.playback_error =
                        Some(PlayerError::IllegalSeekPosition { window_index, window_count: timeline.window_count() });
                    return Some(self.make_update(None, true));
                }
                if self.media_period_id.is_ad() {
                    // Seeking away from a playing ad is not allowed; the request is
                    // silently dropped, but still acked (§4.1).
                    return Some(self.make_update(None, false));
                }
                self.window_index = window_index;
                self.position_us = position_ms * 1_000;
                self.content_position_us = self.position_us;
                self.media_period_id = self.allocate_media_period_id(window_index);
                self.playback_state = if self.playlist.is_empty() {
                    PlaybackState::Ended
                } else if self.current_holder_prepared() {
                    PlaybackState::Ready
                } else {
                    PlaybackState::Buffering
                };
                if self.playback_state == PlaybackState::Ready {
                    self.refresh_track_selection();
                }
                self.message_router.clear();
                Some(self.make_update(Some(DiscontinuityReason::Seek), true))
            }
            Command::SetPlayWhenReady { play_when_ready, .. } => {
                self.play_when_ready = play_when_ready;
                Some(self.make_update(None, false))
            }
            Command::SetRepeatMode { mode, .. } => {
                self.repeat_mode = mode;
                Some(self.make_update(None, false))
            }
            Command::SetShuffleMode { enabled, .. } => {
                self.shuffle_mode_enabled = enabled;
                self.shuffle_order = self.fresh_shuffle_order(self.playlist.len());
                Some(self.make_update(None, false))
            }
            Command::SetShuffleOrder { order, .. } => {
                self.shuffle_order = order;
                Some(self.make_update(None, false))
            }
            Command::SetPlaybackParameters { params, .. } => {
                self.playback_parameters = params;
                Some(self.make_update(None, false))
            }
            Command::SetSeekParameters { params, .. } => {
                self.seek_parameters = params;
                Some(self.make_update(None, false))
            }
            Command::SetForegroundMode { enabled, .. } => {
                self.foreground_mode = enabled;
                Some(self.make_update(None, false))
            }
            Command::Stop { reset, .. } => {
                if reset {
                    let old = self.playlist.replace_all(Vec::new(), &self.uids);
                    for holder in old {
                        holder.source().release();
                    }
                    self.shuffle_order = Box::new(DefaultShuffleOrder::new(0));
                    self.window_index = 0;
                    self.position_us = 0;
                    self.content_position_us = 0;
                    self.media_period_id = self.allocate_media_period_id(0);
                    self.message_router.clear();
                    self.prepare_requested.clear();
                }
                self.playback_state = PlaybackState::Idle;
                Some(self.make_update_with_reason(None, false, reset.then_some(TimelineChangeReason::PlaylistChanged)))
            }
            Command::Release => {
                self.do_release();
                Some(self.make_update(None, false))
            }
            Command::SendMessage(message) => {
                if let Some(immediate) = self.message_router.enqueue(message) {
                    self.deliver_due_messages(vec![immediate]);
                }
                Some(self.make_update(None, false))
            }
        }
    }

    fn handle_source_refreshed(&mut self, holder_uid: u64, timeline: Timeline) -> Option<Update> {
        let index = self.playlist.index_of_uid(holder_uid)?;
        if let Some(holder) = self.playlist.holder_mut(index) {
            holder.mark_prepared(timeline);
        }
        if self.playback_state == PlaybackState::Buffering && self.media_period_id.period_uid.holder_uid == holder_uid {
            self.playback_state = PlaybackState::Ready;
            self.refresh_track_selection();
        }
        Some(Update {
            info: self.snapshot(),
            acks: 0,
            discontinuity_reason: None,
            seek_processed: false,
            timeline_change_reason: Some(TimelineChangeReason::SourceUpdate),
        })
    }

    fn do_prepare(&mut self) {
        if self.playlist.is_empty() {
            self.playback_state = PlaybackState::Ended;
            return;
        }
        self.playback_state = PlaybackState::Buffering;
        self.window_index = 0;
        self.media_period_id = self.allocate_media_period_id(0);
        self.position_us = 0;
        self.content_position_us = 0;
        self.ensure_holders_preparing();
    }

    fn do_release(&mut self) {
        for holder in self.playlist.holders() {
            holder.source().release();
        }
        for renderer in &self.renderers {
            renderer.disable();
        }
        self.message_router.clear();
        self.playback_state = PlaybackState::Idle;
        self.released = true;
    }

    fn ensure_holders_preparing(&mut self) {
        let uids: Vec<u64> = self.playlist.holders().iter().map(|h| h.uid()).collect();
        for uid in uids {
            if self.prepare_requested.insert(uid) {
                if let Some(index) = self.playlist.index_of_uid(uid) {
                    if let Some(holder) = self.playlist.holder(index) {
                        let listener: Arc<dyn MediaSourceListener> =
                            Arc::new(SourceListenerBridge { holder_uid: uid, sender: self.event_sender.clone() });
                        holder.source().prepare(listener);
                    }
                }
            }
        }
    }

    /// Poll every holder's source for a deferred preparation/runtime error
    /// (§7): the first one found moves playback to IDLE and surfaces as
    /// `playback_error`, matching the source being unable to continue. Not
    /// a response to any command, so (like `tick`'s own updates) it carries
    /// no ack.
    fn check_source_errors(&mut self) -> Option<Update> {
        for holder in self.playlist.holders() {
            if let Err(err) = holder.source().maybe_throw_source_error() {
                self.playback_error = Some(err);
                self.playback_state = PlaybackState::Idle;
                return Some(Update {
                    info: self.snapshot(),
                    acks: 0,
                    discontinuity_reason: None,
                    seek_processed: false,
                    timeline_change_reason: None,
                });
            }
        }
        None
    }

    fn current_timeline(&self) -> Timeline {
        self.playlist.masked_timeline()
    }

    fn current_holder_prepared(&self) -> bool {
        let holder_uid = self.media_period_id.period_uid.holder_uid;
        self.playlist.index_of_uid(holder_uid).and_then(|i| self.playlist.holder(i)).map(|h| h.is_prepared()).unwrap_or(false)
    }

    fn next_window(&self, current: usize, timeline: &Timeline) -> Option<usize> {
        if self.shuffle_mode_enabled {
            self.shuffle_order.next_index(current, self.repeat_mode)
        } else {
            timeline.next_window_index(current, self.repeat_mode)
        }
    }

    fn fresh_shuffle_order(&self, length: usize) -> Box<dyn ShuffleOrder> {
        if self.shuffle_mode_enabled {
            Box::new(RandomShuffleOrder::new(length))
        } else {
            Box::new(DefaultShuffleOrder::new(length))
        }
    }

    /// Reuse the current `MediaPeriodId` when the target window resolves to
    /// the same (non-ad) period already playing, so repeated seeks to the
    /// same spot don't mint a fresh sequence number (§3 testable property).
    fn allocate_media_period_id(&mut self, window_index: usize) -> MediaPeriodId {
        let timeline = self.current_timeline();
        let period_uid = timeline
            .uid_of_first_period_in_window(window_index)
            .unwrap_or(PeriodUid { holder_uid: 0, period_index_in_holder: 0 });
        let reuse = self.media_period_id.period_uid == period_uid
            && self.media_period_id.ad_group_index.is_none()
            && self.media_period_id.ad_index_in_ad_group.is_none();
        if reuse {
            self.media_period_id.clone()
        } else {
            let sequence = self.next_window_sequence_number;
            self.next_window_sequence_number += 1;
            MediaPeriodId { period_uid, window_sequence_number: sequence, ad_group_index: None, ad_index_in_ad_group: None }
        }
    }

    fn refresh_track_selection(&mut self) {
        let timeline = self.current_timeline();
        let capabilities: Vec<_> = self.renderers.iter().map(|r| r.track_type()).collect();
        let groups = TrackGroupArray::EMPTY;
        let result = self.track_selector.select_tracks(&capabilities, &groups, &self.media_period_id, &timeline);
        self.track_selector.on_selection_activated(&result);
        self.track_groups = groups;
        self.track_selector_result = result;
    }

    fn deliver_due_messages(&self, due: Vec<PlayerMessage>) {
        for message in due {
            match &message.target {
                MessageTarget::Renderer(index) => {
                    if let (Some(renderer), Some(payload)) = (self.renderers.get(*index), message.payload.as_deref()) {
                        renderer.handle_message(RendererMessageType::Custom(0), payload);
                    }
                }
                MessageTarget::TrackSelector => {
                    log::debug!("player message delivered to track selector");
                }
                MessageTarget::Custom(name) => {
                    log::debug!("player message delivered to custom target {name}");
                }
            }
        }
    }

    fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            timeline: self.current_timeline(),
            media_period_id: self.media_period_id.clone(),
            position_us: self.position_us,
            content_position_us: self.content_position_us,
            playback_state: self.playback_state,
            playback_error: self.playback_error.clone(),
            is_loading: self.playback_state == PlaybackState::Buffering,
            track_groups: self.track_groups.clone(),
            track_selector_result: self.track_selector_result.clone(),
            loading_media_period_id: self.media_period_id.clone(),
            buffered_position_us: self.position_us,
            total_buffered_duration_us: 0,
        }
    }

    fn make_update(&self, discontinuity_reason: Option<DiscontinuityReason>, seek_processed: bool) -> Update {
        self.make_update_with_reason(discontinuity_reason, seek_processed, None)
    }

    fn make_update_with_reason(
        &self,
        discontinuity_reason: Option<DiscontinuityReason>,
        seek_processed: bool,
        timeline_change_reason: Option<TimelineChangeReason>,
    ) -> Update {
        Update { info: self.snapshot(), acks: 1, discontinuity_reason, seek_processed, timeline_change_reason }
    }
}
