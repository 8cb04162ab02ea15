//! Facade-side state mirror: predicts the externally-visible effect of a
//! command synchronously, so getters called immediately after an operation
//! see its effect before the internal dispatcher has acted on it (§4.1).
//!
//! This mirrors the same playlist/shuffle-order mutations the internal
//! dispatcher applies (see `crate::internal::state::InternalState`), kept as
//! a second copy on the application thread rather than shared, since the two
//! threads must be able to disagree transiently while an operation is
//! in flight.

use std::sync::Arc;

use crate::capabilities::{MediaSource, TrackGroupArray, TrackSelectorResult};
use crate::error::PlayerError;
use crate::internal::Update;
use crate::playback_info::PlaybackInfo;
use crate::playlist::{HolderUidGenerator, Playlist};
use crate::state::{PlaybackState, RepeatMode};
use crate::timeline::{remap_moved_index, DefaultShuffleOrder, MediaPeriodId, PeriodUid, RandomShuffleOrder, ShuffleOrder, Timeline};

pub(crate) struct FacadeState {
    pub(crate) playlist: Playlist,
    pub(crate) shuffle_order: Box<dyn ShuffleOrder>,
    pub(crate) shuffle_mode_enabled: bool,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) play_when_ready: bool,
    pub(crate) playback_state: PlaybackState,
    pub(crate) window_index: usize,
    pub(crate) position_us: i64,
    pub(crate) content_position_us: i64,
    pub(crate) media_period_id: MediaPeriodId,
    next_window_sequence_number: u64,
    pub(crate) pending_acks: u32,
    pub(crate) track_groups: TrackGroupArray,
    pub(crate) track_selector_result: TrackSelectorResult,
    pub(crate) is_loading: bool,
    pub(crate) playback_error: Option<PlayerError>,
    pub(crate) buffered_position_us: i64,
    pub(crate) total_buffered_duration_us: i64,
}

impl FacadeState {
    pub(crate) fn new() -> Self {
        let dummy = PlaybackInfo::dummy();
        Self {
            playlist: Playlist::new(),
            shuffle_order: Box::new(DefaultShuffleOrder::new(0)),
            shuffle_mode_enabled: false,
            repeat_mode: RepeatMode::Off,
            play_when_ready: false,
            playback_state: dummy.playback_state,
            window_index: 0,
            position_us: dummy.position_us,
            content_position_us: dummy.content_position_us,
            media_period_id: dummy.media_period_id.clone(),
            next_window_sequence_number: 1,
            pending_acks: 0,
            track_groups: dummy.track_groups.clone(),
            track_selector_result: dummy.track_selector_result.clone(),
            is_loading: dummy.is_loading,
            playback_error: None,
            buffered_position_us: dummy.buffered_position_us,
            total_buffered_duration_us: dummy.total_buffered_duration_us,
        }
    }

    pub(crate) fn timeline(&self) -> Timeline {
        self.playlist.masked_timeline()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.play_when_ready && self.playback_state == PlaybackState::Ready
    }

    pub(crate) fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            timeline: self.timeline(),
            media_period_id: self.media_period_id.clone(),
            position_us: self.position_us,
            content_position_us: self.content_position_us,
            playback_state: self.playback_state,
            playback_error: self.playback_error.clone(),
            is_loading: self.is_loading,
            track_groups: self.track_groups.clone(),
            track_selector_result: self.track_selector_result.clone(),
            loading_media_period_id: self.media_period_id.clone(),
            buffered_position_us: self.buffered_position_us,
            total_buffered_duration_us: self.total_buffered_duration_us,
        }
    }

    fn allocate_media_period_id(&mut self, window_index: usize) -> MediaPeriodId {
        let timeline = self.timeline();
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

    fn fresh_shuffle_order(&self, length: usize) -> Box<dyn ShuffleOrder> {
        if self.shuffle_mode_enabled {
            Box::new(RandomShuffleOrder::new(length))
        } else {
            Box::new(DefaultShuffleOrder::new(length))
        }
    }

    pub(crate) fn apply_set_media_items(
        &mut self,
        sources: Vec<Arc<dyn MediaSource>>,
        reset_position: bool,
        start_window: Option<usize>,
        start_position_ms: i64,
        uids: &HolderUidGenerator,
    ) {
        self.playlist.replace_all(sources, uids);
        self.shuffle_order = self.fresh_shuffle_order(self.playlist.len());
        if reset_position {
            self.window_index = start_window.unwrap_or(0).min(self.playlist.len().saturating_sub(1));
            self.position_us = start_position_ms * 1_000;
            self.content_position_us = self.position_us;
        } else {
            self.window_index = self.window_index.min(self.playlist.len().saturating_sub(1));
        }
        self.media_period_id = self.allocate_media_period_id(self.window_index);
        self.playback_state =
            if self.playlist.is_empty() { PlaybackState::Ended } else if self.playback_state != PlaybackState::Idle {
                PlaybackState::Buffering
            } else {
                self.playback_state
            };
    }

    pub(crate) fn apply_add_media_items(
        &mut self,
        index: usize,
        sources: Vec<Arc<dyn MediaSource>>,
        uids: &HolderUidGenerator,
    ) -> Result<(), PlayerError> {
        let count = sources.len();
        self.playlist.insert_range_at(index, sources, uids)?;
        self.shuffle_order = self.shuffle_order.clone_and_insert(index, count);
        if index <= self.window_index {
            self.window_index += count;
        }
        Ok(())
    }

    pub(crate) fn apply_remove_media_items(&mut self, from: usize, to: usize) -> Result<(), PlayerError> {
        self.playlist.remove_range(from, to)?;
        self.shuffle_order = self.shuffle_order.clone_and_remove(from, to);
        if self.window_index >= from && self.window_index < to {
            if self.playlist.is_empty() {
                self.playback_state = PlaybackState::Ended;
                self.window_index = 0;
            } else {
                self.window_index = from.min(self.playlist.len() - 1);
                self.position_us = 0;
                self.content_position_us = 0;
            }
            self.media_period_id = self.allocate_media_period_id(self.window_index);
        } else if self.window_index >= to {
            self.window_index -= to - from;
        }
        Ok(())
    }

    pub(crate) fn apply_move_media_items(&mut self, from: usize, to: usize, new_from: usize) -> Result<(), PlayerError> {
        let count = to.saturating_sub(from);
        let clamped_new_from = new_from.min(self.playlist.len().saturating_sub(count));
        self.playlist.move_range(from, to, new_from)?;
        self.shuffle_order = self.shuffle_order.clone_and_move(from, to, clamped_new_from);
        self.window_index = remap_moved_index(self.window_index, from, to, clamped_new_from, count);
        Ok(())
    }

    pub(crate) fn apply_seek_to(&mut self, window_index: usize, position_ms: i64) -> Result<(), PlayerError> {
        if !self.playlist.is_empty() && window_index >= self.playlist.len() {
            return Err(PlayerError::IllegalSeekPosition { window_index, window_count: self.timeline().window_count() });
        }
        if self.media_period_id.is_ad() {
            // Matches `InternalState::handle_command`'s `SeekTo` branch: the
            // seek is silently dropped, but the caller still posts an ack.
            return Ok(());
        }
        self.window_index = window_index;
        self.position_us = position_ms * 1_000;
        self.content_position_us = self.position_us;
        self.media_period_id = self.allocate_media_period_id(window_index);
        if self.playback_state != PlaybackState::Idle {
            self.playback_state = PlaybackState::Buffering;
        }
        Ok(())
    }

    pub(crate) fn apply_stop(&mut self, reset: bool, uids: &HolderUidGenerator) {
        if reset {
            self.playlist.replace_all(Vec::new(), uids);
            self.shuffle_order = Box::new(DefaultShuffleOrder::new(0));
            self.window_index = 0;
            self.position_us = 0;
            self.content_position_us = 0;
            self.media_period_id = self.allocate_media_period_id(0);
        }
        self.playback_state = PlaybackState::Idle;
    }

    /// Fold an [`Update`] from the internal thread into this mirror.
    ///
    /// Non-predicted fields (tracks, loading, error, buffering estimates)
    /// always adopt the update's values. Predicted fields (window/position/
    /// playback state/media period id) are only overwritten once the ack
    /// count drains to zero, or when the update itself carries no ack (pure
    /// engine-driven progress, e.g. a tick-driven period transition or an
    /// async source refresh) since there is no in-flight prediction for
    /// those to protect.
    pub(crate) fn reconcile(&mut self, update: &Update) {
        self.track_groups = update.info.track_groups.clone();
        self.track_selector_result = update.info.track_selector_result.clone();
        self.is_loading = update.info.is_loading;
        self.playback_error = update.info.playback_error.clone();
        self.buffered_position_us = update.info.buffered_position_us;
        self.total_buffered_duration_us = update.info.total_buffered_duration_us;

        if update.acks > 0 {
            self.pending_acks = self.pending_acks.saturating_sub(update.acks);
        }

        if update.acks == 0 || self.pending_acks == 0 {
            self.position_us = update.info.position_us;
            self.content_position_us = update.info.content_position_us;
            self.playback_state = update.info.playback_state;
            self.media_period_id = update.info.media_period_id.clone();
            if let Some(window_index) = update.info.timeline.window_index_of_period_uid(self.media_period_id.period_uid) {
                self.window_index = window_index;
            }
        }
    }
}
