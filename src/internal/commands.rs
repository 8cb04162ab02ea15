//! App→internal commands and internal→app updates (§4.2, §9 "two typed
//! command enums carried over bounded channels").

use std::sync::Arc;

use crate::capabilities::MediaSource;
use crate::message::PlayerMessage;
use crate::playback_info::PlaybackInfo;
use crate::state::{DiscontinuityReason, PlaybackParameters, RepeatMode, SeekParameters, TimelineChangeReason};
use crate::timeline::ShuffleOrder;

/// Every command carries the `op_id` the facade assigned it, so the
/// corresponding [`Update`] can be matched back to the operation that
/// produced it (used only for diagnostics; ack accounting itself is a plain
/// counter per §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpId(pub u64);

pub enum Command {
    Prepare(OpId),
    SetMediaItems {
        sources: Vec<Arc<dyn MediaSource>>,
        reset_position: bool,
        start_window: Option<usize>,
        start_position_ms: i64,
        op_id: OpId,
    },
    AddMediaItems {
        index: usize,
        sources: Vec<Arc<dyn MediaSource>>,
        op_id: OpId,
    },
    RemoveMediaItems {
        from: usize,
        to: usize,
        op_id: OpId,
    },
    MoveMediaItems {
        from: usize,
        to: usize,
        new_from: usize,
        op_id: OpId,
    },
    SeekTo {
        window_index: usize,
        position_ms: i64,
        op_id: OpId,
    },
    SetPlayWhenReady {
        play_when_ready: bool,
        op_id: OpId,
    },
    SetRepeatMode {
        mode: RepeatMode,
        op_id: OpId,
    },
    SetShuffleMode {
        enabled: bool,
        op_id: OpId,
    },
    SetShuffleOrder {
        order: Box<dyn ShuffleOrder>,
        op_id: OpId,
    },
    SetPlaybackParameters {
        params: PlaybackParameters,
        op_id: OpId,
    },
    SetSeekParameters {
        params: SeekParameters,
        op_id: OpId,
    },
    SetForegroundMode {
        enabled: bool,
        op_id: OpId,
    },
    Stop {
        reset: bool,
        op_id: OpId,
    },
    Release,
    SendMessage(PlayerMessage),
}

/// A message posted from the internal thread back to the application thread
/// (§4.2). `acks` is always exactly the number of commands this update
/// represents the completion of (this implementation never batches, so it is
/// `1` for command-driven updates and `0` for pure source-refresh-driven
/// updates).
pub struct Update {
    pub info: PlaybackInfo,
    pub acks: u32,
    pub discontinuity_reason: Option<DiscontinuityReason>,
    pub seek_processed: bool,
    /// Set whenever this update's timeline may differ from the previously
    /// reported one, naming why (§4.4): a playlist-mutating command, or an
    /// async source refresh / engine-driven progression. The facade only
    /// actually fires `TimelineChanged` when the timelines differ under
    /// [`crate::timeline::Timeline::same_content`]; this field just supplies
    /// the reason to attach when it does.
    pub timeline_change_reason: Option<TimelineChangeReason>,
}

/// What the internal thread's single event channel actually carries: either
/// a forwarded [`Command`], or a source-info refresh raised by a
/// `MediaSourceListener` the dispatcher handed to a holder's `MediaSource` at
/// prepare time (§4.2.1).
pub(crate) enum InternalEvent {
    Command(Command),
    SourceRefreshed { holder_uid: u64, timeline: crate::timeline::Timeline },
}
