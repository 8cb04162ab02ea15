//! Playback controls: prepare/seek/stop/release and the playback-parameter
//! setters (§4.1).

use crate::error::PlayerError;
use crate::internal::Command;
use crate::listener::PlayerEvent;
use crate::state::{PlaybackParameters, RepeatMode, SeekParameters};
use crate::timeline::ShuffleOrder;

use super::Player;

impl Player {
    pub fn prepare(&self) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let op_id = self.next_op_id();
        self.send(Command::Prepare(op_id));
        self.drain_updates();
        Ok(())
    }

    /// Sets whether playback should proceed as soon as the player is ready.
    /// Fires `PlayerStateChanged`/`IsPlayingChanged` synchronously: unlike
    /// playlist and position changes, this flag is facade-local and does
    /// not need to round-trip through the internal dispatcher to be
    /// observable (§4.1 Open Question decision, see DESIGN.md).
    pub fn set_play_when_ready(&self, play_when_ready: bool) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let mut events = Vec::new();
        {
            let mut guard = self.state.lock().unwrap();
            if guard.play_when_ready == play_when_ready {
                drop(guard);
                return Ok(());
            }
            let was_playing = guard.is_playing();
            guard.play_when_ready = play_when_ready;
            let is_playing = guard.is_playing();
            events.push(PlayerEvent::PlayerStateChanged { play_when_ready, state: guard.playback_state });
            if was_playing != is_playing {
                events.push(PlayerEvent::IsPlayingChanged(is_playing));
            }
        }
        let op_id = self.next_op_id();
        self.send(Command::SetPlayWhenReady { play_when_ready, op_id });
        self.listeners.notify(events);
        self.drain_updates();
        Ok(())
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) -> Result<(), PlayerError> {
        self.require_not_released()?;
        self.state.lock().unwrap().repeat_mode = mode;
        let op_id = self.next_op_id();
        self.send(Command::SetRepeatMode { mode, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn set_shuffle_mode_enabled(&self, enabled: bool) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.shuffle_mode_enabled = enabled;
            let length = guard.timeline().window_count();
            guard.shuffle_order = if enabled {
                Box::new(crate::timeline::RandomShuffleOrder::new(length))
            } else {
                Box::new(crate::timeline::DefaultShuffleOrder::new(length))
            };
        }
        let op_id = self.next_op_id();
        self.send(Command::SetShuffleMode { enabled, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn set_shuffle_order(&self, order: Box<dyn ShuffleOrder>) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let op_id = self.next_op_id();
        self.send(Command::SetShuffleOrder { order, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn set_playback_parameters(&self, params: PlaybackParameters) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let op_id = self.next_op_id();
        self.send(Command::SetPlaybackParameters { params, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn set_seek_parameters(&self, params: SeekParameters) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let op_id = self.next_op_id();
        self.send(Command::SetSeekParameters { params, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn set_foreground_mode(&self, enabled: bool) -> Result<(), PlayerError> {
        self.require_not_released()?;
        let op_id = self.next_op_id();
        self.send(Command::SetForegroundMode { enabled, op_id });
        self.drain_updates();
        Ok(())
    }

    /// Seek to `position_ms` within `window_index`. Masked synchronously:
    /// `current_window_index`/`current_position_ms` reflect the seek target
    /// immediately, before the internal dispatcher has acted on it (§4.1).
    pub fn seek_to(&self, window_index: usize, position_ms: i64) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_seek_to(window_index, position_ms)?;
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::SeekTo { window_index, position_ms, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn seek_to_default_position(&self) -> Result<(), PlayerError> {
        let window_index = self.current_window_index();
        self.seek_to(window_index, 0)
    }

    /// Stop playback (§4.6). `reset == true` also clears the playlist and
    /// position back to the start, matching §8's stop-twice-then-seek
    /// scenario (two `stop(false)` calls must not themselves discontinue
    /// position).
    pub fn stop(&self, reset: bool) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_stop(reset, self.uids());
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::Stop { reset, op_id });
        self.drain_updates();
        Ok(())
    }

    /// Release all resources. Idempotent; subsequent calls to any other
    /// method return [`PlayerError::Released`].
    pub fn release(&self) {
        if !self.released.swap(true, std::sync::atomic::Ordering::SeqCst) {
            self.send_unchecked(Command::Release);
        }
    }

    fn send_unchecked(&self, command: Command) {
        self.internal.send(command);
    }
}
