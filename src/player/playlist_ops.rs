//! Playlist mutation methods (§4.3). Each predicts its effect on the facade
//! mirror before forwarding the equivalent command to the internal
//! dispatcher, so the playlist reads back correctly even before the command
//! has been processed (the "replace before prepare completes" scenario of
//! §8).

use std::sync::Arc;

use crate::capabilities::MediaSource;
use crate::error::PlayerError;
use crate::internal::Command;

use super::Player;

impl Player {
    pub fn set_media_items(
        &self,
        sources: Vec<Arc<dyn MediaSource>>,
        reset_position: bool,
        start_window: Option<usize>,
        start_position_ms: i64,
    ) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_set_media_items(sources.clone(), reset_position, start_window, start_position_ms, self.uids());
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::SetMediaItems { sources, reset_position, start_window, start_position_ms, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn add_media_items(&self, index: usize, sources: Vec<Arc<dyn MediaSource>>) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_add_media_items(index, sources.clone(), self.uids())?;
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::AddMediaItems { index, sources, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn append_media_items(&self, sources: Vec<Arc<dyn MediaSource>>) -> Result<(), PlayerError> {
        let index = self.current_timeline().window_count();
        self.add_media_items(index, sources)
    }

    pub fn remove_media_items(&self, from: usize, to: usize) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_remove_media_items(from, to)?;
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::RemoveMediaItems { from, to, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn move_media_items(&self, from: usize, to: usize, new_from: usize) -> Result<(), PlayerError> {
        self.require_not_released()?;
        {
            let mut guard = self.state.lock().unwrap();
            guard.apply_move_media_items(from, to, new_from)?;
            guard.pending_acks += 1;
        }
        let op_id = self.next_op_id();
        self.send(Command::MoveMediaItems { from, to, new_from, op_id });
        self.drain_updates();
        Ok(())
    }

    pub fn clear_media_items(&self) -> Result<(), PlayerError> {
        let count = self.current_timeline().window_count();
        self.remove_media_items(0, count)
    }
}
