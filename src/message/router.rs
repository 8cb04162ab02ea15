//! Internal-thread message routing: tracks pending positioned messages and
//! decides which become due as playback position advances (§4.5).

use std::sync::atomic::Ordering;

use super::player_message::{MessagePosition, PlayerMessage};

struct Pending {
    message: PlayerMessage,
    /// `false` once delivered, until a loop traversal re-arms it (only used
    /// for `delete_after_delivery == false` messages).
    armed: bool,
}

/// Owned by the internal dispatcher; not exposed across the thread boundary.
#[derive(Default)]
pub struct MessageRouter {
    pending: Vec<Pending>,
    next_sequence: u64,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self { pending: Vec::new(), next_sequence: 0 }
    }

    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// Queue a message for delivery. Messages with `MessagePosition::Immediate`
    /// are returned for immediate delivery by the caller; positioned messages
    /// are retained for [`Self::due_for_position`].
    pub fn enqueue(&mut self, message: PlayerMessage) -> Option<PlayerMessage> {
        if matches!(message.position, MessagePosition::Immediate) {
            return Some(message);
        }
        self.pending.push(Pending { message, armed: true });
        None
    }

    /// Call when playback position advances from `old_ms` to `new_ms` within
    /// `window_index`; returns messages now due, in insertion order (§4.5).
    ///
    /// `new_ms < old_ms` signals a loop traversal (seek-to-self under a
    /// repeat mode or a period transition back to the start of the same
    /// window), which re-arms any `delete_after_delivery == false` message
    /// targeting that window.
    pub fn advance_position(&mut self, window_index: usize, old_ms: i64, new_ms: i64) -> Vec<PlayerMessage> {
        let looped = new_ms < old_ms;
        if looped {
            for pending in &mut self.pending {
                if let MessagePosition::At { window_index: w, .. } = pending.message.position {
                    if w == window_index {
                        pending.armed = true;
                    }
                }
            }
        }

        self.drain_due(window_index, old_ms, new_ms, looped)
    }

    fn drain_due(&mut self, window_index: usize, old_ms: i64, new_ms: i64, looped: bool) -> Vec<PlayerMessage> {
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            let is_due = match pending.message.position {
                MessagePosition::At { window_index: w, position_ms } if w == window_index && pending.armed => {
                    if looped {
                        new_ms >= position_ms
                    } else {
                        old_ms < position_ms && new_ms >= position_ms
                    }
                }
                _ => false,
            };
            if is_due {
                if pending.message.cancelled.load(Ordering::SeqCst) {
                    continue;
                }
                pending.message.delivered.store(true, Ordering::SeqCst);
                if pending.message.delete_after_delivery {
                    due.push(pending.message);
                } else {
                    pending.armed = false;
                    let clone_sequence = pending.message.sequence;
                    due.push(PlayerMessage {
                        target: pending.message.target.clone(),
                        payload: pending.message.payload.clone(),
                        position: pending.message.position,
                        handler: pending.message.handler,
                        delete_after_delivery: false,
                        cancelled: pending.message.cancelled.clone(),
                        delivered: pending.message.delivered.clone(),
                        sequence: clone_sequence,
                    });
                    keep.push(pending);
                }
            } else {
                keep.push(pending);
            }
        }
        self.pending = keep;
        due.sort_by_key(|m| m.sequence);
        due
    }

    /// Drop all pending messages (called on `release()`/playlist replace per
    /// the Open Question decision in DESIGN.md: a playlist mutation that
    /// invalidates the target window drops the message silently).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Clone for super::player_message::MessageTarget {
    fn clone(&self) -> Self {
        match self {
            Self::Renderer(i) => Self::Renderer(*i),
            Self::TrackSelector => Self::TrackSelector,
            Self::Custom(s) => Self::Custom(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::player_message::{MessageHandler, MessageTarget, PlayerMessageBuilder};

    fn message(position_ms: i64, delete_after_delivery: bool) -> PlayerMessage {
        let builder = PlayerMessageBuilder::new(MessageTarget::TrackSelector)
            .with_position(MessagePosition::At { window_index: 0, position_ms })
            .with_handler(MessageHandler::PlaybackThread)
            .with_delete_after_delivery(delete_after_delivery);
        let (message, _sent) = builder.build(0);
        message
    }

    #[test]
    fn delivers_once_crossed() {
        let mut router = MessageRouter::new();
        router.enqueue(message(1000, true));

        let due = router.advance_position(0, 0, 500);
        assert!(due.is_empty());

        let due = router.advance_position(0, 500, 1500);
        assert_eq!(due.len(), 1);
        assert_eq!(router.pending_count(), 0);
    }

    #[test]
    fn non_delete_message_rearms_on_loop() {
        let mut router = MessageRouter::new();
        router.enqueue(message(500, false));

        let due = router.advance_position(0, 0, 600);
        assert_eq!(due.len(), 1);
        assert_eq!(router.pending_count(), 1);

        // No loop: position keeps advancing past, should not refire.
        let due = router.advance_position(0, 600, 700);
        assert!(due.is_empty());

        // Loop traversal (position resets lower): re-arms.
        let due = router.advance_position(0, 700, 600);
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn cancelled_message_is_dropped() {
        let mut router = MessageRouter::new();
        let builder = PlayerMessageBuilder::new(MessageTarget::TrackSelector)
            .with_position(MessagePosition::At { window_index: 0, position_ms: 100 });
        let (message, sent) = builder.build(0);
        router.enqueue(message);
        sent.cancel();

        let due = router.advance_position(0, 0, 200);
        assert!(due.is_empty());
    }

    #[test]
    fn same_timestamp_messages_deliver_in_insertion_order() {
        let mut router = MessageRouter::new();
        for seq in 0..3u64 {
            let builder = PlayerMessageBuilder::new(MessageTarget::TrackSelector)
                .with_position(MessagePosition::At { window_index: 0, position_ms: 100 });
            let (message, _sent) = builder.build(seq);
            router.pending.push(Pending { message, armed: true });
        }

        let due = router.advance_position(0, 0, 200);
        let sequences: Vec<u64> = due.iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}
