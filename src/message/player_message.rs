//! `PlayerMessage`: a targeted, positioned command dispatched to a capability
//! at or after a particular playback position (§4.5).

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a message is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    Renderer(usize),
    TrackSelector,
    Custom(String),
}

/// When a message becomes due for delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessagePosition {
    /// Deliver immediately on the playback thread as soon as dequeued.
    Immediate,
    /// Deliver at or after the first time playback crosses this
    /// `(window_index, position_ms)` pair while its period is being read.
    At { window_index: usize, position_ms: i64 },
}

/// Which thread a message's effect runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHandler {
    ApplicationThread,
    PlaybackThread,
}

/// A message in flight. Constructed via
/// [`crate::player::Player::create_message`].
pub struct PlayerMessage {
    pub target: MessageTarget,
    pub payload: Option<Arc<dyn Any + Send + Sync>>,
    pub position: MessagePosition,
    pub handler: MessageHandler,
    pub delete_after_delivery: bool,
    pub(crate) cancelled: Arc<AtomicBool>,
    pub(crate) delivered: Arc<AtomicBool>,
    pub(crate) sequence: u64,
}

/// A handle retained by the application thread to cancel a sent message.
#[derive(Clone)]
pub struct SentMessage {
    cancelled: Arc<AtomicBool>,
    delivered: Arc<AtomicBool>,
}

impl SentMessage {
    pub(crate) fn new(cancelled: Arc<AtomicBool>, delivered: Arc<AtomicBool>) -> Self {
        Self { cancelled, delivered }
    }

    /// Remove the message if not yet delivered; idempotent and a no-op after
    /// delivery (§4.5).
    pub fn cancel(&self) {
        if !self.delivered.load(Ordering::SeqCst) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Builder returned by [`crate::player::Player::create_message`].
pub struct PlayerMessageBuilder {
    pub(crate) target: MessageTarget,
    pub(crate) payload: Option<Arc<dyn Any + Send + Sync>>,
    pub(crate) position: MessagePosition,
    pub(crate) handler: MessageHandler,
    pub(crate) delete_after_delivery: bool,
}

impl PlayerMessageBuilder {
    pub fn new(target: MessageTarget) -> Self {
        Self {
            target,
            payload: None,
            position: MessagePosition::Immediate,
            handler: MessageHandler::PlaybackThread,
            delete_after_delivery: true,
        }
    }

    pub fn with_payload(mut self, payload: Arc<dyn Any + Send + Sync>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_position(mut self, position: MessagePosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_handler(mut self, handler: MessageHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_delete_after_delivery(mut self, delete_after_delivery: bool) -> Self {
        self.delete_after_delivery = delete_after_delivery;
        self
    }

    pub(crate) fn build(self, sequence: u64) -> (PlayerMessage, SentMessage) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let delivered = Arc::new(AtomicBool::new(false));
        let message = PlayerMessage {
            target: self.target,
            payload: self.payload,
            position: self.position,
            handler: self.handler,
            delete_after_delivery: self.delete_after_delivery,
            cancelled: cancelled.clone(),
            delivered: delivered.clone(),
            sequence,
        };
        let sent = SentMessage::new(cancelled, delivered);
        (message, sent)
    }
}
