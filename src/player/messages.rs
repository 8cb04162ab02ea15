//! Player message creation and dispatch (§4.5).

use crate::error::PlayerError;
use crate::internal::Command;
use crate::message::{MessageTarget, PlayerMessageBuilder, SentMessage};

use super::Player;

impl Player {
    /// Start building a message targeting `target`; configure it with the
    /// builder's `with_*` methods, then pass it to [`Player::send_message`].
    pub fn create_message(&self, target: MessageTarget) -> PlayerMessageBuilder {
        PlayerMessageBuilder::new(target)
    }

    /// Assign the message an insertion-order sequence number and forward it
    /// to the internal dispatcher. The sequence is assigned here, at the
    /// point of the call, rather than when the internal thread happens to
    /// process it, so that two messages sent back-to-back from the
    /// application thread keep their relative order even if the dispatcher
    /// later delivers them in the same tick (§4.5 testable property).
    pub fn send_message(&self, builder: PlayerMessageBuilder) -> Result<SentMessage, PlayerError> {
        self.require_not_released()?;
        let sequence = self.next_message_sequence();
        let (message, sent) = builder.build(sequence);
        self.send(Command::SendMessage(message));
        self.drain_updates();
        Ok(sent)
    }
}
