//! Player message routing (§4.5).

mod player_message;
mod router;

pub use player_message::{
    MessageHandler, MessagePosition, MessageTarget, PlayerMessage, PlayerMessageBuilder, SentMessage,
};
pub(crate) use router::MessageRouter;
