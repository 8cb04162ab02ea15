//! The `Renderer` capability (§6): decoder/output implementations the
//! coordinator drives but never implements.

use std::any::Any;

/// Coarse media type a renderer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    Audio,
    Video,
    Text,
    Metadata,
}

/// A message type a [`Renderer`] accepts via [`Renderer::handle_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererMessageType {
    SetSurface,
    Custom(i32),
}

/// A renderer capability: decoder init/runtime lifecycle and end-of-stream
/// reporting. Implementations are owned/driven by the internal dispatcher
/// after being handed to the player (§5).
pub trait Renderer: Send + Sync {
    fn track_type(&self) -> TrackType;
    fn supports_format(&self, format: &str) -> bool;
    fn enable(&self);
    fn start(&self);
    fn stop(&self);
    fn disable(&self);
    fn reset_position(&self, position_us: i64);
    fn is_ended(&self) -> bool;
    fn handle_message(&self, message_type: RendererMessageType, payload: &(dyn Any + Send + Sync));
}
