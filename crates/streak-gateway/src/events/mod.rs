//! Gateway events
//!
//! Dispatch events the client understands.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{ReadyEvent, UserPayload, VoiceStateEvent};
