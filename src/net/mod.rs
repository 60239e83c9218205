//! # Network Layer
//!
//! Everything that talks to the chat server:
//!
//! - [`channel`]: the real-time event channel (WebSocket, reconnecting)
//! - [`api`]: the REST endpoints behind the `ChatApi` trait
//! - [`wire`]: serde types for both

pub mod api;
pub mod channel;
pub mod wire;

pub use api::{ApiError, ChatApi, HttpApi};
pub use channel::{ChannelConfig, ChannelError, ChannelHandle};
pub use wire::{
    ChannelEvent, CreateRoomRequest, MessagePayload, OutboundEvent, RoomPayload, ServerEvent,
    TypingPayload,
};
