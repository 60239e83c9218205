//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::action::Action;
use crate::core::config::NotificationPermission;
use crate::core::model::{Room, RoomRegistry, User};
use crate::core::state::ChatState;
use crate::net::{ChannelEvent, MessagePayload, ServerEvent};

/// A public room with no description or member count.
pub fn room(id: &str, name: &str) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        is_private: false,
        member_count: None,
    }
}

/// State for user `alice` over the given rooms, notification permission undecided.
pub fn test_state(rooms: Vec<Room>) -> ChatState {
    ChatState::new(
        User::new("alice"),
        RoomRegistry::from_rooms(rooms),
        NotificationPermission::Prompt,
    )
}

pub fn payload(room_id: Option<&str>, username: &str, text: &str) -> MessagePayload {
    MessagePayload {
        id: None,
        room_id: room_id.map(str::to_string),
        user_id: None,
        username: username.to_string(),
        message: text.to_string(),
        timestamp: Some("2024-06-15T12:00:00".to_string()),
        is_system: false,
    }
}

/// A `message` event from the server as the controller receives it.
pub fn incoming(room_id: &str, username: &str, text: &str) -> Action {
    Action::Channel(ChannelEvent::Server(ServerEvent::Message(payload(
        Some(room_id),
        username,
        text,
    ))))
}
