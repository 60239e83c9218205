//! Wire types shared by the event channel and the REST API.
//!
//! Channel frames are JSON text messages shaped as `{"event": name, "data": payload}`.
//! Serde's adjacent tagging maps that envelope straight onto the enums below.

use serde::{Deserialize, Serialize};

/// A chat message as the server sends it, over the channel or in a history page.
///
/// History pages omit `room_id`; the caller fills it in from the request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MessagePayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_system: bool,
}

/// A room entry from `GET /api/rooms` or the `POST /api/rooms` response.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RoomPayload {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub member_count: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TypingPayload {
    pub room_id: String,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PresencePayload {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct JoinSuccessPayload {
    pub room_id: String,
    #[serde(default)]
    pub room_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: String,
}

/// Events pushed by the server.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Message(MessagePayload),
    UserTyping(TypingPayload),
    UserStoppedTyping(TypingPayload),
    UserJoined(PresencePayload),
    UserLeft(PresencePayload),
    JoinSuccess(JoinSuccessPayload),
    Error(ErrorPayload),
}

/// Everything the channel can report: connection lifecycle plus server events.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected(String),
    Reconnected,
    Server(ServerEvent),
}

/// Events the client emits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    LeaveRoom { room_id: String },
    JoinRoom { room_id: String },
    SendMessage { room_id: String, message: String },
    TypingStart { room_id: String, username: String },
    TypingStop { room_id: String, username: String },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::LeaveRoom { .. } => "leave_room",
            OutboundEvent::JoinRoom { .. } => "join_room",
            OutboundEvent::SendMessage { .. } => "send_message",
            OutboundEvent::TypingStart { .. } => "typing_start",
            OutboundEvent::TypingStop { .. } => "typing_stop",
        }
    }
}

/// Body of `POST /api/rooms`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateRoomRequest {
    pub name: String,
    pub description: String,
    pub is_private: bool,
}

/// Body of `GET /api/messages/{room_id}`.
#[derive(Deserialize, Debug)]
pub(crate) struct MessagePage {
    #[serde(default)]
    pub messages: Vec<MessagePayload>,
}

/// Error body returned by the server on non-2xx responses.
#[derive(Deserialize, Debug)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}
