//! # Domain Model
//!
//! ```text
//! User          who we are (client-side id, never sent as authority)
//! Room          one chat room; exactly one is current at a time, or none
//! ChatMessage   one rendered message, always bound to a room
//! RoomRegistry  ordered id → Room table, filled once at startup
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::net::{MessagePayload, RoomPayload};

/// Id and name of the synthetic room used when the server lists none.
pub const DEFAULT_ROOM_ID: &str = "general";

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    /// Client-generated, non-authoritative.
    pub id: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self {
            username: username.into(),
            id: format!("user_{}", &uuid[..9]),
        }
    }

    /// Uppercased first character, for the avatar badge.
    pub fn initial(&self) -> char {
        initial(&self.username)
    }
}

pub fn initial(name: &str) -> char {
    name.chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?')
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub member_count: Option<u32>,
}

impl Room {
    /// The local fallback room; installed without contacting the server.
    pub fn default_room() -> Self {
        Self {
            id: DEFAULT_ROOM_ID.to_string(),
            name: DEFAULT_ROOM_ID.to_string(),
            description: None,
            is_private: false,
            member_count: None,
        }
    }

    /// Header subtitle: the room's description, or a generic label by kind.
    pub fn subtitle(&self) -> &str {
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => desc,
            _ if self.is_private => "Direct message",
            _ => "Channel conversation",
        }
    }

    pub fn members_label(&self) -> String {
        format!("{} members", self.member_count.unwrap_or(1))
    }
}

impl From<RoomPayload> for Room {
    fn from(payload: RoomPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            description: payload.description,
            is_private: payload.is_private,
            member_count: payload.member_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Option<String>,
    pub room_id: String,
    pub user_id: Option<String>,
    pub username: String,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_system: bool,
}

impl ChatMessage {
    /// Build from a wire payload. History pages carry no `room_id`, so the
    /// requesting room is passed as `fallback_room`. Returns `None` when the
    /// message cannot be attributed to any room.
    pub fn from_payload(payload: MessagePayload, fallback_room: Option<&str>) -> Option<Self> {
        let room_id = payload
            .room_id
            .or_else(|| fallback_room.map(str::to_string))?;
        Some(Self {
            id: payload.id,
            room_id,
            user_id: payload.user_id,
            timestamp: payload.timestamp.as_deref().and_then(parse_timestamp),
            username: payload.username,
            text: payload.message,
            is_system: payload.is_system,
        })
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Input collected by the create-room dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateRoomForm {
    pub name: String,
    pub description: String,
    pub is_private: bool,
}

/// Ordered table of known rooms. Order is sidebar order; ids are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    /// Build from a room list, keeping the first occurrence of each id.
    pub fn from_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        let mut registry = Self::default();
        for room in rooms {
            registry.insert(room);
        }
        registry
    }

    /// Insert unless the id is already present. Returns whether it was added.
    pub fn insert(&mut self, room: Room) -> bool {
        if self.contains(&room.id) {
            return false;
        }
        self.rooms.push(room);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> Option<&Room> {
        self.rooms.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Rooms whose lowercase name contains the lowercase query.
    /// A blank query matches everything.
    pub fn filtered(&self, query: &str) -> Vec<&Room> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.rooms.iter().collect();
        }
        self.rooms
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::room;

    #[test]
    fn user_id_is_prefixed_and_short() {
        let user = User::new("alice");
        assert!(user.id.starts_with("user_"));
        assert_eq!(user.id.len(), "user_".len() + 9);
        assert_eq!(user.initial(), 'A');
    }

    #[test]
    fn initial_of_empty_name_is_placeholder() {
        assert_eq!(initial(""), '?');
    }

    #[test]
    fn subtitle_falls_back_by_kind() {
        let mut r = room("r1", "general");
        assert_eq!(r.subtitle(), "Channel conversation");
        r.is_private = true;
        assert_eq!(r.subtitle(), "Direct message");
        r.description = Some("Welcome!".to_string());
        assert_eq!(r.subtitle(), "Welcome!");
    }

    #[test]
    fn members_label_defaults_to_one() {
        let mut r = room("r1", "general");
        assert_eq!(r.members_label(), "1 members");
        r.member_count = Some(7);
        assert_eq!(r.members_label(), "7 members");
    }

    #[test]
    fn registry_dedups_by_id_and_keeps_order() {
        let registry = RoomRegistry::from_rooms(vec![
            room("a", "alpha"),
            room("b", "beta"),
            room("a", "alpha again"),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.first().unwrap().id, "a");
        assert_eq!(registry.get("a").unwrap().name, "alpha");
    }

    #[test]
    fn registry_filter_is_case_insensitive() {
        let registry =
            RoomRegistry::from_rooms(vec![room("a", "General"), room("b", "random-talk")]);
        let names: Vec<&str> = registry.filtered("GEN").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["General"]);
        assert_eq!(registry.filtered("   ").len(), 2);
        assert!(registry.filtered("zzz").is_empty());
    }

    #[test]
    fn payload_without_room_uses_fallback() {
        let payload = MessagePayload {
            id: Some("m1".to_string()),
            room_id: None,
            user_id: Some("u1".to_string()),
            username: "bob".to_string(),
            message: "hi".to_string(),
            timestamp: Some("2024-06-15T12:00:00.123456".to_string()),
            is_system: false,
        };
        let msg = ChatMessage::from_payload(payload.clone(), Some("r1")).unwrap();
        assert_eq!(msg.room_id, "r1");
        assert!(msg.timestamp.is_some());
        assert!(ChatMessage::from_payload(payload, None).is_none());
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_naive() {
        let a = parse_timestamp("2024-06-15T12:00:00Z").unwrap();
        let b = parse_timestamp("2024-06-15T12:00:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
