//! # Chat State
//!
//! Everything a controller knows, in one place. Renderers read it; only a
//! controller's `update` writes it.
//!
//! ```text
//! ChatState
//! ├── user: User                    // local user (client-side id)
//! ├── rooms: RoomRegistry           // sidebar rooms, fixed after startup
//! ├── current_room: Option<Room>    // at most one
//! ├── messages: Vec<ChatMessage>    // render buffer of the current room
//! ├── list_epoch: u64               // bumped when the buffer is replaced
//! ├── show_welcome: bool            // empty/welcome state in the message area
//! ├── typing: TypingSet             // remote typers in the current room
//! ├── unread: UnreadCounts          // per-room badges
//! ├── connected: bool               // channel status
//! ├── visible: bool                 // terminal focused
//! ├── viewport_width: u16           // last known terminal width
//! ├── drawer_open: bool             // room drawer on narrow terminals
//! ├── modal_open / creating_room    // create-room dialog
//! ├── toasts: Vec<Toast>            // auto-dismissed notices
//! ├── search_query: String          // sidebar filter
//! ├── notifications                 // desktop notification permission
//! └── status_message: String        // status line
//! ```

use std::time::{Duration, Instant};

use crate::core::config::NotificationPermission;
use crate::core::model::{ChatMessage, Room, RoomRegistry, User};
use crate::core::typing::TypingSet;
use crate::core::unread::UnreadCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ChatState {
    pub user: User,
    pub rooms: RoomRegistry,
    pub current_room: Option<Room>,
    pub messages: Vec<ChatMessage>,
    pub list_epoch: u64,
    pub show_welcome: bool,
    pub typing: TypingSet,
    pub unread: UnreadCounts,
    pub connected: bool,
    pub visible: bool,
    pub viewport_width: u16,
    pub drawer_open: bool,
    pub modal_open: bool,
    /// A create-room request is in flight.
    pub creating_room: bool,
    pub toasts: Vec<Toast>,
    pub search_query: String,
    pub notifications: NotificationPermission,
    pub status_message: String,
    /// Sends accepted so far. The composer clears each time this advances.
    pub sent_count: u64,
}

impl ChatState {
    pub fn new(user: User, rooms: RoomRegistry, notifications: NotificationPermission) -> Self {
        Self {
            user,
            rooms,
            current_room: None,
            messages: Vec::new(),
            list_epoch: 0,
            show_welcome: true,
            typing: TypingSet::default(),
            unread: UnreadCounts::default(),
            connected: false,
            visible: true,
            viewport_width: 0,
            drawer_open: false,
            modal_open: false,
            creating_room: false,
            toasts: Vec::new(),
            search_query: String::new(),
            notifications,
            status_message: String::from("Connecting..."),
            sent_count: 0,
        }
    }

    pub fn current_room_id(&self) -> Option<&str> {
        self.current_room.as_ref().map(|room| room.id.as_str())
    }

    pub fn is_current(&self, room_id: &str) -> bool {
        self.current_room_id() == Some(room_id)
    }

    /// Sidebar rooms after applying the search filter.
    pub fn visible_rooms(&self) -> Vec<&Room> {
        self.rooms.filtered(&self.search_query)
    }

    pub fn typing_text(&self) -> Option<String> {
        self.typing.indicator_text()
    }

    /// Replace the render buffer with a fresh list.
    pub fn replace_messages(&mut self, messages: Vec<ChatMessage>) {
        self.show_welcome = messages.is_empty();
        self.messages = messages;
        self.list_epoch += 1;
    }

    pub fn push_toast(&mut self, kind: ToastKind, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.toasts.push(Toast {
            kind,
            text: text.into(),
            expires_at: now + ttl,
        });
    }

    /// Drop expired toasts. Returns whether any were removed.
    pub fn expire_toasts(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        self.toasts.len() != before
    }
}
