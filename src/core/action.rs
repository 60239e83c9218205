//! # Actions and Effects
//!
//! Everything that can happen in the client becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Server pushes a message? That's `Action::Channel(ChannelEvent::Server(..))`.
//!
//! A controller folds each action into its state and answers with the
//! `Effect`s the runtime must perform. No I/O happens in the controller.
//!
//! ```text
//! State + Action  →  update()  →  New State + Vec<Effect>
//! ```
//!
//! Time is an input too: controllers receive `now` with every action and
//! check their deadlines on `Action::Tick`.

use crate::core::model::CreateRoomForm;
use crate::net::{ChannelEvent, CreateRoomRequest, MessagePayload, OutboundEvent, RoomPayload};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Periodic clock tick; drives auto-join, typing idle, toast expiry and reload.
    Tick,
    Resize { width: u16, height: u16 },
    /// Terminal focus, standing in for page visibility.
    FocusChanged(bool),
    SelectRoom(String),
    /// Move the selection through the visible room list by `n` entries.
    CycleRoom(isize),
    Submit(String),
    /// A keystroke changed the message input.
    InputChanged,
    /// The message input lost focus.
    InputBlurred,
    ToggleDrawer,
    Search(String),
    OpenCreateRoom,
    CloseModal,
    SubmitCreateRoom(CreateRoomForm),
    GrantNotifications,
    Logout,
    Quit,
    Channel(ChannelEvent),
    MessagesLoaded {
        room_id: String,
        result: Result<Vec<MessagePayload>, String>,
    },
    /// Outcome of `POST /api/rooms`; `Err` carries the text to show.
    RoomCreated(Result<RoomPayload, String>),
}

/// Side effects requested by a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(OutboundEvent),
    FetchMessages {
        room_id: String,
        page: u32,
        per_page: u32,
    },
    CreateRoom(CreateRoomRequest),
    PlaySound,
    DesktopNotification { title: String, body: String },
    /// Rebuild the controller from a fresh room list.
    Reload,
    Logout,
    Quit,
}
