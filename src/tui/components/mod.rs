//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields, built each frame:
//! - `RoomHeader`: current room, connection state, "↓ New" affordance
//! - `RoomList`: sidebar with search, rooms and unread badges
//! - `Message`: a single chat message
//! - `ToastStack`, `Welcome`
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it to
//! render, and the state handles `TuiEvent`s through `EventHandler`:
//! - `InputBox`: message composer
//! - `MessageList` / `MessageListState`: scrollable history with layout caching
//! - `CreateRoomDialog` / `CreateRoomState`: modal form
//!
//! Components never touch the controller. They read `ChatState` fields passed
//! in as props and emit high-level events that the runtime turns into
//! `Action`s.

pub mod create_room;
pub mod input_box;
pub mod message;
pub mod message_list;
pub mod room_header;
pub mod room_list;
pub mod toast;
pub mod welcome;

pub use create_room::{CreateRoomDialog, CreateRoomEvent, CreateRoomState};
pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use room_header::RoomHeader;
pub use room_list::RoomList;
pub use toast::ToastStack;
pub use welcome::Welcome;
