//! # Full Controller
//!
//! The complete chat experience: room switching with leave/join, typing
//! presence in both directions, unread badges, notification routing,
//! toasts, sidebar search, the room drawer and the create-room dialog.
//!
//! ## Timers
//!
//! All timers are deadlines compared against the `now` passed to `update`
//! and checked on `Action::Tick`:
//!
//! | Timer        | Armed by                 | Fires                        |
//! |--------------|--------------------------|------------------------------|
//! | auto-join    | construction             | join first room / default    |
//! | typing idle  | every input keystroke    | `typing_stop`                |
//! | toast        | `push_toast`             | toast removed                |
//! | reload       | successful room creation | `Effect::Reload`             |

use std::time::Instant;

use log::{debug, info, warn};

use super::{Controller, Variant, apply_loaded_messages, cycle_target};
use crate::core::action::{Action, Effect};
use crate::core::config::{ControllerSettings, NotificationPermission};
use crate::core::format::slugify;
use crate::core::model::{ChatMessage, CreateRoomForm, Room};
use crate::core::state::{ChatState, ToastKind};
use crate::core::typing::LocalTyping;
use crate::net::{
    ChannelEvent, CreateRoomRequest, MessagePayload, OutboundEvent, RoomPayload, ServerEvent,
};

pub struct ChatController {
    state: ChatState,
    settings: ControllerSettings,
    local_typing: LocalTyping,
    auto_join_at: Option<Instant>,
    reload_at: Option<Instant>,
}

impl ChatController {
    pub fn new(mut state: ChatState, settings: ControllerSettings, now: Instant) -> Self {
        if state.notifications == NotificationPermission::Prompt {
            state.push_toast(
                ToastKind::Info,
                "Press Ctrl+G to enable desktop notifications",
                now,
                settings.toast_duration,
            );
        }
        Self {
            local_typing: LocalTyping::new(settings.typing_idle),
            auto_join_at: Some(now + settings.auto_join_delay),
            reload_at: None,
            state,
            settings,
        }
    }

    fn toast(&mut self, kind: ToastKind, text: impl Into<String>, now: Instant) {
        self.state
            .push_toast(kind, text, now, self.settings.toast_duration);
    }

    fn on_tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.state.expire_toasts(now);

        if self.auto_join_at.is_some_and(|at| now >= at) {
            self.auto_join_at = None;
            effects.extend(self.auto_join());
        }
        if self.local_typing.expired(now) {
            effects.extend(self.stop_typing());
        }
        if self.reload_at.is_some_and(|at| now >= at) {
            self.reload_at = None;
            info!("Reloading room list");
            effects.push(Effect::Reload);
        }
        effects
    }

    fn auto_join(&mut self) -> Vec<Effect> {
        match self.state.rooms.first().cloned() {
            Some(room) => self.join_room(room, true),
            None => {
                // No server rooms: show the default room without contacting the server.
                info!("No rooms available, showing default room");
                self.state.current_room = Some(Room::default_room());
                self.state.replace_messages(Vec::new());
                Vec::new()
            }
        }
    }

    /// Switch to `room`. A no-op when it is already current.
    fn join_room(&mut self, room: Room, load_messages: bool) -> Vec<Effect> {
        if self.state.is_current(&room.id) {
            return Vec::new();
        }
        info!("Joining room {} ({})", room.name, room.id);

        let mut effects = Vec::new();
        if let Some(previous) = self.state.current_room_id().map(str::to_string) {
            effects.push(Effect::Emit(OutboundEvent::LeaveRoom { room_id: previous }));
            effects.extend(self.stop_typing());
        }

        let room_id = room.id.clone();
        self.state.status_message = format!("#{}", room.name);
        self.state.current_room = Some(room);
        self.state.typing.clear();
        self.state.replace_messages(Vec::new());

        effects.push(Effect::Emit(OutboundEvent::JoinRoom {
            room_id: room_id.clone(),
        }));
        if load_messages {
            effects.push(Effect::FetchMessages {
                room_id: room_id.clone(),
                page: 1,
                per_page: self.settings.messages_per_page,
            });
        }
        self.state.unread.clear(&room_id);
        if self.state.viewport_width <= self.settings.narrow_width {
            self.state.drawer_open = false;
        }
        effects
    }

    fn select_room(&mut self, room_id: &str) -> Vec<Effect> {
        match self.state.rooms.get(room_id).cloned() {
            Some(room) => self.join_room(room, true),
            None => {
                warn!("Ignoring selection of unknown room {}", room_id);
                Vec::new()
            }
        }
    }

    /// Emits `typing_stop` only if the local user was typing.
    fn stop_typing(&mut self) -> Vec<Effect> {
        if !self.local_typing.stop() {
            return Vec::new();
        }
        match self.state.current_room_id() {
            Some(room_id) => vec![Effect::Emit(OutboundEvent::TypingStop {
                room_id: room_id.to_string(),
                username: self.state.user.username.clone(),
            })],
            None => Vec::new(),
        }
    }

    fn on_input(&mut self, now: Instant) -> Vec<Effect> {
        let Some(room_id) = self.state.current_room_id().map(str::to_string) else {
            return Vec::new();
        };
        if self.local_typing.keystroke(now) {
            vec![Effect::Emit(OutboundEvent::TypingStart {
                room_id,
                username: self.state.user.username.clone(),
            })]
        } else {
            Vec::new()
        }
    }

    fn send_message(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim();
        let Some(room_id) = self.state.current_room_id().map(str::to_string) else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }
        self.state.sent_count += 1;
        let mut effects = self.stop_typing();
        effects.push(Effect::Emit(OutboundEvent::SendMessage {
            room_id,
            message: text.to_string(),
        }));
        effects
    }

    fn on_message(&mut self, payload: MessagePayload) -> Vec<Effect> {
        let Some(message) = ChatMessage::from_payload(payload, None) else {
            warn!("Dropping message without a room id");
            return Vec::new();
        };
        let is_current = self.state.is_current(&message.room_id);
        let from_me = message.username == self.state.user.username;

        let mut effects = Vec::new();
        if !from_me {
            if self.state.visible && !is_current {
                effects.push(Effect::PlaySound);
            } else if !self.state.visible
                && self.state.notifications == NotificationPermission::Granted
            {
                let room_name = self
                    .state
                    .rooms
                    .get(&message.room_id)
                    .or(self.state.current_room.as_ref().filter(|_| is_current))
                    .map_or("Chat", |room| room.name.as_str());
                effects.push(Effect::DesktopNotification {
                    title: format!("{} in {}", message.username, room_name),
                    body: message.text.clone(),
                });
            }
        }

        if is_current {
            self.state.show_welcome = false;
            self.state.messages.push(message);
        } else {
            debug!("Message for room {} counted as unread", message.room_id);
            self.state.unread.increment(&message.room_id);
        }
        effects
    }

    fn on_channel(&mut self, event: ChannelEvent) -> Vec<Effect> {
        match event {
            ChannelEvent::Connected => {
                self.state.connected = true;
                self.state.status_message = String::from("Connected");
                Vec::new()
            }
            ChannelEvent::Disconnected(reason) => {
                info!("Disconnected: {}", reason);
                self.state.connected = false;
                self.state.status_message = String::from("Disconnected");
                Vec::new()
            }
            ChannelEvent::Reconnected => {
                info!("Reconnected");
                match self.state.current_room_id() {
                    Some(room_id) => vec![Effect::Emit(OutboundEvent::JoinRoom {
                        room_id: room_id.to_string(),
                    })],
                    None => Vec::new(),
                }
            }
            ChannelEvent::Server(event) => self.on_server_event(event),
        }
    }

    fn on_server_event(&mut self, event: ServerEvent) -> Vec<Effect> {
        match event {
            ServerEvent::Message(payload) => return self.on_message(payload),
            ServerEvent::UserTyping(typing) => {
                if self.state.is_current(&typing.room_id)
                    && typing.username != self.state.user.username
                {
                    self.state.typing.insert(&typing.username);
                }
            }
            ServerEvent::UserStoppedTyping(typing) => {
                self.state.typing.remove(&typing.username);
            }
            ServerEvent::UserJoined(presence) | ServerEvent::UserLeft(presence) => {
                if presence
                    .room_id
                    .as_deref()
                    .is_some_and(|id| self.state.is_current(id))
                {
                    info!(
                        "Presence change in current room: {}",
                        presence.username.as_deref().unwrap_or("someone")
                    );
                }
            }
            ServerEvent::JoinSuccess(joined) => {
                info!(
                    "Joined {} ({})",
                    joined.room_name.as_deref().unwrap_or("room"),
                    joined.room_id
                );
            }
            ServerEvent::Error(error) => {
                warn!("Server error: {}", error.message);
            }
        }
        Vec::new()
    }

    fn submit_create_room(&mut self, form: CreateRoomForm, now: Instant) -> Vec<Effect> {
        if self.state.creating_room {
            return Vec::new();
        }
        if form.name.trim().is_empty() {
            self.toast(ToastKind::Error, "Room name is required", now);
            return Vec::new();
        }
        self.state.creating_room = true;
        vec![Effect::CreateRoom(CreateRoomRequest {
            name: slugify(&form.name),
            description: form.description.trim().to_string(),
            is_private: form.is_private,
        })]
    }

    fn on_room_created(&mut self, result: Result<RoomPayload, String>, now: Instant) {
        self.state.creating_room = false;
        match result {
            Ok(room) => {
                info!("Room {} created, reloading", room.name);
                self.state.modal_open = false;
                self.toast(ToastKind::Success, "Room created successfully", now);
                self.reload_at = Some(now + self.settings.reload_delay);
            }
            Err(message) => {
                warn!("Room creation failed: {}", message);
                self.toast(ToastKind::Error, message, now);
            }
        }
    }
}

impl Controller for ChatController {
    fn variant(&self) -> Variant {
        Variant::Full
    }

    fn state(&self) -> &ChatState {
        &self.state
    }

    fn update(&mut self, action: Action, now: Instant) -> Vec<Effect> {
        match action {
            Action::Tick => return self.on_tick(now),
            Action::Resize { width, .. } => self.state.viewport_width = width,
            Action::FocusChanged(visible) => {
                self.state.visible = visible;
                if visible {
                    if let Some(room_id) = self.state.current_room_id().map(str::to_string) {
                        self.state.unread.clear(&room_id);
                    }
                }
            }
            Action::SelectRoom(room_id) => return self.select_room(&room_id),
            Action::CycleRoom(step) => {
                if let Some(room_id) = cycle_target(&self.state, step) {
                    return self.select_room(&room_id);
                }
            }
            Action::Submit(text) => return self.send_message(&text),
            Action::InputChanged => return self.on_input(now),
            Action::InputBlurred => return self.stop_typing(),
            Action::ToggleDrawer => self.state.drawer_open = !self.state.drawer_open,
            Action::Search(query) => self.state.search_query = query,
            Action::OpenCreateRoom => self.state.modal_open = true,
            Action::CloseModal => self.state.modal_open = false,
            Action::SubmitCreateRoom(form) => return self.submit_create_room(form, now),
            Action::RoomCreated(result) => self.on_room_created(result, now),
            Action::GrantNotifications => {
                self.state.notifications = NotificationPermission::Granted;
                self.toast(ToastKind::Success, "Desktop notifications enabled", now);
            }
            Action::Logout => {
                let mut effects = self.stop_typing();
                effects.push(Effect::Logout);
                return effects;
            }
            Action::Quit => return vec![Effect::Quit],
            Action::Channel(event) => return self.on_channel(event),
            Action::MessagesLoaded { room_id, result } => {
                apply_loaded_messages(&mut self.state, &room_id, result);
            }
        }
        Vec::new()
    }
}
