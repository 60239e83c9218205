//! # Minimal Controller
//!
//! Fallback for terminals the probe deems too limited. Connects, sends,
//! receives messages for the current room and switches rooms with a history
//! load. Typing presence, unread badges, notifications, toasts and the
//! create-room dialog are not offered; their actions are ignored.

use std::time::Instant;

use log::{debug, info};

use super::{Controller, Variant, apply_loaded_messages, cycle_target};
use crate::core::action::{Action, Effect};
use crate::core::config::ControllerSettings;
use crate::core::model::{ChatMessage, Room};
use crate::core::state::ChatState;
use crate::net::{ChannelEvent, OutboundEvent, ServerEvent};

pub struct MinimalController {
    state: ChatState,
    settings: ControllerSettings,
    auto_join_at: Option<Instant>,
}

impl MinimalController {
    pub fn new(state: ChatState, settings: ControllerSettings, now: Instant) -> Self {
        Self {
            auto_join_at: Some(now + settings.auto_join_delay),
            state,
            settings,
        }
    }

    /// Switch rooms without leaving the previous one.
    fn join_room(&mut self, room: Room) -> Vec<Effect> {
        if self.state.is_current(&room.id) {
            return Vec::new();
        }
        info!("Joining room {} ({})", room.name, room.id);
        let room_id = room.id.clone();
        self.state.status_message = format!("#{}", room.name);
        self.state.current_room = Some(room);
        self.state.replace_messages(Vec::new());
        vec![
            Effect::Emit(OutboundEvent::JoinRoom {
                room_id: room_id.clone(),
            }),
            Effect::FetchMessages {
                room_id,
                page: 1,
                per_page: self.settings.messages_per_page,
            },
        ]
    }

    fn select_room(&mut self, room_id: &str) -> Vec<Effect> {
        match self.state.rooms.get(room_id).cloned() {
            Some(room) => self.join_room(room),
            None => Vec::new(),
        }
    }
}

impl Controller for MinimalController {
    fn variant(&self) -> Variant {
        Variant::Minimal
    }

    fn state(&self) -> &ChatState {
        &self.state
    }

    fn update(&mut self, action: Action, now: Instant) -> Vec<Effect> {
        match action {
            Action::Tick => {
                if self.auto_join_at.is_some_and(|at| now >= at) {
                    self.auto_join_at = None;
                    match self.state.rooms.first().cloned() {
                        Some(room) => return self.join_room(room),
                        None => {
                            self.state.current_room = Some(Room::default_room());
                            self.state.replace_messages(Vec::new());
                        }
                    }
                }
            }
            Action::Resize { width, .. } => self.state.viewport_width = width,
            Action::SelectRoom(room_id) => return self.select_room(&room_id),
            Action::CycleRoom(step) => {
                if let Some(room_id) = cycle_target(&self.state, step) {
                    return self.select_room(&room_id);
                }
            }
            Action::Submit(text) => {
                let text = text.trim();
                if let Some(room_id) = self.state.current_room_id()
                    && !text.is_empty()
                {
                    let event = OutboundEvent::SendMessage {
                        room_id: room_id.to_string(),
                        message: text.to_string(),
                    };
                    self.state.sent_count += 1;
                    return vec![Effect::Emit(event)];
                }
            }
            Action::Channel(ChannelEvent::Connected) => {
                self.state.connected = true;
                self.state.status_message = String::from("Connected");
            }
            Action::Channel(ChannelEvent::Disconnected(reason)) => {
                info!("Disconnected: {}", reason);
                self.state.connected = false;
                self.state.status_message = String::from("Disconnected");
            }
            Action::Channel(ChannelEvent::Server(ServerEvent::Message(payload))) => {
                if let Some(message) = ChatMessage::from_payload(payload, None)
                    && self.state.is_current(&message.room_id)
                {
                    self.state.show_welcome = false;
                    self.state.messages.push(message);
                }
            }
            Action::MessagesLoaded { room_id, result } => {
                apply_loaded_messages(&mut self.state, &room_id, result);
            }
            Action::Logout => return vec![Effect::Logout],
            Action::Quit => return vec![Effect::Quit],
            other => debug!("Minimal controller ignoring {:?}", other),
        }
        Vec::new()
    }
}
