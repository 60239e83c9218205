//! # Controllers
//!
//! Two interchangeable state machines drive the chat:
//!
//! - [`full::ChatController`]: rooms, typing presence, unread badges,
//!   notifications, toasts and the create-room dialog
//! - [`minimal::MinimalController`]: connect, send, receive, switch rooms
//!
//! Which one runs is decided up front by [`probe`] from the configured
//! [`UiMode`] and what the terminal reports about itself. The runtime owns
//! the result as a `Box<dyn Controller>`; nothing is global.

pub mod full;
pub mod minimal;

use std::time::Instant;

use log::{debug, warn};

use crate::core::action::{Action, Effect};
use crate::core::config::{ControllerSettings, UiMode};
use crate::core::model::ChatMessage;
use crate::core::state::ChatState;
use crate::net::MessagePayload;

pub use full::ChatController;
pub use minimal::MinimalController;

/// Terminals smaller than this get the minimal controller in `auto` mode.
pub const MIN_FULL_WIDTH: u16 = 60;
pub const MIN_FULL_HEIGHT: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Full,
    Minimal,
}

pub trait Controller {
    fn variant(&self) -> Variant;

    fn state(&self) -> &ChatState;

    /// Fold one action into the state and return the effects to perform.
    fn update(&mut self, action: Action, now: Instant) -> Vec<Effect>;
}

/// What the runtime could find out about its environment.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub mode: UiMode,
    /// Value of `$TERM`, if set.
    pub term: Option<String>,
    /// `(columns, rows)`, or `None` when the size query failed.
    pub terminal_size: Option<(u16, u16)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub variant: Variant,
    pub reasons: Vec<String>,
}

/// Pick a controller variant. Every reason that influenced the choice is
/// listed in the report so the decision can be logged.
pub fn probe(caps: &Capabilities) -> ProbeReport {
    match caps.mode {
        UiMode::Full => {
            return ProbeReport {
                variant: Variant::Full,
                reasons: vec!["full interface forced by configuration".to_string()],
            };
        }
        UiMode::Minimal => {
            return ProbeReport {
                variant: Variant::Minimal,
                reasons: vec!["minimal interface forced by configuration".to_string()],
            };
        }
        UiMode::Auto => {}
    }

    let mut reasons = Vec::new();
    if caps.term.as_deref() == Some("dumb") {
        reasons.push("TERM=dumb".to_string());
    }
    match caps.terminal_size {
        None => reasons.push("terminal size unavailable".to_string()),
        Some((width, height)) if width < MIN_FULL_WIDTH || height < MIN_FULL_HEIGHT => {
            reasons.push(format!(
                "terminal {width}x{height} is smaller than {MIN_FULL_WIDTH}x{MIN_FULL_HEIGHT}"
            ));
        }
        Some(_) => {}
    }

    if reasons.is_empty() {
        ProbeReport {
            variant: Variant::Full,
            reasons: vec!["terminal supports the full interface".to_string()],
        }
    } else {
        ProbeReport {
            variant: Variant::Minimal,
            reasons,
        }
    }
}

/// Construct the controller for `variant` around an initial state.
pub fn build(
    variant: Variant,
    state: ChatState,
    settings: ControllerSettings,
    now: Instant,
) -> Box<dyn Controller> {
    match variant {
        Variant::Full => Box::new(ChatController::new(state, settings, now)),
        Variant::Minimal => Box::new(MinimalController::new(state, settings, now)),
    }
}

/// Id of the room `step` entries away from the current one in the visible
/// sidebar list, wrapping at both ends. With no current room, positive steps
/// start from the top and negative ones from the bottom.
pub(crate) fn cycle_target(state: &ChatState, step: isize) -> Option<String> {
    let rooms = state.visible_rooms();
    if rooms.is_empty() || step == 0 {
        return None;
    }
    let len = rooms.len() as isize;
    let current = state
        .current_room_id()
        .and_then(|id| rooms.iter().position(|room| room.id == id));
    let index = match current {
        Some(index) => (index as isize + step).rem_euclid(len),
        None if step > 0 => (step - 1).rem_euclid(len),
        None => step.rem_euclid(len),
    };
    Some(rooms[index as usize].id.clone())
}

/// Apply a history response. Pages arrive newest-first and are reversed.
/// Responses for a room that is no longer current are dropped; failures
/// leave the welcome state showing.
pub(crate) fn apply_loaded_messages(
    state: &mut ChatState,
    room_id: &str,
    result: Result<Vec<MessagePayload>, String>,
) {
    if !state.is_current(room_id) {
        debug!("Discarding stale history for room {}", room_id);
        return;
    }
    match result {
        Ok(payloads) => {
            let mut messages: Vec<ChatMessage> = payloads
                .into_iter()
                .filter_map(|payload| ChatMessage::from_payload(payload, Some(room_id)))
                .collect();
            messages.reverse();
            debug!("Loaded {} messages for room {}", messages.len(), room_id);
            state.replace_messages(messages);
        }
        Err(e) => {
            warn!("Failed to load messages for room {}: {}", room_id, e);
            state.replace_messages(Vec::new());
        }
    }
}
