//! Translates terminal events into controller `Action`s.
//!
//! Routing depends on what has keyboard focus:
//!
//! - the create-room dialog, while open, takes every key
//! - global shortcuts (room switching, drawer, logout) work everywhere else
//! - `Focus::Input` feeds the composer; Esc or Tab moves to `Browse` and
//!   counts as a blur, which stops the typing indicator
//! - `Focus::Browse` lets arrow keys scroll; typing jumps back to `Input`
//! - `Focus::Search` edits the sidebar filter; Enter joins the first match
//!
//! Scroll keys always go to the message list.

use ratatui::layout::Position;

use crate::core::action::Action;
use crate::core::controller::Variant;
use crate::core::state::ChatState;
use crate::tui::component::EventHandler;
use crate::tui::components::room_list::RoomList;
use crate::tui::components::{CreateRoomEvent, InputEvent};
use crate::tui::event::TuiEvent;
use crate::tui::ui::ScreenLayout;
use crate::tui::{Focus, TuiState};

pub fn route_event(
    event: TuiEvent,
    state: &ChatState,
    variant: Variant,
    tui: &mut TuiState,
    screen: &ScreenLayout,
) -> Vec<Action> {
    match event {
        TuiEvent::ForceQuit => return vec![Action::Quit],
        TuiEvent::Resize(width, height) => return vec![Action::Resize { width, height }],
        TuiEvent::FocusGained => return vec![Action::FocusChanged(true)],
        TuiEvent::FocusLost => return vec![Action::FocusChanged(false)],
        _ => {}
    }

    if let Some(dialog) = tui.create_room.as_mut() {
        return match dialog.handle_event(&event) {
            Some(CreateRoomEvent::Submit(form)) => vec![Action::SubmitCreateRoom(form)],
            Some(CreateRoomEvent::Dismiss) => vec![Action::CloseModal],
            None => Vec::new(),
        };
    }

    match event {
        TuiEvent::NextRoom => return vec![Action::CycleRoom(1)],
        TuiEvent::PrevRoom => return vec![Action::CycleRoom(-1)],
        TuiEvent::ToggleDrawer => return vec![Action::ToggleDrawer],
        TuiEvent::CreateRoom => return vec![Action::OpenCreateRoom],
        TuiEvent::EnableNotifications => return vec![Action::GrantNotifications],
        TuiEvent::Logout => return vec![Action::Logout],
        TuiEvent::Search => {
            if variant == Variant::Minimal {
                return Vec::new();
            }
            return move_focus(tui, Focus::Search);
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            return Vec::new();
        }
        TuiEvent::MouseClick(column, row) => return click(column, row, state, tui, screen),
        _ => {}
    }

    match tui.focus {
        Focus::Input => match event {
            TuiEvent::Escape | TuiEvent::Tab | TuiEvent::BackTab => {
                move_focus(tui, Focus::Browse)
            }
            other => forward_to_input(tui, &other),
        },
        Focus::Browse => match event {
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                tui.focus = Focus::Input;
                forward_to_input(tui, &event)
            }
            TuiEvent::Submit | TuiEvent::Tab | TuiEvent::BackTab => {
                tui.focus = Focus::Input;
                Vec::new()
            }
            _ => Vec::new(),
        },
        Focus::Search => search(event, state, tui),
    }
}

/// Change focus. Leaving the composer is a blur.
fn move_focus(tui: &mut TuiState, focus: Focus) -> Vec<Action> {
    let was_input = tui.focus == Focus::Input;
    tui.focus = focus;
    if was_input && focus != Focus::Input {
        vec![Action::InputBlurred]
    } else {
        Vec::new()
    }
}

fn forward_to_input(tui: &mut TuiState, event: &TuiEvent) -> Vec<Action> {
    match tui.input_box.handle_event(event) {
        Some(InputEvent::Submit(text)) => vec![Action::Submit(text)],
        Some(InputEvent::ContentChanged) => vec![Action::InputChanged],
        None => Vec::new(),
    }
}

fn search(event: TuiEvent, state: &ChatState, tui: &mut TuiState) -> Vec<Action> {
    let mut query = state.search_query.clone();
    match event {
        TuiEvent::InputChar('\n') => return Vec::new(),
        TuiEvent::InputChar(c) => query.push(c),
        TuiEvent::Paste(text) => query.push_str(&text.replace('\n', " ")),
        TuiEvent::Backspace => {
            if query.pop().is_none() {
                return Vec::new();
            }
        }
        TuiEvent::Submit => {
            tui.focus = Focus::Input;
            return state
                .visible_rooms()
                .first()
                .map(|room| vec![Action::SelectRoom(room.id.clone())])
                .unwrap_or_default();
        }
        TuiEvent::Escape => {
            tui.focus = Focus::Input;
            return vec![Action::Search(String::new())];
        }
        TuiEvent::Tab | TuiEvent::BackTab => {
            tui.focus = Focus::Input;
            return Vec::new();
        }
        _ => return Vec::new(),
    }
    vec![Action::Search(query)]
}

fn click(
    column: u16,
    row: u16,
    state: &ChatState,
    tui: &mut TuiState,
    screen: &ScreenLayout,
) -> Vec<Action> {
    let position = Position::new(column, row);
    if let Some(sidebar) = screen.sidebar
        && sidebar.contains(position)
    {
        let rooms = state.visible_rooms();
        return RoomList::room_index_at(sidebar, row, rooms.len())
            .map(|index| vec![Action::SelectRoom(rooms[index].id.clone())])
            .unwrap_or_default();
    }
    if screen.input.contains(position) {
        tui.focus = Focus::Input;
        return Vec::new();
    }
    if screen.messages.contains(position) {
        return move_focus(tui, Focus::Browse);
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::Effect;
    use crate::core::config::ControllerSettings;
    use crate::core::controller::{ChatController, Controller};
    use crate::core::model::CreateRoomForm;
    use crate::core::scroll::ScrollPolicy;
    use crate::net::OutboundEvent;
    use std::time::Instant;
    use crate::test_support::{room, test_state};
    use crate::tui::components::CreateRoomState;
    use crate::tui::ui::compute_layout;
    use ratatui::layout::Rect;

    fn setup() -> (ChatState, TuiState, ScreenLayout) {
        let mut state = test_state(vec![room("r1", "general"), room("r2", "random")]);
        state.viewport_width = 120;
        let screen = compute_layout(Rect::new(0, 0, 120, 30), &state, Variant::Full, 80, 3);
        (state, TuiState::new(ScrollPolicy::default(), Variant::Full), screen)
    }

    fn route(event: TuiEvent, state: &ChatState, tui: &mut TuiState, screen: &ScreenLayout) -> Vec<Action> {
        route_event(event, state, Variant::Full, tui, screen)
    }

    #[test]
    fn typing_reports_input_changes_and_submit() {
        let (state, mut tui, screen) = setup();
        assert_eq!(
            route(TuiEvent::InputChar('h'), &state, &mut tui, &screen),
            vec![Action::InputChanged]
        );
        assert_eq!(
            route(TuiEvent::Submit, &state, &mut tui, &screen),
            vec![Action::Submit("h".to_string())]
        );
        // Cleared only once a controller accepts the send
        assert_eq!(tui.input_box.buffer, "h");
    }

    #[test]
    fn submit_without_current_room_keeps_typed_text() {
        let (state, mut tui, screen) = setup();
        let now = Instant::now();
        let mut controller = ChatController::new(state, ControllerSettings::default(), now);
        for c in "hello".chars() {
            route(TuiEvent::InputChar(c), controller.state(), &mut tui, &screen);
        }

        let actions = route(TuiEvent::Submit, controller.state(), &mut tui, &screen);
        let effects: Vec<_> = actions
            .into_iter()
            .flat_map(|action| controller.update(action, now))
            .collect();
        tui.sync(controller.state());
        assert!(controller.state().current_room.is_none());
        assert!(effects.is_empty());
        assert_eq!(tui.input_box.buffer, "hello");

        controller.update(Action::SelectRoom("r1".to_string()), now);
        let actions = route(TuiEvent::Submit, controller.state(), &mut tui, &screen);
        let effects: Vec<_> = actions
            .into_iter()
            .flat_map(|action| controller.update(action, now))
            .collect();
        tui.sync(controller.state());
        assert!(effects.contains(&Effect::Emit(OutboundEvent::SendMessage {
            room_id: "r1".to_string(),
            message: "hello".to_string()
        })));
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn escape_blurs_input_and_typing_refocuses() {
        let (state, mut tui, screen) = setup();
        assert_eq!(
            route(TuiEvent::Escape, &state, &mut tui, &screen),
            vec![Action::InputBlurred]
        );
        assert_eq!(tui.focus, Focus::Browse);
        assert!(route(TuiEvent::Escape, &state, &mut tui, &screen).is_empty());

        assert_eq!(
            route(TuiEvent::InputChar('x'), &state, &mut tui, &screen),
            vec![Action::InputChanged]
        );
        assert_eq!(tui.focus, Focus::Input);
        assert_eq!(tui.input_box.buffer, "x");
    }

    #[test]
    fn search_edits_query_and_enter_joins_first_match() {
        let (mut state, mut tui, screen) = setup();
        assert_eq!(
            route(TuiEvent::Search, &state, &mut tui, &screen),
            vec![Action::InputBlurred]
        );
        assert_eq!(
            route(TuiEvent::InputChar('r'), &state, &mut tui, &screen),
            vec![Action::Search("r".to_string())]
        );
        state.search_query = "ran".to_string();
        assert_eq!(
            route(TuiEvent::Submit, &state, &mut tui, &screen),
            vec![Action::SelectRoom("r2".to_string())]
        );
        assert_eq!(tui.focus, Focus::Input);
    }

    #[test]
    fn open_dialog_captures_keys() {
        let (state, mut tui, screen) = setup();
        tui.create_room = Some(CreateRoomState::new());
        assert!(route(TuiEvent::InputChar('a'), &state, &mut tui, &screen).is_empty());
        assert!(route(TuiEvent::Logout, &state, &mut tui, &screen).is_empty());
        assert_eq!(
            route(TuiEvent::Submit, &state, &mut tui, &screen),
            vec![Action::SubmitCreateRoom(CreateRoomForm {
                name: "a".to_string(),
                ..Default::default()
            })]
        );
        assert_eq!(
            route(TuiEvent::Escape, &state, &mut tui, &screen),
            vec![Action::CloseModal]
        );
    }

    #[test]
    fn clicking_a_room_selects_it() {
        let (state, mut tui, screen) = setup();
        assert_eq!(
            route(TuiEvent::MouseClick(3, 3), &state, &mut tui, &screen),
            vec![Action::SelectRoom("r2".to_string())]
        );
    }

    #[test]
    fn global_shortcuts() {
        let (state, mut tui, screen) = setup();
        assert_eq!(
            route(TuiEvent::NextRoom, &state, &mut tui, &screen),
            vec![Action::CycleRoom(1)]
        );
        assert_eq!(
            route(TuiEvent::FocusLost, &state, &mut tui, &screen),
            vec![Action::FocusChanged(false)]
        );
        assert_eq!(
            route(TuiEvent::ForceQuit, &state, &mut tui, &screen),
            vec![Action::Quit]
        );
    }

    #[test]
    fn minimal_variant_has_no_search() {
        let (state, mut tui, screen) = setup();
        assert!(route_event(TuiEvent::Search, &state, Variant::Minimal, &mut tui, &screen).is_empty());
        assert_eq!(tui.focus, Focus::Input);
    }
}
