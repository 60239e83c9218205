//! Frame layout and top-level drawing.
//!
//! ```text
//! Full (wide)                              Full (narrow, drawer open)
//! ┌ Rooms ──┐ # general · ...  ● Connected  ┌ Rooms ──┐ral · ...
//! │ / search│ messages                      │ # genera│
//! │ # genera│                               │ # random│
//! │ # random│ bob is typing...              │ A alice │
//! │ A alice │ ╭ Message #general ─────────╮ └─────────┘─────╮
//! └─────────┘ ╰───────────────── 0/2000 ─╯  ╰────── 0/2000 ─╯
//! ```
//!
//! The minimal variant drops the sidebar and typing line. Toasts and the
//! create-room dialog are drawn last, over everything else.

use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Clear, Paragraph};

use crate::core::controller::Variant;
use crate::core::state::ChatState;
use crate::tui::component::Component;
use crate::tui::components::room_list::SIDEBAR_WIDTH;
use crate::tui::components::{
    CreateRoomDialog, MessageList, RoomHeader, RoomList, ToastStack,
};
use crate::tui::{Focus, TuiState};

/// Where each region of the screen goes for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    /// `None` when the sidebar is hidden (minimal, or a closed drawer)
    pub sidebar: Option<Rect>,
    pub header: Rect,
    pub messages: Rect,
    pub typing: Option<Rect>,
    pub input: Rect,
}

/// The sidebar is a drawer when the viewport is at or below this width.
pub fn is_narrow(state: &ChatState, narrow_width: u16) -> bool {
    state.viewport_width <= narrow_width
}

/// Width of the column holding the header, messages and composer.
pub fn main_column_width(area: Rect, state: &ChatState, variant: Variant, narrow_width: u16) -> u16 {
    if variant == Variant::Minimal || is_narrow(state, narrow_width) {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH.min(area.width))
    }
}

pub fn compute_layout(
    area: Rect,
    state: &ChatState,
    variant: Variant,
    narrow_width: u16,
    input_height: u16,
) -> ScreenLayout {
    use Constraint::{Length, Min};

    if variant == Variant::Minimal {
        let [header, messages, input] =
            Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(area);
        return ScreenLayout {
            sidebar: None,
            header,
            messages,
            typing: None,
            input,
        };
    }

    let sidebar_width = SIDEBAR_WIDTH.min(area.width);
    let (sidebar, main) = if is_narrow(state, narrow_width) {
        let drawer = state
            .drawer_open
            .then(|| Rect::new(area.x, area.y, sidebar_width, area.height));
        (drawer, area)
    } else {
        let [sidebar, main] = Layout::horizontal([Length(sidebar_width), Min(0)]).areas(area);
        (Some(sidebar), main)
    };

    let [header, messages, typing, input] =
        Layout::vertical([Length(1), Min(0), Length(1), Length(input_height)]).areas(main);
    ScreenLayout {
        sidebar,
        header,
        messages,
        typing: Some(typing),
        input,
    }
}

pub fn draw_ui(
    frame: &mut Frame,
    state: &ChatState,
    variant: Variant,
    narrow_width: u16,
    tui: &mut TuiState,
) {
    let area = frame.area();
    let input_height = tui
        .input_box
        .calculate_height(main_column_width(area, state, variant, narrow_width));
    let layout = compute_layout(area, state, variant, narrow_width, input_height);

    // The list decides whether the latest append left content unseen
    MessageList {
        state: &mut tui.message_list,
        messages: &state.messages,
        epoch: state.list_epoch,
        show_welcome: state.show_welcome,
        room_name: state.current_room.as_ref().map(|room| room.name.as_str()),
        own_username: &state.user.username,
        now: Utc::now(),
    }
    .render(frame, layout.messages);

    RoomHeader {
        room: state.current_room.as_ref(),
        connected: state.connected,
        has_unseen_content: tui.message_list.has_unseen_content,
        status_message: &state.status_message,
    }
    .render(frame, layout.header);

    if let Some(typing) = layout.typing
        && let Some(text) = state.typing_text()
    {
        frame.render_widget(
            Paragraph::new(text).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
            typing,
        );
    }

    tui.input_box.render(frame, layout.input);

    // Drawn after the main column so a narrow drawer overlays it
    if let Some(sidebar) = layout.sidebar {
        let rooms = state.visible_rooms();
        frame.render_widget(Clear, sidebar);
        RoomList {
            rooms: &rooms,
            current_room_id: state.current_room_id(),
            unread: &state.unread,
            user: &state.user,
            search_query: &state.search_query,
            search_focused: tui.focus == Focus::Search,
            focused: tui.focus != Focus::Input,
        }
        .render(frame, sidebar);
    }

    if let Some(dialog) = tui.create_room.as_mut() {
        CreateRoomDialog {
            state: dialog,
            busy: state.creating_room,
        }
        .render(frame, area);
    }

    ToastStack {
        toasts: &state.toasts,
    }
    .render(frame, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scroll::ScrollPolicy;
    use crate::core::state::ToastKind;
    use crate::core::model::ChatMessage;
    use crate::tui::component::EventHandler;
    use crate::tui::event::TuiEvent;
    use crate::test_support::{payload, room, test_state};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::{Duration, Instant};

    const NARROW: u16 = 80;

    fn draw(state: &ChatState, variant: Variant, tui: &mut TuiState, width: u16) -> String {
        let backend = TestBackend::new(width, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_ui(f, state, variant, NARROW, tui))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn wide_state() -> ChatState {
        let mut state = test_state(vec![room("r1", "general"), room("r2", "random")]);
        state.viewport_width = 120;
        state.current_room = state.rooms.get("r1").cloned();
        state
    }

    #[test]
    fn test_wide_layout_has_sidebar() {
        let state = wide_state();
        let layout = compute_layout(Rect::new(0, 0, 120, 20), &state, Variant::Full, NARROW, 3);
        assert_eq!(layout.sidebar, Some(Rect::new(0, 0, SIDEBAR_WIDTH, 20)));
        assert_eq!(layout.header.x, SIDEBAR_WIDTH);
        assert_eq!(layout.input.height, 3);
        assert!(layout.typing.is_some());
    }

    #[test]
    fn test_narrow_layout_uses_drawer() {
        let mut state = wide_state();
        state.viewport_width = 70;
        let area = Rect::new(0, 0, 70, 20);
        let closed = compute_layout(area, &state, Variant::Full, NARROW, 3);
        assert_eq!(closed.sidebar, None);
        assert_eq!(closed.header.x, 0);

        state.drawer_open = true;
        let open = compute_layout(area, &state, Variant::Full, NARROW, 3);
        assert!(open.sidebar.is_some());
        assert_eq!(open.header.x, 0);
    }

    #[test]
    fn test_minimal_layout_is_single_column() {
        let state = wide_state();
        let layout = compute_layout(Rect::new(0, 0, 120, 20), &state, Variant::Minimal, NARROW, 3);
        assert_eq!(layout.sidebar, None);
        assert_eq!(layout.typing, None);
        assert_eq!(layout.header.width, 120);
    }

    #[test]
    fn test_full_frame_renders_all_regions() {
        let mut state = wide_state();
        state.typing.insert("bob");
        state.push_toast(
            ToastKind::Success,
            "Room created successfully",
            Instant::now(),
            Duration::from_secs(5),
        );
        let mut tui = TuiState::new(ScrollPolicy::default(), Variant::Full);
        tui.input_box.room_name = Some("general".to_string());
        let text = draw(&state, Variant::Full, &mut tui, 120);
        assert!(text.contains("Rooms"));
        assert!(text.contains("# random"));
        assert!(text.contains("# general · Channel conversation"));
        assert!(text.contains("bob is typing..."));
        assert!(text.contains("Message #general"));
        assert!(text.contains("Room created successfully"));
        assert!(text.contains("Welcome to ChatPro"));
    }

    #[test]
    fn test_main_column_excludes_docked_sidebar() {
        let mut state = wide_state();
        let area = Rect::new(0, 0, 120, 20);
        assert_eq!(
            main_column_width(area, &state, Variant::Full, NARROW),
            120 - SIDEBAR_WIDTH
        );
        assert_eq!(main_column_width(area, &state, Variant::Minimal, NARROW), 120);

        state.viewport_width = 70;
        state.drawer_open = true;
        assert_eq!(
            main_column_width(Rect::new(0, 0, 70, 20), &state, Variant::Full, NARROW),
            70
        );
    }

    #[test]
    fn test_composer_height_follows_main_column() {
        let state = wide_state();
        let mut tui = TuiState::new(ScrollPolicy::default(), Variant::Full);
        tui.input_box.handle_event(&TuiEvent::Paste("a".repeat(100)));
        // Fits on one line across the whole terminal, but not beside the sidebar
        assert_eq!(tui.input_box.calculate_height(120), 3);

        let backend = TestBackend::new(120, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let frame = terminal
            .draw(|f| draw_ui(f, &state, Variant::Full, NARROW, &mut tui))
            .unwrap();
        let input_height = tui.input_box.calculate_height(120 - SIDEBAR_WIDTH);
        assert_eq!(input_height, 4);
        let top_of_input = 20 - input_height;
        assert_eq!(frame.buffer[(SIDEBAR_WIDTH, top_of_input)].symbol(), "╭");
    }

    #[test]
    fn test_new_content_affordance_shows_in_same_frame() {
        let mut state = wide_state();
        state.show_welcome = false;
        state.messages = (0..20)
            .filter_map(|i| {
                ChatMessage::from_payload(payload(Some("r1"), "bob", &format!("msg {i}")), None)
            })
            .collect();
        let mut tui = TuiState::new(ScrollPolicy::default(), Variant::Full);
        draw(&state, Variant::Full, &mut tui, 120);
        assert!(!tui.message_list.has_unseen_content);

        tui.message_list
            .scroll_state
            .set_offset(ratatui::layout::Position { x: 0, y: 0 });
        tui.message_list.stick_to_bottom = false;
        state.messages.extend(ChatMessage::from_payload(
            payload(Some("r1"), "bob", "fresh"),
            None,
        ));
        let text = draw(&state, Variant::Full, &mut tui, 120);
        assert!(tui.message_list.has_unseen_content);
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_minimal_frame_has_no_sidebar() {
        let state = wide_state();
        let mut tui = TuiState::new(ScrollPolicy::default(), Variant::Minimal);
        let text = draw(&state, Variant::Minimal, &mut tui, 120);
        assert!(!text.contains("Rooms"));
        assert!(text.contains("# general"));
    }
}
