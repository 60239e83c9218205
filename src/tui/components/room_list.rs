//! # RoomList Component
//!
//! Sidebar with the room search field, the filtered room list and the
//! local user's badge.
//!
//! ```text
//! ┌ Rooms ───────────────┐
//! │ / gen                │
//! │ # general            │
//! │ # random         (3) │
//! │ @ secret             │
//! │                      │
//! │ A  alice             │
//! └──────────────────────┘
//! ```
//!
//! Stateless: selection is the controller's current room, unread badges
//! come from its counters, and the search query is owned by the runtime.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::format::avatar_color;
use crate::core::model::{Room, User};
use crate::core::unread::UnreadCounts;
use crate::tui::component::Component;

/// Preferred sidebar width in columns.
pub const SIDEBAR_WIDTH: u16 = 28;

pub struct RoomList<'a> {
    pub rooms: &'a [&'a Room],
    pub current_room_id: Option<&'a str>,
    pub unread: &'a UnreadCounts,
    pub user: &'a User,
    pub search_query: &'a str,
    pub search_focused: bool,
    pub focused: bool,
}

impl<'a> RoomList<'a> {
    /// Rows above the first room inside the bordered area: border + search.
    const LIST_TOP: u16 = 2;

    /// Index into `rooms` of the row at screen `row`, for mouse selection.
    pub fn room_index_at(area: Rect, row: u16, room_count: usize) -> Option<usize> {
        let top = area.y + Self::LIST_TOP;
        if row < top || row >= area.y + area.height.saturating_sub(3) {
            return None;
        }
        let index = (row - top) as usize;
        (index < room_count).then_some(index)
    }

    fn search_line(&self) -> Line<'a> {
        if self.search_query.is_empty() && !self.search_focused {
            return Line::from(Span::styled(
                "/ search (Ctrl+F)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        let style = if self.search_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.search_query.to_string(), style),
        ])
    }

    fn room_line(&self, room: &Room, width: u16) -> Line<'a> {
        let marker = if room.is_private { "@ " } else { "# " };
        let unread = self.unread.get(&room.id);
        let badge = if unread > 0 {
            format!(" ({unread})")
        } else {
            String::new()
        };
        let name_width = (width as usize).saturating_sub(marker.len() + badge.len());
        let name: String = room.name.chars().take(name_width).collect();
        let padding = name_width.saturating_sub(name.chars().count());

        let is_current = self.current_room_id == Some(room.id.as_str());
        let style = if is_current {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if unread > 0 {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(marker, style),
            Span::styled(name, style),
            Span::styled(" ".repeat(padding), style),
            Span::styled(badge, style.fg(Color::Yellow)),
        ])
    }

    fn user_line(&self) -> Line<'a> {
        let color = avatar_color(&self.user.username);
        Line::from(vec![
            Span::styled(
                format!(" {} ", self.user.initial()),
                Style::default().fg(Color::Black).bg(color),
            ),
            Span::raw("  "),
            Span::styled(
                self.user.username.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

impl<'a> Component for RoomList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(" Rooms ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [search, list, _, user] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.search_line()), search);

        let lines: Vec<Line> = if self.rooms.is_empty() {
            vec![Line::from(Span::styled(
                "No rooms",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.rooms
                .iter()
                .map(|room| self.room_line(room, list.width))
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), list);
        frame.render_widget(Paragraph::new(self.user_line()), user);
    }
}
