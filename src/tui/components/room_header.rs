//! # RoomHeader Component
//!
//! One-line bar above the message list.
//!
//! ```text
//! # general · Channel conversation · 3 members          ● Connected  ↓ New
//! ```
//!
//! Stateless: every field is a prop. The left side describes the current
//! room, the right side shows the channel state and, when the viewport is
//! scrolled away from new messages, the "↓ New" affordance.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::model::Room;
use crate::tui::component::Component;

pub struct RoomHeader<'a> {
    pub room: Option<&'a Room>,
    pub connected: bool,
    pub has_unseen_content: bool,
    /// Shown in place of the room line when no room is selected.
    pub status_message: &'a str,
}

impl<'a> RoomHeader<'a> {
    fn room_line(&self) -> Line<'a> {
        let Some(room) = self.room else {
            return Line::from(Span::styled(
                self.status_message.to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        };
        let marker = if room.is_private { "@ " } else { "# " };
        let dim = Style::default().fg(Color::DarkGray);
        Line::from(vec![
            Span::styled(
                format!("{marker}{}", room.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", dim),
            Span::styled(room.subtitle().to_string(), dim),
            Span::styled(" · ", dim),
            Span::styled(room.members_label(), dim),
        ])
    }

    fn status_line(&self) -> Line<'a> {
        let mut spans = if self.connected {
            vec![Span::styled("● Connected", Style::default().fg(Color::Green))]
        } else {
            vec![Span::styled("○ Disconnected", Style::default().fg(Color::Red))]
        };
        if self.has_unseen_content {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "↓ New",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans).right_aligned()
    }
}

impl<'a> Component for RoomHeader<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(22)]).areas(area);
        frame.render_widget(Paragraph::new(self.room_line()), left);
        frame.render_widget(Paragraph::new(self.status_line()), right);
    }
}
