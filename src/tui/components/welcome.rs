//! # Welcome Component
//!
//! Empty state for the message area: shown when a room has no history or
//! its history failed to load.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct Welcome<'a> {
    pub room_name: Option<&'a str>,
}

impl<'a> Component for Welcome<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome to ChatPro",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
        ];
        match self.room_name {
            Some(name) => lines.push(Line::from(Span::styled(
                format!("No messages in #{name} yet. Say hello!"),
                dim,
            ))),
            None => lines.push(Line::from(Span::styled("Pick a room to start chatting.", dim))),
        }
        lines.push(Line::from(Span::styled(
            "Ctrl+N/Ctrl+P switch rooms  ·  Ctrl+R new room",
            dim,
        )));
        lines.push(Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            dim,
        )));

        let [center] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), center);
    }
}
