use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::core::format::{Fragment, avatar_color, format_message_text, format_time, sanitize};
use crate::core::model::{ChatMessage, initial};

/// Columns the message body is indented under the author line.
const BODY_INDENT: u16 = 4;

/// A single chat message.
///
/// ```text
///  A  alice  09:41
///     hello @bob, see https://example.com
/// ```
///
/// System messages (joins, leaves) render as one dim italic line without an
/// author. The author badge colour comes from the username so it is stable
/// across sessions.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap`, using options that match ratatui's `Paragraph` wrapping,
/// so the parent `MessageList` can lay out the scroll canvas without
/// rendering.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub is_own: bool,
    pub now: DateTime<Utc>,
}

fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

fn wrapped_line_count(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    text.split('\n')
        .map(|line| textwrap::wrap(line, wrap_options(width as usize)).len().max(1) as u16)
        .sum()
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, is_own: bool, now: DateTime<Utc>) -> Self {
        Self {
            message,
            is_own,
            now,
        }
    }

    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let text = sanitize(message.text.trim());
        if message.is_system {
            return wrapped_line_count(&text, width);
        }
        1 + wrapped_line_count(&text, width.saturating_sub(BODY_INDENT))
    }

    fn author_line(&self) -> Line<'a> {
        let color = avatar_color(&self.message.username);
        let name_style = if self.is_own {
            Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![
            Span::styled(
                format!(" {} ", initial(&self.message.username)),
                Style::default().fg(Color::Black).bg(color),
            ),
            Span::raw("  "),
            Span::styled(sanitize(&self.message.username), name_style),
        ];
        if let Some(timestamp) = self.message.timestamp {
            spans.push(Span::styled(
                format!("  {}", format_time(timestamp, self.now)),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    }

    fn body_lines(&self) -> Vec<Line<'a>> {
        format_message_text(self.message.text.trim())
            .into_iter()
            .map(|fragments| {
                Line::from(
                    fragments
                        .into_iter()
                        .map(|fragment| match fragment {
                            Fragment::Text(text) => Span::raw(text),
                            Fragment::Link(url) => Span::styled(
                                url,
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::UNDERLINED),
                            ),
                            Fragment::Mention(name) => Span::styled(
                                name,
                                Style::default()
                                    .fg(Color::Magenta)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.message.is_system {
            Paragraph::new(sanitize(self.message.text.trim()))
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
                .wrap(Wrap { trim: true })
                .render(area, buf);
            return;
        }

        let header = Rect { height: 1, ..area };
        Paragraph::new(self.author_line()).render(header, buf);

        let body = Rect {
            x: area.x + BODY_INDENT.min(area.width),
            y: area.y + 1,
            width: area.width.saturating_sub(BODY_INDENT),
            height: area.height.saturating_sub(1),
        };
        Paragraph::new(self.body_lines())
            .wrap(Wrap { trim: true })
            .render(body, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn make_message(username: &str, text: &str, is_system: bool) -> ChatMessage {
        ChatMessage {
            id: None,
            room_id: "r1".to_string(),
            user_id: None,
            username: username.to_string(),
            text: text.to_string(),
            timestamp: None,
            is_system,
        }
    }

    #[test]
    fn calculate_height_single_line() {
        let message = make_message("alice", "Hello", false);
        assert_eq!(Message::calculate_height(&message, 80), 2);
    }

    #[test]
    fn calculate_height_wraps_body_under_indent() {
        let message = make_message("alice", "Hello world", false);
        // width 9 → body width 5: "Hello" | "world"
        assert_eq!(Message::calculate_height(&message, 9), 3);
    }

    #[test]
    fn calculate_height_counts_explicit_newlines() {
        let message = make_message("alice", "one\ntwo\nthree", false);
        assert_eq!(Message::calculate_height(&message, 80), 4);
    }

    #[test]
    fn calculate_height_system_message_has_no_author_line() {
        let message = make_message("System", "bob joined the room", true);
        assert_eq!(Message::calculate_height(&message, 80), 1);
    }

    #[test]
    fn render_keeps_markup_literal() {
        let message = make_message("mallory", "<b>hi</b> http://x.test", false);
        let backend = TestBackend::new(40, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(Message::new(&message, false, Utc::now()), f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("mallory"));
        assert!(text.contains("<b>hi</b>"));
        assert!(text.contains("http://x.test"));
    }
}
