//! # InputBox Component
//!
//! Message composer for the current room.
//!
//! ## Responsibilities
//!
//! - Capture text input, including bracketed paste with newlines
//! - Handle editing (backspace, delete, cursor movement)
//! - Handle submission (Enter)
//! - Grow with its content up to [`MAX_VISIBLE_LINES`], then scroll
//! - Show a character counter against [`MAX_MESSAGE_CHARS`]
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. The room name and focus flag
//! are props set by the parent before each render.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Longest message the composer accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;
/// Maximum visible content lines before internal scrolling kicks in
pub const MAX_VISIBLE_LINES: u16 = 5;
/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Border (2) + padding (2) consumed horizontally
const HORIZONTAL_OVERHEAD: u16 = 4;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted non-blank text (Enter pressed). The buffer is kept
    /// until the send is accepted.
    Submit(String),
    /// Text content changed
    ContentChanged,
}

fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wrap `text` to `width` columns. Every `\n` starts a new line, including
/// a trailing one.
fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    text.split('\n')
        .flat_map(|segment| {
            let wrapped = textwrap::wrap(segment, wrap_options(width as usize));
            if wrapped.is_empty() {
                vec![String::new()]
            } else {
                wrapped.into_iter().map(|line| line.into_owned()).collect()
            }
        })
        .collect()
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Message composer.
///
/// # Props
///
/// - `room_name`: shown in the title, `None` before a room is joined
/// - `focused`: highlights the border when keyboard focus is here
pub struct InputBox {
    /// Text buffer (Internal State)
    pub buffer: String,
    pub room_name: Option<String>,
    pub focused: bool,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// First visible wrapped line
    scroll_offset: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            room_name: None,
            focused: true,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Calculate required height for the current buffer, clamped to
    /// [1 + VERTICAL_OVERHEAD, MAX_VISIBLE_LINES + VERTICAL_OVERHEAD].
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrap_lines(&self.buffer, area_width.saturating_sub(HORIZONTAL_OVERHEAD));
        (lines.len() as u16).clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Insert as much of `text` as fits under the character limit.
    fn insert(&mut self, text: &str) -> bool {
        let room = MAX_MESSAGE_CHARS.saturating_sub(self.char_count());
        let accepted: String = text.chars().take(room).collect();
        if accepted.is_empty() {
            return false;
        }
        self.buffer.insert_str(self.cursor, &accepted);
        self.cursor += accepted.len();
        true
    }

    /// Wrapped row and column of the cursor.
    fn cursor_row_col(&self, width: u16) -> (u16, u16) {
        let before = &self.buffer[..self.cursor];
        let lines = wrap_lines(before, width);
        let row = lines.len().saturating_sub(1) as u16;
        let last = lines.last().map(String::as_str).unwrap_or("");
        // textwrap drops trailing spaces, the cursor sits after them
        let tail = before.rsplit('\n').next().unwrap_or("");
        let trailing = (tail.len() - tail.trim_end_matches(' ').len()) as u16;
        let col = (last.width() as u16 + trailing).min(width.saturating_sub(1));
        (row, col)
    }

    fn counter_line(&self) -> Line<'static> {
        let count = self.char_count();
        let color = if count >= MAX_MESSAGE_CHARS {
            Color::Red
        } else if count * 10 > MAX_MESSAGE_CHARS * 9 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        Line::styled(format!(" {count}/{MAX_MESSAGE_CHARS} "), Style::default().fg(color)).right_aligned()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = wrap_lines(&self.buffer, width);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1);

        let (row, col) = self.cursor_row_col(width);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + visible {
            self.scroll_offset = row + 1 - visible;
        }

        let title = match &self.room_name {
            Some(name) => format!(" Message #{name} "),
            None => String::from(" Message "),
        };
        let border = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(title)
            .title_bottom(self.counter_line())
            .padding(ratatui::widgets::Padding::horizontal(1));

        let text: Vec<Line> = lines
            .into_iter()
            .skip(self.scroll_offset as usize)
            .take(visible as usize)
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(text).block(block), area);

        if self.focused {
            frame.set_cursor_position((
                area.x + 2 + col,
                area.y + 1 + row.saturating_sub(self.scroll_offset),
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self
                .insert(c.encode_utf8(&mut [0; 4]))
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Paste(text) => self.insert(text).then_some(InputEvent::ContentChanged),
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                None
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                }
                None
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                Some(InputEvent::Submit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(input: &mut InputBox, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        input.handle_event(&TuiEvent::InputChar('é'));
        assert_eq!(input.buffer, "aé");

        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.buffer, "abé");

        assert_eq!(
            input.handle_event(&TuiEvent::Delete),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.buffer, "ab");
        assert_eq!(input.handle_event(&TuiEvent::Delete), None);
    }

    #[test]
    fn test_submit_keeps_buffer_until_cleared() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("one\ntwo\nthree".to_string()));
        assert_eq!(input.calculate_height(40), 5);

        let res = input.handle_event(&TuiEvent::Submit);
        assert_eq!(res, Some(InputEvent::Submit("one\ntwo\nthree".to_string())));
        assert_eq!(input.buffer, "one\ntwo\nthree");

        input.clear();
        assert!(input.buffer.is_empty());
        assert_eq!(input.calculate_height(40), 3);
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("   ".to_string()));
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
    }

    #[test]
    fn test_height_is_capped() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\n".repeat(20)));
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + 2);
    }

    #[test]
    fn test_character_limit() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("x".repeat(MAX_MESSAGE_CHARS + 10)));
        assert_eq!(input.char_count(), MAX_MESSAGE_CHARS);
        assert_eq!(input.handle_event(&TuiEvent::InputChar('y')), None);
    }

    #[test]
    fn test_render_shows_room_and_counter() {
        let mut input = InputBox::new();
        input.room_name = Some("general".to_string());
        input.handle_event(&TuiEvent::Paste("hi there".to_string()));
        let text = rendered(&mut input, 40, 3);
        assert!(text.contains("Message #general"));
        assert!(text.contains("hi there"));
        assert!(text.contains("8/2000"));
    }

    #[test]
    fn test_long_input_scrolls_to_cursor() {
        let mut input = InputBox::new();
        let body: Vec<String> = (1..=8).map(|i| format!("row{i}")).collect();
        input.handle_event(&TuiEvent::Paste(body.join("\n")));
        let text = rendered(&mut input, 40, 7);
        assert!(text.contains("row8"));
        assert!(!text.contains("row1"));
    }
}
