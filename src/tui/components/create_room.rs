//! # Create Room Dialog
//!
//! Modal overlay for creating a room. Opened with Ctrl+R, dismissed with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `CreateRoomState` lives in `TuiState` while the modal is open
//! - `CreateRoomDialog` is created each frame with borrowed state
//!
//! Dropping the state clears the form, so reopening starts blank.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};

use crate::core::model::CreateRoomForm;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Name,
    Description,
    Private,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Name => Field::Description,
            Field::Description => Field::Private,
            Field::Private => Field::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Name => Field::Private,
            Field::Description => Field::Name,
            Field::Private => Field::Description,
        }
    }
}

/// Events emitted by the dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRoomEvent {
    Submit(CreateRoomForm),
    Dismiss,
}

/// Persistent state for the dialog.
#[derive(Debug, Default)]
pub struct CreateRoomState {
    pub form: CreateRoomForm,
    pub field: Field,
}

impl CreateRoomState {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_text(&mut self) -> Option<&mut String> {
        match self.field {
            Field::Name => Some(&mut self.form.name),
            Field::Description => Some(&mut self.form.description),
            Field::Private => None,
        }
    }
}

impl EventHandler for CreateRoomState {
    type Event = CreateRoomEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => Some(CreateRoomEvent::Dismiss),
            TuiEvent::Submit => Some(CreateRoomEvent::Submit(self.form.clone())),
            TuiEvent::Tab | TuiEvent::ScrollDown => {
                self.field = self.field.next();
                None
            }
            TuiEvent::BackTab | TuiEvent::ScrollUp => {
                self.field = self.field.prev();
                None
            }
            TuiEvent::InputChar(' ') if self.field == Field::Private => {
                self.form.is_private = !self.form.is_private;
                None
            }
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => {
                if let Some(text) = self.active_text() {
                    text.push(*c);
                }
                None
            }
            TuiEvent::Paste(pasted) => {
                if let Some(text) = self.active_text() {
                    text.push_str(&pasted.replace('\n', " "));
                }
                None
            }
            TuiEvent::Backspace => {
                if let Some(text) = self.active_text() {
                    text.pop();
                }
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the dialog overlay.
pub struct CreateRoomDialog<'a> {
    pub state: &'a mut CreateRoomState,
    /// A request is in flight
    pub busy: bool,
}

impl<'a> CreateRoomDialog<'a> {
    fn field_line(&self, field: Field, label: &'static str, value: String) -> Line<'a> {
        let active = self.state.field == field;
        let marker = if active { "> " } else { "  " };
        let value_style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{label:<12}"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
        ])
    }
}

impl<'a> Component for CreateRoomDialog<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 11, area);
        frame.render_widget(Clear, overlay);

        let help = if self.busy {
            " Creating... "
        } else {
            " Tab Next  Space Toggle  Enter Create  Esc Cancel "
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Create Room ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help).centered())
            .padding(Padding::uniform(1));

        let form = &self.state.form;
        let checkbox = if form.is_private { "[x]" } else { "[ ]" };
        let lines = vec![
            self.field_line(Field::Name, "Name", form.name.clone()),
            self.field_line(Field::Description, "Description", form.description.clone()),
            self.field_line(Field::Private, "Private", checkbox.to_string()),
            Line::default(),
            Line::from(Span::styled(
                "Names are lowercased, spaces become dashes.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), overlay);
    }
}

/// A rect `width_percent` wide and `height` rows tall, centered in `outer`.
fn centered_rect(width_percent: u16, height: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(outer.height)),
        Constraint::Fill(1),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(center_v);
    center
}
