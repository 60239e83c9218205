//! # Toast Stack
//!
//! Transient notices stacked in the top-right corner, newest last. Expiry
//! is handled by the controller; this only draws what is live.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::state::{Toast, ToastKind};
use crate::tui::component::Component;

const MAX_TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 3;

pub struct ToastStack<'a> {
    pub toasts: &'a [Toast],
}

fn color_for(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    }
}

impl<'a> Component for ToastStack<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut y = area.y + 1;
        for toast in self.toasts {
            if y + TOAST_HEIGHT > area.y + area.height {
                break;
            }
            let width = (toast.text.width() as u16 + 4)
                .min(MAX_TOAST_WIDTH)
                .min(area.width);
            let rect = Rect::new(area.x + area.width - width, y, width, TOAST_HEIGHT);
            let color = color_for(toast.kind);
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(toast.text.as_str())
                    .style(Style::default().fg(color))
                    .block(
                        Block::bordered()
                            .border_type(BorderType::Rounded)
                            .border_style(Style::default().fg(color)),
                    ),
                rect,
            );
            y += TOAST_HEIGHT;
        }
    }
}
