//! # MessageList Component
//!
//! Scrollable view of the current room's messages.
//!
//! ## Responsibilities
//!
//! - Display the render buffer, or the welcome state when it is empty
//! - Follow new messages when the viewport is near the bottom
//! - Track the "↓ New" affordance
//! - Cache message heights so only appended messages are measured
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the messages (props).
//!
//! The controller bumps `list_epoch` whenever it replaces the buffer (room
//! switch, history load). A new epoch drops the layout cache and pins the
//! view to the bottom without consulting the scroll policy. Growth within
//! an epoch is an append and goes through [`ScrollPolicy::after_append`].

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::model::ChatMessage;
use crate::core::scroll::{ScrollDecision, ScrollMetrics, ScrollPolicy};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::components::welcome::Welcome;
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, the view follows the last message
    pub stick_to_bottom: bool,
    /// Drives the "↓ New" affordance in the room header
    pub has_unseen_content: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    policy: ScrollPolicy,
    /// Minimal mode skips the policy and always follows
    follow_always: bool,
    epoch: u64,
}

impl MessageListState {
    pub fn new(policy: ScrollPolicy, follow_always: bool) -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            has_unseen_content: false,
            viewport_height: 0,
            policy,
            follow_always,
            epoch: 0,
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.scroll_state.offset().y as u32,
            content_height: self.layout.total_height() as u32,
            viewport_height: self.viewport_height as u32,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    fn set_offset_y(&mut self, y: u16) {
        self.scroll_state.set_offset(Position { x: 0, y });
    }

    /// Start over for a replaced buffer.
    fn reset(&mut self, epoch: u64) {
        self.epoch = epoch;
        self.layout = LayoutCache::new();
        self.stick_to_bottom = true;
        self.has_unseen_content = false;
        self.set_offset_y(0);
    }

    /// Apply the auto-scroll policy to content that just grew.
    fn follow_append(&mut self, before: ScrollMetrics) {
        if self.follow_always {
            self.stick_to_bottom = true;
            return;
        }
        match self.policy.after_append(before, self.metrics()) {
            ScrollDecision::ScrollToBottom => self.stick_to_bottom = true,
            ScrollDecision::Stay { show_affordance } => {
                self.stick_to_bottom = false;
                self.has_unseen_content = show_affordance;
            }
        }
    }

    /// Pin to the bottom, or clamp a free offset to the content bounds.
    fn settle(&mut self) {
        let max_y = self.max_offset();
        if self.stick_to_bottom {
            self.set_offset_y(max_y);
            self.has_unseen_content = false;
        } else if self.scroll_state.offset().y > max_y {
            self.set_offset_y(max_y);
        }
    }

    /// Re-engage auto-scroll if the user has reached the bottom.
    fn repin_if_at_bottom(&mut self) {
        if self.scroll_state.offset().y >= self.max_offset() {
            self.stick_to_bottom = true;
        }
        self.settle();
    }

    fn refresh_affordance(&mut self) {
        self.has_unseen_content = !self.stick_to_bottom && self.policy.affordance_visible(self.metrics());
    }
}

/// Scrollable message view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    pub epoch: u64,
    pub show_welcome: bool,
    pub room_name: Option<&'a str>,
    pub own_username: &'a str,
    pub now: DateTime<Utc>,
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.epoch != self.state.epoch {
            self.state.reset(self.epoch);
        }
        self.state.viewport_height = area.height;

        if self.show_welcome || self.messages.is_empty() {
            Welcome {
                room_name: self.room_name,
            }
            .render(frame, area);
            return;
        }

        // -1 for the scrollbar column
        let content_width = area.width.saturating_sub(1);

        // 1. Update the layout cache, measuring only what changed
        let before = self.state.metrics();
        let previous_count = self.state.layout.message_count;
        self.state.layout.update(self.messages, content_width);
        if self.messages.len() > previous_count {
            self.state.follow_append(before);
        }
        self.state.settle();

        // 2. Render the visible messages into a ScrollView
        let total_height = self.state.layout.total_height();
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };
        for i in visible_range {
            let message = &self.messages[i];
            let height = self.state.layout.heights[i];
            let is_own = message.username == self.own_username;
            scroll_view.render_widget(
                Message::new(message, is_own, self.now),
                Rect::new(0, y_offset, content_width, height),
            );
            y_offset = y_offset.saturating_add(height);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `MessageListState` because scrolling mutates
/// persistent state while `MessageList` is rebuilt every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
                self.settle();
            }
            _ => return None,
        }
        self.refresh_affordance();
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// Messages are append-only within an epoch, so cached heights stay
    /// valid unless the width changed or the buffer shrank.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update(&mut self, messages: &[ChatMessage], content_width: u16) {
        let reusable = self.reusable_count(messages.len(), content_width);
        self.heights.truncate(reusable);
        for message in messages.iter().skip(reusable) {
            self.heights
                .push(Message::calculate_height(message, content_width));
        }
        self.rebuild_prefix_heights();
        self.message_count = messages.len();
        self.content_width = content_width;
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            id: None,
            room_id: "r1".to_string(),
            user_id: None,
            username: "bob".to_string(),
            text: text.to_string(),
            timestamp: None,
            is_system: false,
        }
    }

    /// Each message is two rows tall at width 40.
    fn messages(count: usize) -> Vec<ChatMessage> {
        (0..count).map(|i| message(&format!("line {i}"))).collect()
    }

    fn draw(state: &mut MessageListState, messages: &[ChatMessage], epoch: u64) -> String {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList {
                    state: &mut *state,
                    messages,
                    epoch,
                    show_welcome: false,
                    room_name: Some("general"),
                    own_username: "alice",
                    now: Utc::now(),
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.update(&messages(5), 80);
        assert_eq!(cache.reusable_count(5, 80), 5);
        assert_eq!(cache.reusable_count(6, 80), 5);
        assert_eq!(cache.reusable_count(5, 40), 0);
        assert_eq!(cache.reusable_count(3, 80), 0);
    }

    #[test]
    fn test_layout_cache_totals() {
        let mut cache = LayoutCache::new();
        cache.update(&messages(3), 40);
        assert_eq!(cache.heights, vec![2, 2, 2]);
        assert_eq!(cache.prefix_heights, vec![2, 4, 6]);
        assert_eq!(cache.total_height(), 6);
    }

    #[test]
    fn test_visible_range_skips_offscreen() {
        let mut cache = LayoutCache::new();
        cache.update(&messages(50), 40);
        let range = cache.visible_range(40, 10);
        assert!(range.start > 0);
        assert!(range.end < 50);
    }

    #[test]
    fn test_new_epoch_pins_to_bottom() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        let history = messages(20);
        let text = draw(&mut state, &history, 1);
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, 40 - 10);
        assert!(text.contains("line 19"));
    }

    #[test]
    fn test_append_near_bottom_follows() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        let mut history = messages(20);
        draw(&mut state, &history, 1);
        history.push(message("fresh"));
        let text = draw(&mut state, &history, 1);
        assert!(state.stick_to_bottom);
        assert!(!state.has_unseen_content);
        assert!(text.contains("fresh"));
    }

    #[test]
    fn test_append_far_from_bottom_shows_affordance() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        let mut history = messages(20);
        draw(&mut state, &history, 1);
        state.scroll_state.set_offset(Position { x: 0, y: 5 });
        state.stick_to_bottom = false;

        history.push(message("fresh"));
        draw(&mut state, &history, 1);
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content);
        assert_eq!(state.scroll_state.offset().y, 5);
    }

    #[test]
    fn test_follow_always_ignores_policy() {
        let mut state = MessageListState::new(ScrollPolicy::default(), true);
        let mut history = messages(20);
        draw(&mut state, &history, 1);
        state.scroll_state.set_offset(Position { x: 0, y: 0 });
        state.stick_to_bottom = false;

        history.push(message("fresh"));
        draw(&mut state, &history, 1);
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, 42 - 10);
    }

    #[test]
    fn test_scroll_to_bottom_repins_and_hides_affordance() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        draw(&mut state, &messages(20), 1);

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
        assert!(!state.has_unseen_content);
        assert_eq!(state.scroll_state.offset().y, 30);
    }

    #[test]
    fn test_scrolling_far_up_reveals_affordance() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        draw(&mut state, &messages(20), 1);
        for _ in 0..10 {
            state.handle_event(&TuiEvent::ScrollUp);
        }
        assert!(state.has_unseen_content);
    }

    #[test]
    fn test_empty_buffer_renders_welcome() {
        let mut state = MessageListState::new(ScrollPolicy::default(), false);
        let text = draw(&mut state, &[], 1);
        assert!(text.contains("Welcome to ChatPro"));
        assert!(text.contains("#general"));
    }
}
