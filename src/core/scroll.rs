//! # Auto-scroll Policy
//!
//! Decides whether the message list follows new messages. Units are
//! whatever the renderer measures in (rows in the terminal).
//!
//! ```text
//!   distance ≤ auto_scroll_within  before append  → follow to bottom
//!   otherwise                                     → stay, show "↓ New"
//!   affordance visible while distance > affordance_beyond
//! ```
//!
//! The two thresholds differ so the affordance does not flicker as the
//! viewport nears the bottom.

/// Viewport position over the message content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub offset: u32,
    pub content_height: u32,
    pub viewport_height: u32,
}

impl ScrollMetrics {
    pub fn distance_from_bottom(&self) -> u32 {
        self.content_height
            .saturating_sub(self.viewport_height)
            .saturating_sub(self.offset)
    }

    /// Offset that shows the last line at the bottom of the viewport.
    pub fn bottom_offset(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    ScrollToBottom,
    Stay { show_affordance: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPolicy {
    pub auto_scroll_within: u32,
    pub affordance_beyond: u32,
}

impl ScrollPolicy {
    /// Thresholds in pixel-like units, as used by a graphical renderer.
    pub const PIXELS: ScrollPolicy = ScrollPolicy {
        auto_scroll_within: 50,
        affordance_beyond: 100,
    };

    /// Decide what to do after content was appended. `before` is measured
    /// prior to the append, `after` once the new content is laid out.
    pub fn after_append(&self, before: ScrollMetrics, after: ScrollMetrics) -> ScrollDecision {
        if before.distance_from_bottom() <= self.auto_scroll_within {
            ScrollDecision::ScrollToBottom
        } else {
            ScrollDecision::Stay {
                show_affordance: self.affordance_visible(after),
            }
        }
    }

    pub fn affordance_visible(&self, metrics: ScrollMetrics) -> bool {
        metrics.distance_from_bottom() > self.affordance_beyond
    }
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            auto_scroll_within: 2,
            affordance_beyond: 4,
        }
    }
}
