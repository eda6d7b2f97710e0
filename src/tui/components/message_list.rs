//! # MessageList Component
//!
//! Scrollable view of the terminal transcript.
//!
//! ## Responsibilities
//!
//! - Display the messages, newest at the bottom
//! - Stick to the bottom on append; detach when the user scrolls up
//! - Track which rich result row is selected (Tab cycling)
//! - Hit testing for mouse clicks on result rows
//! - Cache message heights between frames
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the message slice
//! (props). `render` takes `&mut self`, so the layout cache and scroll state
//! are refreshed during the render pass.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::TerminalMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

/// A screen position resolved to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHit {
    pub index: usize,
    /// Row inside the message (0 = its first line)
    pub row: u16,
    /// Column relative to the list's left edge
    pub column: u16,
}

/// Layout and scroll state for the message list.
/// Persisted in `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Messages arrived while detached from the bottom
    pub has_unseen: bool,
    /// Index of the selected rich result row
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Screen area from the last render, for hit testing
    area: Rect,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            has_unseen: false,
            selected_index: None,
            viewport_height: 0,
            area: Rect::default(),
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.pin_to_bottom();
        }
    }

    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.has_unseen = false;
        self.scroll_state.set_offset(Position { x: 0, y: self.max_offset() });
    }

    /// Scroll the viewport so the selected row is fully visible.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        let Some(range) = self.layout.item_range(idx) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;

        if range.start < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: range.start });
            self.stick_to_bottom = false;
        } else if range.end > offset_y + self.viewport_height {
            let new_y = range.end.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            if new_y >= self.max_offset() {
                self.stick_to_bottom = true;
                self.has_unseen = false;
            }
        }
    }

    /// Moves the selection to the next rich result row, wrapping around.
    /// `rich` holds the transcript indices of result rows, oldest first.
    /// Returns the new selection (`None` when there are no result rows).
    pub fn cycle_selection(&mut self, rich: &[usize]) -> Option<usize> {
        self.selected_index = match self.selected_index {
            Some(current) => rich
                .iter()
                .copied()
                .find(|&i| i > current)
                .or_else(|| rich.first().copied()),
            None => rich.last().copied(),
        };
        self.scroll_to_selected();
        self.selected_index
    }

    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    /// Resolves a screen position to the message under it.
    pub fn hit(&self, column: u16, row: u16) -> Option<ListHit> {
        if !self.area.contains(Position { x: column, y: row }) {
            return None;
        }
        let content_y = (row - self.area.y) + self.scroll_state.offset().y;
        let index = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        let range = self.layout.item_range(index)?;
        Some(ListHit {
            index,
            row: content_y - range.start,
            column: column - self.area.x,
        })
    }
}

/// Scrollable transcript view. Created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [TerminalMessage],
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, messages: &'a [TerminalMessage]) -> Self {
        Self { state, messages }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let layout = &mut self.state.layout;

        let previous_count = layout.message_count;
        let reusable = layout.reusable_count(self.messages, content_width);
        if reusable == 0 {
            // Transcript was reset (clear) or resized; selection indices are stale
            if previous_count > 0 && layout.content_width == content_width {
                self.state.selected_index = None;
            }
        } else if self.messages.len() > previous_count && !self.state.stick_to_bottom {
            self.state.has_unseen = true;
        }

        let layout = &mut self.state.layout;
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout.heights.push(MessageView::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(self.messages, content_width);

        self.state.area = area;
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let total_height = self.state.layout.total_height();
        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible {
            let Some(range) = self.state.layout.item_range(i) else {
                continue;
            };
            let rect = Rect::new(0, range.start, content_width, range.end - range.start);
            let is_selected = self.state.selected_index == Some(i);
            scroll_view.render_widget(MessageView::new(&self.messages[i], is_selected), rect);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

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
            TuiEvent::ScrollToBottom => self.pin_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Cached per-message heights.
///
/// Messages never change after creation, so a cached height stays valid
/// until the width changes or the transcript is replaced. A replacement is
/// detected by a shrinking count or a different first message id.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Running sums of `heights`; entry i is the bottom edge of message i.
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
    first_id: Option<String>,
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
            first_id: None,
        }
    }

    pub fn reusable_count(&self, messages: &[TerminalMessage], content_width: u16) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }
        if messages.len() < self.message_count {
            return 0;
        }
        if messages.first().map(|m| m.id.as_str()) != self.first_id.as_deref() {
            return 0;
        }
        self.message_count.min(self.heights.len())
    }

    pub fn update_metadata(&mut self, messages: &[TerminalMessage], content_width: u16) {
        self.message_count = messages.len();
        self.content_width = content_width;
        self.first_id = messages.first().map(|m| m.id.clone());
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

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Canvas rows covered by message `index`.
    pub fn item_range(&self, index: usize) -> Option<std::ops::Range<u16>> {
        let end = *self.prefix_heights.get(index)?;
        let start = if index == 0 { 0 } else { self.prefix_heights[index - 1] };
        Some(start..end)
    }

    /// Messages overlapping the viewport, padded by half a screen each way.
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
