//! # InputBox Component
//!
//! Multi-line prompt editor with history recall.
//!
//! ## Responsibilities
//!
//! - Capture text input, editing and caret movement
//! - Emit `Submit` on Enter (Shift+Enter / Ctrl+J arrive as a literal '\n')
//! - Ask the parent for history when ArrowUp is pressed with the caret at
//!   the very start, or ArrowDown with the caret at the very end
//! - Reject all edits while `disabled` (a submission is in flight)
//!
//! The history entries themselves live in `core::history`; the box only
//! owns the browsing cursor.

mod rows;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::history::HistoryCursor;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use rows::{
    MAX_VISIBLE_ROWS, VERTICAL_OVERHEAD, column_of, inner_width, next_char_boundary,
    offset_at_column, prev_char_boundary, row_of, visual_rows,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// ArrowUp at the start of the buffer
    RecallOlder,
    /// ArrowDown at the end of the buffer
    RecallNewer,
    ContentChanged,
}

/// Text input component.
///
/// # Props
///
/// - `disabled`: a submission is in flight; edits are rejected
/// - `focused`: whether the caret is drawn
pub struct InputBox {
    pub buffer: String,
    pub disabled: bool,
    pub focused: bool,
    /// Caret as byte offset in buffer (0..=buffer.len())
    pos: usize,
    scroll_offset: u16,
    /// Area width from the last render, used for vertical caret moves
    last_width: u16,
    history: HistoryCursor,
    /// Buffer holds an untouched history entry; arrows keep browsing
    recalled: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            disabled: false,
            focused: true,
            pos: 0,
            scroll_offset: 0,
            last_width: Self::DEFAULT_WIDTH,
            history: HistoryCursor::new(),
            recalled: false,
        }
    }

    pub fn caret(&self) -> usize {
        self.pos
    }

    /// Required height for the current buffer, in `[3, MAX_VISIBLE_ROWS + 2]`.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = visual_rows(&self.buffer, inner_width(area_width)).len() as u16;
        rows.clamp(1, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    /// Replace the buffer with an older history entry. Caret goes to the end.
    pub fn recall_older(&mut self, entries: &[String]) -> bool {
        match self.history.older(entries) {
            Some(entry) => {
                self.load(entry);
                self.recalled = true;
                true
            }
            None => false,
        }
    }

    /// Replace the buffer with a newer history entry, or empty it once past
    /// the newest.
    pub fn recall_newer(&mut self, entries: &[String]) -> bool {
        match self.history.newer(entries) {
            Some(entry) => {
                self.recalled = !entry.is_empty();
                self.load(entry);
                true
            }
            None => false,
        }
    }

    fn load(&mut self, text: String) {
        self.buffer = text;
        self.pos = self.buffer.len();
        self.scroll_offset = 0;
    }

    fn edited(&mut self) -> Option<InputEvent> {
        self.recalled = false;
        Some(InputEvent::ContentChanged)
    }

    /// Moves the caret one visual row up or down, keeping its column.
    fn move_row(&mut self, down: bool) -> bool {
        let rows = visual_rows(&self.buffer, inner_width(self.last_width));
        let current = row_of(&rows, self.pos);
        let target = if down {
            if current + 1 >= rows.len() {
                return false;
            }
            current + 1
        } else {
            if current == 0 {
                return false;
            }
            current - 1
        };
        let column = column_of(&self.buffer, &rows[current], self.pos);
        self.pos = offset_at_column(&self.buffer, &rows[target], column);
        true
    }

    fn update_scroll_offset(&mut self, rows: &[std::ops::Range<usize>]) {
        if rows.len() as u16 <= MAX_VISIBLE_ROWS {
            self.scroll_offset = 0;
            return;
        }
        let caret_row = row_of(rows, self.pos) as u16;
        if caret_row < self.scroll_offset {
            self.scroll_offset = caret_row;
        } else if caret_row >= self.scroll_offset + MAX_VISIBLE_ROWS {
            self.scroll_offset = caret_row + 1 - MAX_VISIBLE_ROWS;
        }
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_rows: usize) {
        use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

        if total_rows as u16 <= MAX_VISIBLE_ROWS {
            return;
        }
        let max_scroll = total_rows.saturating_sub(MAX_VISIBLE_ROWS as usize);
        let mut state = ScrollbarState::default()
            .content_length(max_scroll)
            .position(self.scroll_offset as usize);
        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut state,
        );
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let rows = visual_rows(&self.buffer, inner_width(area.width));
        self.update_scroll_offset(&rows);

        let visible: Vec<Line> = rows
            .iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_ROWS as usize)
            .map(|r| Line::raw(self.buffer[r.clone()].to_string()))
            .collect();

        let (title, style) = if self.disabled {
            (
                "Generating...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            )
        } else if self.focused {
            ("Prompt", Style::default().fg(Color::Green))
        } else {
            ("Prompt", Style::default().fg(Color::Green).add_modifier(Modifier::DIM))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(style);
        frame.render_widget(Paragraph::new(visible).block(block).style(style), area);
        self.render_scrollbar(frame, area, rows.len());

        if self.focused && !self.disabled {
            let row = row_of(&rows, self.pos);
            let col = column_of(&self.buffer, &rows[row], self.pos) as u16;
            let visible_row = (row as u16).saturating_sub(self.scroll_offset);
            frame.set_cursor_position((area.x + 1 + col, area.y + 1 + visible_row));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.pos, *c);
                self.pos += c.len_utf8();
                self.edited()
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF so pasted lines don't carry stray '\r'
                let text = text.replace("\r\n", "\n");
                self.buffer.insert_str(self.pos, &text);
                self.pos += text.len();
                self.edited()
            }
            TuiEvent::Backspace if self.pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(prev..self.pos);
                self.pos = prev;
                self.edited()
            }
            TuiEvent::Delete if self.pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(self.pos..next);
                self.edited()
            }
            TuiEvent::CursorLeft if self.pos > 0 => {
                self.pos = prev_char_boundary(&self.buffer, self.pos);
                self.recalled = false;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.pos < self.buffer.len() => {
                self.pos = next_char_boundary(&self.buffer, self.pos);
                self.recalled = false;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.pos].rfind('\n').map_or(0, |i| i + 1);
                (self.pos != line_start).then(|| {
                    self.pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.pos + i);
                (self.pos != line_end).then(|| {
                    self.pos = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => {
                if self.pos == 0 || self.recalled {
                    Some(InputEvent::RecallOlder)
                } else {
                    self.move_row(false).then_some(InputEvent::ContentChanged)
                }
            }
            TuiEvent::CursorDown => {
                if self.pos == self.buffer.len() || self.recalled {
                    Some(InputEvent::RecallNewer)
                } else {
                    self.move_row(true).then_some(InputEvent::ContentChanged)
                }
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.pos = 0;
                self.scroll_offset = 0;
                self.history.reset();
                self.recalled = false;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
