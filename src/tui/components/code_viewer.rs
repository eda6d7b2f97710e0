//! # CodeViewer Component
//!
//! Modal overlay showing the generated code of one result, syntax
//! highlighted as Python. Esc closes it; arrows and PgUp/PgDn scroll.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeViewerEvent {
    Close,
}

/// Scroll position, persisted in `TuiState` while the overlay is open.
#[derive(Debug, Default)]
pub struct CodeViewerState {
    pub scroll: u16,
    /// Content and viewport heights from the last render
    line_count: u16,
    page: u16,
}

impl CodeViewerState {
    fn max_scroll(&self) -> u16 {
        self.line_count.saturating_sub(self.page)
    }

    pub fn reset(&mut self) {
        self.scroll = 0;
    }
}

impl EventHandler for CodeViewerState {
    type Event = CodeViewerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => return Some(CodeViewerEvent::Close),
            TuiEvent::CursorUp | TuiEvent::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            TuiEvent::CursorDown | TuiEvent::ScrollDown => self.scroll += 1,
            TuiEvent::ScrollPageUp => self.scroll = self.scroll.saturating_sub(self.page.max(1)),
            TuiEvent::ScrollPageDown => self.scroll += self.page.max(1),
            TuiEvent::CursorHome => self.scroll = 0,
            TuiEvent::CursorEnd | TuiEvent::ScrollToBottom => self.scroll = self.max_scroll(),
            _ => {}
        }
        self.scroll = self.scroll.min(self.max_scroll());
        None
    }
}

/// Transient overlay, created each frame while a result's code is shown.
pub struct CodeViewer<'a> {
    pub state: &'a mut CodeViewerState,
    pub class_name: Option<&'a str>,
    pub code: &'a str,
}

/// Centered rect taking `percent` of each dimension.
fn centered(area: Rect, percent: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

impl<'a> Component for CodeViewer<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered(area, 85);
        let title = format!(" {}.py ", self.class_name.unwrap_or("component"));

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_bottom(Line::from(" Esc close · ↑↓ scroll ").right_aligned());
        let inner = block.inner(overlay);

        let lines = markdown::highlight_code(self.code, "python");
        self.state.line_count = lines.len() as u16;
        self.state.page = inner.height;
        self.state.scroll = self.state.scroll.min(self.state.max_scroll());

        frame.render_widget(Clear, overlay);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .scroll((self.state.scroll, 0)),
            overlay,
        );
    }
}
