//! # ResultRow Component
//!
//! The rich rendering of a validated component: a summary line and a line
//! of action labels.
//!
//! ```text
//! ✓ Valid: TextReverser  ·  2 attempts
//!   [v]iew code  [d]ownload  [a]dd to canvas  [s]ave to sidebar
//! ```
//!
//! The action labels double as click targets; [`ResultRow::action_at`]
//! maps a column on the second line back to the action under it.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::action::Action;
use crate::core::message::{TerminalMessage, attempts_label};

const ACTIONS_LEAD: &str = "  ";
const ACTIONS_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    ViewCode,
    Download,
    AddToCanvas,
    SaveToSidebar,
}

impl RowAction {
    pub const ALL: [RowAction; 4] = [
        RowAction::ViewCode,
        RowAction::Download,
        RowAction::AddToCanvas,
        RowAction::SaveToSidebar,
    ];

    /// Shortcut key while the row is selected.
    pub fn key(self) -> char {
        match self {
            RowAction::ViewCode => 'v',
            RowAction::Download => 'd',
            RowAction::AddToCanvas => 'a',
            RowAction::SaveToSidebar => 's',
        }
    }

    pub fn from_key(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.key() == c)
    }

    pub fn label(self) -> &'static str {
        match self {
            RowAction::ViewCode => "[v]iew code",
            RowAction::Download => "[d]ownload",
            RowAction::AddToCanvas => "[a]dd to canvas",
            RowAction::SaveToSidebar => "[s]ave to sidebar",
        }
    }

    /// The reducer action for this button on message `id`.
    pub fn into_action(self, id: String) -> Action {
        match self {
            RowAction::ViewCode => Action::ViewCode(id),
            RowAction::Download => Action::Download(id),
            RowAction::AddToCanvas => Action::AddToCanvas(id),
            RowAction::SaveToSidebar => Action::SaveToSidebar(id),
        }
    }
}

/// Transient widget for one rich result. Created each frame.
pub struct ResultRow<'a> {
    pub message: &'a TerminalMessage,
    pub is_selected: bool,
}

impl<'a> ResultRow<'a> {
    pub const HEIGHT: u16 = 2;

    pub fn new(message: &'a TerminalMessage, is_selected: bool) -> Self {
        Self {
            message,
            is_selected,
        }
    }

    /// Action whose label covers `column` (relative to the row's left edge)
    /// on the actions line.
    pub fn action_at(column: u16) -> Option<RowAction> {
        let column = column as usize;
        let mut start = ACTIONS_LEAD.width();
        for action in RowAction::ALL {
            let end = start + action.label().width();
            if (start..end).contains(&column) {
                return Some(action);
            }
            start = end + ACTIONS_GAP.width();
        }
        None
    }

    fn summary_line(&self) -> Line<'static> {
        let green = Style::default().fg(Color::Green);
        let class_name = self.message.class_name().unwrap_or("component");
        let mut spans = vec![
            Span::styled("✓ ", green.add_modifier(Modifier::BOLD)),
            Span::styled("Valid: ", green),
            Span::styled(class_name.to_string(), green.add_modifier(Modifier::BOLD)),
        ];
        if let Some(attempts) = self.message.attempts() {
            spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                attempts_label(attempts),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    }

    fn actions_line(&self) -> Line<'static> {
        let style = if self.is_selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM)
        };
        let mut spans = vec![Span::raw(ACTIONS_LEAD)];
        for (i, action) in RowAction::ALL.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(ACTIONS_GAP));
            }
            spans.push(Span::styled(action.label(), style));
        }
        Line::from(spans)
    }
}

impl<'a> Widget for ResultRow<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut paragraph = Paragraph::new(vec![self.summary_line(), self.actions_line()]);
        if self.is_selected {
            paragraph = paragraph.style(Style::default().bg(Color::Rgb(30, 40, 50)));
        }
        paragraph.render(area, buf);
    }
}
