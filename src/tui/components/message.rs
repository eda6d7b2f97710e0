use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::message::{MessageKind, TerminalMessage, attempts_label};
use crate::tui::component::Component;
use crate::tui::components::result_row::ResultRow;
use crate::tui::markdown;

/// A stateless component that renders one terminal message.
///
/// # Design
///
/// Like every list item, `MessageView` is created fresh each frame. Three
/// shapes are possible:
///
/// - **Rich result**: delegated to [`ResultRow`] (fixed height)
/// - **Output**: assistant text rendered as markdown
/// - **Everything else**: a colored prefix with a hanging indent, plus an
///   optional dim badge (`[failed · 3 attempts]`)
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) builds the same lines the
/// renderer draws, so the parent list can lay out its scroll canvas without
/// rendering. Plain lines are pre-wrapped with `textwrap` and drawn without
/// `Paragraph` wrapping; markdown uses `Paragraph::line_count`.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a TerminalMessage,
    /// Only meaningful for rich results.
    pub is_selected: bool,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a TerminalMessage, is_selected: bool) -> Self {
        Self {
            message,
            is_selected,
        }
    }

    pub fn calculate_height(message: &TerminalMessage, width: u16) -> u16 {
        if width == 0 {
            return 1;
        }
        if message.is_rich_result() {
            return ResultRow::HEIGHT;
        }
        if message.kind == MessageKind::Output {
            let count = output_paragraph(message).line_count(width);
            return (count as u16).max(1);
        }
        (plain_lines(message, width).len() as u16).max(1)
    }
}

pub fn kind_style(kind: MessageKind) -> Style {
    match kind {
        MessageKind::Input => Style::default().fg(Color::Cyan),
        MessageKind::Output => Style::default().fg(Color::White),
        MessageKind::Error => Style::default().fg(Color::Red),
        MessageKind::System => Style::default().fg(Color::Yellow),
        MessageKind::Validated => Style::default().fg(Color::Green),
        MessageKind::ValidationError => Style::default().fg(Color::LightRed),
    }
}

/// Dim suffix for result messages that don't get the rich row.
fn badge(message: &TerminalMessage) -> Option<String> {
    let status = match message.kind {
        MessageKind::Validated => "validated",
        MessageKind::ValidationError => "failed",
        _ => return None,
    };
    Some(match message.attempts() {
        Some(n) => format!("[{status} · {}]", attempts_label(n)),
        None => format!("[{status}]"),
    })
}

fn output_paragraph(message: &TerminalMessage) -> Paragraph<'static> {
    let text = markdown::render(message.text.trim(), Color::White);
    Paragraph::new(text).wrap(Wrap { trim: false })
}

fn plain_lines(message: &TerminalMessage, width: u16) -> Vec<Line<'static>> {
    let style = kind_style(message.kind);
    let prefix = message.kind.prefix();
    let prefix_width = prefix.width();
    let indent = " ".repeat(prefix_width);
    let width = (width as usize).max(prefix_width + 1);

    let options = textwrap::Options::new(width)
        .initial_indent(prefix)
        .subsequent_indent(&indent)
        .break_words(true);

    let mut lines: Vec<Line<'static>> = textwrap::wrap(message.text.trim_end(), options)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            if i == 0 && !prefix.is_empty() {
                let body = row.strip_prefix(prefix).unwrap_or(row.as_ref()).to_string();
                Line::from(vec![
                    Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                    Span::styled(body, style),
                ])
            } else {
                Line::styled(row.into_owned(), style)
            }
        })
        .collect();

    if let Some(badge) = badge(message) {
        let dim = Style::default().fg(Color::DarkGray);
        let last_width = lines.last().map_or(0, |l| l.width());
        // Badge joins the last line when it fits, otherwise gets its own
        if last_width > 0 && last_width + 1 + badge.width() <= width {
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled(format!(" {badge}"), dim));
            }
        } else {
            lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(badge, dim),
            ]));
        }
    }
    lines
}

impl<'a> Widget for MessageView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.message.is_rich_result() {
            ResultRow::new(self.message, self.is_selected).render(area, buf);
        } else if self.message.kind == MessageKind::Output {
            output_paragraph(self.message).render(area, buf);
        } else {
            Paragraph::new(Text::from(plain_lines(self.message, area.width))).render(area, buf);
        }
    }
}

impl<'a> Component for MessageView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn input_line_has_prefix_and_hanging_indent() {
        let msg = TerminalMessage::input("build a component that reverses text");
        let lines = plain_lines(&msg, 20);
        assert!(line_text(&lines[0]).starts_with("> build"));
        for line in &lines[1..] {
            assert!(line_text(line).starts_with("  "), "{:?}", line_text(line));
        }
        assert_eq!(MessageView::calculate_height(&msg, 20) as usize, lines.len());
    }

    #[test]
    fn single_short_message_is_one_line() {
        let msg = TerminalMessage::system("Terminal cleared.");
        assert_eq!(MessageView::calculate_height(&msg, 80), 1);
    }

    #[test]
    fn hard_newlines_preserved() {
        let msg = TerminalMessage::system("one\ntwo\nthree");
        assert_eq!(MessageView::calculate_height(&msg, 80), 3);
    }

    #[test]
    fn long_words_break_at_width() {
        let msg = TerminalMessage::error("abcdefghij");
        // "✗ " takes 2 columns, leaving 4 per row at width 6
        assert_eq!(MessageView::calculate_height(&msg, 6), 3);
    }

    #[test]
    fn zero_width_returns_minimum() {
        let msg = TerminalMessage::input("hello");
        assert_eq!(MessageView::calculate_height(&msg, 0), 1);
    }

    #[test]
    fn validation_error_badge_on_same_line() {
        let msg = TerminalMessage::validation_error("Could not validate", None, None, Some(4));
        let lines = plain_lines(&msg, 80);
        assert_eq!(lines.len(), 1);
        assert!(line_text(&lines[0]).ends_with("[failed · 4 attempts]"));
    }

    #[test]
    fn badge_wraps_to_own_line_when_narrow() {
        let msg = TerminalMessage::validation_error("Could not validate", None, None, Some(4));
        let lines = plain_lines(&msg, 22);
        assert!(line_text(lines.last().unwrap()).contains("[failed · 4 attempts]"));
        assert_eq!(MessageView::calculate_height(&msg, 22) as usize, lines.len());
    }

    #[test]
    fn validated_without_code_is_plain_with_badge() {
        let msg = TerminalMessage::validated("done", Some("Foo".into()), None, Some(1));
        assert!(!msg.is_rich_result());
        let lines = plain_lines(&msg, 80);
        assert!(line_text(&lines[0]).contains("[validated · 1 attempt]"));
    }

    #[test]
    fn rich_result_has_fixed_height() {
        let msg = TerminalMessage::validated("done", Some("Foo".into()), Some("code".into()), Some(2));
        assert_eq!(MessageView::calculate_height(&msg, 80), ResultRow::HEIGHT);
    }

    #[test]
    fn output_height_counts_markdown_lines() {
        let msg = TerminalMessage::output("first\n\nsecond");
        assert_eq!(MessageView::calculate_height(&msg, 80), 3);
    }

    #[test]
    fn kind_colors() {
        assert_eq!(kind_style(MessageKind::Error).fg, Some(Color::Red));
        assert_eq!(kind_style(MessageKind::Input).fg, Some(Color::Cyan));
        assert_eq!(kind_style(MessageKind::System).fg, Some(Color::Yellow));
    }
}
