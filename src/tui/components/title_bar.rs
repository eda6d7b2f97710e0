//! # TitleBar Component
//!
//! Top status line: app name, backend target, status and the "↓ New"
//! indicator.
//!
//! ```text
//! genterm | openai/gpt-4o | Validating (attempt 2/4) | ↓ New
//! ```
//!
//! Purely presentational. Segments are dropped from the right when absent,
//! so the most important information survives on narrow terminals.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

/// # Props
///
/// - `target`: "provider/model" as far as configured, empty when neither is
/// - `status_message`: transient status from the reducer
/// - `has_unseen_content`: messages arrived below the scroll position
pub struct TitleBar {
    pub target: String,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(target: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            target,
            status_message,
            has_unseen_content,
        }
    }

    /// Joins optional provider and model into the display target.
    pub fn target_label(provider: Option<&str>, model: Option<&str>) -> String {
        match (provider, model) {
            (Some(p), Some(m)) => format!("{p}/{m}"),
            (Some(p), None) => p.to_string(),
            (None, Some(m)) => m.to_string(),
            (None, None) => String::new(),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let sep = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![Span::styled(
            "genterm",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if !self.target.is_empty() {
            spans.push(sep.clone());
            spans.push(Span::raw(self.target.clone()));
        }
        if !self.status_message.is_empty() {
            spans.push(sep.clone());
            spans.push(Span::raw(self.status_message.clone()));
        }
        if self.has_unseen_content {
            spans.push(sep);
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }
        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(mut title_bar: TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_full() {
        let text = render(TitleBar::new(
            "openai/gpt-4o".into(),
            "Validating (attempt 2/4)".into(),
            true,
        ));
        assert!(text.contains("genterm"));
        assert!(text.contains("openai/gpt-4o"));
        assert!(text.contains("Validating (attempt 2/4)"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_bare() {
        let text = render(TitleBar::new(String::new(), String::new(), false));
        assert!(text.contains("genterm"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_target_label() {
        assert_eq!(TitleBar::target_label(Some("openai"), Some("gpt-4o")), "openai/gpt-4o");
        assert_eq!(TitleBar::target_label(None, Some("gpt-4o")), "gpt-4o");
        assert_eq!(TitleBar::target_label(None, None), "");
    }
}
