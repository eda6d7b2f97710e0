//! Markdown → ratatui `Text` for assistant output, plus syntect code
//! highlighting shared with the code viewer.
//!
//! Output messages are short, so the renderer keeps to what the assistant
//! actually emits: paragraphs, headings, emphasis, inline code, lists and
//! fenced code blocks. Anything else degrades to its plain text.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";
const CODE_INDENT: &str = "  ";

/// Highlights `code` as `lang` (a syntect token such as "python" or "py").
///
/// Unknown languages, or a missing theme, fall back to plain white lines.
/// Tabs are expanded because ratatui renders them zero-width.
pub fn highlight_code(code: &str, lang: &str) -> Vec<Line<'static>> {
    let syntax = SYNTAX_SET.find_syntax_by_token(lang);
    let theme = THEME_SET.themes.get(THEME);

    let (Some(syntax), Some(theme)) = (syntax, theme) else {
        return code
            .lines()
            .map(|l| Line::styled(l.replace('\t', "    "), Style::default().fg(Color::White)))
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for raw in LinesWithEndings::from(code) {
        let spans: Vec<Span<'static>> = match highlighter.highlight_line(raw, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .filter_map(|(style, frag)| {
                    let content = frag.trim_end_matches(['\n', '\r']).replace('\t', "    ");
                    if content.is_empty() {
                        return None;
                    }
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    Some(Span::styled(content, Style::default().fg(fg)))
                })
                .collect(),
            Err(e) => {
                log::debug!("Highlighting failed, using plain text: {}", e);
                vec![Span::raw(raw.trim_end_matches(['\n', '\r']).replace('\t', "    "))]
            }
        };
        lines.push(Line::from(spans));
    }
    lines
}

/// Renders markdown `content` with `base_fg` as the default text color.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Style,
    /// Inline styles compose so nested bold + italic works.
    styles: Vec<Style>,
    /// `None` = bullet list, `Some(n)` = ordered list at item n.
    lists: Vec<Option<u64>>,
    /// Language and buffered text of the open fenced block.
    code: Option<(String, String)>,
    /// A block just closed; the next block starts after a blank line.
    gap: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(base_fg),
            styles: Vec::new(),
            lists: Vec::new(),
            code: None,
            gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn start_block(&mut self) {
        if self.gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.gap = false;
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.lines.push(Line::from(span)),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        if let Some((_, buf)) = self.code.as_mut() {
            match event {
                Event::Text(t) => buf.push_str(&t),
                Event::End(TagEnd::CodeBlock) => self.close_code_block(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => {
                let style = self.style();
                self.push_span(Span::styled(t.replace('\t', "    "), style));
            }
            Event::Code(c) => {
                self.push_span(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                ));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.lines.push(Line::default()),
            Event::Rule => {
                self.start_block();
                self.lines.push(Line::styled("─".repeat(24), Style::default().fg(Color::DarkGray)));
                self.gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // A paragraph inside a list item continues the item's line
                if self.lists.is_empty() {
                    self.start_block();
                    self.lines.push(Line::default());
                }
            }
            Tag::Heading { .. } => {
                self.start_block();
                self.lines.push(Line::default());
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(l) => l.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some((lang, String::new()));
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}- "),
                };
                self.lines.push(Line::from(Span::styled(marker, Style::default().fg(Color::DarkGray))));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.gap = self.lists.is_empty(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = self.lists.is_empty();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn close_code_block(&mut self) {
        let Some((lang, body)) = self.code.take() else {
            return;
        };
        let lang = if lang.is_empty() { "txt" } else { lang.as_str() };
        for mut line in highlight_code(&body, lang) {
            line.spans.insert(0, Span::raw(CODE_INDENT));
            self.lines.push(line);
        }
        self.gap = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(plain(&text), vec!["hello"]);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn paragraphs_separated_by_blank_line() {
        let text = render("one\n\ntwo", Color::White);
        assert_eq!(plain(&text), vec!["one", "", "two"]);
    }

    #[test]
    fn heading_is_bold_without_hashes() {
        let text = render("## Summary", Color::Blue);
        assert_eq!(plain(&text), vec!["Summary"]);
        let span = &text.lines[0].spans[0];
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Blue));
    }

    #[test]
    fn nested_emphasis_composes() {
        let text = render("***both***", Color::White);
        let span = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "both")
            .unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert!(span.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn inline_code_styled() {
        let text = render("Use `build()` here", Color::White);
        let span = text.lines[0]
            .spans
            .iter()
            .find(|s| s.content == "build()")
            .unwrap();
        assert_eq!(span.style.bg, Some(Color::DarkGray));
    }

    #[test]
    fn lists_get_markers() {
        let text = render("- a\n- b\n\n1. x\n2. y", Color::White);
        let lines = plain(&text);
        assert!(lines.contains(&"- a".to_string()));
        assert!(lines.contains(&"- b".to_string()));
        assert!(lines.contains(&"1. x".to_string()));
        assert!(lines.contains(&"2. y".to_string()));
    }

    #[test]
    fn code_block_is_indented_and_keeps_lines() {
        let text = render("intro\n\n```python\nclass Foo:\n\tpass\n```", Color::White);
        let lines = plain(&text);
        assert_eq!(lines[0], "intro");
        assert!(lines.iter().any(|l| l == "  class Foo:"));
        assert!(lines.iter().any(|l| l == "      pass"), "tab expanded: {lines:?}");
    }

    #[test]
    fn highlight_unknown_language_falls_back_to_plain() {
        let lines = highlight_code("a\nb", "no-such-language");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::White));
    }

    #[test]
    fn highlight_python_colors_spans() {
        let lines = highlight_code("def f():\n    return 1\n", "python");
        assert_eq!(lines.len(), 2);
        assert!(
            lines[0].spans.iter().all(|s| matches!(s.style.fg, Some(Color::Rgb(..)))),
            "expected syntect colors"
        );
    }
}
