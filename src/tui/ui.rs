use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{CodeViewer, MessageList, TitleBar};
use crate::tui::{InputMode, TuiState};

const HOST_HINT: &str = "Press F2 to toggle the component generator";
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draws the whole screen: title bar, host area, the generator panel when
/// open, and the code viewer overlay on top.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    tui.sync(app);

    let area = frame.area();
    let panel_height = if app.phase.is_open() {
        tui.resize.height(area.height)
    } else {
        0
    };
    let [title_area, host_area, panel_area] =
        Layout::vertical([Length(1), Min(0), Length(panel_height)]).areas(area);

    let target = TitleBar::target_label(app.provider.as_deref(), app.model_name.as_deref());
    TitleBar::new(target, app.status_message.clone(), tui.message_list.has_unseen)
        .render(frame, title_area);

    draw_host(frame, host_area);

    if app.phase.is_open() {
        tui.panel_area = Some(panel_area);
        draw_panel(frame, panel_area, app, tui);
    } else {
        tui.panel_area = None;
    }

    if let Some(id) = &app.viewing_code
        && let Some(message) = app.messages.find(id)
        && let Some(code) = message.code()
    {
        CodeViewer {
            state: &mut tui.code_viewer,
            class_name: message.class_name(),
            code,
        }
        .render(frame, area);
    }
}

fn draw_host(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let [middle] = Layout::vertical([Constraint::Length(1)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    frame.render_widget(
        Paragraph::new(HOST_HINT)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        middle,
    );
}

fn draw_panel(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let border_style = if tui.resize.is_dragging() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let hint = match tui.input_mode {
        InputMode::Results => " v view · d download · a canvas · s sidebar · Esc back ",
        InputMode::Input => " Tab results · Ctrl+L clear · Esc close ",
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Span::styled(
            " Generate Component ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(hint).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status_height = u16::from(app.is_submitting());
    let input_height = tui.input_box.calculate_height(inner.width);
    let [list_area, status_area, input_area] =
        Layout::vertical([Min(1), Length(status_height), Length(input_height)]).areas(inner);

    MessageList::new(&mut tui.message_list, app.messages.as_slice()).render(frame, list_area);

    if status_height > 0 {
        frame.render_widget(status_line(app, tui.spinner_frame, status_area.width), status_area);
    }

    tui.input_box.render(frame, input_area);
}

/// Spinner, progress label and the tail of the streamed preview.
fn status_line(app: &App, spinner_frame: usize, width: u16) -> Line<'static> {
    let label = match &app.progress {
        Some(progress) => progress.label(),
        None => String::from("Generating..."),
    };
    let mut spans = vec![
        Span::styled(
            format!("{} ", SPINNER[spinner_frame % SPINNER.len()]),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(label.clone(), Style::default().fg(Color::Cyan)),
    ];

    let used = label.chars().count() + 2;
    let room = (width as usize).saturating_sub(used + 3);
    let tail = app.preview.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    if room > 0 && !tail.is_empty() {
        let chars: Vec<char> = tail.trim().chars().collect();
        let start = chars.len().saturating_sub(room);
        let shown: String = chars[start..].iter().collect();
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(
            shown,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}
