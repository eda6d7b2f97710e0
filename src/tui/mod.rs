//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard and mouse events into `core::Action` values, and
//! carries out the `Effect`s the reducer returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! Events pass through a fixed precedence:
//!
//! 1. Global keys (Ctrl+C, F2)
//! 2. Closed terminal: only Esc/q (quit) and F2 mean anything
//! 3. Code viewer overlay (modal)
//! 4. Mouse (resize handle, result row clicks), scrolling, Ctrl+L, Tab
//! 5. The current `InputMode`: result shortcuts or the input box
//!
//! ## Redraw Strategy
//!
//! While a submission is running the loop redraws every ~80ms so the
//! spinner moves. Otherwise it sleeps up to 500ms and only redraws on
//! events or background actions.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

pub use ui::draw_ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::assist::{
    AssistError, ComponentGenerator, ComponentSink, GenerationEvent, GenerationRequest,
    LangflowClient,
};
use crate::core::action::{Action, Effect, ResultAction, ResultActionKind, update};
use crate::core::config::ResolvedConfig;
use crate::core::history::{FileStorage, HistoryStore};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    CodeViewerEvent, CodeViewerState, InputBox, InputEvent, MessageListState, PanelResize,
    ResultRow, RowAction,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Modal input mode: determines how keys are interpreted inside the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing goes to the input box.
    Input,
    /// A result row is selected; v/d/a/s act on it. Other typing switches
    /// back to Input.
    Results,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub(crate) message_list: MessageListState,
    pub(crate) input_box: InputBox,
    pub(crate) input_mode: InputMode,
    pub(crate) resize: PanelResize,
    pub(crate) code_viewer: CodeViewerState,
    /// Panel rect from the last draw; its top row is the resize handle
    pub(crate) panel_area: Option<Rect>,
    pub(crate) spinner_frame: usize,
}

impl TuiState {
    pub fn new(panel_height: u16) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            input_mode: InputMode::Input,
            resize: PanelResize::new(panel_height),
            code_viewer: CodeViewerState::default(),
            panel_area: None,
            spinner_frame: 0,
        }
    }

    /// Pushes App state into component props before a draw.
    fn sync(&mut self, app: &App) {
        if self.message_list.selected_index.is_none() {
            self.input_mode = InputMode::Input;
        }
        self.input_box.disabled = app.is_submitting();
        self.input_box.focused =
            self.input_mode == InputMode::Input && app.viewing_code.is_none();
    }

    fn leave_results(&mut self) {
        self.input_mode = InputMode::Input;
        self.message_list.clear_selection();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter be told apart from Enter.
        // Terminals without it ignore the sequence; Ctrl+J still works there.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// The Langflow client serves as both generator and sink.
pub fn build_client(config: &ResolvedConfig) -> LangflowClient {
    LangflowClient::new(config.base_url.clone())
        .with_api_key(config.api_key.clone())
        .with_assist_path(config.assist_path.clone())
        .with_flow_id(config.flow_id.clone())
        .with_download_dir(config.download_dir.clone())
        .with_components_dir(config.components_dir.clone())
}

pub fn build_history(config: &ResolvedConfig) -> HistoryStore {
    if !config.persist_history {
        return HistoryStore::in_memory();
    }
    match FileStorage::default_dir() {
        Some(dir) => {
            info!("Persisting prompt history under {}", dir.display());
            HistoryStore::new(Box::new(FileStorage::new(dir)))
        }
        None => {
            warn!("No home directory; prompt history kept in memory");
            HistoryStore::in_memory()
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let client = Arc::new(build_client(&config));
    let history = build_history(&config);
    let mut app = App::from_config(client.clone(), client, history, &config);
    let mut tui = TuiState::new(config.panel_height);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    update(&mut app, Action::Open);

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        let animating = app.is_submitting();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_millis() / 80) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let frame_height = terminal.size()?.height;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&event, &app, &mut tui, frame_height)
                && dispatch(&mut app, action, &tx)
            {
                break 'main;
            }
        }

        // Drain background task actions (progress, tokens, results)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, action, &tx) {
                break 'main;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Runs one action through the reducer and starts whatever it asks for.
/// Returns true when the app should quit.
fn dispatch(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnGeneration(request) => {
            tokio::spawn(run_generation(app.generator.clone(), request, tx.clone()));
            false
        }
        Effect::RunResultAction(action) => {
            let sink = app.sink.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = run_result_action(sink.as_ref(), &action).await;
                if tx.send(Action::ResultActionDone(outcome)).is_err() {
                    warn!("Failed to send result action outcome: receiver dropped");
                }
            });
            false
        }
    }
}

/// Maps one terminal event to at most one reducer action, updating TUI-only
/// state (selection, scroll, resize, input buffer) along the way.
fn route_event(
    event: &TuiEvent,
    app: &App,
    tui: &mut TuiState,
    frame_height: u16,
) -> Option<Action> {
    // A submit earlier in the same batch may have started a generation
    // before any redraw could disable the input box.
    tui.input_box.disabled = app.is_submitting();

    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        TuiEvent::ToggleTerminal => {
            return Some(if app.phase.is_open() {
                Action::Close
            } else {
                Action::Open
            });
        }
        _ => {}
    }

    if !app.phase.is_open() {
        return match event {
            TuiEvent::Escape | TuiEvent::InputChar('q') => Some(Action::Quit),
            _ => None,
        };
    }

    if app.viewing_code.is_some() {
        return match tui.code_viewer.handle_event(event) {
            Some(CodeViewerEvent::Close) => Some(Action::CloseCodeView),
            None => None,
        };
    }

    match *event {
        TuiEvent::MouseDown(column, row) => return route_click(column, row, app, tui, frame_height),
        TuiEvent::MouseDrag(_, row) => {
            tui.resize.drag_to(row, frame_height);
            return None;
        }
        TuiEvent::MouseUp(..) => {
            tui.resize.end();
            return None;
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(event);
            return None;
        }
        TuiEvent::Clear => return Some(Action::Clear),
        TuiEvent::CycleResult => {
            let rich = app.messages.rich_result_indices();
            tui.input_mode = match tui.message_list.cycle_selection(&rich) {
                Some(_) => InputMode::Results,
                None => InputMode::Input,
            };
            return None;
        }
        _ => {}
    }

    match tui.input_mode {
        InputMode::Results => route_results(event, app, tui),
        InputMode::Input => route_input(event, app, tui),
    }
}

fn selected_result_id(app: &App, tui: &TuiState) -> Option<String> {
    let index = tui.message_list.selected_index?;
    app.messages
        .get(index)
        .filter(|m| m.is_rich_result())
        .map(|m| m.id.clone())
}

fn row_action(action: RowAction, id: String, tui: &mut TuiState) -> Action {
    if action == RowAction::ViewCode {
        tui.code_viewer.reset();
    }
    action.into_action(id)
}

fn route_results(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::Escape | TuiEvent::Submit => {
            tui.leave_results();
            None
        }
        TuiEvent::InputChar(c) => {
            if let Some(action) = RowAction::from_key(*c) {
                let id = selected_result_id(app, tui)?;
                return Some(row_action(action, id, tui));
            }
            tui.leave_results();
            route_input(event, app, tui)
        }
        TuiEvent::Paste(_) => {
            tui.leave_results();
            route_input(event, app, tui)
        }
        _ => None,
    }
}

fn route_input(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    if matches!(event, TuiEvent::Escape) {
        return Some(Action::Close);
    }
    match tui.input_box.handle_event(event)? {
        InputEvent::Submit(text) => Some(Action::Submit(text)),
        InputEvent::RecallOlder => {
            tui.input_box.recall_older(&app.history.read());
            None
        }
        InputEvent::RecallNewer => {
            tui.input_box.recall_newer(&app.history.read());
            None
        }
        InputEvent::ContentChanged => None,
    }
}

fn route_click(
    column: u16,
    row: u16,
    app: &App,
    tui: &mut TuiState,
    frame_height: u16,
) -> Option<Action> {
    if let Some(panel) = tui.panel_area
        && tui.resize.begin(row, panel.y, frame_height)
    {
        return None;
    }

    let hit = tui.message_list.hit(column, row)?;
    let message = app.messages.get(hit.index).filter(|m| m.is_rich_result())?;
    tui.message_list.selected_index = Some(hit.index);
    tui.input_mode = InputMode::Results;

    // Second line of a result row holds the action labels
    if hit.row == 1
        && let Some(action) = ResultRow::action_at(hit.column)
    {
        return Some(row_action(action, message.id.clone(), tui));
    }
    None
}

/// Runs one generation and reports everything it produces as actions.
///
/// Progress and tokens are forwarded as they arrive. The final
/// `GenerationFinished` is sent only after the forwarder has drained, so it
/// is always the last action of a submission.
pub async fn run_generation(
    generator: Arc<dyn ComponentGenerator>,
    request: GenerationRequest,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Starting generation via {} ({} chars)",
        generator.name(),
        request.prompt.len()
    );
    let started = Instant::now();
    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<GenerationEvent>(100);

    let forward_tx = tx.clone();
    let forwarder = tokio::spawn(async move {
        let mut token_bytes = 0usize;
        while let Some(event) = event_rx.recv().await {
            let action = match event {
                GenerationEvent::Progress(progress) => {
                    debug!("Progress: {}", progress.label());
                    Action::GenerationProgress(progress)
                }
                GenerationEvent::Token(chunk) => {
                    token_bytes += chunk.len();
                    Action::GenerationToken(chunk)
                }
            };
            if forward_tx.send(action).is_err() {
                warn!("Failed to forward generation event: receiver dropped");
                return;
            }
        }
        debug!("Progress channel closed after {} token bytes", token_bytes);
    });

    let result = generator.generate(request, event_tx).await;
    if let Err(e) = forwarder.await {
        warn!("Progress forwarder failed: {}", e);
    }

    let outcome = result.map_err(|e| e.to_string());
    match &outcome {
        Ok(response) => info!(
            "Generation finished in {}ms (validated={:?})",
            started.elapsed().as_millis(),
            response.validated
        ),
        Err(e) => warn!("Generation failed after {}ms: {}", started.elapsed().as_millis(), e),
    }
    if tx.send(Action::GenerationFinished(outcome)).is_err() {
        warn!("Failed to send GenerationFinished: receiver dropped");
    }
}

/// Performs a result-row action against the sink, returning the line to
/// show in the transcript.
pub async fn run_result_action(
    sink: &dyn ComponentSink,
    action: &ResultAction,
) -> Result<String, String> {
    let class_name = action.class_name.as_deref();
    info!("{} for {:?}", action.kind.label(), class_name);
    let outcome = match action.kind {
        ResultActionKind::Download => sink
            .download(&action.code, class_name)
            .await
            .map(|path| format!("Downloaded to {}", path.display())),
        ResultActionKind::AddToCanvas => sink
            .add_to_canvas(&action.code)
            .await
            .map(|()| format!("Added {} to canvas", class_name.unwrap_or("component"))),
        ResultActionKind::SaveToSidebar => match class_name {
            Some(name) => sink
                .save_to_sidebar(&action.code, name)
                .await
                .map(|path| format!("Saved to sidebar: {}", path.display())),
            None => Err(AssistError::Config(
                "component has no class name".to_string(),
            )),
        },
    };
    outcome.map_err(|e| {
        warn!("{} failed: {}", action.kind.label(), e);
        format!("{} failed: {}", action.kind.label(), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::{GenerationProgress, GenerationResponse};
    use crate::core::state::TerminalPhase;
    use crate::test_support::{RecordingSink, ScriptedGenerator, open_app, test_app, validated_response};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    const FRAME_HEIGHT: u16 = 30;

    fn draw(app: &App, tui: &mut TuiState) {
        let mut terminal = Terminal::new(TestBackend::new(100, FRAME_HEIGHT)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui)).unwrap();
    }

    fn route(event: TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
        route_event(&event, app, tui, FRAME_HEIGHT)
    }

    fn type_line(text: &str, app: &App, tui: &mut TuiState) -> Option<Action> {
        for c in text.chars() {
            route(TuiEvent::InputChar(c), app, tui);
        }
        route(TuiEvent::Submit, app, tui)
    }

    fn app_with_result() -> App {
        let mut app = open_app();
        update(&mut app, Action::Submit("make Foo".into()));
        update(&mut app, Action::GenerationFinished(Ok(validated_response("Foo", 2))));
        app
    }

    #[test]
    fn test_f2_toggles_and_ctrl_c_quits() {
        let app = test_app();
        let mut tui = TuiState::new(16);
        assert_eq!(route(TuiEvent::ToggleTerminal, &app, &mut tui), Some(Action::Open));
        assert_eq!(route(TuiEvent::ForceQuit, &app, &mut tui), Some(Action::Quit));

        let app = open_app();
        assert_eq!(route(TuiEvent::ToggleTerminal, &app, &mut tui), Some(Action::Close));
    }

    #[test]
    fn test_closed_terminal_ignores_typing() {
        let app = test_app();
        let mut tui = TuiState::new(16);
        assert_eq!(route(TuiEvent::InputChar('x'), &app, &mut tui), None);
        assert_eq!(route(TuiEvent::InputChar('q'), &app, &mut tui), Some(Action::Quit));
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let app = open_app();
        let mut tui = TuiState::new(16);
        assert_eq!(
            type_line("help", &app, &mut tui),
            Some(Action::Submit("help".into()))
        );
    }

    #[test]
    fn test_escape_closes_terminal_from_input() {
        let app = open_app();
        let mut tui = TuiState::new(16);
        assert_eq!(route(TuiEvent::Escape, &app, &mut tui), Some(Action::Close));
    }

    #[test]
    fn test_ctrl_l_clears() {
        let app = open_app();
        let mut tui = TuiState::new(16);
        assert_eq!(route(TuiEvent::Clear, &app, &mut tui), Some(Action::Clear));
    }

    #[test]
    fn test_history_recall_through_router() {
        let mut app = open_app();
        let mut tui = TuiState::new(16);
        let action = type_line("X", &app, &mut tui).unwrap();
        update(&mut app, action);
        update(&mut app, Action::GenerationFinished(Ok(GenerationResponse::default())));

        route(TuiEvent::CursorUp, &app, &mut tui);
        assert_eq!(tui.input_box.buffer, "X");
        route(TuiEvent::CursorDown, &app, &mut tui);
        assert_eq!(tui.input_box.buffer, "");
    }

    #[test]
    fn test_tab_selects_result_and_keys_act() {
        let app = app_with_result();
        let id = app.messages.last().unwrap().id.clone();
        let mut tui = TuiState::new(16);
        draw(&app, &mut tui);

        route(TuiEvent::CycleResult, &app, &mut tui);
        assert_eq!(tui.input_mode, InputMode::Results);
        assert_eq!(
            route(TuiEvent::InputChar('d'), &app, &mut tui),
            Some(Action::Download(id.clone()))
        );
        assert_eq!(
            route(TuiEvent::InputChar('v'), &app, &mut tui),
            Some(Action::ViewCode(id))
        );

        // Any other key returns to the input box and types
        assert_eq!(route(TuiEvent::InputChar('x'), &app, &mut tui), None);
        assert_eq!(tui.input_mode, InputMode::Input);
        assert_eq!(tui.input_box.buffer, "x");
    }

    #[test]
    fn test_tab_without_results_stays_in_input() {
        let app = open_app();
        let mut tui = TuiState::new(16);
        route(TuiEvent::CycleResult, &app, &mut tui);
        assert_eq!(tui.input_mode, InputMode::Input);
    }

    #[test]
    fn test_code_viewer_is_modal() {
        let mut app = app_with_result();
        let id = app.messages.last().unwrap().id.clone();
        update(&mut app, Action::ViewCode(id));
        let mut tui = TuiState::new(16);

        assert_eq!(route(TuiEvent::InputChar('a'), &app, &mut tui), None);
        assert!(tui.input_box.buffer.is_empty());
        assert_eq!(route(TuiEvent::Escape, &app, &mut tui), Some(Action::CloseCodeView));
    }

    #[test]
    fn test_click_on_result_action_label() {
        let app = app_with_result();
        let id = app.messages.last().unwrap().id.clone();
        let mut tui = TuiState::new(16);
        draw(&app, &mut tui);

        // Locate the result row on screen through the list's own hit test
        let (col, row) = (0..FRAME_HEIGHT)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .find(|&(x, y)| {
                tui.message_list
                    .hit(x, y)
                    .is_some_and(|h| h.index == app.messages.len() - 1 && h.row == 1 && h.column == 16)
            })
            .unwrap();
        assert_eq!(
            route(TuiEvent::MouseDown(col, row), &app, &mut tui),
            Some(Action::Download(id))
        );
        assert_eq!(tui.input_mode, InputMode::Results);
    }

    #[test]
    fn test_drag_top_border_resizes_panel() {
        let app = open_app();
        let mut tui = TuiState::new(16);
        draw(&app, &mut tui);
        let handle = tui.panel_area.unwrap().y;

        route(TuiEvent::MouseDown(10, handle), &app, &mut tui);
        assert!(tui.resize.is_dragging());
        route(TuiEvent::MouseDrag(10, handle - 4), &app, &mut tui);
        route(TuiEvent::MouseUp(10, handle - 4), &app, &mut tui);
        assert!(!tui.resize.is_dragging());

        draw(&app, &mut tui);
        assert_eq!(tui.panel_area.unwrap().height, 20);
    }

    #[test]
    fn test_input_rejected_while_submitting() {
        let mut app = open_app();
        update(&mut app, Action::Submit("slow".into()));
        assert_eq!(app.phase, TerminalPhase::Submitting);
        let mut tui = TuiState::new(16);
        draw(&app, &mut tui);
        assert_eq!(type_line("more", &app, &mut tui), None);
        assert!(tui.input_box.buffer.is_empty());
    }

    #[test]
    fn test_batched_second_submit_rejected_before_redraw() {
        let mut app = open_app();
        let mut tui = TuiState::new(16);
        draw(&app, &mut tui);

        let first = type_line("first", &app, &mut tui).unwrap();
        assert!(matches!(update(&mut app, first), Effect::SpawnGeneration(_)));

        // Same event batch: no draw between the two lines
        assert_eq!(type_line("second", &app, &mut tui), None);
        assert!(tui.input_box.disabled);
        assert!(tui.input_box.buffer.is_empty());
        assert_eq!(app.history.read(), vec!["first".to_string()]);
        assert_eq!(app.phase, TerminalPhase::Submitting);

        // Finishing re-enables typing on the next event
        update(&mut app, Action::GenerationFinished(Err("down".into())));
        route(TuiEvent::InputChar('x'), &app, &mut tui);
        assert_eq!(tui.input_box.buffer, "x");
    }

    #[tokio::test]
    async fn test_run_generation_forwards_events_then_finishes() {
        let mut generator = ScriptedGenerator::ok(validated_response("Foo", 2));
        generator.events = vec![
            GenerationEvent::Progress(GenerationProgress {
                step: "generating".into(),
                attempt: 1,
                max_attempts: 4,
            }),
            GenerationEvent::Token("class Foo".into()),
        ];
        let (tx, rx) = mpsc::channel();
        let request = GenerationRequest {
            prompt: "make Foo".into(),
            provider: None,
            model_name: None,
            max_retries: Default::default(),
        };
        run_generation(Arc::new(generator), request, tx).await;

        let actions: Vec<Action> = rx.try_iter().collect();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[0], Action::GenerationProgress(_)));
        assert_eq!(actions[1], Action::GenerationToken("class Foo".into()));
        assert!(matches!(actions[2], Action::GenerationFinished(Ok(_))));
    }

    #[tokio::test]
    async fn test_run_generation_reports_error_text() {
        let (tx, rx) = mpsc::channel();
        let request = GenerationRequest {
            prompt: "x".into(),
            provider: None,
            model_name: None,
            max_retries: Default::default(),
        };
        run_generation(Arc::new(ScriptedGenerator::failing("down")), request, tx).await;
        let last = rx.try_iter().last().unwrap();
        assert_eq!(
            last,
            Action::GenerationFinished(Err("down".into()))
        );
    }

    #[test]
    fn test_run_result_action_messages() {
        let sink = RecordingSink::default();
        let action = ResultAction {
            kind: ResultActionKind::SaveToSidebar,
            code: "class Foo: pass".into(),
            class_name: Some("Foo".into()),
        };
        assert_eq!(
            tokio_test::block_on(run_result_action(&sink, &action)),
            Ok("Saved to sidebar: Foo.py".into())
        );

        let nameless = ResultAction {
            class_name: None,
            ..action
        };
        let err = tokio_test::block_on(run_result_action(&sink, &nameless)).unwrap_err();
        assert!(err.starts_with("Save to sidebar failed"));

        let canvas = ResultAction {
            kind: ResultActionKind::AddToCanvas,
            code: "x".into(),
            class_name: Some("Foo".into()),
        };
        assert_eq!(
            tokio_test::block_on(run_result_action(&sink, &canvas)),
            Ok("Added Foo to canvas".into())
        );
        assert_eq!(
            sink.calls.lock().unwrap().as_slice(),
            ["sidebar:Foo".to_string(), "canvas:1".to_string()]
        );
    }

    #[test]
    fn test_dispatch_plain_response_without_spawn() {
        let mut app = open_app();
        let (tx, _rx) = mpsc::channel();
        let response = GenerationResponse {
            content: "plain".into(),
            ..Default::default()
        };
        update(&mut app, Action::Submit("q".into()));
        assert!(!dispatch(&mut app, Action::GenerationFinished(Ok(response)), &tx));
        assert!(dispatch(&mut app, Action::Quit, &tx));
    }
}
