//! # Actions
//!
//! Everything that can happen in the terminal becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The backend finishes? That's `Action::GenerationFinished(result)`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state and returns an `Effect`. No I/O here: spawning the
//! generation or writing a file is the adapter's job.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::assist::{GenerationProgress, GenerationRequest, GenerationResponse};
use crate::core::command::{self, CommandResult};
use crate::core::message::{TerminalMessage, cleared_messages, welcome_messages};
use crate::core::state::{App, TerminalPhase};

pub const GENERIC_ERROR_TEXT: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open,
    Close,
    Submit(String),
    GenerationProgress(GenerationProgress),
    /// Streamed token text for the live preview.
    GenerationToken(String),
    GenerationFinished(Result<GenerationResponse, String>),
    Clear,
    ViewCode(String),
    CloseCodeView,
    Download(String),
    AddToCanvas(String),
    SaveToSidebar(String),
    ResultActionDone(Result<String, String>),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultActionKind {
    Download,
    AddToCanvas,
    SaveToSidebar,
}

impl ResultActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ResultActionKind::Download => "Download",
            ResultActionKind::AddToCanvas => "Add to canvas",
            ResultActionKind::SaveToSidebar => "Save to sidebar",
        }
    }
}

/// A result-row action resolved to the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultAction {
    pub kind: ResultActionKind,
    pub code: String,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    SpawnGeneration(GenerationRequest),
    RunResultAction(ResultAction),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Open => {
            if app.phase.is_open() {
                return Effect::None;
            }
            app.phase = if app.in_flight {
                TerminalPhase::Submitting
            } else {
                TerminalPhase::Idle
            };
            if app.messages.is_empty() {
                app.messages.reset_to(welcome_messages(app.max_retries));
            }
            app.status_message = String::from("Ready");
            info!("Terminal opened");
            Effect::None
        }
        Action::Close => {
            if app.phase.is_open() {
                app.phase = TerminalPhase::Closed;
                app.viewing_code = None;
                app.status_message = String::from("Press F2 to open the terminal");
                info!("Terminal closed");
            }
            Effect::None
        }
        Action::Submit(text) => submit(app, &text),
        Action::GenerationProgress(progress) => {
            if app.in_flight {
                app.status_message = progress.label();
                app.progress = Some(progress);
            }
            Effect::None
        }
        Action::GenerationToken(chunk) => {
            if app.in_flight {
                app.preview.push_str(&chunk);
            }
            Effect::None
        }
        Action::GenerationFinished(result) => {
            finish(app, result);
            Effect::None
        }
        Action::Clear => {
            app.messages.reset_to(cleared_messages(app.max_retries));
            app.viewing_code = None;
            Effect::None
        }
        Action::ViewCode(id) => {
            if app.messages.find(&id).is_some_and(|m| m.is_rich_result()) {
                app.viewing_code = Some(id);
            }
            Effect::None
        }
        Action::CloseCodeView => {
            app.viewing_code = None;
            Effect::None
        }
        Action::Download(id) => result_action(app, &id, ResultActionKind::Download),
        Action::AddToCanvas(id) => result_action(app, &id, ResultActionKind::AddToCanvas),
        Action::SaveToSidebar(id) => result_action(app, &id, ResultActionKind::SaveToSidebar),
        Action::ResultActionDone(result) => {
            match result {
                Ok(text) => {
                    app.status_message = text.clone();
                    app.messages.append(TerminalMessage::system(text));
                }
                Err(text) => {
                    app.status_message = String::from("Action failed");
                    app.messages.append(TerminalMessage::error(text));
                }
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, text: &str) -> Effect {
    if app.phase != TerminalPhase::Idle {
        debug!("Submit ignored in phase {:?}", app.phase);
        return Effect::None;
    }
    let line = text.trim();
    if line.is_empty() {
        return Effect::None;
    }

    app.messages.append(TerminalMessage::input(line));
    app.history.write(line);

    match command::parse(line, app) {
        CommandResult::Clear => {
            app.messages.reset_to(cleared_messages(app.max_retries));
            app.viewing_code = None;
            Effect::None
        }
        CommandResult::Handled { kind, text } => {
            app.messages.append(TerminalMessage::new(kind, text));
            Effect::None
        }
        CommandResult::NotHandled => {
            info!("Submitting prompt ({} chars, max_retries={})", line.len(), app.max_retries.get());
            app.phase = TerminalPhase::Submitting;
            app.in_flight = true;
            app.progress = None;
            app.preview.clear();
            app.status_message = String::from("Generating...");
            Effect::SpawnGeneration(GenerationRequest {
                prompt: line.to_string(),
                provider: app.provider.clone(),
                model_name: app.model_name.clone(),
                max_retries: app.max_retries,
            })
        }
    }
}

fn finish(app: &mut App, result: Result<GenerationResponse, String>) {
    match result {
        Ok(response) => match response.validated {
            Some(true) => {
                info!("Generation validated: {:?}", response.class_name);
                app.messages.append(TerminalMessage::validated(
                    response.content,
                    response.class_name,
                    response.component_code,
                    response.validation_attempts,
                ));
                app.status_message = String::from("Component validated");
            }
            Some(false) => {
                info!("Generation failed validation: {:?}", response.validation_error);
                app.messages.append(TerminalMessage::validation_error(
                    response.content,
                    response.class_name,
                    response.component_code,
                    response.validation_attempts,
                ));
                if let Some(error) = response.validation_error.filter(|e| !e.is_empty()) {
                    app.messages.append(TerminalMessage::error(error));
                }
                app.status_message = String::from("Validation failed");
            }
            None => {
                app.messages.append(TerminalMessage::output(response.content));
                app.status_message = String::from("Ready");
            }
        },
        Err(text) => {
            warn!("Generation failed: {}", text);
            let text = if text.trim().is_empty() {
                GENERIC_ERROR_TEXT.to_string()
            } else {
                text
            };
            app.messages.append(TerminalMessage::error(text));
            app.status_message = String::from("Generation failed");
        }
    }

    app.in_flight = false;
    app.progress = None;
    app.preview.clear();
    if app.phase.is_open() {
        app.phase = TerminalPhase::Idle;
    }
}

fn result_action(app: &mut App, id: &str, kind: ResultActionKind) -> Effect {
    let Some(message) = app.messages.find(id).filter(|m| m.is_rich_result()) else {
        warn!("{} requested for unknown result {}", kind.label(), id);
        return Effect::None;
    };
    let Some(code) = message.code() else {
        return Effect::None;
    };
    let action = ResultAction {
        kind,
        code: code.to_string(),
        class_name: message.class_name().map(str::to_string),
    };
    info!("{} for {:?}", kind.label(), action.class_name);
    app.status_message = format!("{}...", kind.label());
    Effect::RunResultAction(action)
}
