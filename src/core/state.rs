//! # Application State
//!
//! Core business state for the generator terminal. Domain logic only,
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── generator: Arc<dyn ComponentGenerator>  // submission callback
//! ├── sink: Arc<dyn ComponentSink>            // result-row side effects
//! ├── messages: MessageList                   // the transcript
//! ├── history: HistoryStore                   // submitted lines
//! ├── max_retries: MaxRetries                 // forwarded with each prompt
//! ├── phase: TerminalPhase                    // closed | idle | submitting
//! ├── in_flight: bool                         // a generation is running
//! ├── status_message: String                  // status bar text
//! ├── progress: Option<GenerationProgress>    // latest server step
//! ├── preview: String                         // streamed tokens so far
//! ├── viewing_code: Option<String>            // message id shown in the code viewer
//! └── provider / model_name                   // forwarded with each prompt
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::assist::{ComponentGenerator, ComponentSink, GenerationProgress};
use crate::core::command::RetryContext;
use crate::core::config::ResolvedConfig;
use crate::core::history::HistoryStore;
use crate::core::message::MessageList;

pub const MAX_RETRIES_LIMIT: u8 = 5;
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Server-side validation retry bound, always within `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxRetries(u8);

impl MaxRetries {
    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_RETRIES_LIMIT).then_some(Self(value))
    }

    /// Out-of-range values are pulled to the nearest bound.
    pub fn clamped(value: u8) -> Self {
        Self(value.min(MAX_RETRIES_LIMIT))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for MaxRetries {
    fn default() -> Self {
        Self(DEFAULT_MAX_RETRIES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalPhase {
    #[default]
    Closed,
    Idle,
    Submitting,
}

impl TerminalPhase {
    pub fn is_open(self) -> bool {
        !matches!(self, TerminalPhase::Closed)
    }
}

pub struct App {
    pub generator: Arc<dyn ComponentGenerator>,
    pub sink: Arc<dyn ComponentSink>,
    pub messages: MessageList,
    pub history: HistoryStore,
    pub max_retries: MaxRetries,
    pub phase: TerminalPhase,
    /// Survives a close so a reopen cannot start a second submission.
    pub in_flight: bool,
    pub status_message: String,
    pub progress: Option<GenerationProgress>,
    pub preview: String,
    pub viewing_code: Option<String>,
    pub provider: Option<String>,
    pub model_name: Option<String>,
}

impl App {
    pub fn new(
        generator: Arc<dyn ComponentGenerator>,
        sink: Arc<dyn ComponentSink>,
        history: HistoryStore,
    ) -> Self {
        Self {
            generator,
            sink,
            messages: MessageList::new(),
            history,
            max_retries: MaxRetries::default(),
            phase: TerminalPhase::Closed,
            in_flight: false,
            status_message: String::from("Press F2 to open the terminal"),
            progress: None,
            preview: String::new(),
            viewing_code: None,
            provider: None,
            model_name: None,
        }
    }

    pub fn from_config(
        generator: Arc<dyn ComponentGenerator>,
        sink: Arc<dyn ComponentSink>,
        history: HistoryStore,
        config: &ResolvedConfig,
    ) -> Self {
        let mut app = Self::new(generator, sink, history);
        app.max_retries = config.max_retries;
        app.provider = config.provider.clone();
        app.model_name = config.model_name.clone();
        app
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == TerminalPhase::Submitting
    }
}

impl RetryContext for App {
    fn max_retries(&self) -> MaxRetries {
        self.max_retries
    }

    fn set_max_retries(&mut self, value: MaxRetries) {
        self.max_retries = value;
    }
}
