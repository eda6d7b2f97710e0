//! # Terminal Messages
//!
//! The terminal's transcript: an ordered, append-only list of typed messages.
//!
//! ```text
//! MessageList
//! └── Vec<TerminalMessage>
//!     ├── id: String                   // uuid v4, unique per session
//!     ├── kind: MessageKind            // input | output | error | system | validated | validation_error
//!     ├── text: String
//!     ├── created_at: DateTime<Utc>
//!     └── metadata: Option<ResultMetadata>   // validated / validation_error only
//! ```
//!
//! Messages are never edited after creation. The list supports exactly two
//! mutations: `append` and `reset_to`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::state::MaxRetries;

pub const WELCOME_TEXT: &str = "Welcome to the component generator. \
    Describe a component and it will be generated and validated for you.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Input,
    Output,
    Error,
    System,
    Validated,
    ValidationError,
}

impl MessageKind {
    /// Prefix shown in front of plain lines.
    pub fn prefix(self) -> &'static str {
        match self {
            MessageKind::Input => "> ",
            MessageKind::Output => "",
            MessageKind::Error => "✗ ",
            MessageKind::System => "# ",
            MessageKind::Validated => "✓ ",
            MessageKind::ValidationError => "! ",
        }
    }
}

/// Result details attached to validated and validation_error messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultMetadata {
    pub generated_class_name: Option<String>,
    pub is_validated: Option<bool>,
    /// At least 1 when present.
    pub validation_attempt_count: Option<u32>,
    pub generated_code: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TerminalMessage {
    pub id: String,
    pub kind: MessageKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<ResultMetadata>,
}

impl TerminalMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            text: text.into(),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Input, text)
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Output, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageKind::System, text)
    }

    /// A validated component. Attempt counts below 1 are clamped to 1.
    pub fn validated(
        text: impl Into<String>,
        class_name: Option<String>,
        code: Option<String>,
        attempts: Option<u32>,
    ) -> Self {
        let mut msg = Self::new(MessageKind::Validated, text);
        msg.metadata = Some(ResultMetadata {
            generated_class_name: class_name,
            is_validated: Some(true),
            validation_attempt_count: attempts.map(|n| n.max(1)),
            generated_code: code,
        });
        msg
    }

    pub fn validation_error(
        text: impl Into<String>,
        class_name: Option<String>,
        code: Option<String>,
        attempts: Option<u32>,
    ) -> Self {
        let mut msg = Self::new(MessageKind::ValidationError, text);
        msg.metadata = Some(ResultMetadata {
            generated_class_name: class_name,
            is_validated: Some(false),
            validation_attempt_count: attempts.map(|n| n.max(1)),
            generated_code: code,
        });
        msg
    }

    /// True when this message renders as the rich result row: a validated
    /// message carrying both a class name and generated code.
    pub fn is_rich_result(&self) -> bool {
        self.kind == MessageKind::Validated
            && self.metadata.as_ref().is_some_and(|m| {
                m.generated_class_name.is_some() && m.generated_code.is_some()
            })
    }

    pub fn class_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.generated_class_name.as_deref())
    }

    pub fn code(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.generated_code.as_deref())
    }

    pub fn attempts(&self) -> Option<u32> {
        self.metadata.as_ref().and_then(|m| m.validation_attempt_count)
    }
}

/// Formats an attempt count the way the badge and result row show it.
pub fn attempts_label(attempts: u32) -> String {
    if attempts == 1 {
        "1 attempt".to_string()
    } else {
        format!("{attempts} attempts")
    }
}

/// The two messages seeded when the terminal opens.
pub fn welcome_messages(max_retries: MaxRetries) -> Vec<TerminalMessage> {
    vec![
        TerminalMessage::system(WELCOME_TEXT),
        TerminalMessage::system(format!(
            "MAX_RETRIES: {} (type HELP for commands)",
            max_retries.get()
        )),
    ]
}

/// The two messages left after a clear.
pub fn cleared_messages(max_retries: MaxRetries) -> Vec<TerminalMessage> {
    vec![
        TerminalMessage::system("Terminal cleared."),
        TerminalMessage::system(format!("MAX_RETRIES: {}", max_retries.get())),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct MessageList {
    messages: Vec<TerminalMessage>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: TerminalMessage) {
        self.messages.push(message);
    }

    /// Replaces the whole transcript.
    pub fn reset_to(&mut self, initial: Vec<TerminalMessage>) {
        self.messages = initial;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TerminalMessage> {
        self.messages.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&TerminalMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&TerminalMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TerminalMessage> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[TerminalMessage] {
        &self.messages
    }

    /// Indices of messages that render as rich result rows, in order.
    pub fn rich_result_indices(&self) -> Vec<usize> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_rich_result())
            .map(|(i, _)| i)
            .collect()
    }
}
