use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::core::state::MaxRetries;

/// Errors that can occur while talking to the assistant backend.
#[derive(Debug)]
pub enum AssistError {
    /// Client misconfigured (bad URL, missing directory). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Backend returned a non-success status.
    Api { status: u16, message: String },
    /// Response could not be understood.
    Parse(String),
    /// Backend reported an error event inside the stream.
    Server(String),
    /// Local file I/O for download / sidebar export.
    Io(std::io::Error),
    /// The progress channel was closed (TUI dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistError::Config(msg) => write!(f, "config error: {msg}"),
            // Shown as-is in the transcript
            AssistError::Network(msg) => write!(f, "{msg}"),
            AssistError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            AssistError::Parse(msg) => write!(f, "parse error: {msg}"),
            AssistError::Server(msg) => write!(f, "{msg}"),
            AssistError::Io(e) => write!(f, "I/O error: {e}"),
            AssistError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for AssistError {}

impl From<std::io::Error> for AssistError {
    fn from(e: std::io::Error) -> Self {
        AssistError::Io(e)
    }
}

/// Everything the backend needs to generate one component.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub max_retries: MaxRetries,
}

/// Final outcome of one generation.
///
/// `validated` is `None` when the backend produced plain text with no code
/// to validate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    #[serde(rename = "result", default)]
    pub content: String,
    #[serde(default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub validation_error: Option<String>,
    #[serde(default)]
    pub validation_attempts: Option<u32>,
    #[serde(default)]
    pub component_code: Option<String>,
}

/// One step of the server-side generate → validate → retry loop.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GenerationProgress {
    pub step: String,
    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub max_attempts: u32,
}

impl GenerationProgress {
    /// Status line text, e.g. "Validating (attempt 2/4)".
    pub fn label(&self) -> String {
        let step = match self.step.as_str() {
            "generating" => "Generating",
            "generation_complete" => "Generated",
            "extracting_code" => "Extracting code",
            "validating" => "Validating",
            "validated" => "Validated",
            "validation_failed" => "Validation failed",
            "retrying" => "Retrying",
            other => other,
        };
        if self.max_attempts > 0 {
            format!("{step} (attempt {}/{})", self.attempt, self.max_attempts)
        } else {
            step.to_string()
        }
    }
}

/// Intermediate events streamed while a generation is running.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Progress(GenerationProgress),
    Token(String),
}

#[async_trait]
pub trait ComponentGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Runs one generation to completion, reporting progress on `progress`.
    async fn generate(
        &self,
        request: GenerationRequest,
        progress: Sender<GenerationEvent>,
    ) -> Result<GenerationResponse, AssistError>;
}

/// Where generated code goes when the user acts on a result row.
#[async_trait]
pub trait ComponentSink: Send + Sync {
    async fn add_to_canvas(&self, code: &str) -> Result<(), AssistError>;

    async fn save_to_sidebar(&self, code: &str, class_name: &str) -> Result<PathBuf, AssistError>;

    async fn download(&self, code: &str, class_name: Option<&str>) -> Result<PathBuf, AssistError>;
}
