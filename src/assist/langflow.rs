//! Langflow assistant client.
//!
//! Speaks the agentic assist endpoint's SSE protocol. Every `data:` line
//! carries a JSON object tagged by its `event` field:
//!
//! ```text
//! {"event":"progress","step":"validating","attempt":1,"max_attempts":4}
//! {"event":"token","chunk":"class Foo"}
//! {"event":"complete","data":{"result":"...","validated":true,...}}
//! {"event":"error","message":"..."}
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::assist::{
    AssistError, ComponentGenerator, ComponentSink, GenerationEvent, GenerationProgress,
    GenerationRequest, GenerationResponse,
};
use crate::core::history::atomic_write;

pub const DEFAULT_BASE_URL: &str = "http://localhost:7860";
pub const DEFAULT_ASSIST_PATH: &str = "/api/v1/agentic/assist/stream";
const CUSTOM_COMPONENT_PATH: &str = "/api/v1/custom_component";
const FALLBACK_FILE_NAME: &str = "component.py";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize, Debug)]
struct AssistRequest<'a> {
    input_value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name: Option<&'a str>,
    max_retries: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_id: Option<&'a str>,
}

#[derive(Serialize, Debug)]
struct CustomComponentRequest<'a> {
    code: &'a str,
}

/// One decoded `data:` payload.
#[derive(Deserialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
enum StreamEvent {
    Progress(GenerationProgress),
    Token {
        #[serde(default)]
        chunk: String,
    },
    Complete {
        data: GenerationResponse,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

/// Splits buffered SSE bytes into complete `data:` payloads.
///
/// Consumes every complete line from `buffer`, leaving a trailing partial
/// line in place for the next network chunk. Lines are decoded only once
/// complete, so a multi-byte character split across chunks stays intact.
fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=pos).collect();
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping SSE line that is not valid UTF-8: {}", e);
                continue;
            }
        };
        if let Some(data) = line.trim().strip_prefix("data:") {
            let data = data.trim_start();
            if !data.is_empty() && data != "[DONE]" {
                payloads.push(data.to_string());
            }
        }
    }
    payloads
}

/// Turns a class name into a safe file name (`Foo` → `Foo.py`).
fn file_name_for(class_name: Option<&str>) -> String {
    let cleaned: Option<String> = class_name.map(|name| {
        name.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect()
    });
    match cleaned {
        Some(name) if !name.is_empty() => format!("{name}.py"),
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}

fn write_component(dir: &Path, class_name: Option<&str>, code: &str) -> Result<PathBuf, AssistError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name_for(class_name));
    atomic_write(&path, code)?;
    Ok(path)
}

// ============================================================================
// Client
// ============================================================================

pub struct LangflowClient {
    base_url: String,
    assist_path: String,
    api_key: Option<String>,
    flow_id: Option<String>,
    download_dir: PathBuf,
    components_dir: PathBuf,
    client: reqwest::Client,
}

impl LangflowClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            assist_path: DEFAULT_ASSIST_PATH.to_string(),
            api_key: None,
            flow_id: None,
            download_dir: PathBuf::from("."),
            components_dir: PathBuf::from("components"),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_assist_path(mut self, path: impl Into<String>) -> Self {
        self.assist_path = path.into();
        self
    }

    pub fn with_flow_id(mut self, flow_id: Option<String>) -> Self {
        self.flow_id = flow_id;
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = dir;
        self
    }

    pub fn with_components_dir(mut self, dir: PathBuf) -> Self {
        self.components_dir = dir;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, AssistError> {
        let json_body = serde_json::to_string(body)
            .map_err(|e| AssistError::Parse(format!("request serialization failed: {e}")))?;
        debug!("POST {} ({} bytes)", path, json_body.len());

        let mut builder = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(json_body);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AssistError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Langflow API error: {} - {}", status, message);
            return Err(AssistError::Api { status, message });
        }

        Ok(response)
    }
}

#[async_trait]
impl ComponentGenerator for LangflowClient {
    fn name(&self) -> &str {
        "langflow"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        progress: Sender<GenerationEvent>,
    ) -> Result<GenerationResponse, AssistError> {
        let body = AssistRequest {
            input_value: &request.prompt,
            provider: request.provider.as_deref(),
            model_name: request.model_name.as_deref(),
            max_retries: request.max_retries.get(),
            flow_id: self.flow_id.as_deref(),
        };
        info!(
            "Assist request: provider={:?}, model={:?}, max_retries={}",
            body.provider, body.model_name, body.max_retries
        );

        let mut stream = self.post_json(&self.assist_path, &body).await?.bytes_stream();

        let mut buffer: Vec<u8> = Vec::new();
        let mut token_bytes = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AssistError::Network(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            for data in drain_data_lines(&mut buffer) {
                let event = match serde_json::from_str::<StreamEvent>(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!("Skipping unrecognized SSE payload ({}): {}", e, data);
                        continue;
                    }
                };

                match event {
                    StreamEvent::Progress(p) => {
                        debug!("Progress: {} {}/{}", p.step, p.attempt, p.max_attempts);
                        if progress.send(GenerationEvent::Progress(p)).await.is_err() {
                            warn!("Progress send failed: receiver dropped");
                            return Err(AssistError::ChannelClosed);
                        }
                    }
                    StreamEvent::Token { chunk } => {
                        if chunk.is_empty() {
                            continue;
                        }
                        token_bytes += chunk.len();
                        if progress.send(GenerationEvent::Token(chunk)).await.is_err() {
                            warn!("Token send failed: receiver dropped");
                            return Err(AssistError::ChannelClosed);
                        }
                    }
                    StreamEvent::Complete { data } => {
                        info!(
                            "Assist complete: validated={:?}, class={:?}, attempts={:?}, {} token bytes",
                            data.validated, data.class_name, data.validation_attempts, token_bytes
                        );
                        return Ok(data);
                    }
                    StreamEvent::Error { message } => {
                        warn!("Assist stream error: {}", message);
                        return Err(AssistError::Server(message));
                    }
                }
            }
        }

        warn!("Assist stream ended without a complete event");
        Err(AssistError::Parse("stream ended before completion".to_string()))
    }
}

#[async_trait]
impl ComponentSink for LangflowClient {
    async fn add_to_canvas(&self, code: &str) -> Result<(), AssistError> {
        self.post_json(CUSTOM_COMPONENT_PATH, &CustomComponentRequest { code })
            .await?;
        info!("Component added to canvas ({} bytes)", code.len());
        Ok(())
    }

    async fn save_to_sidebar(&self, code: &str, class_name: &str) -> Result<PathBuf, AssistError> {
        let path = write_component(&self.components_dir, Some(class_name), code)?;
        info!("Component saved to {}", path.display());
        Ok(path)
    }

    async fn download(&self, code: &str, class_name: Option<&str>) -> Result<PathBuf, AssistError> {
        let path = write_component(&self.download_dir, class_name, code)?;
        info!("Component downloaded to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_partial_line() {
        let mut buffer = b"data: {\"event\":\"token\",\"chunk\":\"a\"}\n\ndata: {\"ev".to_vec();
        let payloads = drain_data_lines(&mut buffer);
        assert_eq!(payloads, vec![r#"{"event":"token","chunk":"a"}"#]);
        assert_eq!(buffer, b"data: {\"ev");
    }

    #[test]
    fn test_drain_ignores_comments_and_done() {
        let mut buffer = b": keep-alive\nevent: message\ndata: [DONE]\ndata:{\"x\":1}\n".to_vec();
        assert_eq!(drain_data_lines(&mut buffer), vec![r#"{"x":1}"#]);
    }

    #[test]
    fn test_drain_joins_character_split_across_chunks() {
        let line = "data: {\"event\":\"token\",\"chunk\":\"# café\"}\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = line[..split].to_vec();
        assert!(drain_data_lines(&mut buffer).is_empty());
        buffer.extend_from_slice(&line[split..]);
        assert_eq!(
            drain_data_lines(&mut buffer),
            vec![r##"{"event":"token","chunk":"# café"}"##]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_skips_invalid_utf8_line() {
        let mut buffer = b"data: \xff\xfe\ndata: {\"x\":1}\n".to_vec();
        assert_eq!(drain_data_lines(&mut buffer), vec![r#"{"x":1}"#]);
    }

    #[test]
    fn test_stream_event_progress() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"event":"progress","step":"validating","attempt":1,"max_attempts":4}"#,
        )
        .unwrap();
        match event {
            StreamEvent::Progress(p) => {
                assert_eq!(p.step, "validating");
                assert_eq!(p.max_attempts, 4);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_stream_event_complete() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"event":"complete","data":{"result":"ok","validated":false,"validation_error":"SyntaxError"}}"#,
        )
        .unwrap();
        match event {
            StreamEvent::Complete { data } => {
                assert_eq!(data.validated, Some(false));
                assert_eq!(data.validation_error.as_deref(), Some("SyntaxError"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let body = AssistRequest {
            input_value: "make a component",
            provider: None,
            model_name: None,
            max_retries: 3,
            flow_id: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"input_value":"make a component","max_retries":3}"#);
    }

    #[test]
    fn test_file_name_sanitizes_class_name() {
        assert_eq!(file_name_for(Some("TextReverser")), "TextReverser.py");
        assert_eq!(file_name_for(Some("../evil")), "evil.py");
        assert_eq!(file_name_for(Some("")), FALLBACK_FILE_NAME);
        assert_eq!(file_name_for(None), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LangflowClient::new("http://localhost:7860/");
        assert_eq!(client.url(DEFAULT_ASSIST_PATH), "http://localhost:7860/api/v1/agentic/assist/stream");
    }

    #[tokio::test]
    async fn test_download_writes_class_file() {
        let dir = tempfile::tempdir().unwrap();
        let client = LangflowClient::new(DEFAULT_BASE_URL).with_download_dir(dir.path().to_path_buf());
        let path = client.download("class Foo: pass", Some("Foo")).await.unwrap();
        assert_eq!(path, dir.path().join("Foo.py"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "class Foo: pass");
    }

    #[tokio::test]
    async fn test_save_to_sidebar_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let components = dir.path().join("nested").join("components");
        let client = LangflowClient::new(DEFAULT_BASE_URL).with_components_dir(components.clone());
        let path = client.save_to_sidebar("code", "Bar").await.unwrap();
        assert_eq!(path, components.join("Bar.py"));
        assert!(path.exists());
    }
}
