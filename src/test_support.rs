//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::assist::{
    AssistError, ComponentGenerator, ComponentSink, GenerationEvent, GenerationRequest,
    GenerationResponse,
};
use crate::core::action::{Action, update};
use crate::core::history::HistoryStore;
use crate::core::state::App;

/// Replays a fixed list of events, then returns a fixed outcome.
pub struct ScriptedGenerator {
    pub events: Vec<GenerationEvent>,
    pub outcome: Result<GenerationResponse, String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn ok(response: GenerationResponse) -> Self {
        Self {
            events: Vec::new(),
            outcome: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            events: Vec::new(),
            outcome: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ComponentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        progress: Sender<GenerationEvent>,
    ) -> Result<GenerationResponse, AssistError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        for event in &self.events {
            progress
                .send(event.clone())
                .await
                .map_err(|_| AssistError::ChannelClosed)?;
        }
        self.outcome.clone().map_err(AssistError::Network)
    }
}

/// Records every sink call instead of touching disk or network.
#[derive(Default)]
pub struct RecordingSink {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ComponentSink for RecordingSink {
    async fn add_to_canvas(&self, code: &str) -> Result<(), AssistError> {
        self.calls.lock().unwrap().push(format!("canvas:{}", code.len()));
        Ok(())
    }

    async fn save_to_sidebar(&self, _code: &str, class_name: &str) -> Result<PathBuf, AssistError> {
        self.calls.lock().unwrap().push(format!("sidebar:{class_name}"));
        Ok(PathBuf::from(format!("{class_name}.py")))
    }

    async fn download(&self, _code: &str, class_name: Option<&str>) -> Result<PathBuf, AssistError> {
        let name = class_name.unwrap_or("component");
        self.calls.lock().unwrap().push(format!("download:{name}"));
        Ok(PathBuf::from(format!("{name}.py")))
    }
}

/// Creates a closed test App backed by in-memory history.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedGenerator::ok(GenerationResponse::default())),
        Arc::new(RecordingSink::default()),
        HistoryStore::in_memory(),
    )
}

/// A test App that has already been opened (welcome messages seeded).
pub fn open_app() -> App {
    let mut app = test_app();
    update(&mut app, Action::Open);
    app
}

pub fn validated_response(class_name: &str, attempts: u32) -> GenerationResponse {
    GenerationResponse {
        content: "done".to_string(),
        validated: Some(true),
        class_name: Some(class_name.to_string()),
        validation_error: None,
        validation_attempts: Some(attempts),
        component_code: Some(format!("class {class_name}(Component):\n    pass\n")),
    }
}
