//! The submission boundary: generation requests out, results and
//! result-action side effects back.

pub mod langflow;
pub mod provider;

pub use langflow::LangflowClient;
pub use provider::{
    AssistError, ComponentGenerator, ComponentSink, GenerationEvent, GenerationProgress,
    GenerationRequest, GenerationResponse,
};
