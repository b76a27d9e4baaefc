pub mod gemini;
pub mod openai;


use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::capture::ImagePayload;
use crate::config::{LlmConfig, LlmProvider};
use crate::error::ModelError;

pub use gemini::GeminiClient;
pub use openai::LLMClient;

/// Shape of the reply requested from the model
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseFormat {
    Text,
    /// JSON constrained to the given JSON Schema
    Json(Value),
}

/// One generation call against the external model
#[derive(Clone, Debug)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub image: Option<ImagePayload>,
    pub response_format: ResponseFormat,
    /// Ask the model to ground its answer in live web search
    pub search_grounding: bool,
}

impl ModelRequest {
    pub fn new(system_instruction: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            prompt: prompt.into(),
            image: None,
            response_format: ResponseFormat::Text,
            search_grounding: false,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_format = ResponseFormat::Json(schema);
        self
    }

    pub fn with_search_grounding(mut self) -> Self {
        self.search_grounding = true;
        self
    }
}

/// The external generative model, as a black-box RPC.
///
/// `Ok(None)` means the call succeeded but produced no text.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: ModelRequest) -> Result<Option<String>, ModelError>;
}

/// Build the backend selected by configuration
pub fn build_backend(config: &LlmConfig) -> Result<Arc<dyn ModelBackend>, ModelError> {
    let api_key = config
        .resolve_api_key()
        .ok_or_else(|| ModelError::MissingApiKey {
            provider: config.provider.as_str().to_string(),
        })?;
    let timeout = Duration::from_secs(config.timeout_secs);

    let backend: Arc<dyn ModelBackend> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            timeout,
        )?),
        LlmProvider::OpenAi => Arc::new(LLMClient::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
        )),
    };
    Ok(backend)
}
