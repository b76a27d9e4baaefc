use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use super::{ModelBackend, ModelRequest, ResponseFormat};
use crate::analysis::schema::to_gemini_schema;
use crate::constants::llm::GEMINI_API_BASE;
use crate::error::ModelError;

/// Gemini `generateContent` backend over plain HTTP
#[derive(Clone)]
pub struct GeminiClient {
    http: HttpClient,
    api_base: String,
    api_key: String,
    pub model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let api_base = base_url
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| GEMINI_API_BASE.to_string());
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base,
            api_key,
            model,
        })
    }

    pub fn endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Request body for one `generateContent` call
    pub fn build_payload(request: &ModelRequest) -> Value {
        let mut parts = Vec::new();
        if let Some(image) = &request.image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type(),
                    "data": image.to_base64(),
                }
            }));
        }
        parts.push(json!({ "text": request.prompt }));

        let mut payload = json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
        });

        if let ResponseFormat::Json(schema) = &request.response_format {
            payload["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(schema),
            });
        }
        if request.search_grounding {
            payload["tools"] = json!([{ "googleSearch": {} }]);
        }
        payload
    }

    /// Concatenated text parts of the first candidate, if any
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ModelRequest) -> Result<Option<String>, ModelError> {
        info!(
            "🤖 Sending request to Gemini (Model: {}, grounding: {})...",
            self.model, request.search_grounding
        );

        let payload = Self::build_payload(&request);
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ModelError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        let text = Self::extract_text(&value);
        debug!("🤖 Gemini reply: {} chars", text.as_ref().map_or(0, String::len));
        info!("🤖 Gemini Response received.");
        Ok(text)
    }
}
