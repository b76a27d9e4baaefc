use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::agents::NakedForexAnalyst;
use crate::capture::ImagePayload;
use crate::constants::chat::{FALLBACK_REPLY, TIMESTAMP_FORMAT};
use crate::error::SessionError;
use crate::llm::{ModelBackend, ModelRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(ChatRole::Assistant, content)
    }

    fn now(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Serialize a conversation as ordered `role: content` lines
pub fn format_history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Issues follow-up questions about the current analysis, one turn per call
#[derive(Clone)]
pub struct ChatOrchestrator {
    backend: Arc<dyn ModelBackend>,
    analyst: Arc<NakedForexAnalyst>,
}

impl ChatOrchestrator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            analyst: Arc::new(NakedForexAnalyst),
        }
    }

    /// Prompt for one turn. `prior` excludes the message being sent.
    pub fn build_prompt(&self, prior: &[ChatMessage], user_text: &str, context: Option<&str>) -> String {
        self.analyst
            .chat_prompt(context, &format_history(prior), user_text)
    }

    /// Ask the model for the assistant side of one turn
    pub async fn send_message(
        &self,
        image: Option<&ImagePayload>,
        prior: &[ChatMessage],
        user_text: &str,
        context: Option<&str>,
    ) -> Result<String, SessionError> {
        let mut request = ModelRequest::new(
            self.analyst.chat_system_prompt(),
            self.build_prompt(prior, user_text, context),
        )
        .with_search_grounding();
        if let Some(image) = image {
            request = request.with_image(image.clone());
        }

        info!(
            "💬 [CHAT] Sending turn ({} prior messages, image: {})",
            prior.len(),
            image.is_some()
        );

        let reply = self.backend.generate(request).await.map_err(|e| {
            error!("❌ [CHAT] Assistant turn failed: {}", e);
            SessionError::ChatTurnFailed(e.to_string())
        })?;

        Ok(reply
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}
