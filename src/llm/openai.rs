use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageUrlArgs,
        ResponseFormat as OpenAiResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{info, warn};

use super::{ModelBackend, ModelRequest, ResponseFormat};
use crate::constants::llm::SCHEMA_NAME;
use crate::error::ModelError;

/// OpenAI-compatible chat-completions backend
#[derive(Clone)]
pub struct LLMClient {
    pub client: Client<OpenAIConfig>,
    pub model: String,
}

impl LLMClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        let client = Client::with_config(config);
        Self { client, model }
    }

    fn user_content(request: &ModelRequest) -> Result<ChatCompletionRequestUserMessageContent, ModelError> {
        let Some(image) = &request.image else {
            return Ok(ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()));
        };

        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(ImageUrlArgs::default().url(image.to_data_url()).build()?)
            .build()?;
        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(request.prompt.clone())
            .build()?;

        Ok(ChatCompletionRequestUserMessageContent::Array(vec![
            ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part),
            ChatCompletionRequestUserMessageContentPart::Text(text_part),
        ]))
    }
}

#[async_trait]
impl ModelBackend for LLMClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: ModelRequest) -> Result<Option<String>, ModelError> {
        info!("🤖 Sending request to LLM (Model: {})...", self.model);

        if request.search_grounding {
            warn!("🤖 Search grounding is not available on chat completions; answering from model knowledge");
        }

        let messages = [
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_instruction.clone())
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(Self::user_content(&request)?)
                    .build()?,
            ),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let ResponseFormat::Json(schema) = &request.response_format {
            builder.response_format(OpenAiResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: SCHEMA_NAME.to_string(),
                    schema: Some(schema.clone()),
                    strict: Some(true),
                },
            });
        }
        let chat_request = builder.build()?;

        let response = self.client.chat().create(chat_request).await?;

        info!("🤖 LLM Response received.");

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}
