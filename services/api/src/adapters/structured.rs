//! services/api/src/adapters/structured.rs
//!
//! Shared plumbing for the LLM adapters: one chat-completion call, and the
//! parse step that turns a schema-constrained reply into a typed value.

use std::sync::LazyLock;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use learning_path_core::ports::{PortError, PortResult};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

/// The schema a structured reply must follow.
pub struct ResponseSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

/// Sends the messages and returns the text of the first choice.
pub async fn complete(
    client: &Client<OpenAIConfig>,
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    response_format: Option<ResponseFormat>,
) -> PortResult<String> {
    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(model).messages(messages).n(1);
    if let Some(format) = response_format {
        args.response_format(format);
    }
    let request = args
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

    // Call the API and manually map the error if it occurs, which respects the orphan rule.
    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| PortError::Malformed("LLM response contained no text content.".to_string()))
}

/// Asks for a JSON reply constrained to `schema` and parses it into `T`.
pub async fn complete_json<T: DeserializeOwned>(
    client: &Client<OpenAIConfig>,
    model: &str,
    system: &str,
    user: String,
    schema: ResponseSchema,
) -> PortResult<T> {
    let messages = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into(),
    ];

    let name = schema.name;
    let raw = complete(client, model, messages, Some(json_schema_format(schema))).await?;
    parse_json(name, &raw)
}

/// A strict `json_schema` response format for `schema`.
pub fn json_schema_format(schema: ResponseSchema) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: schema.name.to_string(),
            description: Some(schema.description.to_string()),
            schema: Some(schema.schema),
            strict: Some(true),
        },
    }
}

/// Parses a JSON reply, tolerating a surrounding Markdown code fence.
pub fn parse_json<T: DeserializeOwned>(what: &str, raw: &str) -> PortResult<T> {
    let body = CODE_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim();

    serde_json::from_str(body).map_err(|e| {
        warn!("Failed to parse {} response ({}): {}", what, e, raw);
        PortError::Malformed(format!("Failed to generate a valid {}.", what.replace('_', " ")))
    })
}
