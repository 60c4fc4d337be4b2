//! services/api/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the per-topic AI tutor.
//! It implements the `TutorService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    },
    Client,
};
use async_trait::async_trait;
use learning_path_core::domain::{ChatMessage, ChatRole};
use learning_path_core::ports::{PortError, PortResult, TutorService};
use tracing::info;

use super::structured::complete;

const SYSTEM_TEMPLATE: &str = r#"You are a helpful and encouraging tutor.

Your knowledge is limited to the topic content below. Do not answer questions outside of it; if a question is out of scope, politely decline and point the learner back to the topic. Keep answers concise and clear.

TOPIC CONTENT:
---
{content}
---"#;

/// An adapter that implements the `TutorService`.
pub struct TutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl TutorAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn build_messages(
    topic_content: &str,
    history: &[ChatMessage],
    message: &str,
) -> PortResult<Vec<ChatCompletionRequestMessage>> {
    let to_port = |e: async_openai::error::OpenAIError| PortError::Unexpected(e.to_string());

    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_TEMPLATE.replace("{content}", topic_content))
            .build()
            .map_err(to_port)?
            .into(),
    );

    for entry in history {
        let message = match entry.role {
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(entry.content.as_str())
                .build()
                .map_err(to_port)?
                .into(),
            ChatRole::Model => ChatCompletionRequestAssistantMessageArgs::default()
                .content(entry.content.as_str())
                .build()
                .map_err(to_port)?
                .into(),
        };
        messages.push(message);
    }

    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(message)
            .build()
            .map_err(to_port)?
            .into(),
    );
    Ok(messages)
}

#[async_trait]
impl TutorService for TutorAdapter {
    async fn chat_response(
        &self,
        topic_content: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> PortResult<String> {
        info!("Tutor request with {} prior messages", history.len());
        let messages = build_messages(topic_content, history, message)?;
        let reply = complete(&self.client, &self.model, messages, None).await?;
        Ok(reply.trim().to_string())
    }
}
