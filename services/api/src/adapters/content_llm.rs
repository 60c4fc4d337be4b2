//! services/api/src/adapters/content_llm.rs
//!
//! This module contains the adapter that writes the body of a lesson or checkpoint.
//! It implements the `ContentGenerationService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use learning_path_core::domain::{TopicContent, MAX_REFERENCES};
use learning_path_core::ports::{ContentGenerationService, PortResult};
use serde_json::json;
use tracing::info;

use super::structured::{complete_json, ResponseSchema};

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert educator writing study material.

- Be accurate. If you are unsure about a fact, leave it out rather than guess.
- Write clear, engaging Markdown with headings, lists and bold key terms.
- Only cite further-reading links you are confident exist: official documentation, standards bodies, well-known educational sites.

Reply with JSON only."#;

/// An adapter that implements the `ContentGenerationService`.
pub struct ContentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ContentAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn user_prompt(topic_title: &str, subject: &str) -> String {
    format!(
        "Write the learning content for the topic \"{}\" in the subject \"{}\".\nInclude up to {} references for further study.",
        topic_title, subject, MAX_REFERENCES
    )
}

fn schema() -> ResponseSchema {
    ResponseSchema {
        name: "topic_content",
        description: "Markdown learning content and further-reading links.",
        schema: json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Detailed, well-structured learning content in Markdown."
                },
                "references": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": format!("Up to {} URLs for further reading.", MAX_REFERENCES)
                }
            },
            "required": ["content", "references"],
            "additionalProperties": false
        }),
    }
}

#[async_trait]
impl ContentGenerationService for ContentAdapter {
    async fn generate_topic_content(
        &self,
        topic_title: &str,
        subject: &str,
    ) -> PortResult<TopicContent> {
        info!("Generating content for topic '{}' ({})", topic_title, subject);
        let content: TopicContent = complete_json(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            user_prompt(topic_title, subject),
            schema(),
        )
        .await?;
        content.validate()
    }
}
