//! services/api/src/adapters/outline_llm.rs
//!
//! This module contains the adapter that drafts a course outline.
//! It implements the `CourseOutlineService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use learning_path_core::domain::CourseOutline;
use learning_path_core::ports::{CourseOutlineService, PortResult};
use serde_json::json;
use tracing::info;

use super::structured::{complete_json, ResponseSchema};

const SYSTEM_INSTRUCTIONS: &str = r#"You design self-paced learning paths.

A path is an ordered list of topics. Each topic is either:
- a "lesson": something the learner reads about and is then quizzed on, or
- a "checkpoint": a small practical exercise that applies the lessons just before it.

Rules for the path:
- Order the topics along Bloom's Taxonomy: start with remembering and understanding, move on to applying and analyzing.
- Place a checkpoint after every few related lessons. Never start the path with a checkpoint.
- Keep titles short and specific.
- Pick one emoji that represents the subject as the icon.

Reply with JSON only."#;

/// An adapter that implements the `CourseOutlineService` using an OpenAI-compatible chat API.
pub struct OutlineAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OutlineAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn user_prompt(subject: &str, syllabus: Option<&str>) -> String {
    let mut prompt = format!("Create a structured learning path for the subject \"{}\".", subject);
    if let Some(syllabus) = syllabus.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!(
            "\n\nThe learner supplied this syllabus. Work its topics into the path in a sensible order:\n---\n{}\n---",
            syllabus
        ));
    }
    prompt
}

fn schema() -> ResponseSchema {
    ResponseSchema {
        name: "course_outline",
        description: "An ordered learning path with an emoji icon.",
        schema: json!({
            "type": "object",
            "properties": {
                "subject": { "type": "string" },
                "icon": {
                    "type": "string",
                    "description": "A single emoji representing the subject."
                },
                "topics": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "type": { "type": "string", "enum": ["lesson", "checkpoint"] }
                        },
                        "required": ["title", "type"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["subject", "icon", "topics"],
            "additionalProperties": false
        }),
    }
}

#[async_trait]
impl CourseOutlineService for OutlineAdapter {
    async fn generate_course_outline(
        &self,
        subject: &str,
        syllabus: Option<&str>,
    ) -> PortResult<CourseOutline> {
        info!("Generating a course outline for '{}'", subject);
        let outline: CourseOutline = complete_json(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            user_prompt(subject, syllabus),
            schema(),
        )
        .await?;
        outline.validate()
    }
}
