//! services/api/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter that writes the multiple-choice quiz for a lesson.
//! It implements the `QuizGenerationService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use learning_path_core::domain::{
    validate_quiz, QuizQuestion, QUIZ_OPTION_COUNT, QUIZ_QUESTION_COUNT,
};
use learning_path_core::ports::{PortResult, QuizGenerationService};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::structured::{complete_json, ResponseSchema};

const SYSTEM_INSTRUCTIONS: &str = r#"You write short multiple-choice quizzes that check whether a learner understood a lesson.

- Test the key concepts of the lesson, not trivia.
- Every question has exactly one correct answer, and "correctAnswer" repeats that option verbatim.
- Options within a question must all be different.
- The explanation says briefly why the correct answer is right.

Reply with JSON only."#;

/// Structured replies must be objects, so the question list is wrapped.
#[derive(Deserialize)]
struct QuizReply {
    questions: Vec<QuizQuestion>,
}

/// An adapter that implements the `QuizGenerationService`.
pub struct QuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl QuizAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn user_prompt(topic_content: &str, topic_title: &str) -> String {
    format!(
        "Write a {}-question quiz with {} options per question for the topic \"{}\", based on this content:\n---\n{}\n---",
        QUIZ_QUESTION_COUNT, QUIZ_OPTION_COUNT, topic_title, topic_content
    )
}

fn schema() -> ResponseSchema {
    ResponseSchema {
        name: "quiz",
        description: "A multiple-choice quiz.",
        schema: json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": { "type": "string" },
                            "options": { "type": "array", "items": { "type": "string" } },
                            "correctAnswer": { "type": "string" },
                            "explanation": {
                                "type": "string",
                                "description": "Why the correct answer is right."
                            }
                        },
                        "required": ["question", "options", "correctAnswer", "explanation"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["questions"],
            "additionalProperties": false
        }),
    }
}

#[async_trait]
impl QuizGenerationService for QuizAdapter {
    async fn generate_quiz(
        &self,
        topic_content: &str,
        topic_title: &str,
    ) -> PortResult<Vec<QuizQuestion>> {
        info!("Generating a quiz for topic '{}'", topic_title);
        let reply: QuizReply = complete_json(
            &self.client,
            &self.model,
            SYSTEM_INSTRUCTIONS,
            user_prompt(topic_content, topic_title),
            schema(),
        )
        .await?;
        validate_quiz(reply.questions)
    }
}
