//! services/api/src/adapters/task_llm.rs
//!
//! This module contains the adapter that sets and grades checkpoint tasks.
//! It implements the `TaskService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use learning_path_core::domain::{Task, TaskEvaluation};
use learning_path_core::ports::{PortResult, TaskService};
use learning_path_core::TASK_PASS_SCORE;
use serde_json::json;
use tracing::info;

use super::structured::{complete_json, ResponseSchema};

const TASK_INSTRUCTIONS: &str = r#"You set small practical exercises for a learner who has just finished a block of lessons.

- The task must let the learner apply what they learned, and be doable in a single text answer.
- State clearly how the submission will be judged.

Reply with JSON only."#;

const EVALUATION_INSTRUCTIONS: &str = r#"You are an expert, fair evaluator of learner submissions.

- Judge correctness, effort and how well the submission fits the topic.
- Feedback is concise and constructive: say what works and what to improve.
- The score is an integer from 0 to 100.

Reply with JSON only."#;

/// An adapter that implements the `TaskService`.
pub struct TaskAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl TaskAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn task_prompt(topic_title: &str, subject: &str) -> String {
    format!(
        "Create a checkpoint task for a learner who just completed \"{}\" in the subject \"{}\".",
        topic_title, subject
    )
}

fn evaluation_prompt(task_description: &str, submission: &str, topic_title: &str) -> String {
    format!(
        "Assess this submission for the topic \"{}\".\n\nTask:\n{}\n\nSubmission:\n```\n{}\n```\n\nThe submission passes when the score is at least {}.",
        topic_title, task_description, submission, TASK_PASS_SCORE
    )
}

fn task_schema() -> ResponseSchema {
    ResponseSchema {
        name: "task",
        description: "A practical checkpoint task.",
        schema: json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What the learner has to do."
                },
                "evaluationCriteria": {
                    "type": "string",
                    "description": "How the submission will be judged."
                }
            },
            "required": ["description", "evaluationCriteria"],
            "additionalProperties": false
        }),
    }
}

fn evaluation_schema() -> ResponseSchema {
    ResponseSchema {
        name: "evaluation",
        description: "The grade for a task submission.",
        schema: json!({
            "type": "object",
            "properties": {
                "passed": { "type": "boolean" },
                "feedback": { "type": "string" },
                "score": { "type": "integer", "minimum": 0, "maximum": 100 }
            },
            "required": ["passed", "feedback", "score"],
            "additionalProperties": false
        }),
    }
}

#[async_trait]
impl TaskService for TaskAdapter {
    async fn generate_task(&self, topic_title: &str, subject: &str) -> PortResult<Task> {
        info!("Generating a checkpoint task for '{}'", topic_title);
        let task: Task = complete_json(
            &self.client,
            &self.model,
            TASK_INSTRUCTIONS,
            task_prompt(topic_title, subject),
            task_schema(),
        )
        .await?;
        task.validate()
    }

    async fn evaluate_task(
        &self,
        task_description: &str,
        submission: &str,
        topic_title: &str,
    ) -> PortResult<TaskEvaluation> {
        info!("Evaluating a submission for '{}'", topic_title);
        let evaluation: TaskEvaluation = complete_json(
            &self.client,
            &self.model,
            EVALUATION_INSTRUCTIONS,
            evaluation_prompt(task_description, submission, topic_title),
            evaluation_schema(),
        )
        .await?;
        evaluation.validate()
    }
}
