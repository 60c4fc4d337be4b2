//! crates/learning_path_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store and the LLM provider.

use async_trait::async_trait;

use crate::domain::{
    ChatMessage, Course, CourseOutline, QuizQuestion, Task, TaskEvaluation, TopicContent,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    /// The collaborator answered, but not in the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Whole-value persistence of the course list.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Reads every stored course. Missing or unreadable data yields an empty list.
    async fn read(&self) -> Vec<Course>;

    /// Replaces the stored list with `courses`.
    async fn write(&self, courses: &[Course]) -> PortResult<()>;
}

#[async_trait]
pub trait CourseOutlineService: Send + Sync {
    /// Generates an ordered outline of lessons and checkpoints for a subject.
    async fn generate_course_outline(
        &self,
        subject: &str,
        syllabus: Option<&str>,
    ) -> PortResult<CourseOutline>;
}

#[async_trait]
pub trait ContentGenerationService: Send + Sync {
    /// Generates the Markdown body and further-reading links for a topic.
    async fn generate_topic_content(&self, topic_title: &str, subject: &str)
        -> PortResult<TopicContent>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    async fn generate_quiz(&self, topic_content: &str, topic_title: &str)
        -> PortResult<Vec<QuizQuestion>>;
}

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn generate_task(&self, topic_title: &str, subject: &str) -> PortResult<Task>;

    async fn evaluate_task(
        &self,
        task_description: &str,
        submission: &str,
        topic_title: &str,
    ) -> PortResult<TaskEvaluation>;
}

#[async_trait]
pub trait TutorService: Send + Sync {
    /// Answers `message` using only `topic_content` as context.
    async fn chat_response(
        &self,
        topic_content: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> PortResult<String>;
}
