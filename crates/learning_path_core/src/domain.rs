//! crates/learning_path_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! The serde layout of `Course` is the persisted layout; the remaining types
//! double as the parsed shape of generation responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ports::{PortError, PortResult};

/// At most this many further-reading links are kept on a topic.
pub const MAX_REFERENCES: usize = 3;
/// Number of questions a generated quiz must contain.
pub const QUIZ_QUESTION_COUNT: usize = 3;
/// Number of options every quiz question must offer.
pub const QUIZ_OPTION_COUNT: usize = 4;

//=========================================================================================
// Courses and Topics
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Decides which assessment gates a topic: lessons get a quiz, checkpoints a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    Lesson,
    Checkpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TopicType,
    pub status: TopicStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
}

impl Topic {
    pub fn is_locked(&self) -> bool {
        self.status == TopicStatus::Locked
    }

    pub fn is_completed(&self) -> bool {
        self.status == TopicStatus::Completed
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

/// A generated course. The topic order defines the unlock sequence and never
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub topics: Vec<Topic>,
}

/// Completion summary shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl CourseProgress {
    /// A course nobody has finished a topic of yet is "started", not "resumed".
    pub fn is_started(&self) -> bool {
        self.percent > 0
    }
}

//=========================================================================================
// Generation Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineTopic {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TopicType,
}

/// The shape returned by course outline generation, before ids and statuses exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub subject: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub topics: Vec<OutlineTopic>,
}

impl CourseOutline {
    pub fn validate(self) -> PortResult<Self> {
        if self.topics.is_empty() {
            return Err(PortError::Malformed(
                "course outline contains no topics".to_string(),
            ));
        }
        if self.topics.iter().any(|t| t.title.trim().is_empty()) {
            return Err(PortError::Malformed(
                "course outline contains a topic without a title".to_string(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContent {
    pub content: String,
    #[serde(default)]
    pub references: Vec<String>,
}

impl TopicContent {
    /// Rejects empty bodies and keeps only the first `MAX_REFERENCES` links.
    pub fn validate(mut self) -> PortResult<Self> {
        if self.content.trim().is_empty() {
            return Err(PortError::Malformed("topic content is empty".to_string()));
        }
        self.references.retain(|r| !r.trim().is_empty());
        self.references.truncate(MAX_REFERENCES);
        Ok(self)
    }
}

//=========================================================================================
// Assessments
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    fn validate(&self) -> PortResult<()> {
        if self.question.trim().is_empty() {
            return Err(PortError::Malformed("quiz question text is empty".to_string()));
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(PortError::Malformed(format!(
                "quiz question has {} options, expected {}",
                self.options.len(),
                QUIZ_OPTION_COUNT
            )));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(PortError::Malformed(format!(
                    "quiz question repeats the option '{}'",
                    option
                )));
            }
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(PortError::Malformed(
                "quiz correct answer is not one of the options".to_string(),
            ));
        }
        Ok(())
    }
}

/// Checks a generated quiz against the fixed shape: three questions, four distinct
/// options each, correct answer drawn from the options.
pub fn validate_quiz(questions: Vec<QuizQuestion>) -> PortResult<Vec<QuizQuestion>> {
    if questions.len() != QUIZ_QUESTION_COUNT {
        return Err(PortError::Malformed(format!(
            "quiz has {} questions, expected {}",
            questions.len(),
            QUIZ_QUESTION_COUNT
        )));
    }
    for question in &questions {
        question.validate()?;
    }
    Ok(questions)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub description: String,
    pub evaluation_criteria: String,
}

impl Task {
    pub fn validate(self) -> PortResult<Self> {
        if self.description.trim().is_empty() {
            return Err(PortError::Malformed("task description is empty".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvaluation {
    pub passed: bool,
    pub feedback: String,
    pub score: u8,
}

impl TaskEvaluation {
    pub fn validate(self) -> PortResult<Self> {
        if self.score > 100 {
            return Err(PortError::Malformed(format!(
                "task score {} is outside 0-100",
                self.score
            )));
        }
        Ok(self)
    }
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}
