//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server.
//! Every frame is a JSON text message tagged by `type`.

use chrono::{DateTime, Utc};
use learning_path_core::assessment::{AnswerReveal, QuestionView};
use learning_path_core::{ChatMessage, Course, Task, TaskEvaluation, Topic, View};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Leaves the dashboard for the subject form.
    StartNewCourse,

    /// Generates a course from the subject form.
    CreateCourse {
        subject: String,
        #[serde(default)]
        syllabus: Option<String>,
    },

    /// Opens a course from the dashboard and selects its resume topic.
    OpenCourse { course_id: Uuid },

    /// Returns to the dashboard from any view.
    Back,

    SelectTopic { topic_id: Uuid },

    /// Opens the quiz or task for the selected topic.
    StartAssessment,

    SelectOption { option: String },
    SubmitAnswer,
    NextQuestion,

    SubmitTask { submission: String },

    /// Closes the open quiz or task without completing the topic.
    CloseAssessment,

    SendChat { message: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The active view changed. `course` is set when the learning view opens.
    ViewChanged {
        view: View,
        #[serde(skip_serializing_if = "Option::is_none")]
        course: Option<Course>,
    },

    /// The dashboard listing.
    Courses { courses: Vec<CourseSummary> },

    /// The active course has a new value (content filled, topic completed).
    CourseUpdated { course: Course },

    TopicSelected { topic: Topic },

    /// Content for the topic is being generated.
    ContentLoading { topic_id: Uuid },

    TopicContent { topic: Topic },

    QuizQuestion { topic_id: Uuid, question: QuestionView },

    AnswerRevealed { topic_id: Uuid, reveal: AnswerReveal },

    QuizFinished {
        topic_id: Uuid,
        score: usize,
        total: usize,
        passed: bool,
    },

    TaskReady { topic_id: Uuid, task: Task },

    TaskEvaluated {
        topic_id: Uuid,
        evaluation: TaskEvaluation,
    },

    TopicCompleted {
        topic_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_topic_id: Option<Uuid>,
    },

    /// One message of the tutor conversation, either the echoed user message or a reply.
    ChatMessage { topic_id: Uuid, message: ChatMessage },

    /// The requested action is already running for this session.
    Busy { action: String },

    /// Reports a failed action. The session stays usable.
    Error { message: String },
}

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// A course as listed on the dashboard.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub subject: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed: usize,
    pub total: usize,
    /// Whole percent of completed topics.
    pub percent: u8,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        let progress = course.progress();
        Self {
            id: course.id,
            subject: course.subject.clone(),
            icon: course.icon.clone(),
            created_at: course.created_at,
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent,
        }
    }
}

pub fn summaries(courses: &[Course]) -> Vec<CourseSummary> {
    courses.iter().map(CourseSummary::from).collect()
}
