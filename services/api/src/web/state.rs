//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::error::ApiError;
use crate::web::protocol::ServerMessage;
use learning_path_core::{
    Assessment, ChatSession, ContentOrchestrator, CourseLibrary, CourseOutlineService,
    LearningError, QuizGenerationService, QuizSession, TaskService, TaskSession, TutorService,
    ViewRouter,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub library: Arc<CourseLibrary>,
    pub content: Arc<ContentOrchestrator>,
    pub outline_adapter: Arc<dyn CourseOutlineService>,
    pub quiz_adapter: Arc<dyn QuizGenerationService>,
    pub task_adapter: Arc<dyn TaskService>,
    pub tutor_adapter: Arc<dyn TutorService>,
}

//=========================================================================================
// Outbound Messages
//=========================================================================================

/// The sending half of a connection. Frames are serialized and written to the
/// socket by a dedicated writer task, so workers never touch the socket.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: ServerMessage) -> Result<(), ApiError> {
        self.tx
            .send(message)
            .map_err(|_| ApiError::Internal("The connection is closed.".to_string()))
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// Long-running actions that must not be started twice at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCourse,
    StartAssessment,
    EvaluateTask,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateCourse => "create_course",
            Operation::StartAssessment => "start_assessment",
            Operation::EvaluateTask => "evaluate_task",
        }
    }
}

/// The state for a single, active WebSocket connection.
#[derive(Default)]
pub struct SessionState {
    pub router: ViewRouter,
    pub selected_topic: Option<Uuid>,
    /// Created on the first chat message, discarded whenever the topic changes.
    pub chat: Option<ChatSession>,
    pub assessment: Option<Assessment>,
    in_flight: HashSet<Operation>,
}

impl SessionState {
    /// Marks `op` as running. Returns `false` when it already is.
    pub fn try_begin(&mut self, op: Operation) -> bool {
        self.in_flight.insert(op)
    }

    pub fn finish(&mut self, op: Operation) {
        self.in_flight.remove(&op);
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.in_flight.contains(&op)
    }

    /// Drops everything tied to the selected topic.
    pub fn clear_topic_view(&mut self) {
        self.selected_topic = None;
        self.chat = None;
        self.assessment = None;
    }

    /// The active course and selected topic, if the learning view shows one.
    pub fn selection(&self) -> Option<(Uuid, Uuid)> {
        Some((self.router.active_course()?, self.selected_topic?))
    }

    pub fn is_viewing(&self, course_id: Uuid, topic_id: Uuid) -> bool {
        self.selection() == Some((course_id, topic_id))
    }

    pub fn quiz_mut(&mut self) -> Result<&mut QuizSession, LearningError> {
        match self.assessment.as_mut() {
            Some(Assessment::Quiz(quiz)) => Ok(quiz),
            _ => Err(LearningError::InvalidInput("No quiz is open.".to_string())),
        }
    }

    pub fn task_mut(&mut self) -> Result<&mut TaskSession, LearningError> {
        match self.assessment.as_mut() {
            Some(Assessment::Task(task)) => Ok(task),
            _ => Err(LearningError::InvalidInput("No task is open.".to_string())),
        }
    }
}
