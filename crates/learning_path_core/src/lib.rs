pub mod assessment;
pub mod chat;
pub mod content;
pub mod creation;
pub mod domain;
pub mod error;
pub mod library;
pub mod ports;
pub mod progression;
pub mod router;

#[cfg(test)]
mod test_support;

pub use assessment::{
    quiz_passed, start_assessment, Assessment, QuizSession, QuizStep, TaskSession,
    QUIZ_PASS_PERCENT, TASK_PASS_SCORE,
};
pub use chat::{ChatRequest, ChatSession, CHAT_FALLBACK_REPLY};
pub use content::{ensure_content, ContentOrchestrator, ContentOutcome};
pub use creation::create_course;
pub use domain::{
    ChatMessage, ChatRole, Course, CourseOutline, CourseProgress, QuizQuestion, Task,
    TaskEvaluation, Topic, TopicContent, TopicStatus, TopicType,
};
pub use error::{LearningError, LearningResult};
pub use library::CourseLibrary;
pub use ports::{
    ContentGenerationService, CourseOutlineService, CourseStore, PortError, PortResult,
    QuizGenerationService, TaskService, TutorService,
};
pub use progression::Completion;
pub use router::{View, ViewRouter};
