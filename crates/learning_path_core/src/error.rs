//! crates/learning_path_core/src/error.rs
//!
//! Errors raised by the learning flow itself, as opposed to its collaborators.

use uuid::Uuid;

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LearningError {
    #[error("Course {0} not found")]
    CourseNotFound(Uuid),
    #[error("Topic {0} not found")]
    TopicNotFound(Uuid),
    #[error("Topic {0} is locked")]
    TopicLocked(Uuid),
    #[error("Topic {0} is already completed")]
    AlreadyCompleted(Uuid),
    #[error("Cannot {action} from the {from} view")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("Select an answer first")]
    NoAnswerSelected,
    #[error("The answer has already been submitted")]
    AnswerAlreadySubmitted,
    #[error("Submit the answer first")]
    AnswerNotSubmitted,
    #[error("'{0}' is not one of the options")]
    UnknownOption(String),
    #[error("The quiz is already finished")]
    QuizFinished,
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type LearningResult<T> = Result<T, LearningError>;
