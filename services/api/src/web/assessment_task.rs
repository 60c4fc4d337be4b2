//! services/api/src/web/assessment_task.rs
//!
//! This module contains the asynchronous "workers" that generate an assessment
//! and grade checkpoint submissions.

use crate::{
    error::ApiError,
    web::{protocol::ServerMessage, session::Session, state::Operation},
};
use learning_path_core::{assessment::TaskSubmission, start_assessment, Assessment, LearningError};
use tracing::{error, info};
use uuid::Uuid;

/// Generates the quiz or task for the selected topic and shows its first step.
pub async fn start(session: Session, course_id: Uuid, topic_id: Uuid) {
    let result = run_start(&session, course_id, topic_id).await;
    session.state.lock().await.finish(Operation::StartAssessment);
    if let Err(e) = result {
        error!("Starting the assessment for topic {} failed: {}", topic_id, e);
        session.report(&e);
    }
}

async fn run_start(session: &Session, course_id: Uuid, topic_id: Uuid) -> Result<(), ApiError> {
    let course = session.app.library.get(course_id).await?;
    let topic = course
        .topic(topic_id)
        .ok_or(LearningError::TopicNotFound(topic_id))?;

    let assessment = start_assessment(
        topic,
        &course.subject,
        session.app.quiz_adapter.as_ref(),
        session.app.task_adapter.as_ref(),
    )
    .await?;

    let first = match &assessment {
        Assessment::Quiz(quiz) => ServerMessage::QuizQuestion {
            topic_id,
            question: quiz.current_question().ok_or(LearningError::QuizFinished)?,
        },
        Assessment::Task(task) => ServerMessage::TaskReady {
            topic_id,
            task: task.task().clone(),
        },
    };

    let mut state = session.state.lock().await;
    if !state.is_viewing(course_id, topic_id) {
        info!("Assessment for topic {} arrived after the user moved on.", topic_id);
        return Ok(());
    }
    state.assessment = Some(assessment);
    session.send(first)
}

/// Sends a checkpoint submission to the evaluator and completes the topic on a pass.
pub async fn evaluate(session: Session, course_id: Uuid, submission: TaskSubmission) {
    let result = run_evaluate(&session, course_id, &submission).await;
    if let Err(e) = result {
        error!(
            "Evaluating the submission for '{}' failed: {}",
            submission.topic_title, e
        );
        session.report(&e);
    }
}

async fn run_evaluate(
    session: &Session,
    course_id: Uuid,
    submission: &TaskSubmission,
) -> Result<(), ApiError> {
    let result = submission
        .evaluate(session.app.task_adapter.as_ref())
        .await;

    let (topic_id, evaluation) = {
        let mut state = session.state.lock().await;
        state.finish(Operation::EvaluateTask);
        let evaluation = result?;
        if state.router.active_course() != Some(course_id) {
            info!("Evaluation arrived after the course was closed.");
            return Ok(());
        }
        let task = match state.task_mut() {
            Ok(task) if task.accepts(submission) => task,
            _ => {
                info!("Evaluation arrived after the task was closed.");
                return Ok(());
            }
        };
        let topic_id = submission.topic_id;
        let evaluation = task.record(evaluation).clone();
        if evaluation.passed {
            state.assessment = None;
        }
        (topic_id, evaluation)
    };

    let passed = evaluation.passed;
    session.send(ServerMessage::TaskEvaluated {
        topic_id,
        evaluation,
    })?;
    if passed {
        session.complete_topic(course_id, topic_id).await?;
    }
    Ok(())
}
