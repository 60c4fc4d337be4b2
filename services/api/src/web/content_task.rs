//! services/api/src/web/content_task.rs
//!
//! This module contains the asynchronous "worker" that fills a topic's content.

use crate::{
    error::ApiError,
    web::{protocol::ServerMessage, session::Session},
};
use learning_path_core::ContentOutcome;
use tracing::{error, info};
use uuid::Uuid;

/// Generates the content of `topic_id` unless it already exists or is being generated.
///
/// The course is updated even when the user moved on in the meantime; the
/// content is only shown when the topic is still selected.
pub async fn load_content(session: Session, course_id: Uuid, topic_id: Uuid) {
    if let Err(e) = run(&session, course_id, topic_id).await {
        error!("Loading content for topic {} failed: {}", topic_id, e);
        session.report(&e);
    }
}

async fn run(session: &Session, course_id: Uuid, topic_id: Uuid) -> Result<(), ApiError> {
    session.send(ServerMessage::ContentLoading { topic_id })?;

    let topic = match session
        .app
        .content
        .ensure(&session.app.library, course_id, topic_id)
        .await?
    {
        ContentOutcome::Fetched(topic) | ContentOutcome::Cached(topic) => topic,
        ContentOutcome::AlreadyPending => {
            info!("Content for topic {} is on its way already.", topic_id);
            return Ok(());
        }
    };

    let course = session.app.library.get(course_id).await?;
    let state = session.state.lock().await;
    if state.router.active_course() != Some(course_id) {
        return Ok(());
    }
    session.send(ServerMessage::CourseUpdated { course })?;
    if state.selected_topic == Some(topic_id) {
        session.send(ServerMessage::TopicContent { topic })?;
    } else {
        info!("Topic {} is no longer selected; content stored only.", topic_id);
    }
    Ok(())
}
