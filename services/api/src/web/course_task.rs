//! services/api/src/web/course_task.rs
//!
//! This module contains the asynchronous "worker" that generates a new course.

use crate::{
    error::ApiError,
    web::{protocol::ServerMessage, session::Session, state::Operation},
};
use learning_path_core::create_course as generate_course;
use tracing::{error, info};

/// Generates and stores a course, then opens it if the user is still waiting on
/// the subject form.
pub async fn create_course(session: Session, subject: String, syllabus: Option<String>) {
    let result = run(&session, &subject, syllabus.as_deref()).await;
    session.state.lock().await.finish(Operation::CreateCourse);
    if let Err(e) = result {
        error!("Creating a course for '{}' failed: {}", subject, e);
        session.report(&e);
    }
}

async fn run(session: &Session, subject: &str, syllabus: Option<&str>) -> Result<(), ApiError> {
    let course = generate_course(subject, syllabus, session.app.outline_adapter.as_ref()).await?;
    session.app.library.add(course.clone()).await?;

    let opened = {
        let mut state = session.state.lock().await;
        let opened = state.router.course_created(course.id);
        if opened.is_ok() {
            state.clear_topic_view();
        }
        opened
    };

    match opened {
        Ok(view) => {
            let first = course.resume_topic().map(|t| t.id);
            session.send(ServerMessage::ViewChanged {
                view,
                course: Some(course),
            })?;
            match first {
                Some(topic_id) => session.select_topic(topic_id).await,
                None => Ok(()),
            }
        }
        Err(_) => {
            info!("Course {} created after the user left the form.", course.id);
            session.send_courses().await
        }
    }
}
