//! crates/learning_path_core/src/creation.rs
//!
//! Turns a user's subject request into a seeded `Course`.

use tracing::info;

use crate::domain::Course;
use crate::error::{LearningError, LearningResult};
use crate::ports::CourseOutlineService;

/// Validates the request, asks for an outline and seeds the course.
///
/// An empty subject is rejected before any generation call is made. A blank
/// syllabus counts as no syllabus.
pub async fn create_course(
    subject: &str,
    syllabus: Option<&str>,
    generator: &dyn CourseOutlineService,
) -> LearningResult<Course> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(LearningError::InvalidInput(
            "Please enter a subject to learn.".to_string(),
        ));
    }
    let syllabus = syllabus.map(str::trim).filter(|s| !s.is_empty());

    info!("Generating course outline for '{}'", subject);
    let outline = generator.generate_course_outline(subject, syllabus).await?;
    let course = Course::from_outline(outline)?;
    info!(
        "Created course {} ('{}') with {} topics",
        course.id,
        course.subject,
        course.topics.len()
    );
    Ok(course)
}
