//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{summaries, CourseSummary},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use learning_path_core::{Course, LearningError, Topic, TopicStatus, TopicType};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_courses_handler,
        get_course_handler,
    ),
    components(
        schemas(CourseSummary, CourseDetail, TopicDetail)
    ),
    tags(
        (name = "Learning Path API", description = "Read-only views of the generated courses. The learning flow itself runs over the /ws WebSocket.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// One topic of a course, as returned by the course detail endpoint.
#[derive(Serialize, Debug, ToSchema)]
pub struct TopicDetail {
    pub id: Uuid,
    pub title: String,
    /// `lesson` or `checkpoint`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `locked`, `unlocked` or `completed`.
    pub status: String,
    pub content: Option<String>,
    pub references: Vec<String>,
}

/// A full course with its progress.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub id: Uuid,
    pub subject: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub percent: u8,
    /// Id of the topic the learning view opens on.
    pub resume_topic_id: Option<Uuid>,
    pub topics: Vec<TopicDetail>,
}

impl From<&Topic> for TopicDetail {
    fn from(topic: &Topic) -> Self {
        let kind = match topic.kind {
            TopicType::Lesson => "lesson",
            TopicType::Checkpoint => "checkpoint",
        };
        let status = match topic.status {
            TopicStatus::Locked => "locked",
            TopicStatus::Unlocked => "unlocked",
            TopicStatus::Completed => "completed",
        };
        Self {
            id: topic.id,
            title: topic.title.clone(),
            kind: kind.to_string(),
            status: status.to_string(),
            content: topic.content.clone(),
            references: topic.references.clone().unwrap_or_default(),
        }
    }
}

impl From<&Course> for CourseDetail {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            subject: course.subject.clone(),
            icon: course.icon.clone(),
            created_at: course.created_at,
            percent: course.progress().percent,
            resume_topic_id: course.resume_topic().map(|t| t.id),
            topics: course.topics.iter().map(TopicDetail::from).collect(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every course with its progress, in creation order.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "The dashboard listing", body = [CourseSummary])
    )
)]
pub async fn list_courses_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<CourseSummary>> {
    let courses = app_state.library.courses().await;
    Json(summaries(&courses))
}

/// Get one course with all of its topics.
#[utoipa::path(
    get,
    path = "/courses/{course_id}",
    responses(
        (status = 200, description = "The course", body = CourseDetail),
        (status = 404, description = "No course with this id")
    ),
    params(
        ("course_id" = Uuid, Path, description = "The unique ID of the course.")
    )
)]
pub async fn get_course_handler(
    State(app_state): State<Arc<AppState>>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseDetail>, (StatusCode, String)> {
    match app_state.library.get(course_id).await {
        Ok(course) => Ok(Json(CourseDetail::from(&course))),
        Err(LearningError::CourseNotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            format!("Course {} not found", course_id),
        )),
        Err(e) => {
            error!("Failed to load course {}: {:?}", course_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load course".to_string(),
            ))
        }
    }
}
