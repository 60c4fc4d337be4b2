//! crates/learning_path_core/src/content.rs
//!
//! Lazily fills a topic's generated content the first time it is viewed.
//! Content is fetched at most once per topic and never refreshed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Topic;
use crate::error::{LearningError, LearningResult};
use crate::library::CourseLibrary;
use crate::ports::{ContentGenerationService, PortResult};

/// Returns the topic with content, generating it only when it is missing.
///
/// On failure the error is returned and the caller keeps the topic as it was.
pub async fn ensure_content(
    topic: &Topic,
    subject: &str,
    generator: &dyn ContentGenerationService,
) -> PortResult<Topic> {
    if topic.has_content() {
        return Ok(topic.clone());
    }

    let generated = generator
        .generate_topic_content(&topic.title, subject)
        .await?
        .validate()?;

    Ok(Topic {
        content: Some(generated.content),
        references: Some(generated.references),
        ..topic.clone()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    /// The topic already had content; no request was made.
    Cached(Topic),
    /// Content was generated and stored on the course.
    Fetched(Topic),
    /// A request for this topic is already running.
    AlreadyPending,
}

/// Applies `ensure_content` to courses held by a `CourseLibrary`, with at most
/// one outstanding request per topic.
pub struct ContentOrchestrator {
    generator: Arc<dyn ContentGenerationService>,
    in_flight: Mutex<HashSet<Uuid>>,
}

struct PendingGuard<'a> {
    in_flight: &'a Mutex<HashSet<Uuid>>,
    topic_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.topic_id);
        }
    }
}

impl ContentOrchestrator {
    pub fn new(generator: Arc<dyn ContentGenerationService>) -> Self {
        Self {
            generator,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_pending(&self, topic_id: Uuid) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(&topic_id))
            .unwrap_or(false)
    }

    fn begin(&self, topic_id: Uuid) -> Option<PendingGuard<'_>> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(topic_id) {
            return None;
        }
        Some(PendingGuard {
            in_flight: &self.in_flight,
            topic_id,
        })
    }

    /// Makes sure the topic of `course_id` has content.
    ///
    /// The generated body is merged into whatever the course looks like when the
    /// response arrives, so progress made in the meantime is kept.
    pub async fn ensure(
        &self,
        library: &CourseLibrary,
        course_id: Uuid,
        topic_id: Uuid,
    ) -> LearningResult<ContentOutcome> {
        let course = library.get(course_id).await?;
        let topic = course.select_topic(topic_id)?.clone();
        if topic.has_content() {
            return Ok(ContentOutcome::Cached(topic));
        }

        let Some(_guard) = self.begin(topic_id) else {
            info!("Content for topic {} is already being generated.", topic_id);
            return Ok(ContentOutcome::AlreadyPending);
        };

        info!("Generating content for topic '{}'", topic.title);
        let filled = ensure_content(&topic, &course.subject, self.generator.as_ref())
            .await
            .map_err(|e| {
                warn!("Failed to generate content for topic {}: {}", topic_id, e);
                e
            })?;

        let updated = library
            .update(course_id, |current| {
                let existing = current
                    .topic(topic_id)
                    .ok_or(LearningError::TopicNotFound(topic_id))?;
                if existing.has_content() {
                    return Ok(current.clone());
                }
                current.with_topic(Topic {
                    content: filled.content.clone(),
                    references: filled.references.clone(),
                    ..existing.clone()
                })
            })
            .await?;

        let topic = updated
            .topic(topic_id)
            .cloned()
            .ok_or(LearningError::TopicNotFound(topic_id))?;
        Ok(ContentOutcome::Fetched(topic))
    }
}
