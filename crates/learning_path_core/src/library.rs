//! crates/learning_path_core/src/library.rs
//!
//! The in-memory course list and its write-through to the `CourseStore`.
//!
//! Every change is a whole-course replacement computed from the current value
//! while the list lock is held, so two updates to different topics of the same
//! course cannot overwrite each other.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Course;
use crate::error::{LearningError, LearningResult};
use crate::ports::CourseStore;

pub struct CourseLibrary {
    store: Arc<dyn CourseStore>,
    courses: Mutex<Vec<Course>>,
}

impl CourseLibrary {
    /// Loads the stored courses. A broken store simply yields an empty library.
    pub async fn load(store: Arc<dyn CourseStore>) -> Self {
        let courses = store.read().await;
        info!("Loaded {} course(s) from the store.", courses.len());
        Self {
            store,
            courses: Mutex::new(courses),
        }
    }

    /// A snapshot of every course, in creation order.
    pub async fn courses(&self) -> Vec<Course> {
        self.courses.lock().await.clone()
    }

    pub async fn get(&self, course_id: Uuid) -> LearningResult<Course> {
        self.courses
            .lock()
            .await
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or(LearningError::CourseNotFound(course_id))
    }

    pub async fn add(&self, course: Course) -> LearningResult<()> {
        let mut courses = self.courses.lock().await;
        let mut next = courses.clone();
        next.push(course);
        self.store.write(&next).await?;
        *courses = next;
        Ok(())
    }

    /// Replaces one course with the value `apply` derives from its current state.
    ///
    /// Nothing is written when `apply` fails; the in-memory list only changes
    /// after the store accepted the new list.
    pub async fn update<F>(&self, course_id: Uuid, apply: F) -> LearningResult<Course>
    where
        F: FnOnce(&Course) -> LearningResult<Course>,
    {
        let mut courses = self.courses.lock().await;
        let index = courses
            .iter()
            .position(|c| c.id == course_id)
            .ok_or(LearningError::CourseNotFound(course_id))?;

        let updated = apply(&courses[index])?;
        if updated.id != course_id {
            warn!("Refusing to replace course {} with a different id.", course_id);
            return Err(LearningError::CourseNotFound(course_id));
        }

        let mut next = courses.clone();
        next[index] = updated.clone();
        self.store.write(&next).await?;
        *courses = next;
        Ok(updated)
    }
}
