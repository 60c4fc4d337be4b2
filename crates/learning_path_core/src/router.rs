//! crates/learning_path_core/src/router.rs
//!
//! Which top-level screen is active. Flat, with no history: every screen goes
//! back straight to the dashboard.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{LearningError, LearningResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Dashboard,
    NewCourse,
    Learning { course_id: Uuid },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::NewCourse => "new_course",
            View::Learning { .. } => "learning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRouter {
    view: View,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self {
            view: View::Dashboard,
        }
    }
}

impl ViewRouter {
    pub fn view(&self) -> View {
        self.view
    }

    pub fn active_course(&self) -> Option<Uuid> {
        match self.view {
            View::Learning { course_id } => Some(course_id),
            _ => None,
        }
    }

    fn require(&self, expected: View, action: &'static str) -> LearningResult<()> {
        if self.view == expected {
            Ok(())
        } else {
            Err(LearningError::InvalidTransition {
                from: self.view.name(),
                action,
            })
        }
    }

    pub fn start_new_course(&mut self) -> LearningResult<View> {
        self.require(View::Dashboard, "start a new course")?;
        self.view = View::NewCourse;
        Ok(self.view)
    }

    pub fn course_created(&mut self, course_id: Uuid) -> LearningResult<View> {
        self.require(View::NewCourse, "open a created course")?;
        self.view = View::Learning { course_id };
        Ok(self.view)
    }

    pub fn open_course(&mut self, course_id: Uuid) -> LearningResult<View> {
        self.require(View::Dashboard, "open a course")?;
        self.view = View::Learning { course_id };
        Ok(self.view)
    }

    /// Returns to the dashboard from anywhere, dropping the active course.
    pub fn back(&mut self) -> View {
        self.view = View::Dashboard;
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_flow_lands_in_the_new_course() {
        let mut router = ViewRouter::default();
        let id = Uuid::new_v4();

        router.start_new_course().unwrap();
        assert_eq!(router.course_created(id).unwrap(), View::Learning { course_id: id });
        assert_eq!(router.active_course(), Some(id));
    }

    #[test]
    fn back_always_returns_to_the_dashboard() {
        let mut router = ViewRouter::default();
        router.open_course(Uuid::new_v4()).unwrap();
        assert_eq!(router.back(), View::Dashboard);
        assert_eq!(router.active_course(), None);

        router.start_new_course().unwrap();
        assert_eq!(router.back(), View::Dashboard);
    }

    #[test]
    fn transitions_outside_the_dashboard_are_rejected() {
        let mut router = ViewRouter::default();
        let id = Uuid::new_v4();

        assert!(router.course_created(id).is_err());
        router.open_course(id).unwrap();

        let err = router.start_new_course().unwrap_err();
        assert_eq!(
            err,
            LearningError::InvalidTransition {
                from: "learning",
                action: "start a new course"
            }
        );
        assert_eq!(router.view(), View::Learning { course_id: id });
    }

    #[test]
    fn view_serializes_with_a_tag() {
        let json = serde_json::to_value(View::NewCourse).unwrap();
        assert_eq!(json["view"], "new_course");
    }
}
