//! crates/learning_path_core/src/progression.rs
//!
//! The course/topic state machine. Topics move `locked -> unlocked -> completed`
//! and never back; every transition returns a new `Course` value.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Course, CourseOutline, CourseProgress, OutlineTopic, Topic, TopicStatus};
use crate::error::{LearningError, LearningResult};

/// The result of completing a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub course: Course,
    /// The topic unlocked by this completion, which becomes the suggested selection.
    pub next_topic_id: Option<Uuid>,
}

/// Gives every outline topic an id; only the first one starts unlocked.
pub fn seed_topics(outline: Vec<OutlineTopic>) -> Vec<Topic> {
    outline
        .into_iter()
        .enumerate()
        .map(|(index, topic)| Topic {
            id: Uuid::new_v4(),
            title: topic.title.trim().to_string(),
            kind: topic.kind,
            status: if index == 0 {
                TopicStatus::Unlocked
            } else {
                TopicStatus::Locked
            },
            content: None,
            references: None,
        })
        .collect()
}

impl Course {
    /// Builds a freshly seeded course from a generated outline.
    pub fn from_outline(outline: CourseOutline) -> LearningResult<Self> {
        let outline = outline.validate()?;
        let icon = outline
            .icon
            .map(|icon| icon.trim().to_string())
            .filter(|icon| !icon.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            subject: outline.subject.trim().to_string(),
            icon,
            created_at: Utc::now(),
            topics: seed_topics(outline.topics),
        })
    }

    pub fn topic(&self, topic_id: Uuid) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn topic_index(&self, topic_id: Uuid) -> Option<usize> {
        self.topics.iter().position(|t| t.id == topic_id)
    }

    /// Returns the topic if it may become the active selection.
    ///
    /// Locked topics are rejected; the caller keeps its current selection.
    pub fn select_topic(&self, topic_id: Uuid) -> LearningResult<&Topic> {
        let topic = self
            .topic(topic_id)
            .ok_or(LearningError::TopicNotFound(topic_id))?;
        if topic.is_locked() {
            return Err(LearningError::TopicLocked(topic_id));
        }
        Ok(topic)
    }

    /// Marks a topic completed and unlocks its successor.
    pub fn complete_topic(&self, topic_id: Uuid) -> LearningResult<Completion> {
        let index = self
            .topic_index(topic_id)
            .ok_or(LearningError::TopicNotFound(topic_id))?;

        match self.topics[index].status {
            TopicStatus::Completed => return Err(LearningError::AlreadyCompleted(topic_id)),
            TopicStatus::Locked => return Err(LearningError::TopicLocked(topic_id)),
            TopicStatus::Unlocked => {}
        }

        let mut course = self.clone();
        course.topics[index].status = TopicStatus::Completed;

        let next_topic_id = course.topics.get_mut(index + 1).map(|next| {
            if next.status == TopicStatus::Locked {
                next.status = TopicStatus::Unlocked;
            }
            next.id
        });

        info!(
            "Topic {} of course {} completed; next topic: {:?}",
            topic_id, self.id, next_topic_id
        );
        Ok(Completion {
            course,
            next_topic_id,
        })
    }

    /// Index of the topic to open when the course is resumed: the one after the
    /// last completed topic, the first topic if none is completed, and the last
    /// topic once everything is done.
    pub fn resume_index(&self) -> usize {
        match self.topics.iter().rposition(Topic::is_completed) {
            Some(last) if last + 1 < self.topics.len() => last + 1,
            Some(last) => last,
            None => 0,
        }
    }

    pub fn resume_topic(&self) -> Option<&Topic> {
        self.topics.get(self.resume_index())
    }

    /// Replaces the topic with the same id, leaving every other topic untouched.
    pub fn with_topic(&self, topic: Topic) -> LearningResult<Self> {
        let index = self
            .topic_index(topic.id)
            .ok_or(LearningError::TopicNotFound(topic.id))?;
        let mut course = self.clone();
        course.topics[index] = topic;
        Ok(course)
    }

    pub fn progress(&self) -> CourseProgress {
        let total = self.topics.len();
        let completed = self.topics.iter().filter(|t| t.is_completed()).count();
        let percent = if total == 0 {
            0
        } else {
            ((completed * 100 + total / 2) / total) as u8
        };
        CourseProgress {
            completed,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopicStatus::{Completed, Locked, Unlocked};
    use crate::domain::TopicType;
    use crate::test_support::course;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn statuses(course: &Course) -> Vec<TopicStatus> {
        course.topics.iter().map(|t| t.status).collect()
    }

    #[test]
    fn seeding_unlocks_only_the_first_topic() {
        let outline = CourseOutline {
            subject: " Rust ".to_string(),
            icon: Some("🦀".to_string()),
            topics: (0..4)
                .map(|i| OutlineTopic {
                    title: format!("Topic {i}"),
                    kind: if i == 3 {
                        TopicType::Checkpoint
                    } else {
                        TopicType::Lesson
                    },
                })
                .collect(),
        };

        let course = Course::from_outline(outline).unwrap();

        assert_eq!(course.subject, "Rust");
        assert_eq!(statuses(&course), vec![Unlocked, Locked, Locked, Locked]);
        assert!(course.topics.iter().all(|t| t.content.is_none()));
        assert_eq!(course.topics[3].kind, TopicType::Checkpoint);
    }

    #[test]
    fn blank_icon_is_dropped() {
        let outline = CourseOutline {
            subject: "Go".to_string(),
            icon: Some("  ".to_string()),
            topics: vec![OutlineTopic {
                title: "Basics".to_string(),
                kind: TopicType::Lesson,
            }],
        };
        assert_eq!(Course::from_outline(outline).unwrap().icon, None);
    }

    #[test]
    fn completing_a_topic_unlocks_the_next_one() {
        let course = course(&[Unlocked, Locked, Locked]);
        let first = course.topics[0].id;

        let completion = course.complete_topic(first).unwrap();

        assert_eq!(statuses(&completion.course), vec![Completed, Unlocked, Locked]);
        assert_eq!(completion.next_topic_id, Some(course.topics[1].id));
        // The original value is untouched.
        assert_eq!(statuses(&course), vec![Unlocked, Locked, Locked]);
    }

    #[test]
    fn completing_the_last_topic_suggests_nothing() {
        let course = course(&[Completed, Unlocked]);
        let completion = course.complete_topic(course.topics[1].id).unwrap();

        assert_eq!(statuses(&completion.course), vec![Completed, Completed]);
        assert_eq!(completion.next_topic_id, None);
    }

    #[test]
    fn completed_topics_stay_completed() {
        let course = course(&[Completed, Unlocked, Locked]);
        let first = course.topics[0].id;

        assert_eq!(
            course.complete_topic(first),
            Err(LearningError::AlreadyCompleted(first))
        );

        let next = course.complete_topic(course.topics[1].id).unwrap().course;
        assert_eq!(next.topics[0].status, Completed);
    }

    #[test]
    fn locked_and_unknown_topics_cannot_be_completed() {
        let course = course(&[Unlocked, Locked]);
        let locked = course.topics[1].id;
        let unknown = Uuid::new_v4();

        assert_eq!(course.complete_topic(locked), Err(LearningError::TopicLocked(locked)));
        assert_eq!(
            course.complete_topic(unknown),
            Err(LearningError::TopicNotFound(unknown))
        );
    }

    #[test]
    fn selecting_a_locked_topic_is_rejected() {
        let course = course(&[Completed, Unlocked, Locked]);

        assert!(course.select_topic(course.topics[0].id).is_ok());
        assert!(course.select_topic(course.topics[1].id).is_ok());
        assert_eq!(
            course.select_topic(course.topics[2].id),
            Err(LearningError::TopicLocked(course.topics[2].id))
        );
    }

    #[rstest]
    #[case(&[Completed, Completed, Unlocked, Locked], 2)]
    #[case(&[Unlocked, Locked, Locked], 0)]
    #[case(&[Completed, Completed, Completed], 2)]
    #[case(&[Completed, Unlocked], 1)]
    fn resume_picks_the_topic_after_the_last_completed(
        #[case] states: &[TopicStatus],
        #[case] expected: usize,
    ) {
        assert_eq!(course(states).resume_index(), expected);
    }

    #[test]
    fn with_topic_replaces_by_id() {
        let course = course(&[Unlocked, Locked]);
        let mut topic = course.topics[0].clone();
        topic.content = Some("body".to_string());

        let updated = course.with_topic(topic).unwrap();

        assert_eq!(updated.topics[0].content.as_deref(), Some("body"));
        assert_eq!(updated.topics[1], course.topics[1]);
    }

    #[rstest]
    #[case(&[Unlocked, Locked, Locked], 0)]
    #[case(&[Completed, Unlocked, Locked], 33)]
    #[case(&[Completed, Completed, Unlocked], 67)]
    #[case(&[Completed, Completed, Completed], 100)]
    fn progress_rounds_to_whole_percent(#[case] states: &[TopicStatus], #[case] percent: u8) {
        let progress = course(states).progress();
        assert_eq!(progress.percent, percent);
        assert_eq!(progress.total, states.len());
        assert_eq!(progress.is_started(), percent > 0);
    }
}
