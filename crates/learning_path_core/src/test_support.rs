//! In-memory port implementations and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::{
    ChatMessage, Course, CourseOutline, QuizQuestion, Task, TaskEvaluation, Topic, TopicContent,
    TopicStatus, TopicType,
};
use crate::ports::{
    ContentGenerationService, CourseOutlineService, CourseStore, PortError, PortResult,
    QuizGenerationService, TaskService, TutorService,
};

pub fn course(states: &[TopicStatus]) -> Course {
    Course {
        id: Uuid::new_v4(),
        subject: "Rust".to_string(),
        icon: Some("🦀".to_string()),
        created_at: Utc::now(),
        topics: states
            .iter()
            .enumerate()
            .map(|(i, status)| Topic {
                id: Uuid::new_v4(),
                title: format!("Topic {i}"),
                kind: TopicType::Lesson,
                status: *status,
                content: None,
                references: None,
            })
            .collect(),
    }
}

pub fn question(prefix: &str) -> QuizQuestion {
    QuizQuestion {
        question: format!("{prefix}?"),
        options: (0..4).map(|i| format!("{prefix}-{i}")).collect(),
        correct_answer: format!("{prefix}-0"),
        explanation: format!("{prefix}-0 is right"),
    }
}

pub fn quiz() -> Vec<QuizQuestion> {
    vec![question("a"), question("b"), question("c")]
}

#[derive(Default)]
pub struct MemoryStore {
    pub courses: Mutex<Vec<Course>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with(courses: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(courses),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self) -> Vec<Course> {
        self.courses.lock().unwrap().clone()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn read(&self) -> Vec<Course> {
        self.stored()
    }

    async fn write(&self, courses: &[Course]) -> PortResult<()> {
        *self.courses.lock().unwrap() = courses.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Generation double that counts calls and can fail or hold responses.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub fail: bool,
    /// When set, content generation waits for a notification before answering.
    pub gate: Option<Notify>,
    pub evaluation: Option<TaskEvaluation>,
    pub outline: Option<CourseOutline>,
    pub last_history: Mutex<Vec<ChatMessage>>,
}

impl FakeGenerator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> PortResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(PortError::Unexpected("generator offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CourseOutlineService for FakeGenerator {
    async fn generate_course_outline(
        &self,
        subject: &str,
        _syllabus: Option<&str>,
    ) -> PortResult<CourseOutline> {
        self.record()?;
        let outline = self.outline.clone().unwrap_or_else(|| CourseOutline {
            subject: subject.to_string(),
            icon: Some("📘".to_string()),
            topics: vec![
                crate::domain::OutlineTopic {
                    title: "Intro".to_string(),
                    kind: TopicType::Lesson,
                },
                crate::domain::OutlineTopic {
                    title: "Practice".to_string(),
                    kind: TopicType::Checkpoint,
                },
            ],
        });
        outline.validate()
    }
}

#[async_trait]
impl ContentGenerationService for FakeGenerator {
    async fn generate_topic_content(
        &self,
        topic_title: &str,
        subject: &str,
    ) -> PortResult<TopicContent> {
        self.record()?;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(TopicContent {
            content: format!("# {topic_title}\nAll about {subject}."),
            references: vec!["https://doc.rust-lang.org/book/".to_string()],
        })
    }
}

#[async_trait]
impl QuizGenerationService for FakeGenerator {
    async fn generate_quiz(
        &self,
        _topic_content: &str,
        _topic_title: &str,
    ) -> PortResult<Vec<QuizQuestion>> {
        self.record()?;
        Ok(quiz())
    }
}

#[async_trait]
impl TaskService for FakeGenerator {
    async fn generate_task(&self, topic_title: &str, _subject: &str) -> PortResult<Task> {
        self.record()?;
        Ok(Task {
            description: format!("Build something with {topic_title}"),
            evaluation_criteria: "It compiles".to_string(),
        })
    }

    async fn evaluate_task(
        &self,
        _task_description: &str,
        _submission: &str,
        _topic_title: &str,
    ) -> PortResult<TaskEvaluation> {
        self.record()?;
        Ok(self.evaluation.clone().unwrap_or(TaskEvaluation {
            passed: true,
            feedback: "Nice work".to_string(),
            score: 90,
        }))
    }
}

#[async_trait]
impl TutorService for FakeGenerator {
    async fn chat_response(
        &self,
        _topic_content: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> PortResult<String> {
        self.record()?;
        *self.last_history.lock().unwrap() = history.to_vec();
        Ok(format!("You asked: {message}"))
    }
}
