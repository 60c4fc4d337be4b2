//! Scripted ports and an in-memory application state for the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use learning_path_core::domain::{OutlineTopic, TopicContent};
use learning_path_core::ports::{
    ContentGenerationService, CourseOutlineService, CourseStore, PortError, PortResult,
    QuizGenerationService, TaskService, TutorService,
};
use learning_path_core::{
    ChatMessage, ContentOrchestrator, Course, CourseLibrary, CourseOutline, QuizQuestion, Task,
    TaskEvaluation, Topic, TopicStatus, TopicType,
};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::adapters::SqliteCourseStore;
use crate::web::protocol::ServerMessage;
use crate::web::state::AppState;

/// Answers every port with fixed, valid data and counts the calls.
pub struct Scripted {
    pub evaluation: Mutex<TaskEvaluation>,
    pub fail_tutor: AtomicBool,
    pub outline_calls: AtomicUsize,
    pub content_calls: AtomicUsize,
    pub task_calls: AtomicUsize,
    pub evaluate_calls: AtomicUsize,
}

impl Default for Scripted {
    fn default() -> Self {
        Self {
            evaluation: Mutex::new(TaskEvaluation {
                passed: true,
                feedback: "Well done".to_string(),
                score: 90,
            }),
            fail_tutor: AtomicBool::new(false),
            outline_calls: AtomicUsize::new(0),
            content_calls: AtomicUsize::new(0),
            task_calls: AtomicUsize::new(0),
            evaluate_calls: AtomicUsize::new(0),
        }
    }
}

impl Scripted {
    pub fn grade(&self, passed: bool, score: u8) {
        *self.evaluation.lock().unwrap() = TaskEvaluation {
            passed,
            feedback: format!("Scored {score}"),
            score,
        };
    }
}

/// The right answer of question `index` in the scripted quiz.
pub fn correct_option(index: usize) -> String {
    format!("q{index}-right")
}

#[async_trait]
impl CourseOutlineService for Scripted {
    async fn generate_course_outline(
        &self,
        subject: &str,
        _syllabus: Option<&str>,
    ) -> PortResult<CourseOutline> {
        self.outline_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CourseOutline {
            subject: subject.to_string(),
            icon: Some("📚".to_string()),
            topics: vec![
                OutlineTopic {
                    title: "Introduction".to_string(),
                    kind: TopicType::Lesson,
                },
                OutlineTopic {
                    title: "Practice".to_string(),
                    kind: TopicType::Checkpoint,
                },
            ],
        })
    }
}

#[async_trait]
impl ContentGenerationService for Scripted {
    async fn generate_topic_content(
        &self,
        topic_title: &str,
        subject: &str,
    ) -> PortResult<TopicContent> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TopicContent {
            content: format!("# {topic_title}\nAll about {subject}."),
            references: vec!["https://example.org/docs".to_string()],
        })
    }
}

#[async_trait]
impl QuizGenerationService for Scripted {
    async fn generate_quiz(
        &self,
        _topic_content: &str,
        _topic_title: &str,
    ) -> PortResult<Vec<QuizQuestion>> {
        Ok((0..3)
            .map(|i| QuizQuestion {
                question: format!("Question {i}?"),
                options: vec![
                    correct_option(i),
                    format!("q{i}-wrong-a"),
                    format!("q{i}-wrong-b"),
                    format!("q{i}-wrong-c"),
                ],
                correct_answer: correct_option(i),
                explanation: "Because.".to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl TaskService for Scripted {
    async fn generate_task(&self, topic_title: &str, _subject: &str) -> PortResult<Task> {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Task {
            description: format!("Apply {topic_title}"),
            evaluation_criteria: "Correctness".to_string(),
        })
    }

    async fn evaluate_task(
        &self,
        _task_description: &str,
        _submission: &str,
        _topic_title: &str,
    ) -> PortResult<TaskEvaluation> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.evaluation.lock().unwrap().clone())
    }
}

#[async_trait]
impl TutorService for Scripted {
    async fn chat_response(
        &self,
        _topic_content: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> PortResult<String> {
        if self.fail_tutor.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("tutor offline".to_string()));
        }
        Ok(format!("You asked '{}' after {} messages", message, history.len()))
    }
}

/// Builds the shared state on an in-memory SQLite store holding `courses`.
pub async fn app_state(scripted: Arc<Scripted>, courses: Vec<Course>) -> Arc<AppState> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteCourseStore::new(pool);
    store.run_migrations().await.unwrap();
    store.write(&courses).await.unwrap();

    let library = Arc::new(CourseLibrary::load(Arc::new(store)).await);
    Arc::new(AppState {
        library,
        content: Arc::new(ContentOrchestrator::new(scripted.clone())),
        outline_adapter: scripted.clone(),
        quiz_adapter: scripted.clone(),
        task_adapter: scripted.clone(),
        tutor_adapter: scripted,
    })
}

/// A course with one lesson and one checkpoint in the given states, both with content.
pub fn two_topic_course(lesson: TopicStatus, checkpoint: TopicStatus) -> Course {
    let topic = |title: &str, kind, status| Topic {
        id: Uuid::new_v4(),
        title: title.to_string(),
        kind,
        status,
        content: Some(format!("# {title}")),
        references: Some(Vec::new()),
    };
    Course {
        id: Uuid::new_v4(),
        subject: "Rust".to_string(),
        icon: None,
        created_at: Utc::now(),
        topics: vec![
            topic("Ownership", TopicType::Lesson, lesson),
            topic("Build a CLI", TopicType::Checkpoint, checkpoint),
        ],
    }
}

/// Receives messages until one matches `wanted`, failing after a short timeout.
pub async fn wait_for<F>(rx: &mut UnboundedReceiver<ServerMessage>, wanted: F) -> ServerMessage
where
    F: Fn(&ServerMessage) -> bool,
{
    let found = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(message) = rx.recv().await {
            if wanted(&message) {
                return Some(message);
            }
        }
        None
    })
    .await;
    match found {
        Ok(Some(message)) => message,
        Ok(None) => panic!("the outbox closed before the expected message"),
        Err(_) => panic!("timed out waiting for a message"),
    }
}
