//! services/api/src/web/session.rs
//!
//! One UI session: routes client messages to the view router, the topic
//! selection and the open assessment, and hands long-running generation calls
//! to the worker modules.

use crate::{
    error::ApiError,
    web::{
        assessment_task, chat_task, content_task, course_task,
        protocol::{summaries, ClientMessage, ServerMessage},
        state::{AppState, Operation, Outbox, SessionState},
    },
};
use learning_path_core::{ChatMessage, ChatSession, LearningError, QuizStep, View};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct Session {
    pub app: Arc<AppState>,
    pub state: Arc<Mutex<SessionState>>,
    pub outbox: Outbox,
}

impl Session {
    pub fn new(app: Arc<AppState>, outbox: Outbox) -> Self {
        Self {
            app,
            state: Arc::new(Mutex::new(SessionState::default())),
            outbox,
        }
    }

    /// Sends the initial dashboard.
    pub async fn greet(&self) -> Result<(), ApiError> {
        self.send(ServerMessage::ViewChanged {
            view: View::Dashboard,
            course: None,
        })?;
        self.send_courses().await
    }

    pub fn send(&self, message: ServerMessage) -> Result<(), ApiError> {
        self.outbox.send(message)
    }

    /// Tells the client an action failed. The session carries on.
    pub fn report(&self, error: &ApiError) {
        if self
            .send(ServerMessage::Error {
                message: error.client_message(),
            })
            .is_err()
        {
            info!("Could not report the failure, the connection is gone.");
        }
    }

    /// Dispatches one client message, reporting any failure back to the client.
    pub async fn handle(&self, message: ClientMessage) {
        if let Err(e) = self.dispatch(message).await {
            warn!("Session action failed: {}", e);
            self.report(&e);
        }
    }

    async fn dispatch(&self, message: ClientMessage) -> Result<(), ApiError> {
        match message {
            ClientMessage::StartNewCourse => {
                let view = self.state.lock().await.router.start_new_course()?;
                self.send(ServerMessage::ViewChanged { view, course: None })
            }
            ClientMessage::CreateCourse { subject, syllabus } => {
                self.create_course(subject, syllabus).await
            }
            ClientMessage::OpenCourse { course_id } => self.open_course(course_id).await,
            ClientMessage::Back => self.back().await,
            ClientMessage::SelectTopic { topic_id } => self.select_topic(topic_id).await,
            ClientMessage::StartAssessment => self.start_assessment().await,
            ClientMessage::SelectOption { option } => {
                let mut state = self.state.lock().await;
                state.quiz_mut()?.select_option(&option)?;
                Ok(())
            }
            ClientMessage::SubmitAnswer => {
                let (topic_id, reveal) = {
                    let mut state = self.state.lock().await;
                    let quiz = state.quiz_mut()?;
                    (quiz.topic_id(), quiz.submit()?)
                };
                self.send(ServerMessage::AnswerRevealed { topic_id, reveal })
            }
            ClientMessage::NextQuestion => self.next_question().await,
            ClientMessage::SubmitTask { submission } => self.submit_task(&submission).await,
            ClientMessage::CloseAssessment => {
                self.state.lock().await.assessment = None;
                Ok(())
            }
            ClientMessage::SendChat { message } => self.send_chat(&message).await,
        }
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    pub async fn send_courses(&self) -> Result<(), ApiError> {
        let courses = self.app.library.courses().await;
        self.send(ServerMessage::Courses {
            courses: summaries(&courses),
        })
    }

    async fn open_course(&self, course_id: Uuid) -> Result<(), ApiError> {
        let course = self.app.library.get(course_id).await?;
        let view = {
            let mut state = self.state.lock().await;
            let view = state.router.open_course(course_id)?;
            state.clear_topic_view();
            view
        };
        info!("Opened course {} ('{}')", course.id, course.subject);

        let resume = course.resume_topic().map(|t| t.id);
        self.send(ServerMessage::ViewChanged {
            view,
            course: Some(course),
        })?;
        match resume {
            Some(topic_id) => self.select_topic(topic_id).await,
            None => Ok(()),
        }
    }

    async fn back(&self) -> Result<(), ApiError> {
        let view = {
            let mut state = self.state.lock().await;
            state.clear_topic_view();
            state.router.back()
        };
        self.send(ServerMessage::ViewChanged { view, course: None })?;
        self.send_courses().await
    }

    /// Makes `topic_id` of the active course the selection and loads its content
    /// if it has none yet. Locked topics leave the selection unchanged.
    pub async fn select_topic(&self, topic_id: Uuid) -> Result<(), ApiError> {
        let course_id = self
            .state
            .lock()
            .await
            .router
            .active_course()
            .ok_or_else(|| LearningError::InvalidInput("Open a course first.".to_string()))?;

        let course = self.app.library.get(course_id).await?;
        let topic = course.select_topic(topic_id)?.clone();
        {
            let mut state = self.state.lock().await;
            state.clear_topic_view();
            state.selected_topic = Some(topic_id);
        }

        let needs_content = !topic.has_content();
        self.send(ServerMessage::TopicSelected { topic })?;
        if needs_content {
            tokio::spawn(content_task::load_content(self.clone(), course_id, topic_id));
        }
        Ok(())
    }

    async fn create_course(
        &self,
        subject: String,
        syllabus: Option<String>,
    ) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock().await;
            let view = state.router.view();
            if view != View::NewCourse {
                return Err(LearningError::InvalidTransition {
                    from: view.name(),
                    action: "create a course",
                }
                .into());
            }
            if !state.try_begin(Operation::CreateCourse) {
                return self.busy(Operation::CreateCourse);
            }
        }
        tokio::spawn(course_task::create_course(self.clone(), subject, syllabus));
        Ok(())
    }

    /// Marks the topic completed, announces it and moves on to the next topic.
    pub async fn complete_topic(&self, course_id: Uuid, topic_id: Uuid) -> Result<(), ApiError> {
        let mut next_topic_id = None;
        let course = self
            .app
            .library
            .update(course_id, |current| {
                let completion = current.complete_topic(topic_id)?;
                next_topic_id = completion.next_topic_id;
                Ok(completion.course)
            })
            .await?;

        if self.state.lock().await.router.active_course() != Some(course_id) {
            return Ok(());
        }
        self.send(ServerMessage::CourseUpdated { course })?;
        self.send(ServerMessage::TopicCompleted {
            topic_id,
            next_topic_id,
        })?;
        match next_topic_id {
            Some(next) => self.select_topic(next).await,
            None => Ok(()),
        }
    }

    //=====================================================================================
    // Assessment
    //=====================================================================================

    async fn start_assessment(&self) -> Result<(), ApiError> {
        let (course_id, topic_id) = {
            let mut state = self.state.lock().await;
            let selection = state
                .selection()
                .ok_or_else(|| LearningError::InvalidInput("Select a topic first.".to_string()))?;
            if !state.try_begin(Operation::StartAssessment) {
                return self.busy(Operation::StartAssessment);
            }
            state.assessment = None;
            selection
        };
        tokio::spawn(assessment_task::start(self.clone(), course_id, topic_id));
        Ok(())
    }

    async fn next_question(&self) -> Result<(), ApiError> {
        let (topic_id, step) = {
            let mut state = self.state.lock().await;
            let quiz = state.quiz_mut()?;
            (quiz.topic_id(), quiz.next()?)
        };

        let result = match step {
            QuizStep::Question(question) => {
                return self.send(ServerMessage::QuizQuestion { topic_id, question });
            }
            QuizStep::Finished(result) => result,
        };
        self.send(ServerMessage::QuizFinished {
            topic_id,
            score: result.score,
            total: result.total,
            passed: result.passed,
        })?;
        if !result.passed {
            return Ok(());
        }

        let course_id = {
            let mut state = self.state.lock().await;
            state.assessment = None;
            state.router.active_course()
        };
        match course_id {
            Some(course_id) => self.complete_topic(course_id, topic_id).await,
            None => Ok(()),
        }
    }

    async fn submit_task(&self, text: &str) -> Result<(), ApiError> {
        let (course_id, submission) = {
            let mut state = self.state.lock().await;
            let (course_id, _) = state
                .selection()
                .ok_or_else(|| LearningError::InvalidInput("Select a topic first.".to_string()))?;
            let submission = state.task_mut()?.submission(text)?;
            if !state.try_begin(Operation::EvaluateTask) {
                return self.busy(Operation::EvaluateTask);
            }
            (course_id, submission)
        };
        tokio::spawn(assessment_task::evaluate(self.clone(), course_id, submission));
        Ok(())
    }

    //=====================================================================================
    // Chat
    //=====================================================================================

    async fn send_chat(&self, text: &str) -> Result<(), ApiError> {
        let (course_id, topic_id) = self
            .state
            .lock()
            .await
            .selection()
            .ok_or_else(|| LearningError::InvalidInput("Select a topic first.".to_string()))?;

        let course = self.app.library.get(course_id).await?;
        let topic = course
            .topic(topic_id)
            .ok_or(LearningError::TopicNotFound(topic_id))?;
        if !topic.has_content() {
            return Err(LearningError::InvalidInput(
                "The tutor is available once the lesson has loaded.".to_string(),
            )
            .into());
        }

        let request = {
            let mut state = self.state.lock().await;
            if state.selected_topic != Some(topic_id) {
                return Ok(());
            }
            state
                .chat
                .get_or_insert_with(|| ChatSession::new(topic))
                .begin(text)?
        };

        self.send(ServerMessage::ChatMessage {
            topic_id,
            message: ChatMessage::user(request.message.clone()),
        })?;
        tokio::spawn(chat_task::reply(self.clone(), topic_id, request));
        Ok(())
    }

    fn busy(&self, op: Operation) -> Result<(), ApiError> {
        info!("Ignoring '{}': already running.", op.name());
        self.send(ServerMessage::Busy {
            action: op.name().to_string(),
        })
    }
}
