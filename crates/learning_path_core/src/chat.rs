//! crates/learning_path_core/src/chat.rs
//!
//! The per-topic tutor conversation. It lives only as long as the topic view
//! and is never persisted.

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{ChatMessage, Topic};
use crate::error::{LearningError, LearningResult};
use crate::ports::{PortResult, TutorService};

/// Shown in place of a reply when the tutor could not answer.
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, I couldn't process that. Please try again.";

/// One outstanding question to the tutor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub session_id: Uuid,
    pub topic_content: String,
    /// Messages exchanged before `message`.
    pub history: Vec<ChatMessage>,
    pub message: String,
}

impl ChatRequest {
    pub async fn send(&self, tutor: &dyn TutorService) -> PortResult<String> {
        tutor
            .chat_response(&self.topic_content, &self.history, &self.message)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    topic_id: Uuid,
    topic_content: String,
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
}

impl ChatSession {
    /// Opens an empty conversation scoped to the topic's content.
    pub fn new(topic: &Topic) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id: topic.id,
            topic_content: topic.content.clone().unwrap_or_default(),
            messages: Vec::new(),
            awaiting_reply: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic_id(&self) -> Uuid {
        self.topic_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Appends the user's message and returns the request to send.
    pub fn begin(&mut self, text: &str) -> LearningResult<ChatRequest> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LearningError::InvalidInput("Type a question first.".to_string()));
        }
        if self.awaiting_reply {
            return Err(LearningError::InvalidInput(
                "The tutor is still answering the previous question.".to_string(),
            ));
        }

        let request = ChatRequest {
            session_id: self.id,
            topic_content: self.topic_content.clone(),
            history: self.messages.clone(),
            message: text.to_string(),
        };
        self.messages.push(ChatMessage::user(text));
        self.awaiting_reply = true;
        Ok(request)
    }

    /// Appends the tutor's reply, or the fallback apology when it failed.
    /// Replies meant for an earlier conversation are ignored.
    pub fn finish(
        &mut self,
        request: &ChatRequest,
        reply: PortResult<String>,
    ) -> Option<&ChatMessage> {
        if request.session_id != self.id {
            info!("Dropping tutor reply for a discarded chat session.");
            return None;
        }
        let message = match reply {
            Ok(text) => ChatMessage::model(text),
            Err(e) => {
                warn!("Tutor failed to answer for topic {}: {}", self.topic_id, e);
                ChatMessage::model(CHAT_FALLBACK_REPLY)
            }
        };
        self.awaiting_reply = false;
        self.messages.push(message);
        self.messages.last()
    }

    /// Sends one message and waits for the reply.
    pub async fn send(
        &mut self,
        text: &str,
        tutor: &dyn TutorService,
    ) -> LearningResult<ChatMessage> {
        let request = self.begin(text)?;
        let reply = request.send(tutor).await;
        self.finish(&request, reply)
            .cloned()
            .ok_or_else(|| LearningError::InvalidInput("The chat session was closed.".to_string()))
    }
}
