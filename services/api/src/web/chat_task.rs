//! services/api/src/web/chat_task.rs
//!
//! This module contains the asynchronous "worker" that fetches a tutor reply.

use crate::web::{protocol::ServerMessage, session::Session};
use learning_path_core::ChatRequest;
use tracing::{info, warn};
use uuid::Uuid;

/// Asks the tutor and appends the reply to the chat it was asked in.
///
/// A failed call still yields a reply (the fallback apology). A reply for a
/// chat that was discarded meanwhile is dropped.
pub async fn reply(session: Session, topic_id: Uuid, request: ChatRequest) {
    let reply = request.send(session.app.tutor_adapter.as_ref()).await;

    let message = {
        let mut state = session.state.lock().await;
        state
            .chat
            .as_mut()
            .and_then(|chat| chat.finish(&request, reply).cloned())
    };

    match message {
        Some(message) => {
            if session
                .send(ServerMessage::ChatMessage { topic_id, message })
                .is_err()
            {
                warn!("Tutor reply for topic {} could not be delivered.", topic_id);
            }
        }
        None => info!("Dropped a tutor reply for topic {}.", topic_id),
    }
}
