//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection is one `Session`; frames are read here and written by a
//! separate writer task.

use crate::{
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        session::Session,
        state::{AppState, Outbox},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let (outbox, outgoing) = Outbox::channel();
    let writer = tokio::spawn(write_frames(sender, outgoing));

    let session = Session::new(app_state, outbox);
    if let Err(e) = session.greet().await {
        error!("Failed to send the initial dashboard: {}", e);
        writer.abort();
        return;
    }

    // --- Main Message Loop ---
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => session.handle(message).await,
                Err(e) => {
                    warn!("Failed to deserialize client message: {}", e);
                    session.report(&ApiError::from(e));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive failed: {}", ApiError::from(e));
                break;
            }
        }
    }

    // --- Cleanup ---
    // Workers still running hold their own outbox handles; their late frames are dropped.
    writer.abort();
    info!("WebSocket connection closed.");
}

/// Serializes queued messages onto the socket until either side goes away.
async fn write_frames(
    mut sender: SplitSink<WebSocket, Message>,
    mut outgoing: UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = outgoing.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize server message: {}", e);
                continue;
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            info!("Client went away; stopping the writer.");
            break;
        }
    }
}
