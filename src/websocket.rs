use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::handlers;
use crate::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.register_client();
    info!("New WebSocket connection: {}", client_uid);

    let (mut sink, mut receiver) = socket.split();
    let (sender, mut outgoing) = mpsc::unbounded_channel::<String>();

    // Single writer so pushed state and replies never interleave mid-frame
    let writer = tokio::spawn(async move {
        while let Some(text) = outgoing.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let (snapshot, mut events) = state.controller.subscribe();
    let pair = state.client_languages(&client_uid);
    for msg in handlers::initial_messages(&client_uid, &pair, &snapshot) {
        let _ = sender.send(msg.to_string());
    }

    let push = sender.clone();
    let controller = state.controller.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            let snapshot = match events.recv().await {
                Ok(snapshot) => snapshot,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("State push fell behind by {} events, resending current", skipped);
                    controller.snapshot()
                }
                Err(RecvError::Closed) => break,
            };
            if push.send(handlers::state_message(&snapshot).to_string()).is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) =
                    handlers::handle_message(&state, &client_uid, &text, &sender).await
                {
                    warn!("Error handling message from {}: {}", client_uid, e);
                    let _ = sender.send(handlers::error_message(&e.to_string()).to_string());
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // The translation itself is shared, so it keeps running
    forwarder.abort();
    writer.abort();
    if let Some((_, context)) = state.client_contexts.remove(&client_uid) {
        info!(
            "Cleaned up client {} ({})",
            context.client_uid,
            context.languages.as_query()
        );
    }
}
