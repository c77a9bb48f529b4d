use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::StateSnapshot;
use crate::state::AppState;
use crate::translate::languages::{supported_languages, LanguagePair};

/// Outgoing text frames for one WebSocket client
pub type WebSocketSend = mpsc::UnboundedSender<String>;

pub fn state_message(snapshot: &StateSnapshot) -> Value {
    json!({
        "type": "translation-state",
        "snapshot": snapshot,
    })
}

fn language_pair_message(pair: &LanguagePair) -> Value {
    json!({
        "type": "language-pair",
        "source_lang": pair.source,
        "target_lang": pair.target,
    })
}

fn language_list_message() -> Value {
    json!({
        "type": "language-list",
        "languages": supported_languages(),
    })
}

pub fn error_message(message: &str) -> Value {
    json!({
        "type": "error",
        "message": message,
    })
}

/// Frames sent right after a client connects
pub fn initial_messages(
    client_uid: &str,
    pair: &LanguagePair,
    snapshot: &StateSnapshot,
) -> Vec<Value> {
    vec![
        json!({
            "type": "connection-established",
            "client_uid": client_uid,
        }),
        language_list_message(),
        language_pair_message(pair),
        state_message(snapshot),
    ]
}

fn send(sender: &WebSocketSend, message: Value) {
    // The socket closing first is not an error here
    let _ = sender.send(message.to_string());
}

pub async fn handle_message(
    state: &AppState,
    client_uid: &str,
    text: &str,
    sender: &WebSocketSend,
) -> anyhow::Result<()> {
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg.get("type").and_then(|v| v.as_str());

    match msg_type {
        Some("translate") => {
            handle_translate(state, client_uid, &msg, sender);
        }
        Some("cancel-translation") => {
            state.controller.cancel();
        }
        Some("swap-languages") => {
            handle_swap_languages(state, client_uid, &msg, sender);
        }
        Some("set-languages") => {
            handle_set_languages(state, client_uid, &msg, sender);
        }
        Some("fetch-languages") => {
            send(sender, language_list_message());
        }
        Some("fetch-state") => {
            send(sender, state_message(&state.controller.snapshot()));
        }
        Some("fetch-history") => {
            handle_history_list(state, sender).await;
        }
        Some("clear-history") => {
            state.history.clear().await?;
            handle_history_list(state, sender).await;
        }
        _ => {
            warn!("Unknown message type: {:?}", msg_type);
        }
    }

    Ok(())
}

fn handle_translate(state: &AppState, client_uid: &str, msg: &Value, sender: &WebSocketSend) {
    let text = msg.get("text").and_then(|v| v.as_str()).unwrap_or("");
    let source = msg.get("source_lang").and_then(|v| v.as_str());
    let target = msg.get("target_lang").and_then(|v| v.as_str());

    let current = state.client_languages(client_uid);
    let pair = match current.with_overrides(source, target) {
        Ok(pair) => pair,
        Err(e) => {
            send(sender, error_message(&e.to_string()));
            return;
        }
    };
    if pair != current {
        state.set_client_languages(client_uid, pair);
        send(sender, language_pair_message(&pair));
    }

    match state.controller.submit(text, pair.source, pair.target) {
        Some(generation) => debug!("Client {} submitted request {}", client_uid, generation),
        None => debug!("Client {} submitted empty text", client_uid),
    }
}

fn handle_swap_languages(state: &AppState, client_uid: &str, msg: &Value, sender: &WebSocketSend) {
    let pair = state.client_languages(client_uid).swapped();
    state.set_client_languages(client_uid, pair);
    info!(
        "Client {} swapped languages: {} -> {}",
        client_uid,
        pair.source.name(),
        pair.target.name()
    );
    send(sender, language_pair_message(&pair));

    // Swap-and-retranslate: the panel passes along the text now on the source side
    if let Some(text) = msg.get("text").and_then(|v| v.as_str()) {
        state.controller.submit(text, pair.source, pair.target);
    }
}

fn handle_set_languages(state: &AppState, client_uid: &str, msg: &Value, sender: &WebSocketSend) {
    let source = msg.get("source_lang").and_then(|v| v.as_str());
    let target = msg.get("target_lang").and_then(|v| v.as_str());

    match state.client_languages(client_uid).with_overrides(source, target) {
        Ok(pair) => {
            info!(
                "Client {} set languages: {} -> {}",
                client_uid,
                pair.source.name(),
                pair.target.name()
            );
            state.set_client_languages(client_uid, pair);
            send(sender, language_pair_message(&pair));
        }
        Err(e) => send(sender, error_message(&e.to_string())),
    }
}

async fn handle_history_list(state: &AppState, sender: &WebSocketSend) {
    send(
        sender,
        json!({
            "type": "history-list",
            "entries": state.history.entries().await,
        }),
    );
}
