use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;
use crate::translate::languages::supported_languages;

#[derive(Debug, Deserialize)]
pub struct TranslatePayload {
    pub text: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/client-ws", get(crate::websocket::websocket_handler))

        // Health check
        .route("/api/health", get(health_check))

        // REST API routes
        .route("/api/languages", get(get_languages))
        .route("/api/state", get(get_state))
        .route("/api/translate", post(submit_translation))
        .route("/api/cancel", post(cancel_translation))
        .route("/api/history", get(get_history).delete(clear_history))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "conf_version": state.config.system_config.conf_version,
        "provider": state.controller.transport_name(),
        "translation_status": state.controller.state().status(),
    }))
}

async fn get_languages() -> Json<Value> {
    Json(json!(supported_languages()))
}

async fn get_state(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.controller.snapshot()))
}

async fn submit_translation(
    State(state): State<AppState>,
    Json(payload): Json<TranslatePayload>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let pair = state
        .default_pair
        .with_overrides(payload.source_lang.as_deref(), payload.target_lang.as_deref())
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": e.to_string()})),
            )
        })?;

    match state.controller.submit(&payload.text, pair.source, pair.target) {
        Some(generation) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "accepted": true,
                "generation": generation,
                "snapshot": state.controller.snapshot(),
            })),
        )),
        None => Ok((
            StatusCode::OK,
            Json(json!({
                "accepted": false,
                "snapshot": state.controller.snapshot(),
            })),
        )),
    }
}

async fn cancel_translation(State(state): State<AppState>) -> Json<Value> {
    let cancelled = state.controller.cancel();
    Json(json!({
        "cancelled": cancelled,
        "snapshot": state.controller.snapshot(),
    }))
}

async fn get_history(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.history.entries().await))
}

async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.history.clear().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
    })?;
    Ok(Json(json!({"status": "success"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_manager::Config;
    use crate::translate::interface::TranslationTransport;
    use crate::translate::testing::{body_for, GatedTransport, StaticTransport};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(transport: Arc<dyn TranslationTransport>) -> (Router, AppState) {
        let state = AppState::with_transport(Config::default(), transport).unwrap();
        let router = Router::new().merge(create_routes()).with_state(state.clone());
        (router, state)
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lists_languages_and_health() {
        let (router, _) = app(Arc::new(StaticTransport::body(&body_for("x"))));

        let (status, languages) = call(&router, Method::GET, "/api/languages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(languages
            .as_array()
            .unwrap()
            .iter()
            .any(|l| l["code"] == "zh-CN" && l["name"] == "Chinese (Simplified)"));

        let (_, health) = call(&router, Method::GET, "/api/health", None).await;
        assert_eq!(health["provider"], "static");
        assert_eq!(health["translation_status"], "idle");
    }

    #[tokio::test]
    async fn translate_is_accepted_and_goes_in_flight() {
        let (transport, mut calls) = GatedTransport::new();
        let (router, _) = app(Arc::new(transport));

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/translate",
            Some(json!({"text": "Hello", "target_lang": "pt"})),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["snapshot"]["state"]["status"], "in_flight");
        assert_eq!(body["snapshot"]["state"]["request"]["target_language"], "pt");

        let pending = calls.recv().await.unwrap();
        pending.respond(&body_for("Olá"));
    }

    #[tokio::test]
    async fn empty_text_is_not_accepted() {
        let (router, state) = app(Arc::new(StaticTransport::body(&body_for("x"))));

        let (status, body) =
            call(&router, Method::POST, "/api/translate", Some(json!({"text": ""}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], false);
        assert_eq!(body["snapshot"]["generation"], 0);
        assert_eq!(state.controller.snapshot().generation, 0);
    }

    #[tokio::test]
    async fn unsupported_language_is_bad_request() {
        let (router, _) = app(Arc::new(StaticTransport::body(&body_for("x"))));

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/translate",
            Some(json!({"text": "Hello", "source_lang": "zz"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("zz"));
    }

    #[tokio::test]
    async fn cancel_reports_what_happened() {
        let (transport, mut calls) = GatedTransport::new();
        let (router, _) = app(Arc::new(transport));

        let (_, body) = call(&router, Method::POST, "/api/cancel", None).await;
        assert_eq!(body["cancelled"], false);

        call(&router, Method::POST, "/api/translate", Some(json!({"text": "Hello"}))).await;
        let _pending = calls.recv().await.unwrap();

        let (_, body) = call(&router, Method::POST, "/api/cancel", None).await;
        assert_eq!(body["cancelled"], true);
        assert_eq!(body["snapshot"]["state"]["status"], "idle");

        let (_, snapshot) = call(&router, Method::GET, "/api/state", None).await;
        assert_eq!(snapshot["state"]["status"], "idle");
        assert_eq!(snapshot["generation"], 1);
    }

    #[tokio::test]
    async fn history_can_be_cleared() {
        let (router, state) = app(Arc::new(StaticTransport::body(&body_for("x"))));

        let (_, history) = call(&router, Method::GET, "/api/history", None).await;
        assert!(history.as_array().unwrap().is_empty());

        let (status, body) = call(&router, Method::DELETE, "/api/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert!(state.history.entries().await.is_empty());
    }
}
