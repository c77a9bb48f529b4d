use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use lingua_panel_backend::config_manager::Config;
use lingua_panel_backend::routes;
use lingua_panel_backend::state::AppState;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stand-in for the translation service: uppercases `q`, has nothing for Japanese
async fn fake_service() -> String {
    let router = Router::new().route(
        "/get",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let q = params.get("q").cloned().unwrap_or_default();
            let pair = params.get("langpair").cloned().unwrap_or_default();
            if pair.ends_with("|ja") {
                return json!({
                    "responseData": { "translatedText": null },
                    "responseDetails": "NO QUERY SPECIFIED",
                })
                .to_string();
            }
            let translated = format!("{} [{}]", q.to_uppercase(), pair);
            json!({ "responseData": { "translatedText": translated } }).to_string()
        }),
    );
    serve(router).await
}

async fn start_app() -> (String, reqwest::Client) {
    let mut config = Config::default();
    config.translation_config.endpoint = fake_service().await;
    config.translation_config.timeout_secs = 5;

    let state = AppState::new(config).unwrap();
    let app = Router::new().merge(routes::create_routes()).with_state(state);
    (serve(app).await, reqwest::Client::new())
}

async fn wait_until_settled(client: &reqwest::Client, base: &str) -> Value {
    for _ in 0..200 {
        let snapshot: Value = client
            .get(format!("{}/api/state", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if snapshot["state"]["status"] != "in_flight" {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("translation never settled");
}

#[tokio::test]
async fn translation_round_trip_through_http() {
    let (base, client) = start_app().await;

    let response = client
        .post(format!("{}/api/translate", base))
        .json(&json!({ "text": "good night", "source_lang": "en", "target_lang": "fr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let snapshot = wait_until_settled(&client, &base).await;
    assert_eq!(snapshot["state"]["status"], "succeeded");
    assert_eq!(snapshot["state"]["translated_text"], "GOOD NIGHT [en|fr]");

    // The recorder runs off the event stream, so give it a moment
    let mut history = Value::Null;
    for _ in 0..100 {
        history = client
            .get(format!("{}/api/history", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if !history.as_array().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(history[0]["source_text"], "good night");
}

#[tokio::test]
async fn service_without_translation_reports_unavailable() {
    let (base, client) = start_app().await;

    client
        .post(format!("{}/api/translate", base))
        .json(&json!({ "text": "hello", "target_lang": "ja" }))
        .send()
        .await
        .unwrap();

    let snapshot = wait_until_settled(&client, &base).await;
    assert_eq!(snapshot["state"]["status"], "failed");
    assert_eq!(snapshot["state"]["kind"], "translation_unavailable");
    assert!(snapshot["state"]["message"]
        .as_str()
        .unwrap()
        .contains("NO QUERY SPECIFIED"));
}
