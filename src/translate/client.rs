use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use super::error::TranslateError;
use super::interface::{TranslationRequest, TranslationTransport};

/// Client for a MyMemory-compatible `GET /get?q=..&langpair=src|tgt` endpoint
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
    contact_email: Option<String>,
    api_key: Option<String>,
}

impl MyMemoryClient {
    pub fn new(
        endpoint: String,
        timeout: Option<Duration>,
        contact_email: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, TranslateError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            timeout,
            contact_email,
            api_key,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/get", self.endpoint.trim_end_matches('/'))
    }

    fn query_params(&self, request: &TranslationRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.source_text.clone()),
            ("langpair", request.language_pair().as_query()),
        ];
        if let Some(email) = &self.contact_email {
            params.push(("de", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }

    fn map_send_error(&self, err: reqwest::Error) -> TranslateError {
        match self.timeout {
            Some(limit) if err.is_timeout() => TranslateError::Timeout(limit),
            _ => TranslateError::from(err),
        }
    }
}

#[async_trait]
impl TranslationTransport for MyMemoryClient {
    fn name(&self) -> &str {
        "mymemory"
    }

    async fn fetch(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        debug!(
            "Requesting translation: langpair={}, chars={}",
            request.language_pair().as_query(),
            request.source_text.chars().count()
        );

        let response = self
            .client
            .get(self.query_url())
            .header(ACCEPT, "application/json")
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Network(format!(
                "translation service returned HTTP {}",
                status
            )));
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }
}
