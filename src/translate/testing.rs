//! Transports for exercising the controller without a network.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::error::TranslateError;
use super::interface::{TranslationRequest, TranslationTransport};

/// Answers every call with the same result
pub struct StaticTransport {
    result: Result<String, TranslateError>,
    calls: AtomicUsize,
}

impl StaticTransport {
    pub fn body(body: &str) -> Self {
        Self {
            result: Ok(body.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: TranslateError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationTransport for StaticTransport {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _request: &TranslationRequest) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// A call parked inside [`GatedTransport`], released by the test
pub struct PendingCall {
    pub request: TranslationRequest,
    reply: oneshot::Sender<Result<String, TranslateError>>,
}

impl PendingCall {
    /// Complete the call with a body. Returns false if the caller already gave up.
    pub fn respond(self, body: &str) -> bool {
        self.reply.send(Ok(body.to_string())).is_ok()
    }

    pub fn fail(self, err: TranslateError) -> bool {
        self.reply.send(Err(err)).is_ok()
    }
}

/// Every call blocks until the test answers it through the paired receiver
pub struct GatedTransport {
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl GatedTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { calls: tx }, rx)
    }
}

#[async_trait]
impl TranslationTransport for GatedTransport {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send(PendingCall {
                request: request.clone(),
                reply,
            })
            .map_err(|_| TranslateError::Network("gate closed".to_string()))?;
        answer
            .await
            .unwrap_or_else(|_| Err(TranslateError::Network("call dropped".to_string())))
    }
}

/// Response body in the service's shape
pub fn body_for(text: &str) -> String {
    serde_json::json!({ "responseData": { "translatedText": text } }).to_string()
}
