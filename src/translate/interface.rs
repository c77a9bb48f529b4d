use async_trait::async_trait;
use serde::Serialize;

use super::error::TranslateError;
use super::languages::{LanguageCode, LanguagePair};

/// A single translation query. Only constructible from non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRequest {
    pub source_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
}

impl TranslationRequest {
    pub fn new(text: &str, source: LanguageCode, target: LanguageCode) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(Self {
            source_text: text.to_string(),
            source_language: source,
            target_language: target,
        })
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language, self.target_language)
    }
}

/// Transport to a remote translation service
#[async_trait]
pub trait TranslationTransport: Send + Sync {
    /// Provider name, for logs and the health endpoint
    fn name(&self) -> &str;

    /// Issue the query and return the raw response body.
    ///
    /// Only transport-level failures are reported here; interpreting the body
    /// is left to the caller.
    async fn fetch(&self, request: &TranslationRequest) -> Result<String, TranslateError>;
}
