use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a failed translation, as published to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkError,
    EmptyResponse,
    DecodeError,
    TranslationUnavailable,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Translation service returned an empty response")]
    EmptyResponse,

    #[error("Could not decode translation response: {0}")]
    Decode(String),

    #[error("No translation available: {0}")]
    Unavailable(String),

    #[error("Translation request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Network(_) => ErrorKind::NetworkError,
            TranslateError::EmptyResponse => ErrorKind::EmptyResponse,
            TranslateError::Decode(_) => ErrorKind::DecodeError,
            TranslateError::Unavailable(_) => ErrorKind::TranslationUnavailable,
            TranslateError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the query text and any API key
        TranslateError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::Decode(err.to_string())
    }
}
