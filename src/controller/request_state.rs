use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::translate::error::{ErrorKind, TranslateError};
use crate::translate::interface::TranslationRequest;

/// Lifecycle of the current translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestState {
    Idle,
    InFlight { request: TranslationRequest },
    Succeeded { translated_text: String },
    Failed { kind: ErrorKind, message: String },
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::InFlight { .. } => "in_flight",
            RequestState::Succeeded { .. } => "succeeded",
            RequestState::Failed { .. } => "failed",
        }
    }

    /// Terminal state for a finished request
    pub fn from_outcome(outcome: Result<String, TranslateError>) -> Self {
        match outcome {
            Ok(translated_text) => RequestState::Succeeded { translated_text },
            Err(err) => RequestState::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// What the presentation layer reads and is pushed on every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Id of the most recently submitted request; 0 before the first submit
    pub generation: u64,
    pub state: RequestState,
    pub updated_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn initial() -> Self {
        Self {
            generation: 0,
            state: RequestState::Idle,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let failed = RequestState::from_outcome(Err(TranslateError::EmptyResponse));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["kind"], "empty_response");
        assert_eq!(value["message"], "Translation service returned an empty response");

        let request = TranslationRequest::new(
            "Hello",
            "en".parse().unwrap(),
            "es".parse().unwrap(),
        )
        .unwrap();
        let value = serde_json::to_value(RequestState::InFlight { request }).unwrap();
        assert_eq!(value["status"], "in_flight");
        assert_eq!(value["request"]["source_text"], "Hello");
        assert_eq!(value["request"]["target_language"], "es");
    }

    #[test]
    fn success_outcome_carries_text() {
        let state = RequestState::from_outcome(Ok("Hola".to_string()));
        assert_eq!(state.status(), "succeeded");
        assert_eq!(
            state,
            RequestState::Succeeded {
                translated_text: "Hola".to_string()
            }
        );
        assert!(!state.is_in_flight());
    }
}
