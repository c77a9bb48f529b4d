use serde::Deserialize;
use serde_json::Value;

use super::error::TranslateError;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "responseData")]
    response_data: ResponseData,
    #[serde(rename = "responseDetails", default)]
    response_details: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

/// Interpret a translation service response body.
///
/// Expected shape: `{ "responseData": { "translatedText": string | null } }`.
pub fn decode_translation(body: &str) -> Result<String, TranslateError> {
    if body.trim().is_empty() {
        return Err(TranslateError::EmptyResponse);
    }

    let parsed: ApiResponse = serde_json::from_str(body)?;
    match parsed.response_data.translated_text {
        Some(text) => Ok(text),
        None => {
            let details = parsed
                .response_details
                .as_ref()
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("service returned no translated text");
            Err(TranslateError::Unavailable(details.to_string()))
        }
    }
}
