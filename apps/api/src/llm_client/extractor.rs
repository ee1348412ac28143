//! Locates the generated text inside a raw provider payload.
//!
//! Shapes are tried in a fixed order and the first match wins:
//! error object → chat completion → responses → unrecognized.
//! Extraction is total: every payload maps to some text.

use serde_json::Value;

use crate::llm_client::RawResponse;

pub const FALLBACK_DESCRIPTION: &str = "Spacious property with modern amenities.";
const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// The recognized payload shapes, borrowed from the raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape<'a> {
    /// `{"error": {...}}`, a provider-level failure reported in-band.
    ApiError { message: &'a str },
    /// `{"choices": [{"message": {"content": "..."}}]}`
    ChatCompletion { content: &'a str },
    /// `{"output": [{"content": [{"text": "..."}]}]}`
    Responses { text: &'a str },
    Unrecognized,
}

type Detector = for<'a> fn(&'a Value) -> Option<ResponseShape<'a>>;

/// Ordered detection predicates. The error check must stay first.
const DETECTORS: &[Detector] = &[detect_api_error, detect_chat_completion, detect_responses];

fn detect_api_error(payload: &Value) -> Option<ResponseShape<'_>> {
    let error = payload.get("error")?;
    if !(error.is_object() || error.is_array()) {
        return None;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_API_ERROR);
    Some(ResponseShape::ApiError { message })
}

fn detect_chat_completion(payload: &Value) -> Option<ResponseShape<'_>> {
    payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|content| ResponseShape::ChatCompletion { content })
}

fn detect_responses(payload: &Value) -> Option<ResponseShape<'_>> {
    payload
        .get("output")?
        .get(0)?
        .get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|text| ResponseShape::Responses { text })
}

/// Classifies a payload into exactly one shape.
pub fn detect_shape(payload: &RawResponse) -> ResponseShape<'_> {
    DETECTORS
        .iter()
        .find_map(|detect| detect(payload))
        .unwrap_or(ResponseShape::Unrecognized)
}

/// Returns the generated text, or a fallback sentence when the payload carries
/// an error or no known shape.
pub fn extract_description(payload: &RawResponse) -> String {
    match detect_shape(payload) {
        ResponseShape::ApiError { message } => format!("{FALLBACK_DESCRIPTION} {message}"),
        ResponseShape::ChatCompletion { content } => content.to_string(),
        ResponseShape::Responses { text } => text.to_string(),
        ResponseShape::Unrecognized => FALLBACK_DESCRIPTION.to_string(),
    }
}
