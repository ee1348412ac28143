/// LLM Client — the single point of entry for all completion API calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Generation goes through the `CompletionBackend` trait, which `LlmClient`
/// implements for the real network path.
///
/// One request per `complete()` call. No retries here: the orchestrator
/// isolates failures per iteration.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod extractor;

/// Raw provider payload. Shape detection lives in `extractor`.
pub type RawResponse = Value;

/// The responses-style endpoint is fixed regardless of the configured base URL.
pub const RESPONSES_API_URL: &str = "https://api.openai.com/v1/responses";
/// Base URLs containing this marker are routed to the alternate provider model.
const OPENROUTER_MARKER: &str = "openrouter.ai";
pub const OPENROUTER_MODEL: &str = "openai/gpt-4o";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for AI service.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API error ({status}): {body}")]
    InvalidBody { status: u16, body: String },
}

/// Which request/response family the client speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiStyle {
    /// `POST {base}/chat/completions` with a `messages` array.
    #[default]
    ChatCompletions,
    /// `POST /v1/responses` with an `input` array of typed content parts.
    Responses,
}

#[derive(Debug, Error)]
#[error("unknown API style '{0}'")]
pub struct UnknownApiStyle(String);

impl FromStr for ApiStyle {
    type Err = UnknownApiStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" | "chat_completions" | "chat-completions" => Ok(ApiStyle::ChatCompletions),
            "responses" => Ok(ApiStyle::Responses),
            other => Err(UnknownApiStyle(other.to_string())),
        }
    }
}

/// Anything that can turn a prompt into a raw provider payload.
///
/// Carried in `AppState` as `Arc<dyn CompletionBackend>` so the generation
/// pipeline can run against a scripted backend in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<RawResponse, LlmError>;
}

/// Connection settings for `LlmClient`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub style: ApiStyle,
}

impl LlmSettings {
    /// Model actually sent on the wire. Alternate-provider base URLs get a fixed model id.
    pub fn effective_model(&self) -> &str {
        if self.base_url.contains(OPENROUTER_MARKER) {
            OPENROUTER_MODEL
        } else {
            &self.model
        }
    }

    pub fn endpoint(&self) -> String {
        match self.style {
            ApiStyle::ChatCompletions => {
                format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
            }
            ApiStyle::Responses => RESPONSES_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<ResponsesInput<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponsesInput<'a> {
    role: &'a str,
    content: Vec<InputText<'a>>,
}

#[derive(Debug, Serialize)]
struct InputText<'a> {
    #[serde(rename = "type")]
    part_type: &'a str,
    text: &'a str,
}

/// The single HTTP completion client. Cheap to clone; the underlying
/// `reqwest::Client` keeps a keep-alive pool shared by all clones.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .tcp_keepalive(POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

/// Serializes the request body for the configured style.
fn build_request_body(style: ApiStyle, model: &str, prompt: &str) -> Value {
    let body = match style {
        ApiStyle::ChatCompletions => serde_json::to_value(ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }),
        ApiStyle::Responses => serde_json::to_value(ResponsesRequest {
            model,
            input: vec![ResponsesInput {
                role: "user",
                content: vec![InputText {
                    part_type: "input_text",
                    text: prompt,
                }],
            }],
        }),
    };
    // Plain structs of &str never fail to serialize.
    body.unwrap_or(Value::Null)
}

/// Parses a response body. Objects and arrays are accepted regardless of status;
/// anything else is a transport failure carrying the status and raw body.
fn parse_body(status: u16, body: String) -> Result<RawResponse, LlmError> {
    match serde_json::from_str::<Value>(&body) {
        Ok(json @ (Value::Object(_) | Value::Array(_))) => Ok(json),
        _ => Err(LlmError::InvalidBody { status, body }),
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<RawResponse, LlmError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let model = self.settings.effective_model();
        let endpoint = self.settings.endpoint();
        let request_body = build_request_body(self.settings.style, model, prompt);

        debug!("Completion request: endpoint={endpoint}, model={model}");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.settings.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Completion API returned {}: {}", status, body);
        }

        parse_body(status.as_u16(), body)
    }
}
