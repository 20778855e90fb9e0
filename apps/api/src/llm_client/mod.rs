//! LLM Client: the single point of entry for all OpenRouter chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
//! All model interactions MUST go through this module.
//!
//! Calls are one-shot: no retries, no backoff, no caching.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod fenced;
pub mod prompts;

/// Timeout for structured text calls.
const JSON_CALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for vision calls.
const VISION_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENROUTER_API_KEY is not set. Configure it as an environment variable or in the secrets file.")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OpenRouter error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to parse JSON from model response: {raw}")]
    MalformedResponse { raw: String },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Value,
}

/// The single model client shared by every handler.
/// Holds an optional credential; calls fail with `MissingCredential` when it is absent.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingCredential)
    }

    /// Sends a system instruction plus a JSON payload and returns the decoded JSON object.
    ///
    /// The endpoint is asked for `json_object` output. Content that arrives as a
    /// string is parsed; anything that is not a JSON object is `MalformedResponse`.
    pub async fn call_json(
        &self,
        system: &str,
        payload: &Value,
        model: &str,
        temperature: Option<f32>,
    ) -> Result<Value, LlmError> {
        let api_key = self.api_key()?;
        let user_content = format!("{}{}", prompts::JSON_PAYLOAD_PREAMBLE, payload);

        let request_body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(&user_content),
                },
            ],
            temperature,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let content = self
            .send(api_key, &request_body, JSON_CALL_TIMEOUT)
            .await?;

        match content {
            Value::Object(map) => Ok(Value::Object(map)),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(LlmError::MalformedResponse { raw: text }),
            },
            other => Err(LlmError::MalformedResponse {
                raw: other.to_string(),
            }),
        }
    }

    /// Sends a prompt with one image (a `data:` URI) and returns the raw reply text.
    /// Callers run the reply through [`fenced::parse_fenced_json`].
    pub async fn call_vision(
        &self,
        prompt: &str,
        image_data_uri: &str,
        model: &str,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key()?;

        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_uri,
                        },
                    },
                ]),
            }],
            temperature: None,
            response_format: None,
        };

        match self
            .send(api_key, &request_body, VISION_CALL_TIMEOUT)
            .await?
        {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }

    /// Posts one request and returns `choices[0].message.content`.
    async fn send(
        &self,
        api_key: &str,
        request_body: &ChatRequest<'_>,
        timeout: Duration,
    ) -> Result<Value, LlmError> {
        debug!(
            "POST {} model={} messages={}",
            self.endpoint(),
            request_body.model,
            request_body.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .timeout(timeout)
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("OpenRouter returned {}: {}", status, body);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|_| LlmError::MalformedResponse { raw: body.clone() })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_null())
            .ok_or(LlmError::MalformedResponse { raw: body })
    }
}
