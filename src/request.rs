use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::error::{Error, Result};
use crate::provider::{Provider, ResponseMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct DisabledToolFields {
    response_format: ResponseFormat,
    stop: Option<Vec<String>>,
    tools: Option<Vec<serde_json::Value>>,
    tool_choice: &'static str,
    logprobs: bool,
    top_logprobs: Option<u8>,
}

impl DisabledToolFields {
    fn new() -> Self {
        Self {
            response_format: ResponseFormat { kind: "text" },
            stop: None,
            tools: None,
            tool_choice: "none",
            logprobs: false,
            top_logprobs: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatPayload {
    model: String,
    messages: [Message; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
    #[serde(flatten)]
    tool_fields: Option<DisabledToolFields>,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub model: String,
}

/// Empty `model` and `system_prompt` fall back to the provider default and
/// [`DEFAULT_SYSTEM_PROMPT`].
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub provider: Provider,
    pub endpoint: &'a str,
    pub query: &'a str,
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub api_key: &'a str,
}

pub fn build(parts: RequestParts<'_>) -> Result<ChatRequest> {
    let provider = parts.provider;
    let model = effective(parts.model, provider.default_model());
    let system_prompt = effective(parts.system_prompt, DEFAULT_SYSTEM_PROMPT);
    let streaming = provider.response_mode() == ResponseMode::Streaming;
    let params = provider.generation_params();

    let payload = ChatPayload {
        model: model.to_string(),
        messages: [Message::system(system_prompt), Message::user(parts.query)],
        temperature: params.temperature,
        top_p: params.top_p,
        frequency_penalty: params.frequency_penalty,
        presence_penalty: params.presence_penalty,
        max_tokens: params.max_tokens,
        stream: streaming,
        stream_options: streaming.then_some(StreamOptions {
            include_usage: true,
        }),
        tool_fields: provider
            .sends_disabled_tool_fields()
            .then(DisabledToolFields::new),
    };
    let body = serde_json::to_vec(&payload).map_err(Error::Encoding)?;

    Ok(ChatRequest {
        url: parts.endpoint.to_string(),
        headers: build_headers(parts.api_key)?,
        body,
        model: payload.model,
    })
}

fn effective<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

fn build_headers(api_key: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
        Error::user_input("API key contains characters that are not allowed in an HTTP header")
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}
