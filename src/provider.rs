use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Streaming,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    ChatGpt,
    Grok,
}

impl Provider {
    pub const SUPPORTED: &'static str = "deepseek, chatgpt, grok";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::ChatGpt => "chatgpt",
            Self::Grok => "grok",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com/chat/completions",
            Self::ChatGpt => "https://api.openai.com/v1/chat/completions",
            Self::Grok => "https://api.x.ai/v1/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::ChatGpt => "gpt-4o-mini",
            Self::Grok => "grok-2-latest",
        }
    }

    pub fn response_mode(&self) -> ResponseMode {
        match self {
            Self::DeepSeek | Self::ChatGpt => ResponseMode::Streaming,
            Self::Grok => ResponseMode::Single,
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        match self {
            Self::DeepSeek => GenerationParams {
                temperature: 1.0,
                top_p: Some(1.0),
                frequency_penalty: Some(0.0),
                presence_penalty: Some(0.0),
                max_tokens: Some(8192),
            },
            Self::ChatGpt => GenerationParams {
                temperature: 1.0,
                top_p: Some(1.0),
                frequency_penalty: Some(0.0),
                presence_penalty: Some(0.0),
                max_tokens: Some(4096),
            },
            Self::Grok => GenerationParams {
                temperature: 0.0,
                top_p: None,
                frequency_penalty: None,
                presence_penalty: None,
                max_tokens: None,
            },
        }
    }

    // Only DeepSeek gets explicit "disabled" tool and logprob fields.
    pub fn sends_disabled_tool_fields(&self) -> bool {
        matches!(self, Self::DeepSeek)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "chatgpt" | "openai" => Ok(Self::ChatGpt),
            "grok" | "xai" => Ok(Self::Grok),
            other => Err(Error::user_input(format!(
                "Unsupported provider '{}'. Supported providers: {}. \
                 Set a valid provider in the configuration file or pass --provider.",
                other,
                Self::SUPPORTED
            ))),
        }
    }
}
