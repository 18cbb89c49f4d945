use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::stream::Answer;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    total_tokens: Option<u64>,
}

pub fn decode_completion(body: &[u8]) -> Result<Answer> {
    let parsed: CompletionResponse = serde_json::from_slice(body).map_err(Error::Decode)?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    let total_tokens = parsed.usage.and_then(|usage| usage.total_tokens);
    debug!(
        content_len = content.len(),
        total_tokens = ?total_tokens,
        "decoded chat completion"
    );

    Ok(Answer {
        content,
        total_tokens,
        skipped_fragments: 0,
    })
}
