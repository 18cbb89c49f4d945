use std::io::{BufRead, Write};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::transport::body_read_error;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Content(String),
    Usage(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub content: String,
    /// Last reported total, never a sum.
    pub total_tokens: Option<u64>,
    pub skipped_fragments: usize,
}

pub struct EventStream<R> {
    reader: R,
    timeout_secs: u64,
    line: Vec<u8>,
    pending: Option<StreamEvent>,
    finished: bool,
    skipped: usize,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R, timeout_secs: u64) -> Self {
        Self {
            reader,
            timeout_secs,
            line: Vec::new(),
            pending: None,
            finished: false,
            skipped: 0,
        }
    }

    pub fn skipped_fragments(&self) -> usize {
        self.skipped
    }

    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(None);
        }
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
        }
        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }
        Ok(Some(String::from_utf8_lossy(&self.line).into_owned()))
    }

    fn decode_fragment(&mut self, data: &str) -> Option<StreamEvent> {
        let fragment: Map<String, Value> = match serde_json::from_str(data) {
            Ok(fragment) => fragment,
            Err(err) => {
                self.skipped += 1;
                warn!(fragment = %data, error = %err, "skipping malformed stream fragment");
                return None;
            }
        };

        let usage = total_tokens(&fragment).map(StreamEvent::Usage);
        let content = delta_content(&fragment).map(|text| StreamEvent::Content(text.to_string()));
        match (usage, content) {
            (Some(usage), content) => {
                self.pending = content;
                Some(usage)
            }
            (None, content) => content,
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(Ok(event));
        }

        while !self.finished {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("response stream closed without done marker");
                    self.finished = true;
                    break;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(body_read_error(&err, self.timeout_secs)));
                }
            };

            let Some(data) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            if data == DONE_MARKER {
                self.finished = true;
                break;
            }
            if let Some(event) = self.decode_fragment(data) {
                return Some(Ok(event));
            }
        }

        None
    }
}

fn total_tokens(fragment: &Map<String, Value>) -> Option<u64> {
    let tokens = fragment.get("usage")?.get("total_tokens")?;
    tokens
        .as_u64()
        .or_else(|| tokens.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
}

fn delta_content(fragment: &Map<String, Value>) -> Option<&str> {
    fragment
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}

/// Writes every content fragment to `sink` as it arrives. `timeout_secs` is
/// only used to word a read timeout.
pub fn decode_stream<R: BufRead, W: Write>(
    reader: R,
    timeout_secs: u64,
    sink: &mut W,
) -> Result<Answer> {
    let mut events = EventStream::new(reader, timeout_secs);
    let mut answer = Answer::default();

    for event in events.by_ref() {
        match event? {
            StreamEvent::Content(text) => {
                sink.write_all(text.as_bytes()).map_err(Error::Output)?;
                sink.flush().map_err(Error::Output)?;
                answer.content.push_str(&text);
            }
            StreamEvent::Usage(total) => answer.total_tokens = Some(total),
        }
    }

    answer.skipped_fragments = events.skipped_fragments();
    debug!(
        content_len = answer.content.len(),
        total_tokens = ?answer.total_tokens,
        skipped_fragments = answer.skipped_fragments,
        "finished decoding response stream"
    );
    Ok(answer)
}
