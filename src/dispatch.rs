use std::io::{BufReader, Read, Write};

use tracing::{debug, warn};

use crate::completion::decode_completion;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::provider::{Provider, ResponseMode};
use crate::request::{self, ChatRequest, RequestParts};
use crate::stream::{self, Answer};
use crate::transport::{HttpReply, Transport, body_read_error};

pub struct Dispatcher<T> {
    provider: Provider,
    endpoint: String,
    config: Config,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(config: Config, endpoint_override: Option<String>, transport: T) -> Result<Self> {
        let provider: Provider = config.provider.parse().inspect_err(|_| {
            warn!(provider = %config.provider, "unsupported provider configured");
        })?;
        let endpoint = endpoint_override.unwrap_or_else(|| provider.endpoint().to_string());

        Ok(Self {
            provider,
            endpoint,
            config,
            transport,
        })
    }

    pub fn build_request(&self, query: &str) -> Result<ChatRequest> {
        request::build(RequestParts {
            provider: self.provider,
            endpoint: &self.endpoint,
            query,
            model: &self.config.model,
            system_prompt: &self.config.system_prompt,
            api_key: &self.config.api_key,
        })
    }

    pub fn ask<W: Write>(&self, query: &str, sink: &mut W) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(Error::user_input("Query cannot be empty"));
        }

        let request = self.build_request(query)?;
        debug!(
            provider = %self.provider,
            model = %request.model,
            query_len = query.len(),
            "dispatching chat request"
        );

        let reply = self.transport.send(&request)?;
        if !reply.is_success() {
            return Err(self.rejected(reply));
        }

        match self.provider.response_mode() {
            ResponseMode::Streaming => stream::decode_stream(
                BufReader::new(reply.body),
                self.transport.timeout_secs(),
                sink,
            ),
            ResponseMode::Single => {
                let body = self.read_body(reply.body)?;
                let answer = decode_completion(&body)?;
                sink.write_all(answer.content.as_bytes())
                    .and_then(|()| sink.flush())
                    .map_err(Error::Output)?;
                Ok(answer)
            }
        }
    }

    fn read_body(&self, mut body: Box<dyn Read>) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf)
            .map_err(|err| body_read_error(&err, self.transport.timeout_secs()))?;
        Ok(buf)
    }

    fn rejected(&self, reply: HttpReply) -> Error {
        let status = reply.status;
        let body = match self.read_body(reply.body) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };
        warn!(
            provider = %self.provider,
            status,
            response_body_len = body.len(),
            "chat API returned non-success status"
        );
        Error::Api { status, body }
    }
}
