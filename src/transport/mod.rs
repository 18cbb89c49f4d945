mod http_errors;

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::request::ChatRequest;

pub(crate) use http_errors::body_read_error;

pub struct HttpReply {
    pub status: u16,
    pub body: Box<dyn Read>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub trait Transport {
    fn send(&self, request: &ChatRequest) -> Result<HttpReply>;

    fn timeout_secs(&self) -> u64;
}

pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    // The timeout covers connecting, sending and reading the whole body.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| Error::Transport(format!("Failed to initialize HTTP client: {err}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ChatRequest) -> Result<HttpReply> {
        debug!(
            api_url = %request.url,
            model = %request.model,
            body_len = request.body.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&request.url)
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .map_err(|err| {
                warn!(
                    api_url = %request.url,
                    model = %request.model,
                    error = %err,
                    "chat request failed"
                );
                http_errors::request_error(err, &request.url, self.timeout_secs)
            })?;

        let status = response.status().as_u16();
        debug!(api_url = %request.url, status, "received response headers");
        Ok(HttpReply {
            status,
            body: Box::new(response),
        })
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}
