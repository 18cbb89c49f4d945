#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

/// Request captured by [`MockServer`].
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// One-shot HTTP server: answers the first request with a canned response
/// and hands the request back through `finish`.
pub struct MockServer {
    pub url: String,
    handle: thread::JoinHandle<CapturedRequest>,
}

impl MockServer {
    pub fn start(status_line: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n{body}"
        );

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept should succeed");
            let mut reader = BufReader::new(stream.try_clone().expect("clone should succeed"));
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("head should be readable");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().expect("length should parse");
                }
                head.push_str(&line);
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).expect("body should be readable");

            let mut stream = stream;
            stream
                .write_all(response.as_bytes())
                .expect("response should be written");
            CapturedRequest {
                head,
                body: String::from_utf8(body).expect("body should be utf-8"),
            }
        });

        Self {
            url: format!("http://{addr}/chat/completions"),
            handle,
        }
    }

    pub fn finish(self) -> CapturedRequest {
        self.handle.join().expect("server thread should join")
    }
}

pub fn write_config(dir: &Path, provider: &str, system_prompt: &str) -> PathBuf {
    let path = dir.join("config.json");
    let config = json!({
        "provider": provider,
        "model": "",
        "apiKey": "sk-integration",
        "systemPrompt": system_prompt,
    });
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&config).expect("config should encode"),
    )
    .expect("config should be written");
    path
}

/// Base command with a clean environment for the binary under test.
pub fn agent_command(config_path: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chat-agent"));
    cmd.env("CHAT_AGENT_CONFIG", config_path)
        .env_remove("CHAT_AGENT_ENDPOINT")
        .env_remove("CHAT_AGENT_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_FILE_PATH");
    cmd
}

pub fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn chat-agent binary");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should be writable");
    child
        .wait_with_output()
        .expect("failed to wait for chat-agent binary")
}
