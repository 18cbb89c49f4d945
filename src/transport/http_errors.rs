use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::Error;

fn error_chain_matches(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    message_fragment: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains(message_fragment)
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::TimedOut, "timed out")
}

pub(crate) fn request_error(err: reqwest::Error, api_url: &str, timeout_secs: u64) -> Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return Error::Transport(format!(
            "Request timed out after {timeout_secs}s while calling '{api_url}'. \
             Increase CHAT_AGENT_TIMEOUT_SECS or try again later."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return Error::Transport(format!(
                "Connection refused by chat API at '{api_url}'. \
                 Check CHAT_AGENT_ENDPOINT and that the service is reachable."
            ));
        }

        return Error::Transport(format!(
            "Failed to connect to chat API at '{api_url}'. \
             Check your network connection and CHAT_AGENT_ENDPOINT."
        ));
    }

    Error::Transport(format!("Failed to call chat API at '{api_url}': {err}"))
}

pub(crate) fn body_read_error(err: &std::io::Error, timeout_secs: u64) -> Error {
    if error_chain_has_timeout(err) {
        return Error::Transport(format!(
            "Response did not finish within {timeout_secs}s. \
             Increase CHAT_AGENT_TIMEOUT_SECS for long answers."
        ));
    }

    Error::Transport(format!("Failed to read response body: {err}"))
}
