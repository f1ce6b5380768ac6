/// Failures talking to the marketplace REST backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with status {status}.")]
    Status {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    #[error("Could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The message the backend put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Transport failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Decode { .. } => false,
        }
    }

    /// Pulls a human readable message out of a JSON error body.
    pub(crate) fn message_from_body(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|field| value.get(field).and_then(|m| m.as_str()))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToOwned::to_owned)
    }
}
