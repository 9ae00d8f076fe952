use serde_json::Value;

/// Message used when neither the server nor the transport says anything useful.
pub const FALLBACK_MESSAGE: &str = "Unknown error occurred";

/// Uniform failure shape for every request that leaves the client.
///
/// Transport failures (connect, timeout) carry no status. Server failures
/// carry the HTTP status and, when the body was JSON, the parsed body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<u16>, data: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status,
            data,
        }
    }

    /// Picks the message: server `message` field, then the transport
    /// message, then [`FALLBACK_MESSAGE`].
    pub fn normalize(status: Option<u16>, data: Option<Value>, transport_message: &str) -> Self {
        let server_message = data
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|msg| !msg.is_empty())
            .map(str::to_owned);

        let message = server_message
            .or_else(|| Some(transport_message.to_owned()).filter(|msg| !msg.is_empty()))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());

        Self::new(message, status, data)
    }

    /// 4xx responses are final, except 429. A 2xx whose body could not be
    /// read is final too, since the server already handled the request.
    /// Everything else may be retried.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            Some(429) => true,
            Some(status) => !(200..300).contains(&status) && !(400..500).contains(&status),
            None => true,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        ApiError::normalize(status, None, &err.to_string())
    }
}
