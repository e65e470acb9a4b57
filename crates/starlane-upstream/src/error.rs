use thiserror::Error;

/// Errors returned while talking to an upstream data source.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single attempt did not finish inside its time budget.
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The JSON body carried an explicit error marker.
    #[error("upstream API error from {url}: {message}")]
    ApiError { url: String, message: String },

    #[error("empty payload from {url}")]
    EmptyPayload { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid upstream URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Every attempt in the budget failed; `last_error` is the final cause.
    #[error("gave up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl UpstreamError {
    /// Description of the underlying cause, unwrapping [`UpstreamError::Exhausted`].
    #[must_use]
    pub fn cause_description(&self) -> String {
        match self {
            UpstreamError::Exhausted { last_error, .. } => last_error.clone(),
            other => other.to_string(),
        }
    }
}
