use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    /// Caller-supplied input failed shape constraints (empty prompt, bad file)
    #[error("Validation error: {0}")]
    Validation(String),
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    /// Response parsing errors (missing fields, invalid format)
    #[error("Failed to parse response: {0}")]
    ResponseFormat(String),
    /// API-specific errors not covered by a more specific variant
    #[error("API error: {0}")]
    ApiError(String),
    /// Authentication-specific errors
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// The provider rejected the request because of rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    /// Stream-related errors
    #[error("Stream error: {0}")]
    StreamError(String),
    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IOError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LLMError {
    /// Maps a non-2xx provider status and its body onto the matching variant.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = format!("status {status}: {body}");
        match status.as_u16() {
            401 | 403 => Self::Authentication(detail),
            404 => Self::NotFound(detail),
            429 => Self::RateLimited(detail),
            500..=599 => Self::ServerError(detail),
            _ => Self::ApiError(detail),
        }
    }

    /// Whether the failure came from the transport or the provider rather
    /// than from local input or configuration.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::ApiError(_)
                | Self::Authentication(_)
                | Self::RateLimited(_)
                | Self::NotFound(_)
                | Self::ServerError(_)
                | Self::StreamError(_)
        )
    }
}

impl From<std::io::Error> for LLMError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(err.to_string())
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        // If the error has a status code, map it to a more specific error
        if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => Self::Authentication(format!("Authentication failed: {err}")),
                404 => Self::NotFound(format!("Resource not found: {err}")),
                429 => Self::RateLimited(err.to_string()),
                500..=599 => Self::ServerError(err.to_string()),
                _ => Self::Network(err),
            }
        } else {
            Self::Network(err)
        }
    }
}

impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat(err.to_string())
    }
}
