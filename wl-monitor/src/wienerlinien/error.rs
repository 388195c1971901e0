//! Client error types.

/// Errors from the Wiener Linien HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Every attempt timed out and no cached snapshot exists.
    #[error("request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("json parse error: {message}")]
    Json { message: String },
}

impl ApiError {
    /// Timeouts are the only retryable failure; everything else degrades
    /// straight to the cached snapshot.
    pub fn is_timeout(&self) -> bool {
        match self {
            ApiError::Timeout { .. } => true,
            ApiError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}
