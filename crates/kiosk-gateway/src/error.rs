//! Gateway error types.

/// Errors that can occur when talking to the payment processor.
///
/// All transport failures are translated here at the boundary; no raw
/// `reqwest` error reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request did not complete within the configured timeout.
    #[error("payment processor request timed out")]
    Timeout,

    /// A network-level failure (connect, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The processor answered but rejected the request.
    #[error("processor rejected request: {category} - {message}")]
    ApiRejected {
        /// The processor's error category.
        category: String,
        /// The processor's error message.
        message: String,
    },

    /// The processor's response could not be parsed.
    #[error("invalid response from payment processor")]
    InvalidResponse,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse
        } else {
            Self::Network(err.to_string())
        }
    }
}
