// Centralized error handling using thiserror
//
// Two layers:
// - NetworkError: the fixed taxonomy every remote call maps its failures to
// - ImageFeedError: crate-level error wrapping NetworkError plus local
//   failures (configuration, token storage, IO)

use thiserror::Error;

/// Message carried by `NetworkError::UrlRequestError` when a request is
/// cancelled before it completes (superseded, reset, or logout).
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Failure of a single HTTP round trip
///
/// Every remote operation resolves to exactly one of these on failure.
/// The duplicate-guard rejection also uses `InvalidRequest`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Response arrived with a status outside 200..=299
    #[error("HTTP status code {0}")]
    HttpStatusCode(u16),

    /// Transport-level failure (connection refused, timeout, cancellation)
    #[error("URL request error: {0}")]
    UrlRequestError(String),

    /// Neither a response nor an error came back from the transport
    #[error("URL session error: no response and no error")]
    UrlSessionError,

    /// Request could not be built locally, or repeats an unresolved request
    #[error("Invalid request")]
    InvalidRequest,

    /// Body did not match the expected shape
    #[error("Decoding error: {0}")]
    DecodingError(#[from] serde_json::Error),

    /// Response metadata was malformed or missing
    #[error("Invalid response")]
    InvalidResponse,
}

impl NetworkError {
    /// Error delivered to callers whose request was cancelled
    pub fn cancelled() -> Self {
        NetworkError::UrlRequestError(CANCELLED_MESSAGE.to_string())
    }

    /// True when this error represents a cancelled request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NetworkError::UrlRequestError(msg) if msg == CANCELLED_MESSAGE)
    }
}

/// Main error type for the imagefeed crate
#[derive(Debug, Error)]
pub enum ImageFeedError {
    /// Remote call failed
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Configuration loading or validation error
    ///
    /// Missing environment variables or values that fail validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Token persistence error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A service task stopped and can no longer answer
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed outside a network response
    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ImageFeedError {
    /// The network error behind this failure, if any
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            ImageFeedError::Network(err) => Some(err),
            _ => None,
        }
    }
}

/// Type alias for Result with ImageFeedError
pub type Result<T> = std::result::Result<T, ImageFeedError>;
