//! Error types for the Urlbox client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, sending or decoding a render request
#[derive(Error, Debug)]
pub enum Error {
    /// The target URL was empty
    #[error("a url must be passed in")]
    UrlRequired,

    /// An async render was submitted without a webhook URL
    #[error("a webhook url must be passed in for async renders")]
    WebhookUrlRequired,

    /// Image quality above 100
    #[error("image quality cannot be greater than 100 (got {0})")]
    ImageQualityExceeded(u32),

    /// The async render endpoint did not accept the submission
    #[error("async render was not accepted (status {status})")]
    AsyncUnsuccessful { status: u16 },

    /// The API answered a JSON call with a non-success status
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Failed to construct the outgoing request
    #[error("Failed to build request: {0}")]
    Request(String),

    /// Network or transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to read or decode a response body
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors raised before any network I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UrlRequired | Error::WebhookUrlRequired | Error::ImageQualityExceeded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_classified() {
        assert!(Error::UrlRequired.is_validation());
        assert!(Error::ImageQualityExceeded(101).is_validation());
        assert!(!Error::AsyncUnsuccessful { status: 500 }.is_validation());
        assert!(!Error::Transport("reset".into()).is_validation());
    }

    #[test]
    fn test_messages_carry_context() {
        let e = Error::ImageQualityExceeded(150);
        assert!(e.to_string().contains("150"));
        let e = Error::AsyncUnsuccessful { status: 403 };
        assert!(e.to_string().contains("403"));
    }
}
