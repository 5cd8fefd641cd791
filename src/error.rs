//! Error types for the MarketDeck application.

use thiserror::Error;

/// The main error type for MarketDeck.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal/TUI related errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// The request never completed (DNS, connect, timeout, stream closed).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `detail` is the body's `detail` field when present.
    #[error("Server error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// Response JSON is missing expected keys or has the wrong types.
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// Wallet provider absent or user rejected.
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// On-chain call reverted or the provider refused the submission.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic application error
    #[error("{0}")]
    Application(String),
}

/// Errors raised by a wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No provider is configured or it cannot be reached.
    #[error("no wallet provider available")]
    Unavailable,

    /// The user declined the request in their wallet.
    #[error("request rejected by user")]
    UserRejected,

    /// Any other provider-level failure.
    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Create a new contract error.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new application error.
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }

    /// Build a server error from a status code and the raw response body.
    ///
    /// A string `detail` is used verbatim; an object or array is serialized
    /// back to JSON text. Bodies without `detail` (or that are not JSON)
    /// yield `detail: None`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("detail").cloned())
            .and_then(|detail| match detail {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });

        Self::Server { status, detail }
    }

    /// The server-provided detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to show in an error banner: the server detail when present,
    /// otherwise `generic`.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            Self::Wallet(wallet) => wallet.to_string(),
            Self::InvalidInput(msg) | Self::Contract(msg) => msg.clone(),
            _ => self.detail().unwrap_or(generic).to_string(),
        }
    }

    /// Check if this error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Channel(_) | Self::Shape(_) => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Shape(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Server {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_is_used_verbatim() {
        let err = Error::from_response(400, r#"{"detail": "coin parametresi gerekli"}"#);
        assert_eq!(err.detail(), Some("coin parametresi gerekli"));
        assert_eq!(err.user_message("generic"), "coin parametresi gerekli");
    }

    #[test]
    fn test_detail_object_is_serialized() {
        let err = Error::from_response(422, r#"{"detail": {"loc": "body"}}"#);
        assert_eq!(err.detail(), Some(r#"{"loc":"body"}"#));
    }

    #[test]
    fn test_missing_detail_falls_back_to_generic() {
        let err = Error::from_response(500, "Internal Server Error");
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message("Predictions unavailable"), "Predictions unavailable");

        let err = Error::from_response(500, r#"{"message": "nope"}"#);
        assert_eq!(err.user_message("generic"), "generic");
    }

    #[test]
    fn test_network_error_uses_generic_message() {
        let err = Error::network("connection refused");
        assert_eq!(err.user_message("Try again later"), "Try again later");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_wallet_errors_surface_their_own_message() {
        let err = Error::from(WalletError::UserRejected);
        assert_eq!(err.user_message("generic"), "request rejected by user");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_server_recoverability() {
        assert!(Error::from_response(503, "").is_recoverable());
        assert!(!Error::from_response(401, "").is_recoverable());
    }
}
