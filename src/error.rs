//! Error types for Courseforge
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling, plus the coarse
//! classification applied to transport failures when choosing user-facing
//! error copy.

use thiserror::Error;

/// Main error type for Courseforge operations
///
/// This enum encompasses all possible errors that can occur during outline
/// generation, content-stream ingestion, persistence, and publishing.
#[derive(Error, Debug)]
pub enum CourseforgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outline generation errors (bad status, missing or malformed payload)
    #[error("Outline error: {0}")]
    Outline(String),

    /// Content-stream transport errors
    #[error("Stream error: {0}")]
    Stream(String),

    /// Local persistence errors (sled operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Publishing errors against the content-management backend
    #[error("Publish error: {0}")]
    Publish(String),

    /// Authentication errors (e.g., 401 Unauthorized from the backend)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Courseforge operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Coarse classification of a transport/backend failure
///
/// Chosen by substring match on the error text and used only to select
/// which error copy is shown to the user; it never drives retry logic
/// (nothing is retried).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Server-side failure (HTTP 5xx)
    Server,
    /// The operation was aborted by the caller
    Aborted,
    /// Stream buffering failure
    Buffer,
    /// The request or stream timed out
    Timeout,
    /// Connection-level network failure
    Network,
    /// Credentials rejected (HTTP 401/403)
    Auth,
    /// Anything that matched none of the known patterns
    Unknown,
}

impl ErrorClass {
    /// Classify an error message by substring match
    ///
    /// Patterns are checked in a fixed order; the first hit wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use courseforge::error::ErrorClass;
    ///
    /// assert_eq!(ErrorClass::classify("HTTP 500 Internal Server Error"), ErrorClass::Server);
    /// assert_eq!(ErrorClass::classify("operation timed out"), ErrorClass::Timeout);
    /// ```
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("500") || lower.contains("502") || lower.contains("503") {
            Self::Server
        } else if lower.contains("abort") || lower.contains("cancel") {
            Self::Aborted
        } else if lower.contains("buffer") {
            Self::Buffer
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
        {
            Self::Auth
        } else if lower.contains("network")
            || lower.contains("connect")
            || lower.contains("dns")
        {
            Self::Network
        } else {
            Self::Unknown
        }
    }

    /// User-facing copy for this failure class
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Server => "The generation service hit an internal error. Try again later.",
            Self::Aborted => "The operation was cancelled.",
            Self::Buffer => "The stream could not be buffered. Try regenerating.",
            Self::Timeout => "The request timed out. Check the service and try again.",
            Self::Network => "Could not reach the service. Check your connection.",
            Self::Auth => "Your credentials were rejected. Sign in again.",
            Self::Unknown => "Something went wrong. Try again.",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Server => "server",
            Self::Aborted => "aborted",
            Self::Buffer => "buffer",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CourseforgeError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_outline_error_display() {
        let error = CourseforgeError::Outline("tree missing".to_string());
        assert_eq!(error.to_string(), "Outline error: tree missing");
    }

    #[test]
    fn test_stream_error_display() {
        let error = CourseforgeError::Stream("connection reset".to_string());
        assert_eq!(error.to_string(), "Stream error: connection reset");
    }

    #[test]
    fn test_storage_error_display() {
        let error = CourseforgeError::Storage("database locked".to_string());
        assert_eq!(error.to_string(), "Storage error: database locked");
    }

    #[test]
    fn test_publish_error_display() {
        let error = CourseforgeError::Publish("module creation failed".to_string());
        assert_eq!(error.to_string(), "Publish error: module creation failed");
    }

    #[test]
    fn test_authentication_error_display() {
        let error = CourseforgeError::Authentication("token expired".to_string());
        assert_eq!(error.to_string(), "Authentication error: token expired");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CourseforgeError = io_error.into();
        assert!(matches!(error, CourseforgeError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{bad json}").unwrap_err();
        let error: CourseforgeError = json_error.into();
        assert!(matches!(error, CourseforgeError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: CourseforgeError = yaml_error.into();
        assert!(matches!(error, CourseforgeError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CourseforgeError>();
    }

    #[test]
    fn test_classify_server() {
        assert_eq!(
            ErrorClass::classify("HTTP 500 Internal Server Error"),
            ErrorClass::Server
        );
        assert_eq!(ErrorClass::classify("got 503 from upstream"), ErrorClass::Server);
    }

    #[test]
    fn test_classify_aborted() {
        assert_eq!(ErrorClass::classify("request aborted by user"), ErrorClass::Aborted);
        assert_eq!(ErrorClass::classify("stream cancelled"), ErrorClass::Aborted);
    }

    #[test]
    fn test_classify_buffer() {
        assert_eq!(ErrorClass::classify("buffer overflow in reader"), ErrorClass::Buffer);
    }

    #[test]
    fn test_classify_timeout() {
        assert_eq!(ErrorClass::classify("operation timed out"), ErrorClass::Timeout);
        assert_eq!(ErrorClass::classify("read timeout"), ErrorClass::Timeout);
    }

    #[test]
    fn test_classify_network() {
        assert_eq!(ErrorClass::classify("network unreachable"), ErrorClass::Network);
        assert_eq!(
            ErrorClass::classify("failed to connect to host"),
            ErrorClass::Network
        );
    }

    #[test]
    fn test_classify_auth() {
        assert_eq!(ErrorClass::classify("401 Unauthorized"), ErrorClass::Auth);
        assert_eq!(ErrorClass::classify("access forbidden"), ErrorClass::Auth);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(ErrorClass::classify("something odd happened"), ErrorClass::Unknown);
    }

    #[test]
    fn test_classify_order_server_before_timeout() {
        // A message containing both patterns resolves to the first checked class.
        assert_eq!(
            ErrorClass::classify("500 after timeout"),
            ErrorClass::Server
        );
    }

    #[test]
    fn test_user_message_is_nonempty() {
        for class in [
            ErrorClass::Server,
            ErrorClass::Aborted,
            ErrorClass::Buffer,
            ErrorClass::Timeout,
            ErrorClass::Network,
            ErrorClass::Auth,
            ErrorClass::Unknown,
        ] {
            assert!(!class.user_message().is_empty());
        }
    }
}
