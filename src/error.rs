//! Error types for MailPal
//!
//! This module defines the error hierarchy for all operations in the service.

use thiserror::Error;

/// Main error type for MailPal
#[derive(Error, Debug)]
pub enum MailPalError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Gmail API errors
    #[error("Gmail API error: {0}")]
    Gmail(#[from] GmailApiError),

    /// Language model errors
    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No stored feedback with this id
    #[error("Feedback not found: {feedback_id}")]
    FeedbackNotFound { feedback_id: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth keys file not found: {path}")]
    KeysFileNotFound { path: String },

    #[error("Invalid OAuth keys format: expected 'installed' or 'web' credentials")]
    InvalidKeysFormat,

    #[error("Credentials file not found: {path}")]
    CredentialsNotFound { path: String },

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("No authorization code provided")]
    NoAuthCode,

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
}

/// Gmail API errors
#[derive(Error, Debug)]
pub enum GmailApiError {
    #[error("Draft not found: {draft_id}")]
    DraftNotFound { draft_id: String },

    #[error("API request failed: {message}")]
    RequestFailed { message: String },
}

/// Language model errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Model returned no content")]
    EmptyCompletion,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

/// Result type alias for MailPal operations
pub type Result<T> = std::result::Result<T, MailPalError>;

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "request".to_string());
        ValidationError::MissingField { field }
    }
}

impl From<validator::ValidationErrors> for MailPalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MailPalError::Validation(ValidationError::from(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::KeysFileNotFound {
            path: "/path/to/keys.json".to_string(),
        };
        assert!(err.to_string().contains("/path/to/keys.json"));
    }

    #[test]
    fn test_error_conversion() {
        let auth_err = AuthError::NoAuthCode;
        let err: MailPalError = auth_err.into();
        assert!(matches!(err, MailPalError::Auth(_)));
    }

    #[test]
    fn test_llm_error_carries_upstream_body() {
        let err: MailPalError = LlmError::RequestFailed {
            status: 429,
            message: "rate limit exceeded".to_string(),
        }
        .into();
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limit exceeded"));
    }
}
