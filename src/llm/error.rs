//! Error types for generation backends.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`LlmError::code()`].

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration (including a missing API key).
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/expired API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// The HTTP request could not be completed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Rate limit or quota exhausted.
    pub const QUOTA_EXCEEDED: &str = "QUOTA_EXCEEDED";

    /// The requested model does not exist or is not enabled for the key.
    pub const MODEL_UNSUPPORTED: &str = "MODEL_UNSUPPORTED";

    /// The backend answered but the body held no usable text.
    pub const MALFORMED_RESPONSE: &str = "MALFORMED_RESPONSE";

    /// The attempt exceeded its deadline.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// The attempt was cancelled by its owner.
    pub const CANCELLED: &str = "CANCELLED";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced by a single generation attempt.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Authentication failed.
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// The request failed before a response arrived.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Rate limit or quota exhausted.
    #[error("[{}] {}", error_codes::QUOTA_EXCEEDED, .0)]
    QuotaError(String),

    /// Model not found or not available to this key.
    #[error("[{}] {}", error_codes::MODEL_UNSUPPORTED, .0)]
    UnsupportedModel(String),

    /// Response parsed but carried no reply text.
    #[error("[{}] {}", error_codes::MALFORMED_RESPONSE, .0)]
    MalformedResponse(String),

    /// The attempt deadline elapsed.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),

    /// The attempt was cancelled.
    #[error("[{}] {}", error_codes::CANCELLED, .0)]
    Cancelled(String),

    /// Provider-specific error not covered by other variants.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),
}

impl LlmError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::QuotaError(_) => error_codes::QUOTA_EXCEEDED,
            Self::UnsupportedModel(_) => error_codes::MODEL_UNSUPPORTED,
            Self::MalformedResponse(_) => error_codes::MALFORMED_RESPONSE,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
            Self::Cancelled(_) => error_codes::CANCELLED,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::AuthError(m)
            | Self::RequestError(m)
            | Self::QuotaError(m)
            | Self::UnsupportedModel(m)
            | Self::MalformedResponse(m)
            | Self::TimeoutError(m)
            | Self::Cancelled(m)
            | Self::ProviderError(m) => m,
        }
    }

    /// Returns true if the same request could succeed if sent again later.
    ///
    /// The resolver advances to the next candidate on every error regardless;
    /// this only feeds diagnostics.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::AuthError(_) | Self::UnsupportedModel(_) => false,
            Self::Cancelled(_) => false,
            Self::RequestError(_)
            | Self::QuotaError(_)
            | Self::MalformedResponse(_)
            | Self::TimeoutError(_)
            | Self::ProviderError(_) => true,
        }
    }
}

/// Convenience alias for backend results.
pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<LlmError> {
        vec![
            LlmError::ConfigError("x".into()),
            LlmError::AuthError("x".into()),
            LlmError::RequestError("x".into()),
            LlmError::QuotaError("x".into()),
            LlmError::UnsupportedModel("x".into()),
            LlmError::MalformedResponse("x".into()),
            LlmError::TimeoutError("x".into()),
            LlmError::Cancelled("x".into()),
            LlmError::ProviderError("x".into()),
        ]
    }

    #[test]
    fn display_includes_code_prefix() {
        let err = LlmError::ConfigError("GEMINI_API_KEY not set".into());
        let display = format!("{err}");
        assert!(display.starts_with("[CONFIG_INVALID]"));
        assert!(display.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn message_returns_inner_text() {
        let err = LlmError::UnsupportedModel("gemini-0.1".into());
        assert_eq!(err.message(), "gemini-0.1");
    }

    #[test]
    fn all_codes_are_screaming_snake_case() {
        for err in &all() {
            let code = err.code();
            assert!(
                code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "code {code:?} is not SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn codes_are_distinct() {
        let mut codes: Vec<&str> = all().iter().map(LlmError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all().len());
    }

    #[test]
    fn credential_and_model_errors_are_not_retryable() {
        assert!(!LlmError::ConfigError("x".into()).is_retryable());
        assert!(!LlmError::AuthError("x".into()).is_retryable());
        assert!(!LlmError::UnsupportedModel("x".into()).is_retryable());
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(LlmError::RequestError("x".into()).is_retryable());
        assert!(LlmError::QuotaError("x".into()).is_retryable());
        assert!(LlmError::TimeoutError("x".into()).is_retryable());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LlmError>();
    }
}
