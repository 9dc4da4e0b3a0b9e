use thiserror::Error;

/// Error types for machine translation and autotranslate requests
///
/// Request-level variants display their message verbatim so it can be
/// returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Provider misconfiguration (missing or rejected API key)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// HTTP transport failure
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    #[error("Unsupported mime type: {0}")]
    InvalidMimeType(String),
    /// The provider failed or returned a malformed reply
    #[error("Translation error: {0}")]
    TranslationError(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    EmptySource(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unsupported(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_display_verbatim() {
        assert_eq!(
            MtError::NotFound("Field not found.".to_string()).to_string(),
            "Field not found."
        );
        assert_eq!(
            MtError::EmptySource("Source field is empty.".to_string()).to_string(),
            "Source field is empty."
        );
    }

    #[test]
    fn test_provider_errors_are_prefixed() {
        let err = MtError::TranslationError("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Translation error: quota exceeded");
    }
}
