use thiserror::Error;

/// Errors raised by the catalog, its codecs and its configuration
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input rejected before any mutation took place
    #[error("Validation error: {0}")]
    Validation(String),
    /// An interchange payload could not be decoded
    #[error("Format error: {0}")]
    Format(String),
    /// A database statement failed; the surrounding batch has been rolled back
    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether the caller sent something unacceptable, as opposed to an internal failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, CatalogError::Validation(_) | CatalogError::Format(_))
    }
}

impl From<csv::Error> for CatalogError {
    fn from(error: csv::Error) -> Self {
        CatalogError::Format(format!("Invalid CSV: {}", error))
    }
}

impl From<zip::result::ZipError> for CatalogError {
    fn from(error: zip::result::ZipError) -> Self {
        CatalogError::Format(format!("Invalid ZIP file: {}", error))
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_class() {
        assert!(CatalogError::Validation("empty key".to_string()).is_validation());
        assert!(CatalogError::Format("bad header".to_string()).is_validation());
        assert!(!CatalogError::Config("no sites".to_string()).is_validation());
    }

    #[test]
    fn test_display_messages() {
        let err = CatalogError::Validation("Translation key cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: Translation key cannot be empty"
        );
    }
}
