use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while setting up or running the daemon.
///
/// Every variant here is a startup-time failure. Errors encountered during a
/// traversal (unreadable directories, unreadable metadata) are recoverable by
/// contract: the walker skips the affected entry or subtree, optionally logs
/// a warning, and keeps going. They are never surfaced as a `ScanError`.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("pattern set is empty: at least one pattern is required")]
    EmptyPatternSet,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to daemonize: {0}")]
    Daemonize(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn daemonize(msg: impl Into<String>) -> Self {
        Self::Daemonize(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScanError::EmptyPatternSet;
        assert_eq!(
            err.to_string(),
            "pattern set is empty: at least one pattern is required"
        );

        let err = ScanError::daemonize("fork failed");
        assert_eq!(err.to_string(), "Failed to daemonize: fork failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ScanError = io.into();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
