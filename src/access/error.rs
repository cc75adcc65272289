//! Access error types.

use std::path::PathBuf;

/// Errors that can occur while resolving or reading a sandboxed file.
#[derive(thiserror::Error, Debug)]
pub enum AccessError {
    /// The path is absolute, contains a `..` segment, or resolves outside the root.
    ///
    /// The message carries no detail about the path.
    #[error("Invalid path")]
    InvalidPath,

    /// No regular file exists at the resolved location.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but is not valid UTF-8 text.
    #[error("Unreadable file: {0}")]
    Unreadable(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_display_has_no_detail() {
        assert_eq!(AccessError::InvalidPath.to_string(), "Invalid path");
    }

    #[test]
    fn test_not_found_display() {
        let err = AccessError::NotFound(PathBuf::from("alpha/a.md"));
        assert_eq!(err.to_string(), "File not found: alpha/a.md");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AccessError = io_err.into();
        assert!(matches!(err, AccessError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }
}
