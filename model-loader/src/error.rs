//! Error handling for model loading operations

use thiserror::Error;

/// Result type alias for model loading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving and loading model data
#[derive(Error, Debug)]
pub enum Error {
    /// The file data could not be parsed as the indicated format
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The extension or type hint does not map to a registered format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// The format (or format variant) is recognized but has no loader
    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    /// A named entry could not be found by the resolver
    #[error("File not found: {name}")]
    FileNotFound { name: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Fetching a remote archive failed
    #[error("Download failed: {message}")]
    Download { message: String },

    /// An archive could not be opened or read
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// Loaded data does not form a usable scene
    #[error("Invalid scene: {message}")]
    InvalidScene { message: String },

    /// Generic error with custom message
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a new not-implemented error
    pub fn not_implemented<S: Into<String>>(message: S) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Create a new file-not-found error
    pub fn file_not_found<S: Into<String>>(name: S) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    /// Create a new I/O error
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new download error
    pub fn download<S: Into<String>>(message: S) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Create a new archive error
    pub fn archive<S: Into<String>>(message: S) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Create a new invalid scene error
    pub fn invalid_scene<S: Into<String>>(message: S) -> Self {
        Self::InvalidScene {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error marks a recognized-but-unimplemented format variant
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::parse("unexpected token");
        assert!(matches!(error, Error::Parse { .. }));
        assert_eq!(error.to_string(), "Parse error: unexpected token");
    }

    #[test]
    fn test_not_implemented_predicate() {
        assert!(Error::not_implemented("glTF 1.0").is_not_implemented());
        assert!(!Error::parse("bad header").is_not_implemented());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io { .. }));
        assert!(error.to_string().contains("short read"));
    }
}
