//! Unified error types for chatsync.
//!
//! Only *structural* problems are errors: a chat directory with no source
//! files, a record file that is not an array of well-formed objects, or an
//! unreadable self-identity file. Per-record problems (a bad date, a missing
//! attachment, an unresolvable sender) are logged through `tracing` and
//! replaced by a fallback value, so they never surface here.
//!
//! Every error is raised before any file in the chat directory is modified.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatsync operations.
///
/// # Example
///
/// ```rust
/// use chatsync::error::Result;
/// use chatsync::Message;
///
/// fn load() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatsyncError>;

/// The error type for all chatsync operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatsyncError {
    /// An I/O error occurred while reading sources or writing results.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a source file.
    #[error("Failed to parse {format}{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The format being parsed (e.g., "record JSON", "transcript")
        format: &'static str,
        /// The underlying parse error
        #[source]
        source: ParseErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The input does not have the expected overall shape.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// A structured record entry failed validation.
    #[error("Invalid record at index {index}: {message}")]
    InvalidRecord {
        /// Position of the entry in the record array
        index: usize,
        /// Description of what's wrong
        message: String,
    },

    /// Neither the record file nor the transcript exists.
    #[error("No chat sources found in {}", dir.display())]
    MissingSources {
        /// The chat directory that was searched
        dir: PathBuf,
    },

    /// The self-identity configuration could not be read.
    #[error("Invalid configuration in {}: {message}", path.display())]
    InvalidConfig {
        /// Path of the configuration file
        path: PathBuf,
        /// Description of what's wrong
        message: String,
    },
}

/// Kinds of parse errors that can occur.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// JSON parsing error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Generic parsing error
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatsyncError {
    /// Creates a parse error for the structured record format.
    pub fn records_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ChatsyncError::Parse {
            format: "record JSON",
            source: ParseErrorKind::Json(source),
            path,
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatsyncError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(index: usize, message: impl Into<String>) -> Self {
        ChatsyncError::InvalidRecord {
            index,
            message: message.into(),
        }
    }

    /// Creates a missing sources error.
    pub fn missing_sources(dir: impl Into<PathBuf>) -> Self {
        ChatsyncError::MissingSources { dir: dir.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ChatsyncError::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attaches a file path to a parse error, leaving other variants untouched.
    #[must_use]
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            ChatsyncError::Parse {
                format,
                source,
                path: None,
            } => ChatsyncError::Parse {
                format,
                source,
                path: Some(file.into()),
            },
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatsyncError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChatsyncError::Parse { .. })
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatsyncError::InvalidFormat { .. })
    }

    /// Returns `true` if this is an invalid record error.
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, ChatsyncError::InvalidRecord { .. })
    }

    /// Returns `true` if the chat directory had no sources.
    pub fn is_missing_sources(&self) -> bool {
        matches!(self, ChatsyncError::MissingSources { .. })
    }
}
