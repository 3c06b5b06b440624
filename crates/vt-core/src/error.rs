//! Unified error type for the video-transformer application.
//!
//! All crates funnel their failures into [`Error`]. Each variant belongs to
//! one [`ErrorKind`] so callers can branch on the classification, and API
//! handlers derive an HTTP status via [`Error::http_status`] and a stable
//! machine-readable code via [`Error::code`].

use std::fmt;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input: size format, size/duration policy, malformed request.
    Validation,
    /// An artifact or link id did not resolve.
    NotFound,
    /// A share link is past its expiry.
    Expired,
    /// The external media capability failed while producing an artifact.
    Processing,
    /// Duration probing failed.
    Probe,
    /// The caller is not authenticated.
    Unauthorized,
    /// Storage, I/O or other unexpected failures.
    Internal,
}

/// Unified error type covering all failure modes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found.")]
    NotFound {
        /// The kind of entity (e.g. "Video", "Shared link").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// One or more entities of a batch lookup could not be found.
    #[error("Some videos were not found.")]
    SomeNotFound {
        /// Number of ids requested.
        requested: usize,
        /// Number of ids that resolved.
        found: usize,
    },

    /// A time-limited entity is past its expiry.
    #[error("The video link has expired")]
    Expired {
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// A human-readable size string did not match `<integer><kb|mb|gb>`.
    #[error("Invalid size format.")]
    InvalidSizeFormat(String),

    /// The upload is larger than the policy allows.
    #[error("File size exceeds the allowed limit.")]
    SizeExceeded {
        /// Size of the upload in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },

    /// The probed duration is outside the policy bounds.
    #[error("Video duration is out of bounds.")]
    DurationOutOfBounds {
        /// Probed duration in seconds.
        duration: f64,
        /// Minimum allowed duration in seconds.
        min: u32,
        /// Maximum allowed duration in seconds.
        max: u32,
    },

    /// Media probing failed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// The external media capability failed to produce an artifact.
    #[error("Processing error [{operation}]: {message}")]
    Processing {
        /// The operation that failed ("trim", "merge").
        operation: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool (ffmpeg, ffprobe) could not be run or returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_)
            | Error::InvalidSizeFormat(_)
            | Error::SizeExceeded { .. }
            | Error::DurationOutOfBounds { .. } => ErrorKind::Validation,
            Error::NotFound { .. } | Error::SomeNotFound { .. } => ErrorKind::NotFound,
            Error::Expired { .. } => ErrorKind::Expired,
            Error::Processing { .. } | Error::Tool { .. } => ErrorKind::Processing,
            Error::Probe(_) => ErrorKind::Probe,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::Database { .. } | Error::Io { .. } | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map this error to an appropriate HTTP status code.
    ///
    /// Expired links are reported in the not-found class.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound | ErrorKind::Expired => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Probe => 422,
            ErrorKind::Processing => 502,
            ErrorKind::Internal => 500,
        }
    }

    /// Stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } | Error::SomeNotFound { .. } => "not_found",
            Error::Expired { .. } => "expired",
            Error::Unauthorized(_) => "unauthorized",
            Error::Validation(_) => "validation_error",
            Error::InvalidSizeFormat(_) => "invalid_size_format",
            Error::SizeExceeded { .. } => "size_exceeded",
            Error::DurationOutOfBounds { .. } => "duration_out_of_bounds",
            Error::Probe(_) => "probe_error",
            Error::Processing { .. } => "processing_error",
            Error::Tool { .. } => "tool_error",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Processing`].
    pub fn processing(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Processing {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
