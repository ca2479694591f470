//! Unified error type for the syncwave application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in syncwave.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The metadata search capability has not been configured.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "file").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The remote source is geo-restricted, removed, or access-denied.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The extraction capability failed or offered no audio track.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// An outbound HTTP request failed or returned a non-success status.
    #[error("Upstream request failed: {0}")]
    UpstreamRequestFailed(String),

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
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::ConfigurationMissing(_) => 400,
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Unavailable(_) => 403,
            Error::ExtractionFailed(_) => 500,
            Error::UpstreamRequestFailed(_) => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::ConfigurationMissing(_) => "configuration_missing",
            Error::Validation(_) => "validation_error",
            Error::NotFound { .. } => "not_found",
            Error::Unavailable(_) => "unavailable",
            Error::ExtractionFailed(_) => "extraction_failed",
            Error::UpstreamRequestFailed(_) => "upstream_request_failed",
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

    /// Rebuild an owned error from one shared between several waiters.
    ///
    /// Variants that carry only text are reproduced exactly; the rest are
    /// folded into [`Error::Internal`] with their display message.
    pub fn from_shared(err: &Error) -> Self {
        match err {
            Error::ConfigurationMissing(m) => Error::ConfigurationMissing(m.clone()),
            Error::Validation(m) => Error::Validation(m.clone()),
            Error::NotFound { entity, id } => Error::NotFound {
                entity: entity.clone(),
                id: id.clone(),
            },
            Error::Unavailable(m) => Error::Unavailable(m.clone()),
            Error::ExtractionFailed(m) => Error::ExtractionFailed(m.clone()),
            Error::UpstreamRequestFailed(m) => Error::UpstreamRequestFailed(m.clone()),
            Error::Internal(m) => Error::Internal(m.clone()),
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_missing_is_bad_request() {
        let err = Error::ConfigurationMissing("YOUTUBE_API_KEY is not set".into());
        assert_eq!(
            err.to_string(),
            "Configuration missing: YOUTUBE_API_KEY is not set"
        );
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code(), "configuration_missing");
    }

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", "abc123");
        assert_eq!(err.to_string(), "video not found: abc123");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn unavailable_is_forbidden() {
        let err = Error::Unavailable("not available in your country".into());
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn extraction_and_upstream_are_server_errors() {
        assert_eq!(Error::ExtractionFailed("x".into()).http_status(), 500);
        assert_eq!(Error::UpstreamRequestFailed("x".into()).http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn from_shared_keeps_variant() {
        let err = Error::Unavailable("removed".into());
        let copy = Error::from_shared(&err);
        assert!(matches!(copy, Error::Unavailable(ref m) if m == "removed"));

        let io = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let copy = Error::from_shared(&io);
        assert!(matches!(copy, Error::Internal(ref m) if m.contains("disk")));
    }
}
