//! Error types for the mock engine.
//!
//! Only defects live here. Business failures (validation, auth, missing
//! records) travel as [`Envelope`](crate::envelope::Envelope) values and never
//! reach this type.

use thiserror::Error;

use crate::routing::Method;

/// Hard failures raised by route registration, query parsing or handlers.
#[derive(Debug, Error)]
pub enum MockError {
    /// Route pattern could not be parsed.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Method string outside the supported verb set.
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),

    /// Route key not in `"METHOD /path"` form.
    #[error("invalid route key `{0}`, expected \"METHOD /path\"")]
    InvalidRouteKey(String),

    /// Same method and pattern shape registered twice under the reject policy.
    #[error("duplicate route {method} {pattern} (already registered at position {existing})")]
    DuplicateRoute {
        method: Method,
        pattern: String,
        existing: usize,
    },

    /// Query string with a broken percent escape or non UTF-8 bytes.
    #[error("malformed query string `{query}`: {reason}")]
    MalformedQuery { query: String, reason: String },

    /// Seed data for a collection could not be loaded.
    #[error("failed to load seed data from {path}: {reason}")]
    Seed { path: String, reason: String },

    /// A handler hit a defect it cannot express as an envelope.
    #[error("handler failed: {0}")]
    Handler(String),
}

impl MockError {
    /// Shorthand used by handlers to raise a defect.
    pub fn handler(reason: impl Into<String>) -> Self {
        MockError::Handler(reason.into())
    }
}

/// Result type for mock engine operations.
pub type MockResult<T> = Result<T, MockError>;
