//! Error types.
//!
//! Every fallible operation inside the crate returns [`ReqrResult`]. Errors
//! only reach the test as reports: usage faults become fatal reports through
//! [`OrFatal`](crate::reporter::OrFatal), configuration errors are returned to
//! the caller of the loader.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ReqrError`].
pub type ReqrResult<T> = Result<T, ReqrError>;

/// Errors that can occur while building, dispatching, or inspecting requests.
#[derive(Error, Debug)]
pub enum ReqrError {
    /// The HTTP method is not a valid token.
    #[error("invalid method {method:?}: {reason}")]
    InvalidMethod {
        /// The rejected method.
        method: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request path could not be parsed as a URI.
    #[error("invalid path {path:?}: {reason}")]
    InvalidUri {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request could not be assembled.
    #[error("request build error: {0}")]
    RequestBuild(#[from] http::Error),

    /// A structured payload could not be serialized.
    #[error("body encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A payload stream could not be read.
    #[error("body read error: {0}")]
    BodyRead(#[from] std::io::Error),

    /// A header name or value is not valid HTTP.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// The header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A `contains` pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A transform step received a value of the wrong type.
    #[error("transform step {index}: expected input of type {expected}, got {actual}")]
    StepInputMismatch {
        /// Zero-based position of the step in the chain.
        index: usize,
        /// The type the step accepts.
        expected: &'static str,
        /// The type that actually arrived.
        actual: &'static str,
    },

    /// A check that needs text was applied to another type.
    #[error("{check}: captured value of type {actual} is not text")]
    NotText {
        /// The check that was attempted.
        check: &'static str,
        /// The captured value's type.
        actual: &'static str,
    },

    /// Configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML configuration did not parse.
    #[error("failed to parse TOML configuration: {0}")]
    ConfigToml(#[from] toml::de::Error),

    /// JSON configuration did not parse.
    #[error("failed to parse JSON configuration: {0}")]
    ConfigJson(#[source] serde_json::Error),

    /// Configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl ReqrError {
    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors caused by configuration rather than usage.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. } | Self::ConfigToml(_) | Self::ConfigJson(_) | Self::ConfigInvalid(_)
        )
    }
}
