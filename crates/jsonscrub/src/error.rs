use std::{error::Error as StdError, io};

use thiserror::Error;

/// Failure raised by a [`Sanitize`](crate::Sanitize) implementation.
///
/// The scanner never inspects this error; it aborts the pass and hands it back
/// to the caller unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SanitizeError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl SanitizeError {
    /// Creates an error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised by the canonicalization step of the default pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalizeError {
    /// More than one decoding round changed the input.
    #[error("multiple encoding detected in input: {input:?}")]
    MultipleEncoding {
        /// The value as it was before canonicalization.
        input: String,
    },
    /// Decoding switched between codecs more than once.
    #[error("mixed encoding detected in input: {input:?}")]
    MixedEncoding {
        /// The value as it was before canonicalization.
        input: String,
    },
}

impl From<CanonicalizeError> for SanitizeError {
    fn from(err: CanonicalizeError) -> Self {
        SanitizeError::with_source("canonicalization rejected input", err)
    }
}

/// Error produced while scrubbing a document.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// The source stream failed.
    #[error("source read failed: {0}")]
    Io(#[from] io::Error),
    /// The sanitize function rejected a literal.
    #[error("sanitize failed: {0}")]
    Sanitize(#[from] SanitizeError),
}

impl From<ScrubError> for io::Error {
    fn from(err: ScrubError) -> Self {
        match err {
            ScrubError::Io(e) => e,
            other @ ScrubError::Sanitize(_) => io::Error::other(other),
        }
    }
}

/// Error produced while loading a [`ScrubConfig`](crate::ScrubConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// The config file is not valid TOML or has unknown keys.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The effective config could not be rendered as TOML.
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Error produced by [`XssFilter::filter`](crate::XssFilter::filter).
#[derive(Debug, Error)]
pub enum FilterError {
    /// The body is larger than `max_body_bytes`.
    #[error("request body of {actual} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge {
        /// Configured limit.
        limit: usize,
        /// Size of the rejected body.
        actual: usize,
    },
    /// A sanitized header value cannot be stored back into the request.
    #[error("sanitized value for header `{name}` is not a valid header value")]
    InvalidHeader {
        /// Header name.
        name: String,
    },
    /// The sanitized path and query do not form a URI.
    #[error("sanitized request target is not a valid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    /// The sanitized path and query could not be recombined with the rest
    /// of the URI.
    #[error("sanitized request target cannot be reassembled: {0}")]
    InvalidUriParts(#[from] http::uri::InvalidUriParts),
    /// The scanner or sanitize pipeline failed.
    #[error(transparent)]
    Scrub(#[from] ScrubError),
}

impl From<SanitizeError> for FilterError {
    fn from(err: SanitizeError) -> Self {
        FilterError::Scrub(ScrubError::Sanitize(err))
    }
}
