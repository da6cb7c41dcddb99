//! Error types for reprise-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during repetition analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A candidate phrase could not be turned into a match pattern.
    #[error("cannot build match pattern for {phrase:?}: {source}")]
    Pattern {
        /// The phrase that failed to compile.
        phrase: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised by the in-memory [`Document`](crate::document::Document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A span does not fit inside the document.
    #[error("span {start}..{end} is outside paragraph {paragraph}")]
    SpanOutOfBounds {
        /// Paragraph index of the span.
        paragraph: usize,
        /// Byte offset where the span starts.
        start: usize,
        /// Byte offset where the span ends.
        end: usize,
    },

    /// A search pattern could not be compiled.
    #[error("cannot search for {phrase:?}: {reason}")]
    Search {
        /// The phrase being searched for.
        phrase: String,
        /// Why the search pattern was rejected.
        reason: String,
    },
}

/// Errors from [`locate`](crate::locate::locate).
#[derive(Error, Debug)]
pub enum LocateError<E>
where
    E: std::error::Error + 'static,
{
    /// The sequence to locate was empty.
    #[error("sequence to locate must not be empty")]
    EmptySequence,

    /// The text source failed during a round trip.
    #[error("text source failed: {0}")]
    Source(#[source] E),
}
