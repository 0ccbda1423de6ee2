// crates/feed-reader/src/error.rs
//! Error types for feed reading

use thiserror::Error;

/// Result type for feed reader operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur while importing a feed or resolving its fields
#[derive(Debug, Error)]
pub enum FeedError {
    /// Invalid XML structure
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// XML parsing error reported by the tokenizer
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Root element matches no known feed dialect
    #[error("Unrecognized feed format: {0}")]
    UnrecognizedFormat(String),

    /// A document query failed
    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    /// A timestamp did not match the feed's date profile
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// Input exceeded the configured size limit
    #[error("Document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    /// Reader configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::XmlParse(err.to_string())
    }
}

/// Errors raised by the query adapter.
///
/// Kept separate from [`FeedError`] and `Clone` so a failed lookup can be
/// memoized in an entry's cache like any other outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The path expression could not be parsed
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// The path uses a prefix with no registered namespace
    #[error("unbound namespace prefix '{prefix}' in '{path}'")]
    UnboundPrefix { path: String, prefix: String },

    /// A node set was requested from a path selecting attributes or text
    #[error("path '{0}' does not select element nodes")]
    NotANodeSet(String),
}
