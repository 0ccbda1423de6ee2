// crates/feed-reader/src/reader.rs
//! Import entry points

use crate::config::ReaderConfig;
use crate::document::Document;
use crate::error::{FeedError, FeedResult};
use crate::feed::Feed;
use std::fs;
use std::path::Path;

/// Imports feed documents using a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Reader {
    config: ReaderConfig,
}

impl Reader {
    /// Creates a reader after validating `config`
    pub fn new(config: ReaderConfig) -> FeedResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Imports a feed from a string
    pub fn import_string(&self, xml: &str) -> FeedResult<Feed> {
        self.import(xml, None)
    }

    /// Imports a feed fetched from `retrieval_url`.
    ///
    /// The URL is the last fallback when resolving relative links.
    pub fn import_string_with_source(&self, xml: &str, retrieval_url: &str) -> FeedResult<Feed> {
        self.import(xml, Some(retrieval_url.to_string()))
    }

    /// Imports a feed from UTF-8 bytes
    pub fn import_bytes(&self, bytes: &[u8]) -> FeedResult<Feed> {
        self.check_size(bytes.len())?;
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| FeedError::InvalidXml(format!("document is not UTF-8: {}", e)))?;
        self.import(xml, None)
    }

    /// Imports a feed from a file
    pub fn import_file(&self, path: impl AsRef<Path>) -> FeedResult<Feed> {
        let path = path.as_ref();
        log::debug!("Importing feed from {}", path.display());
        let bytes = fs::read(path)?;
        self.import_bytes(&bytes)
    }

    fn check_size(&self, size: usize) -> FeedResult<()> {
        let limit = self.config.max_document_size;
        if size > limit {
            log::warn!("Rejecting {} byte document (limit {})", size, limit);
            return Err(FeedError::DocumentTooLarge { size, limit });
        }
        Ok(())
    }

    fn import(&self, xml: &str, retrieval_url: Option<String>) -> FeedResult<Feed> {
        self.check_size(xml.len())?;
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let document = Document::parse(xml)?;
        Feed::from_document(document, self.config.clone(), retrieval_url)
    }
}

/// Imports a feed from a string with the default configuration
pub fn import_string(xml: &str) -> FeedResult<Feed> {
    Reader::default().import_string(xml)
}

/// Imports a feed from a file with the default configuration
pub fn import_file(path: impl AsRef<Path>) -> FeedResult<Feed> {
    Reader::default().import_file(path)
}
