// crates/feed-reader/src/entry.rs
//! Read-only view of one feed entry
//!
//! Fields are resolved on first access and cached for the lifetime of the
//! entry. The cache is owned by the entry, so entries never observe each
//! other's lookups.

use crate::document::NodeId;
use crate::error::{FeedResult, QueryError};
use crate::model::{Author, Categories, Enclosure};
use crate::resolver::{FeedContext, ResolvedValue, Resolver};
use crate::strategy::Field;
use crate::version::FeedVersion;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A single entry (Atom `entry`, RSS `item`) of a feed
pub struct Entry {
    context: Rc<FeedContext>,
    node: NodeId,
    index: usize,
    cache: RefCell<HashMap<Field, Result<ResolvedValue, QueryError>>>,
    lookups: Cell<usize>,
}

impl Entry {
    pub(crate) fn new(context: Rc<FeedContext>, node: NodeId, index: usize) -> Self {
        Self {
            context,
            node,
            index,
            cache: RefCell::new(HashMap::new()),
            lookups: Cell::new(0),
        }
    }

    /// Position of this entry within its feed
    pub fn index(&self) -> usize {
        self.index
    }

    /// Version of the feed this entry came from
    pub fn version(&self) -> FeedVersion {
        self.context.version
    }

    /// Number of fields resolved against the document so far
    ///
    /// Cached fields do not count again, so this never exceeds the number of
    /// distinct fields accessed.
    pub fn document_lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Resolves a field, consulting the document only on first access
    pub fn resolve(&self, field: Field) -> FeedResult<ResolvedValue> {
        if let Some(cached) = self.cache.borrow().get(&field) {
            log::trace!("Entry {}: {:?} served from cache", self.index, field);
            return Ok(cached.clone()?);
        }

        log::trace!("Entry {}: resolving {:?}", self.index, field);
        self.lookups.set(self.lookups.get() + 1);
        let entry = self.context.document.node(self.node);
        let outcome = Resolver::new(&self.context, entry).resolve(field);
        if let Err(e) = &outcome {
            log::debug!("Entry {}: {:?} failed: {}", self.index, field, e);
        }

        self.cache.borrow_mut().insert(field, outcome.clone());
        Ok(outcome?)
    }

    /// Unique identifier
    pub fn id(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::Id)?.into_text())
    }

    /// Title
    pub fn title(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::Title)?.into_text())
    }

    /// Publication date; `None` when missing or unparseable
    pub fn date_created(&self) -> FeedResult<Option<DateTime<Utc>>> {
        Ok(self.resolve(Field::DateCreated)?.into_date())
    }

    /// Last modification date; `None` when missing or unparseable
    pub fn date_modified(&self) -> FeedResult<Option<DateTime<Utc>>> {
        Ok(self.resolve(Field::DateModified)?.into_date())
    }

    /// All authors in document order
    pub fn authors(&self) -> FeedResult<Vec<Author>> {
        Ok(self.resolve(Field::Authors)?.into_authors())
    }

    /// The first author
    pub fn author(&self) -> FeedResult<Option<Author>> {
        Ok(self.authors()?.into_iter().next())
    }

    /// Summary text
    pub fn description(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::Description)?.into_text())
    }

    /// Full content, falling back to the description
    pub fn content(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::Content)?.into_text())
    }

    /// Alternate links, resolved against the entry base
    pub fn links(&self) -> FeedResult<Vec<String>> {
        Ok(self.resolve(Field::Links)?.into_links())
    }

    /// The first alternate link
    pub fn link(&self) -> FeedResult<Option<String>> {
        Ok(self.links()?.into_iter().next())
    }

    /// Permanent link to the entry
    pub fn permalink(&self) -> FeedResult<Option<String>> {
        self.link()
    }

    /// Base URL relative links resolve against
    pub fn base_url(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::BaseUrl)?.into_text())
    }

    /// HTML page holding the entry's comments
    pub fn comment_link(&self) -> FeedResult<Option<String>> {
        Ok(self.resolve(Field::CommentLink)?.into_links().into_iter().next())
    }

    /// Feed of the entry's comments
    pub fn comment_feed_link(&self) -> FeedResult<Option<String>> {
        Ok(self
            .resolve(Field::CommentFeedLink)?
            .into_links()
            .into_iter()
            .next())
    }

    /// Number of comments, when the feed reports one
    pub fn comment_count(&self) -> FeedResult<Option<u64>> {
        Ok(self.resolve(Field::CommentCount)?.into_count())
    }

    /// Categories from every applicable source, concatenated
    pub fn categories(&self) -> FeedResult<Categories> {
        Ok(self.resolve(Field::Categories)?.into_categories())
    }

    /// First media enclosure
    pub fn enclosure(&self) -> FeedResult<Option<Enclosure>> {
        Ok(self.resolve(Field::Enclosure)?.into_enclosure())
    }

    /// Title of the feed this entry belongs to
    pub fn feed_title(&self) -> Option<&str> {
        self.context.metadata.title.as_deref()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("index", &self.index)
            .field("version", &self.context.version)
            .field("cached_fields", &self.cache.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::reader::import_string;
    use crate::strategy::Field;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed Title</title>
  <entry>
    <id>1</id>
    <title>Entry Title</title>
  </entry>
  <entry>
    <id>2</id>
  </entry>
</feed>"#;

    #[test]
    fn test_repeated_access_hits_cache() {
        let feed = import_string(ATOM).expect("Should import");
        let entry = feed.first().expect("Should have entry");

        assert_eq!(entry.document_lookups(), 0);
        let first = entry.title().expect("Should resolve");
        let second = entry.title().expect("Should resolve");
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("Entry Title"));
        assert_eq!(entry.document_lookups(), 1);
    }

    #[test]
    fn test_absence_is_cached() {
        let feed = import_string(ATOM).expect("Should import");
        let entry = feed.get(1).expect("Should have entry");

        assert_eq!(entry.title().expect("Should resolve"), None);
        assert_eq!(entry.title().expect("Should resolve"), None);
        assert_eq!(entry.document_lookups(), 1);
    }

    #[test]
    fn test_entries_have_independent_caches() {
        let feed = import_string(ATOM).expect("Should import");
        let first = feed.get(0).expect("Should have entry");
        let second = feed.get(1).expect("Should have entry");

        assert_eq!(first.id().expect("Should resolve").as_deref(), Some("1"));
        assert_eq!(second.document_lookups(), 0);
        assert_eq!(second.id().expect("Should resolve").as_deref(), Some("2"));
    }

    #[test]
    fn test_derived_getters_share_cache_slot() {
        let feed = import_string(ATOM).expect("Should import");
        let entry = feed.first().expect("Should have entry");

        entry.authors().expect("Should resolve");
        entry.author().expect("Should resolve");
        entry.links().expect("Should resolve");
        entry.link().expect("Should resolve");
        entry.permalink().expect("Should resolve");
        assert_eq!(entry.document_lookups(), 2);
    }

    #[test]
    fn test_resolve_every_field_once() {
        let feed = import_string(ATOM).expect("Should import");
        let entry = feed.first().expect("Should have entry");

        for field in Field::ALL {
            entry.resolve(field).expect("Should resolve");
        }
        for field in Field::ALL {
            entry.resolve(field).expect("Should resolve");
        }
        assert_eq!(entry.document_lookups(), Field::ALL.len());
        assert_eq!(entry.feed_title(), Some("Feed Title"));
        assert_eq!(entry.index(), 0);
    }
}
