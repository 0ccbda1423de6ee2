// crates/feed-reader/src/feed.rs
//! Feed facade: feed-level metadata plus the ordered entries

use crate::config::ReaderConfig;
use crate::document::{resolve_reference, Document, Node};
use crate::entry::Entry;
use crate::error::{FeedError, FeedResult};
use crate::query::QueryAdapter;
use crate::resolver::{FeedContext, FeedMetadata};
use crate::version::{FeedVersion, VersionFamily};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A parsed feed with metadata and entries
pub struct Feed {
    context: Rc<FeedContext>,
    entries: Vec<Entry>,
}

impl Feed {
    /// Builds the feed for an already parsed document
    pub(crate) fn from_document(
        document: Document,
        config: ReaderConfig,
        retrieval_url: Option<String>,
    ) -> FeedResult<Self> {
        let version = FeedVersion::detect(&document)?;
        let family = version
            .family()
            .ok_or_else(|| FeedError::UnrecognizedFormat(version.to_string()))?;
        let namespaces = version.namespaces();

        let (metadata, entry_nodes) = {
            let query = QueryAdapter::new(&namespaces);
            let root = document.root();
            let channel = query
                .evaluate_node_set(root, version.channel_path())?
                .into_iter()
                .next();
            let metadata = match channel {
                Some(channel) => read_metadata(&query, family, channel, retrieval_url.as_deref())?,
                None => FeedMetadata::default(),
            };
            let nodes: Vec<_> = query
                .evaluate_node_set(root, version.entry_path())?
                .iter()
                .map(Node::id)
                .collect();
            (metadata, nodes)
        };

        log::debug!(
            "Imported {} feed with {} entries",
            version,
            entry_nodes.len()
        );

        let context = Rc::new(FeedContext {
            document,
            version,
            family,
            namespaces,
            config,
            retrieval_url,
            metadata,
        });

        let entries = entry_nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Entry::new(Rc::clone(&context), node, index))
            .collect();

        Ok(Self { context, entries })
    }

    /// Detected feed version
    pub fn version(&self) -> FeedVersion {
        self.context.version
    }

    /// Feed title
    pub fn title(&self) -> Option<&str> {
        self.context.metadata.title.as_deref()
    }

    /// Feed identifier (Atom `id`)
    pub fn id(&self) -> Option<&str> {
        self.context.metadata.id.as_deref()
    }

    /// Feed description or subtitle
    pub fn description(&self) -> Option<&str> {
        self.context.metadata.description.as_deref()
    }

    /// Link to the site the feed describes
    pub fn link(&self) -> Option<&str> {
        self.context.metadata.link.as_deref()
    }

    /// Feed language
    pub fn language(&self) -> Option<&str> {
        self.context.metadata.language.as_deref()
    }

    /// Feed-level base URL (`xml:base`, else the retrieval URL)
    pub fn base_url(&self) -> Option<&str> {
        self.context.metadata.base_url.as_deref()
    }

    /// URL the document was retrieved from, if the caller supplied one
    pub fn retrieval_url(&self) -> Option<&str> {
        self.context.retrieval_url.as_deref()
    }

    /// Namespace declarations on the document's root element
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        self.context.document.namespaces()
    }

    /// Returns the number of entries in the feed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the feed has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// The first entry
    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// All entries in document order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the entries; every call starts from the first entry
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("version", &self.context.version)
            .field("title", &self.context.metadata.title)
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn first_text(
    query: &QueryAdapter<'_>,
    node: Node<'_>,
    paths: &[&str],
) -> FeedResult<Option<String>> {
    for path in paths {
        if let Some(value) = query.evaluate_string(node, path)? {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
        }
    }
    Ok(None)
}

fn read_metadata(
    query: &QueryAdapter<'_>,
    family: VersionFamily,
    channel: Node<'_>,
    retrieval_url: Option<&str>,
) -> FeedResult<FeedMetadata> {
    let (title, id, description, link, language): (&[&str], &[&str], &[&str], &[&str], &[&str]) =
        match family {
            VersionFamily::Atom10 | VersionFamily::Atom03 => (
                &["atom:title", "dc11:title", "dc10:title"],
                &["atom:id"],
                &["atom:subtitle", "atom:tagline", "dc11:description"],
                &[
                    "atom:link[@rel='alternate']/@href",
                    "atom:link[not(@rel)]/@href",
                ],
                &["@xml:lang", "dc11:language", "dc10:language"],
            ),
            VersionFamily::Rss | VersionFamily::RssRdf => (
                &["rss:title", "dc11:title", "dc10:title"],
                &["atom:id", "rss:guid"],
                &["rss:description", "dc11:description", "dc10:description"],
                &["rss:link", "atom:link[@rel='alternate']/@href"],
                &["rss:language", "dc11:language", "dc10:language"],
            ),
        };

    let base_url = channel.base_uri_from(retrieval_url);
    let link = first_text(query, channel, link)?.map(|href| match &base_url {
        Some(base) => resolve_reference(base, &href),
        None => href,
    });

    Ok(FeedMetadata {
        title: first_text(query, channel, title)?,
        id: first_text(query, channel, id)?,
        description: first_text(query, channel, description)?,
        link,
        language: first_text(query, channel, language)?,
        base_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(xml: &str) -> Feed {
        let document = Document::parse(xml).expect("Should parse");
        Feed::from_document(document, ReaderConfig::default(), None).expect("Should build feed")
    }

    #[test]
    fn test_atom_metadata() {
        let feed = feed(
            r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en" xml:base="http://www.example.com/">
  <title>Feed Title</title>
  <subtitle>Feed Subtitle</subtitle>
  <id>urn:feed</id>
  <link rel="alternate" href="blog"/>
</feed>"#,
        );
        assert_eq!(feed.version(), FeedVersion::Atom10);
        assert_eq!(feed.title(), Some("Feed Title"));
        assert_eq!(feed.description(), Some("Feed Subtitle"));
        assert_eq!(feed.id(), Some("urn:feed"));
        assert_eq!(feed.link(), Some("http://www.example.com/blog"));
        assert_eq!(feed.language(), Some("en"));
        assert_eq!(feed.base_url(), Some("http://www.example.com/"));
        assert!(feed.is_empty());
    }

    #[test]
    fn test_rss_metadata() {
        let feed = feed(
            r#"<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <link>http://example.com</link>
    <language>en-us</language>
    <item><title>One</title></item>
  </channel>
</rss>"#,
        );
        assert_eq!(feed.version(), FeedVersion::Rss20);
        assert_eq!(feed.title(), Some("Test Feed"));
        assert_eq!(feed.description(), Some("A test feed"));
        assert_eq!(feed.link(), Some("http://example.com"));
        assert_eq!(feed.language(), Some("en-us"));
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let feed = feed(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><id>1</id></entry>
  <entry><id>2</id></entry>
</feed>"#,
        );
        let first: Vec<usize> = feed.iter().map(Entry::index).collect();
        let second: Vec<usize> = (&feed).into_iter().map(Entry::index).collect();
        assert_eq!(first, vec![0, 1]);
        assert_eq!(first, second);
        assert!(std::ptr::eq(feed.first().expect("Should have entry"), &feed.entries()[0]));
    }

    #[test]
    fn test_unknown_document_is_rejected() {
        let document = Document::parse("<html/>").expect("Should parse");
        let result = Feed::from_document(document, ReaderConfig::default(), None);
        assert!(matches!(result, Err(FeedError::UnrecognizedFormat(_))));
    }
}
