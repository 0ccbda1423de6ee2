// crates/feed-reader/src/resolver.rs
//! Field resolution engine
//!
//! Walks the [`Chain`](crate::strategy) for a field against one entry node and
//! post-processes what it finds. Memoization lives in the entry, not here.

use crate::config::ReaderConfig;
use crate::date::{parse_date, DateProfile};
use crate::document::{resolve_reference, Document, Node};
use crate::error::QueryError;
use crate::model::{Author, Categories, Category, Enclosure};
use crate::namespaces::Namespaces;
use crate::query::QueryAdapter;
use crate::strategy::{self, Combine, Field, Source};
use crate::version::{FeedVersion, VersionFamily};
use base64::Engine;
use chrono::{DateTime, Utc};
use quick_xml::escape::partial_escape;
use serde::Serialize;

/// The resolved value of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedValue {
    /// The field is not present (or held an unparseable date)
    Absent,
    Text(String),
    Date(DateTime<Utc>),
    Authors(Vec<Author>),
    Links(Vec<String>),
    Categories(Categories),
    Enclosure(Enclosure),
    Count(u64),
}

impl ResolvedValue {
    /// Returns true for [`ResolvedValue::Absent`]
    pub fn is_absent(&self) -> bool {
        matches!(self, ResolvedValue::Absent)
    }

    /// Text value, `None` for any other variant
    pub fn into_text(self) -> Option<String> {
        match self {
            ResolvedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Timestamp, `None` when absent or unparseable
    pub fn into_date(self) -> Option<DateTime<Utc>> {
        match self {
            ResolvedValue::Date(date) => Some(date),
            _ => None,
        }
    }

    /// Authors, empty unless the value holds some
    pub fn into_authors(self) -> Vec<Author> {
        match self {
            ResolvedValue::Authors(authors) => authors,
            _ => Vec::new(),
        }
    }

    /// Resolved link URLs, empty unless the value holds some
    pub fn into_links(self) -> Vec<String> {
        match self {
            ResolvedValue::Links(links) => links,
            _ => Vec::new(),
        }
    }

    /// Categories, empty unless the value holds some
    pub fn into_categories(self) -> Categories {
        match self {
            ResolvedValue::Categories(categories) => categories,
            _ => Categories::new(),
        }
    }

    /// Enclosure, `None` for any other variant
    pub fn into_enclosure(self) -> Option<Enclosure> {
        match self {
            ResolvedValue::Enclosure(enclosure) => Some(enclosure),
            _ => None,
        }
    }

    /// Comment count, `None` for any other variant
    pub fn into_count(self) -> Option<u64> {
        match self {
            ResolvedValue::Count(count) => Some(count),
            _ => None,
        }
    }

    /// Appends list-valued results; scalars keep the first value
    fn append(self, other: ResolvedValue) -> ResolvedValue {
        match (self, other) {
            (ResolvedValue::Absent, other) => other,
            (ResolvedValue::Categories(mut a), ResolvedValue::Categories(b)) => {
                a.extend(b);
                ResolvedValue::Categories(a)
            }
            (ResolvedValue::Authors(mut a), ResolvedValue::Authors(b)) => {
                a.extend(b);
                ResolvedValue::Authors(a)
            }
            (ResolvedValue::Links(mut a), ResolvedValue::Links(b)) => {
                a.extend(b);
                ResolvedValue::Links(a)
            }
            (current, _) => current,
        }
    }
}

/// Feed-level metadata, resolved once at import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedMetadata {
    pub title: Option<String>,
    pub id: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub language: Option<String>,
    pub base_url: Option<String>,
}

/// State shared read-only by a feed and all of its entries
#[derive(Debug)]
pub(crate) struct FeedContext {
    pub document: Document,
    pub version: FeedVersion,
    pub family: VersionFamily,
    pub namespaces: Namespaces,
    pub config: ReaderConfig,
    pub retrieval_url: Option<String>,
    pub metadata: FeedMetadata,
}

/// Resolves fields of a single entry node
pub(crate) struct Resolver<'c> {
    context: &'c FeedContext,
    entry: Node<'c>,
    query: QueryAdapter<'c>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<'c> Resolver<'c> {
    pub fn new(context: &'c FeedContext, entry: Node<'c>) -> Self {
        Self {
            context,
            entry,
            query: QueryAdapter::new(&context.namespaces),
        }
    }

    /// Runs the field's chain and returns the combined result
    pub fn resolve(&self, field: Field) -> Result<ResolvedValue, QueryError> {
        let chain = strategy::chain(self.context.family, field);

        match chain.combine {
            Combine::FirstMatch => {
                for source in chain.sources {
                    if let Some(value) = self.evaluate(field, source)? {
                        return Ok(value);
                    }
                }
                Ok(ResolvedValue::Absent)
            }
            Combine::Union => {
                let mut combined = ResolvedValue::Absent;
                for source in chain.sources {
                    if let Some(value) = self.evaluate(field, source)? {
                        combined = combined.append(value);
                    }
                }
                Ok(combined)
            }
        }
    }

    /// `None` when the source has nothing; `Some` ends a first-match chain
    fn evaluate(&self, field: Field, source: &Source) -> Result<Option<ResolvedValue>, QueryError> {
        match *source {
            Source::Text(path) => Ok(self.text(self.entry, path)?.map(ResolvedValue::Text)),
            Source::Date(path, profiles) => self.date(field, path, profiles),
            Source::Person {
                path,
                name,
                email,
                uri,
            } => {
                let mut authors = Vec::new();
                for node in self.query.evaluate_node_set(self.entry, path)? {
                    let author = Author {
                        name: self.first_text(node, name)?,
                        email: self.first_text(node, email)?,
                        uri: self.first_text(node, uri)?,
                    };
                    if !author.is_empty() {
                        authors.push(author);
                    }
                }
                Ok((!authors.is_empty()).then_some(ResolvedValue::Authors(authors)))
            }
            Source::Creator(path) => {
                let authors: Vec<Author> = self
                    .texts(path)?
                    .into_iter()
                    .map(Author::named)
                    .collect();
                Ok((!authors.is_empty()).then_some(ResolvedValue::Authors(authors)))
            }
            Source::RssAuthor(path) => {
                let authors: Vec<Author> = self
                    .texts(path)?
                    .iter()
                    .map(|value| Author::from_rss_author(value))
                    .filter(|author| !author.is_empty())
                    .collect();
                Ok((!authors.is_empty()).then_some(ResolvedValue::Authors(authors)))
            }
            Source::AtomContent(path) => self.atom_content(path),
            Source::Link(path) => {
                let links: Vec<String> = self
                    .texts(path)?
                    .into_iter()
                    .map(|href| self.absolutize(&href))
                    .collect();
                Ok((!links.is_empty()).then_some(ResolvedValue::Links(links)))
            }
            Source::XmlBase => Ok(match self.entry.base_uri() {
                Some(_) => self.base().map(ResolvedValue::Text),
                None => None,
            }),
            Source::RetrievalUrl => Ok(self
                .context
                .retrieval_url
                .clone()
                .map(ResolvedValue::Text)),
            Source::Category {
                path,
                term,
                scheme,
                label,
            } => {
                let mut categories = Categories::new();
                for node in self.query.evaluate_node_set(self.entry, path)? {
                    let Some(term) = self.text(node, term)? else {
                        continue;
                    };
                    let scheme = match scheme {
                        Some(p) => self.text(node, p)?,
                        None => None,
                    };
                    let label = match label {
                        Some(p) => self.text(node, p)?,
                        None => None,
                    };
                    categories.push(Category::new(term, scheme, label));
                }
                Ok((!categories.is_empty()).then_some(ResolvedValue::Categories(categories)))
            }
            Source::Enclosure {
                path,
                url,
                length,
                mime_type,
            } => {
                for node in self.query.evaluate_node_set(self.entry, path)? {
                    let Some(href) = self.text(node, url)? else {
                        continue;
                    };
                    return Ok(Some(ResolvedValue::Enclosure(Enclosure {
                        url: self.absolutize(&href),
                        length: self.text(node, length)?.and_then(|l| l.parse().ok()),
                        mime_type: self.text(node, mime_type)?,
                    })));
                }
                Ok(None)
            }
            Source::Count(path) => Ok(self
                .texts(path)?
                .iter()
                .find_map(|value| value.parse::<u64>().ok())
                .map(ResolvedValue::Count)),
        }
    }

    fn text(&self, context: Node<'_>, path: &str) -> Result<Option<String>, QueryError> {
        Ok(non_empty(self.query.evaluate_string(context, path)?))
    }

    fn texts(&self, path: &str) -> Result<Vec<String>, QueryError> {
        Ok(self
            .query
            .evaluate_strings(self.entry, path)?
            .into_iter()
            .filter_map(|value| non_empty(Some(value)))
            .collect())
    }

    fn first_text(&self, context: Node<'_>, paths: &[&str]) -> Result<Option<String>, QueryError> {
        for path in paths {
            if let Some(value) = self.text(context, path)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn date(
        &self,
        field: Field,
        path: &str,
        profiles: &[DateProfile],
    ) -> Result<Option<ResolvedValue>, QueryError> {
        let Some(raw) = self.text(self.entry, path)? else {
            return Ok(None);
        };

        let parsed = if self.context.config.lenient_dates {
            let mut all = profiles.to_vec();
            all.extend(DateProfile::ALL.iter().copied().filter(|p| !profiles.contains(p)));
            parse_date(&raw, &all)
        } else {
            parse_date(&raw, profiles)
        };

        match parsed {
            Ok(date) => Ok(Some(ResolvedValue::Date(date))),
            Err(e) => {
                log::warn!("Ignoring {:?} from {}: {}", field, path, e);
                Ok(Some(ResolvedValue::Absent))
            }
        }
    }

    fn atom_content(&self, path: &str) -> Result<Option<ResolvedValue>, QueryError> {
        let Some(node) = self.query.evaluate_node_set(self.entry, path)?.into_iter().next() else {
            return Ok(None);
        };

        let content_type = node
            .attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let mode = node.attribute("mode").map(str::trim).unwrap_or_default();
        let markup_type = content_type.contains("html");

        let content = if content_type == "xhtml"
            || content_type == "application/xhtml+xml"
            || (self.context.family == VersionFamily::Atom03 && mode == "xml" && markup_type)
        {
            match node.child_elements().next() {
                Some(wrapper) => wrapper.inner_xml(),
                None => node.inner_xml(),
            }
        } else if mode == "base64" {
            let encoded: String = node
                .text_content()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            match base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    log::warn!("Content at {} is not valid base64: {}", path, e);
                    node.text_content()
                }
            }
        } else if markup_type {
            node.text_content()
        } else {
            partial_escape(node.text_content().as_str()).into_owned()
        };

        Ok(non_empty(Some(content)).map(ResolvedValue::Text))
    }

    /// Composed `xml:base` chain, anchored at the retrieval URL
    fn base(&self) -> Option<String> {
        self.entry
            .base_uri_from(self.context.retrieval_url.as_deref())
    }

    fn absolutize(&self, href: &str) -> String {
        if !self.context.config.resolve_relative_urls {
            return href.to_string();
        }
        match self.base() {
            Some(base) => resolve_reference(&base, href),
            None => href.to_string(),
        }
    }
}
