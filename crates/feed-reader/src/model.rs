// crates/feed-reader/src/model.rs
//! Value types returned by entry and feed getters

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A person credited on an entry
///
/// Every sub-field is optional: a source element may carry any subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Home page or profile URI
    pub uri: Option<String>,
}

impl Author {
    /// Creates an author with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns true when no sub-field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.uri.is_none()
    }

    /// Splits the RSS `author` form `email (Name)`.
    ///
    /// A bare address yields only `email`; anything else is kept as the name.
    pub fn from_rss_author(value: &str) -> Self {
        let value = value.trim();
        if let Some((email, rest)) = value.split_once('(') {
            if let Some(name) = rest.trim_end().strip_suffix(')') {
                let email = email.trim();
                return Self {
                    name: non_empty(name),
                    email: non_empty(email),
                    uri: None,
                };
            }
        }
        if value.contains('@') && !value.contains(char::is_whitespace) {
            return Self {
                email: non_empty(value),
                ..Self::default()
            };
        }
        Self {
            name: non_empty(value),
            ..Self::default()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A category assigned to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Machine-readable term
    pub term: String,
    /// Categorization scheme, if any
    pub scheme: Option<String>,
    /// Human-readable label; equals `term` unless the source gave one
    pub label: String,
}

impl Category {
    /// Creates a category; the label falls back to the term
    pub fn new(term: impl Into<String>, scheme: Option<String>, label: Option<String>) -> Self {
        let term = term.into();
        let label = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| term.clone());
        Self { term, scheme, label }
    }
}

/// Ordered categories of an entry
///
/// Sources are concatenated without merging, so the same term may appear more
/// than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories(Vec<Category>);

impl Categories {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category
    pub fn push(&mut self, category: Category) {
        self.0.push(category);
    }

    /// Labels in first-occurrence order, each label listed once
    pub fn values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = Vec::with_capacity(self.0.len());
        for category in &self.0 {
            if !values.contains(&category.label.as_str()) {
                values.push(category.label.as_str());
            }
        }
        values
    }

    /// Consumes the collection, returning the categories
    pub fn into_vec(self) -> Vec<Category> {
        self.0
    }
}

impl Deref for Categories {
    type Target = [Category];

    fn deref(&self) -> &[Category] {
        &self.0
    }
}

impl From<Vec<Category>> for Categories {
    fn from(categories: Vec<Category>) -> Self {
        Self(categories)
    }
}

impl FromIterator<Category> for Categories {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Category> for Categories {
    fn extend<I: IntoIterator<Item = Category>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Categories {
    type Item = Category;
    type IntoIter = std::vec::IntoIter<Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Media enclosure (typically audio or video)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    /// URL to the media file
    pub url: String,
    /// File size in bytes
    pub length: Option<u64>,
    /// MIME type (e.g., "audio/mpeg")
    pub mime_type: Option<String>,
}

impl Enclosure {
    /// Creates a new enclosure
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            length: None,
            mime_type: None,
        }
    }

    /// Returns true if this is an audio enclosure
    pub fn is_audio(&self) -> bool {
        self.mime_type
            .as_ref()
            .map_or(false, |mime| mime.starts_with("audio/"))
    }

    /// Returns true if this is a video enclosure
    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_ref()
            .map_or(false, |mime| mime.starts_with("video/"))
    }
}
