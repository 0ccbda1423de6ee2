// crates/feed-reader/src/namespaces.rs
//! Namespace URIs and the prefix bindings used by queries

use crate::document::{XHTML_NS, XML_NS};
use std::collections::BTreeMap;

pub const ATOM_10: &str = "http://www.w3.org/2005/Atom";
pub const ATOM_03: &str = "http://purl.org/atom/ns#";
pub const DC_10: &str = "http://purl.org/dc/elements/1.0/";
pub const DC_11: &str = "http://purl.org/dc/elements/1.1/";
pub const CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
pub const ITUNES: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const MEDIA: &str = "http://search.yahoo.com/mrss/";
pub const THREAD: &str = "http://purl.org/syndication/thread/1.0";
pub const SLASH: &str = "http://purl.org/rss/1.0/modules/slash/";
pub const WFW: &str = "http://wellformedweb.org/CommentAPI/";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RSS_10: &str = "http://purl.org/rss/1.0/";
pub const RSS_090: &str = "http://my.netscape.com/rdf/simple/0.9/";

/// Prefix → namespace URI table registered for one feed version.
///
/// A prefix bound to the empty string selects names without a namespace, so
/// RSS 2.0 queries can share the `rss:` prefix with the RDF-based versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    bindings: BTreeMap<&'static str, &'static str>,
}

impl Namespaces {
    /// Bindings shared by every feed version
    pub fn common() -> Self {
        let bindings = [
            ("atom03", ATOM_03),
            ("atom10", ATOM_10),
            ("dc10", DC_10),
            ("dc11", DC_11),
            ("content", CONTENT),
            ("xhtml", XHTML_NS),
            ("itunes", ITUNES),
            ("media", MEDIA),
            ("thr", THREAD),
            ("slash", SLASH),
            ("wfw", WFW),
            ("rdf", RDF),
            ("xml", XML_NS),
        ]
        .into_iter()
        .collect();

        Self { bindings }
    }

    /// Adds or replaces a binding
    pub fn bind(mut self, prefix: &'static str, uri: &'static str) -> Self {
        self.bindings.insert(prefix, uri);
        self
    }

    /// Returns the URI bound to `prefix`
    pub fn uri(&self, prefix: &str) -> Option<&'static str> {
        self.bindings.get(prefix).copied()
    }

    /// Iterates over all bindings in prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.bindings.iter().map(|(prefix, uri)| (*prefix, *uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_bindings() {
        let ns = Namespaces::common();
        assert_eq!(ns.uri("dc11"), Some(DC_11));
        assert_eq!(ns.uri("xml"), Some(XML_NS));
        assert_eq!(ns.uri("atom"), None);
    }

    #[test]
    fn test_bind_overrides() {
        let ns = Namespaces::common().bind("atom", ATOM_03).bind("atom", ATOM_10);
        assert_eq!(ns.uri("atom"), Some(ATOM_10));
        assert!(ns.iter().any(|(prefix, _)| prefix == "atom"));
    }
}
