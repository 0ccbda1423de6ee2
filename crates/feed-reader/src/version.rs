// crates/feed-reader/src/version.rs
//! Feed version detection

use crate::document::Document;
use crate::error::{FeedError, FeedResult};
use crate::namespaces::{self, Namespaces};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntactic dialect of a feed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedVersion {
    /// Atom 0.3 (`http://purl.org/atom/ns#`)
    Atom03,
    /// Atom 1.0 (RFC 4287)
    Atom10,
    /// RSS 0.90 (RDF based)
    Rss090,
    /// RSS 0.91
    Rss091,
    /// RSS 0.92
    Rss092,
    /// RSS 0.93
    Rss093,
    /// RSS 0.94
    Rss094,
    /// RSS 1.0 (RDF based)
    Rss10,
    /// RSS 2.0
    Rss20,
    /// Not a recognized feed dialect
    Unknown,
}

/// Versions that share one set of field strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionFamily {
    Atom10,
    Atom03,
    /// RSS 0.91 through 2.0, elements without a namespace
    Rss,
    /// RSS 0.90 and 1.0, wrapped in `rdf:RDF`
    RssRdf,
}

impl FeedVersion {
    /// Classifies a document, returning `Unknown` when nothing matches
    pub fn classify(document: &Document) -> FeedVersion {
        let root = document.root();

        match (root.namespace(), root.local_name()) {
            (Some(namespaces::ATOM_10), "feed") => FeedVersion::Atom10,
            (Some(namespaces::ATOM_03), "feed") => FeedVersion::Atom03,
            (None, "rss") => match root.attribute("version").map(str::trim) {
                Some("0.91") => FeedVersion::Rss091,
                Some("0.92") => FeedVersion::Rss092,
                Some("0.93") => FeedVersion::Rss093,
                Some("0.94") => FeedVersion::Rss094,
                _ => FeedVersion::Rss20,
            },
            (Some(namespaces::RDF), "RDF") => root
                .child_elements()
                .filter(|child| child.local_name() == "channel")
                .find_map(|channel| match channel.namespace() {
                    Some(namespaces::RSS_10) => Some(FeedVersion::Rss10),
                    Some(namespaces::RSS_090) => Some(FeedVersion::Rss090),
                    _ => None,
                })
                .unwrap_or(FeedVersion::Unknown),
            _ => FeedVersion::Unknown,
        }
    }

    /// Detects the version of a document
    pub fn detect(document: &Document) -> FeedResult<FeedVersion> {
        match Self::classify(document) {
            FeedVersion::Unknown => {
                let root = document.root();
                let name = match root.namespace() {
                    Some(ns) => format!("{{{}}}{}", ns, root.local_name()),
                    None => root.local_name().to_string(),
                };
                Err(FeedError::UnrecognizedFormat(format!(
                    "root element <{}> is not a known feed type",
                    name
                )))
            }
            version => Ok(version),
        }
    }

    /// Returns the family whose strategies apply, `None` for `Unknown`
    pub fn family(self) -> Option<VersionFamily> {
        match self {
            FeedVersion::Atom10 => Some(VersionFamily::Atom10),
            FeedVersion::Atom03 => Some(VersionFamily::Atom03),
            FeedVersion::Rss091
            | FeedVersion::Rss092
            | FeedVersion::Rss093
            | FeedVersion::Rss094
            | FeedVersion::Rss20 => Some(VersionFamily::Rss),
            FeedVersion::Rss090 | FeedVersion::Rss10 => Some(VersionFamily::RssRdf),
            FeedVersion::Unknown => None,
        }
    }

    /// Returns true for both Atom versions
    pub fn is_atom(self) -> bool {
        matches!(self, FeedVersion::Atom03 | FeedVersion::Atom10)
    }

    /// Returns true for every RSS version
    pub fn is_rss(self) -> bool {
        matches!(
            self.family(),
            Some(VersionFamily::Rss) | Some(VersionFamily::RssRdf)
        )
    }

    /// Prefix bindings registered for queries against this version
    pub fn namespaces(self) -> Namespaces {
        let common = Namespaces::common();
        match self {
            FeedVersion::Atom10 => common.bind("atom", namespaces::ATOM_10).bind("rss", ""),
            FeedVersion::Atom03 => common.bind("atom", namespaces::ATOM_03).bind("rss", ""),
            FeedVersion::Rss10 => common.bind("atom", namespaces::ATOM_10).bind("rss", namespaces::RSS_10),
            FeedVersion::Rss090 => common
                .bind("atom", namespaces::ATOM_10)
                .bind("rss", namespaces::RSS_090),
            _ => common.bind("atom", namespaces::ATOM_10).bind("rss", ""),
        }
    }

    /// Absolute path selecting the feed-level element
    pub(crate) fn channel_path(self) -> &'static str {
        match self.family() {
            Some(VersionFamily::Atom10) | Some(VersionFamily::Atom03) => "/atom:feed",
            Some(VersionFamily::Rss) => "/rss:rss/rss:channel",
            Some(VersionFamily::RssRdf) => "/rdf:RDF/rss:channel",
            None => "/*",
        }
    }

    /// Absolute path selecting every entry element in document order
    pub(crate) fn entry_path(self) -> &'static str {
        match self.family() {
            Some(VersionFamily::Atom10) | Some(VersionFamily::Atom03) => "/atom:feed/atom:entry",
            Some(VersionFamily::Rss) => "/rss:rss/rss:channel/rss:item",
            Some(VersionFamily::RssRdf) => "/rdf:RDF/rss:item",
            None => "/*/entry",
        }
    }

    /// Short identifier, e.g. `atom-10`
    pub fn as_str(self) -> &'static str {
        match self {
            FeedVersion::Atom03 => "atom-03",
            FeedVersion::Atom10 => "atom-10",
            FeedVersion::Rss090 => "rss-090",
            FeedVersion::Rss091 => "rss-091",
            FeedVersion::Rss092 => "rss-092",
            FeedVersion::Rss093 => "rss-093",
            FeedVersion::Rss094 => "rss-094",
            FeedVersion::Rss10 => "rss-10",
            FeedVersion::Rss20 => "rss-20",
            FeedVersion::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FeedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(xml: &str) -> FeedResult<FeedVersion> {
        let doc = Document::parse(xml).expect("Should parse XML");
        FeedVersion::detect(&doc)
    }

    #[test]
    fn test_detect_atom_versions() {
        let atom10 = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
        let atom03 = r#"<feed xmlns="http://purl.org/atom/ns#" version="0.3"></feed>"#;
        assert_eq!(detect(atom10).expect("Should detect"), FeedVersion::Atom10);
        assert_eq!(detect(atom03).expect("Should detect"), FeedVersion::Atom03);
    }

    #[test]
    fn test_detect_prefixed_atom_root() {
        let atom = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom"></a:feed>"#;
        assert_eq!(detect(atom).expect("Should detect"), FeedVersion::Atom10);
    }

    #[test]
    fn test_detect_rss_versions() {
        let rss = |v: &str| format!(r#"<rss version="{}"><channel></channel></rss>"#, v);
        assert_eq!(detect(&rss("2.0")).expect("Should detect"), FeedVersion::Rss20);
        assert_eq!(detect(&rss("0.91")).expect("Should detect"), FeedVersion::Rss091);
        assert_eq!(detect(&rss("0.94")).expect("Should detect"), FeedVersion::Rss094);
        assert_eq!(
            detect("<rss><channel/></rss>").expect("Should detect"),
            FeedVersion::Rss20
        );
    }

    #[test]
    fn test_detect_rdf_versions() {
        let rss10 = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/"><channel/></rdf:RDF>"#;
        let rss090 = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://my.netscape.com/rdf/simple/0.9/"><channel/></rdf:RDF>"#;
        assert_eq!(detect(rss10).expect("Should detect"), FeedVersion::Rss10);
        assert_eq!(detect(rss090).expect("Should detect"), FeedVersion::Rss090);
    }

    #[test]
    fn test_unrecognized_format() {
        let result = detect("<html><body/></html>");
        assert!(matches!(result, Err(FeedError::UnrecognizedFormat(ref msg)) if msg.contains("html")));

        let wrong_ns = detect(r#"<feed xmlns="http://example.com/not-atom"/>"#);
        assert!(matches!(wrong_ns, Err(FeedError::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_classify_unknown_is_lenient() {
        let doc = Document::parse("<html/>").expect("Should parse XML");
        assert_eq!(FeedVersion::classify(&doc), FeedVersion::Unknown);
        assert_eq!(FeedVersion::Unknown.family(), None);
    }

    #[test]
    fn test_namespaces_follow_version() {
        assert_eq!(
            FeedVersion::Atom03.namespaces().uri("atom"),
            Some(namespaces::ATOM_03)
        );
        assert_eq!(FeedVersion::Rss20.namespaces().uri("rss"), Some(""));
        assert_eq!(
            FeedVersion::Rss10.namespaces().uri("rss"),
            Some(namespaces::RSS_10)
        );
    }

    #[test]
    fn test_families() {
        assert!(FeedVersion::Atom03.is_atom());
        assert!(FeedVersion::Rss092.is_rss());
        assert!(!FeedVersion::Unknown.is_rss());
        assert_eq!(FeedVersion::Rss10.family(), Some(VersionFamily::RssRdf));
        assert_eq!(FeedVersion::Rss20.to_string(), "rss-20");
    }
}
