// crates/feed-reader/src/lib.rs
//! Entry-field resolution for Atom 0.3, Atom 1.0 and RSS feeds
//!
//! This crate reads a syndication document into a read-only tree and
//! exposes each entry through one uniform API, whatever the feed format:
//! - Atom 1.0 and Atom 0.3
//! - RSS 0.90 through 2.0, including RDF-wrapped RSS 1.0
//! - Dublin Core, content, thread, slash and wfw extensions
//!
//! Field values are resolved lazily and cached per entry.
//!
//! # Example
//!
//! ```rust
//! use syndic_reader::import_string;
//!
//! let atom = r#"<?xml version="1.0"?>
//! <feed xmlns="http://www.w3.org/2005/Atom">
//!   <title>My Blog</title>
//!   <entry>
//!     <id>urn:post:1</id>
//!     <title>First post</title>
//!     <updated>2024-01-01T12:00:00Z</updated>
//!     <link rel="alternate" href="http://example.com/1"/>
//!   </entry>
//! </feed>"#;
//!
//! let feed = import_string(atom).expect("Failed to import feed");
//! for entry in &feed {
//!     let title = entry.title().expect("Failed to resolve title");
//!     println!("{:?} -> {:?}", title, entry.link().expect("Failed to resolve link"));
//! }
//! ```

mod config;
mod date;
mod document;
mod entry;
mod error;
mod feed;
mod model;
pub mod namespaces;
mod query;
mod reader;
mod resolver;
mod strategy;
mod version;

pub use config::{ReaderConfig, DEFAULT_MAX_DOCUMENT_SIZE};
pub use date::{parse_date, DateProfile};
pub use document::{Attribute, Document, Node, NodeId};
pub use entry::Entry;
pub use error::{FeedError, FeedResult, QueryError};
pub use feed::Feed;
pub use model::{Author, Categories, Category, Enclosure};
pub use namespaces::Namespaces;
pub use query::{Path, QueryAdapter};
pub use reader::{import_file, import_string, Reader};
pub use resolver::ResolvedValue;
pub use strategy::Field;
pub use version::{FeedVersion, VersionFamily};
