// crates/feed-reader/tests/integration_tests.rs
//! Integration tests for importing feeds

use std::io::Write;
use syndic_reader::{
    import_file, import_string, Document, FeedError, FeedVersion, Field, QueryAdapter, Reader,
    ReaderConfig, ResolvedValue,
};
use tempfile::NamedTempFile;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xml:base="http://www.example.com/">
  <title>Engineering Notes</title>
  <subtitle>Notes from the team</subtitle>
  <link rel="alternate" href="blog/"/>
  <entry>
    <id>urn:notes:1</id>
    <title>First</title>
    <link href="posts/1"/>
    <updated>2024-01-10T12:00:00Z</updated>
  </entry>
  <entry>
    <id>urn:notes:2</id>
    <title>Second</title>
    <updated>Wed, 10 Jan 2024 12:00:00 GMT</updated>
  </entry>
</feed>"#;

#[test]
fn test_import_file() {
    init_logging();

    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(ATOM.as_bytes()).expect("Should write feed");

    let feed = import_file(file.path()).expect("Should import file");
    assert_eq!(feed.version(), FeedVersion::Atom10);
    assert_eq!(feed.title(), Some("Engineering Notes"));
    assert_eq!(feed.description(), Some("Notes from the team"));
    assert_eq!(feed.link(), Some("http://www.example.com/blog/"));
    assert_eq!(feed.len(), 2);

    let entry = feed.first().expect("Should have entry");
    assert_eq!(
        entry.link().expect("Should resolve").as_deref(),
        Some("http://www.example.com/posts/1")
    );
}

#[test]
fn test_config_file_drives_reader() {
    init_logging();

    let mut file = NamedTempFile::new().expect("Should create temp file");
    writeln!(file, "lenient_dates = true").expect("Should write config");

    let config = ReaderConfig::load(file.path()).expect("Should load config");
    assert!(config.lenient_dates);
    assert!(config.resolve_relative_urls);

    let strict = import_string(ATOM).expect("Should import");
    let lenient = Reader::new(config)
        .expect("Valid config")
        .import_string(ATOM)
        .expect("Should import");

    let second = |feed: &syndic_reader::Feed| {
        feed.get(1)
            .expect("Should have entry")
            .date_modified()
            .expect("Should resolve")
    };
    assert_eq!(second(&strict), None);
    assert!(second(&lenient).is_some());
}

#[test]
fn test_relative_urls_can_be_left_alone() {
    let reader = Reader::new(ReaderConfig {
        resolve_relative_urls: false,
        ..ReaderConfig::default()
    })
    .expect("Valid config");
    let feed = reader.import_string(ATOM).expect("Should import");
    let entry = feed.first().expect("Should have entry");
    assert_eq!(entry.link().expect("Should resolve").as_deref(), Some("posts/1"));
}

#[test]
fn test_missing_config_file() {
    let result = ReaderConfig::load("/nonexistent/reader.toml");
    assert!(matches!(result, Err(FeedError::Io(_))));
}

#[test]
fn test_document_too_large() {
    init_logging();

    let reader = Reader::new(ReaderConfig {
        max_document_size: 64,
        ..ReaderConfig::default()
    })
    .expect("Valid config");

    match reader.import_string(ATOM) {
        Err(FeedError::DocumentTooLarge { size, limit }) => {
            assert_eq!(size, ATOM.len());
            assert_eq!(limit, 64);
        }
        other => panic!("Expected DocumentTooLarge, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_format() {
    let result = import_string("<html><body>Not a feed</body></html>");
    match result {
        Err(FeedError::UnrecognizedFormat(msg)) => assert!(msg.contains("html")),
        other => panic!("Expected UnrecognizedFormat, got {:?}", other),
    }
}

#[test]
fn test_invalid_xml() {
    let result = import_string(r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry></feed>"#);
    assert!(result.is_err());
}

#[test]
fn test_empty_feed() {
    let feed = import_string(r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Empty</title></feed>"#)
        .expect("Should import");
    assert!(feed.is_empty());
    assert!(feed.first().is_none());
    assert_eq!(feed.iter().count(), 0);
}

#[test]
fn test_resolve_generic_field() {
    let feed = import_string(ATOM).expect("Should import");
    let entry = feed.first().expect("Should have entry");

    assert_eq!(
        entry.resolve(Field::Title).expect("Should resolve"),
        ResolvedValue::Text("First".to_string())
    );
    assert!(entry
        .resolve(Field::Enclosure)
        .expect("Should resolve")
        .is_absent());
}

#[test]
fn test_root_namespaces_exposed() {
    let feed = import_string(ATOM).expect("Should import");
    assert_eq!(
        feed.namespaces().get("").map(String::as_str),
        Some("http://www.w3.org/2005/Atom")
    );
}

#[test]
fn test_query_adapter_on_parsed_document() {
    let document = Document::parse(ATOM).expect("Should parse");
    let namespaces = FeedVersion::Atom10.namespaces();
    let query = QueryAdapter::new(&namespaces);

    let titles = query
        .evaluate_strings(document.root(), "/atom:feed/atom:entry/atom:title")
        .expect("Should query");
    assert_eq!(titles, vec!["First", "Second"]);

    let result = query.evaluate_string(document.root(), "nope:title");
    assert!(result.is_err());
}
