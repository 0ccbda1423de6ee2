// crates/feed-reader/examples/read_feed.rs
//! Example of reading entries from Atom and RSS feeds

use syndic_reader::{import_string, Feed, FeedResult, Reader, ReaderConfig};

fn main() {
    env_logger::init();

    println!("=== Syndic Feed Reader Demo ===\n");

    println!("Example 1: Atom 1.0 Feed");
    println!("{}", "=".repeat(60));
    if let Err(e) = read_atom_example() {
        eprintln!("Error reading Atom: {}", e);
    }

    println!("\n");

    println!("Example 2: RSS 2.0 Feed");
    println!("{}", "=".repeat(60));
    if let Err(e) = read_rss_example() {
        eprintln!("Error reading RSS: {}", e);
    }

    println!("\n");

    println!("Example 3: Lenient Dates");
    println!("{}", "=".repeat(60));
    if let Err(e) = lenient_dates_example() {
        eprintln!("Error: {}", e);
    }
}

fn print_entries(feed: &Feed) -> FeedResult<()> {
    println!("Feed: {}", feed.title().unwrap_or("(untitled)"));
    println!("Version: {}", feed.version());
    if let Some(base) = feed.base_url() {
        println!("Base URL: {}", base);
    }

    println!("\nEntries: {}", feed.len());
    println!("{}", "-".repeat(60));

    for entry in feed {
        println!(
            "\n{}. {}",
            entry.index() + 1,
            entry.title()?.unwrap_or_default()
        );

        if let Some(link) = entry.link()? {
            println!("   Link: {}", link);
        }

        for author in entry.authors()? {
            if let Some(name) = &author.name {
                println!("   Author: {}", name);
            }
        }

        if let Some(date) = entry.date_modified()? {
            println!("   Updated: {}", date.format("%Y-%m-%d %H:%M"));
        }

        let categories = entry.categories()?;
        if !categories.is_empty() {
            println!("   Categories: {}", categories.values().join(", "));
        }

        if let Some(enclosure) = entry.enclosure()? {
            println!("   Enclosure: {}", enclosure.url);
            if let Some(size) = enclosure.length {
                println!("   Size: {:.1} MB", size as f64 / 1_000_000.0);
            }
        }

        if let Some(count) = entry.comment_count()? {
            println!("   Comments: {}", count);
        }
    }

    Ok(())
}

fn read_atom_example() -> FeedResult<()> {
    let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:thr="http://purl.org/syndication/thread/1.0"
      xml:base="https://example.com/">
  <title>Engineering Notes</title>
  <author><name>Team</name></author>

  <entry>
    <id>urn:notes:1</id>
    <title>Parsing without tears</title>
    <link rel="alternate" href="posts/parsing"/>
    <link rel="replies" type="text/html" href="posts/parsing#comments" thr:count="3"/>
    <updated>2024-01-10T12:00:00Z</updated>
    <category term="xml" label="XML"/>
    <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Hello</p></div></content>
  </entry>

  <entry>
    <id>urn:notes:2</id>
    <title>Episode two</title>
    <link href="posts/two"/>
    <link rel="enclosure" href="audio/two.mp3" type="audio/mpeg" length="15000000"/>
    <updated>2024-01-11T12:00:00Z</updated>
  </entry>
</feed>"#;

    let feed = import_string(atom)?;
    print_entries(&feed)
}

fn read_rss_example() -> FeedResult<()> {
    let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Classic Audiobooks</title>
    <link>https://example.com/audiobooks</link>

    <item>
      <title>Pride and Prejudice - Chapter 1</title>
      <link>https://example.com/pride-ch1</link>
      <guid isPermaLink="false">pride-ch1</guid>
      <pubDate>Mon, 01 Jan 2024 12:00:00 GMT</pubDate>
      <dc:creator>Jane Austen</dc:creator>
      <category>fiction</category>
      <enclosure url="https://example.com/audio/pride-ch1.mp3"
                 type="audio/mpeg"
                 length="15000000"/>
    </item>
  </channel>
</rss>"#;

    let feed = import_string(rss)?;
    print_entries(&feed)
}

fn lenient_dates_example() -> FeedResult<()> {
    let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Sloppy Dates</title>
  <entry>
    <title>Mailer-style timestamp</title>
    <updated>Mon, 01 Jan 2024 12:00:00 GMT</updated>
  </entry>
</feed>"#;

    let strict = import_string(atom)?;
    let lenient = Reader::new(ReaderConfig {
        lenient_dates: true,
        ..ReaderConfig::default()
    })?
    .import_string(atom)?;

    for (label, feed) in [("strict", &strict), ("lenient", &lenient)] {
        if let Some(entry) = feed.first() {
            println!("{:>8}: {:?}", label, entry.date_modified()?);
        }
    }

    Ok(())
}
