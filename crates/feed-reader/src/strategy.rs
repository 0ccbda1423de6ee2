// crates/feed-reader/src/strategy.rs
//! Field resolution strategies
//!
//! Every logical field maps, per [`VersionFamily`], to a [`Chain`]: an
//! ordered list of [`Source`] descriptors plus how their results combine.
//! The resolver walks the chain; nothing here touches a document.

use crate::date::DateProfile;
use crate::version::VersionFamily;
use serde::{Deserialize, Serialize};

/// A logical entry field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Id,
    Title,
    DateCreated,
    DateModified,
    Authors,
    Description,
    Content,
    Links,
    BaseUrl,
    CommentLink,
    CommentFeedLink,
    CommentCount,
    Categories,
    Enclosure,
}

impl Field {
    /// Every field, in declaration order
    pub const ALL: [Field; 14] = [
        Field::Id,
        Field::Title,
        Field::DateCreated,
        Field::DateModified,
        Field::Authors,
        Field::Description,
        Field::Content,
        Field::Links,
        Field::BaseUrl,
        Field::CommentLink,
        Field::CommentFeedLink,
        Field::CommentCount,
        Field::Categories,
        Field::Enclosure,
    ];
}

/// One place a field's value may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// Trimmed string value of a path
    Text(&'static str),
    /// Timestamp parsed with the given profiles
    Date(&'static str, &'static [DateProfile]),
    /// Person constructs; each sub-field tries its paths in order
    Person {
        path: &'static str,
        name: &'static [&'static str],
        email: &'static [&'static str],
        uri: &'static [&'static str],
    },
    /// Plain names, one author each (`dc:creator`)
    Creator(&'static str),
    /// RSS `author` values of the form `email (Name)`
    RssAuthor(&'static str),
    /// Atom `content` construct, decoded according to its type
    AtomContent(&'static str),
    /// URLs, resolved against the entry base
    Link(&'static str),
    /// The entry's effective `xml:base`
    XmlBase,
    /// The URL the feed was retrieved from
    RetrievalUrl,
    /// Category-like elements; sub-paths are relative to each element
    Category {
        path: &'static str,
        term: &'static str,
        scheme: Option<&'static str>,
        label: Option<&'static str>,
    },
    /// Media enclosure elements
    Enclosure {
        path: &'static str,
        url: &'static str,
        length: &'static str,
        mime_type: &'static str,
    },
    /// Non-negative integer
    Count(&'static str),
}

/// How the results of a chain's sources combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combine {
    /// The first source with a result wins
    FirstMatch,
    /// Every source contributes, in chain order
    Union,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Chain {
    pub combine: Combine,
    pub sources: &'static [Source],
}

const fn first(sources: &'static [Source]) -> Chain {
    Chain {
        combine: Combine::FirstMatch,
        sources,
    }
}

const fn union(sources: &'static [Source]) -> Chain {
    Chain {
        combine: Combine::Union,
        sources,
    }
}

const RFC3339: &[DateProfile] = &[DateProfile::Rfc3339];
const ATOM03_DATES: &[DateProfile] = &[DateProfile::W3cdtf, DateProfile::Rfc822];
const RSS_DATES: &[DateProfile] = &[DateProfile::Rfc822, DateProfile::W3cdtf];
const DC_DATES: &[DateProfile] = &[DateProfile::W3cdtf];

const DC_TITLE: [Source; 2] = [Source::Text("dc11:title"), Source::Text("dc10:title")];
const DC_DATE: [Source; 2] = [
    Source::Date("dc11:date", DC_DATES),
    Source::Date("dc10:date", DC_DATES),
];
const DC_DESCRIPTION: [Source; 2] = [
    Source::Text("dc11:description"),
    Source::Text("dc10:description"),
];
const DC_SUBJECT: [Source; 2] = [
    Source::Category {
        path: "dc11:subject",
        term: "text()",
        scheme: None,
        label: None,
    },
    Source::Category {
        path: "dc10:subject",
        term: "text()",
        scheme: None,
        label: None,
    },
];
const MEDIA_CONTENT: Source = Source::Enclosure {
    path: "media:content",
    url: "@url",
    length: "@fileSize",
    mime_type: "@type",
};

const ATOM_PERSON_NAME: &[&str] = &["atom:name"];
const ATOM_PERSON_EMAIL: &[&str] = &["atom:email"];
// Atom 0.3 persons carry `url` where 1.0 has `uri`.
const ATOM_PERSON_URI: &[&str] = &["atom:uri", "atom:url"];

const ATOM_ID: &[Source] = &[Source::Text("atom:id")];
const ATOM_TITLE: &[Source] = &[Source::Text("atom:title"), DC_TITLE[0], DC_TITLE[1]];
const ATOM10_MODIFIED: &[Source] = &[Source::Date("atom:updated", RFC3339), DC_DATE[0], DC_DATE[1]];
const ATOM10_CREATED: &[Source] = &[
    Source::Date("atom:published", RFC3339),
    DC_DATE[0],
    DC_DATE[1],
];
const ATOM03_MODIFIED: &[Source] = &[
    Source::Date("atom:modified", ATOM03_DATES),
    DC_DATE[0],
    DC_DATE[1],
];
const ATOM03_CREATED: &[Source] = &[
    Source::Date("atom:created", ATOM03_DATES),
    Source::Date("atom:issued", ATOM03_DATES),
    DC_DATE[0],
    DC_DATE[1],
];
const ATOM_AUTHORS: &[Source] = &[
    Source::Person {
        path: "atom:author",
        name: ATOM_PERSON_NAME,
        email: ATOM_PERSON_EMAIL,
        uri: ATOM_PERSON_URI,
    },
    Source::Creator("dc11:creator"),
    Source::Creator("dc10:creator"),
    Source::Person {
        path: "/atom:feed/atom:author",
        name: ATOM_PERSON_NAME,
        email: ATOM_PERSON_EMAIL,
        uri: ATOM_PERSON_URI,
    },
];
const ATOM_DESCRIPTION: &[Source] = &[
    Source::Text("atom:summary"),
    DC_DESCRIPTION[0],
    DC_DESCRIPTION[1],
];
const ATOM_CONTENT: &[Source] = &[
    Source::AtomContent("atom:content"),
    Source::Text("atom:summary"),
    DC_DESCRIPTION[0],
    DC_DESCRIPTION[1],
];
const ATOM_LINKS: &[Source] = &[
    Source::Link("atom:link[@rel='alternate']/@href"),
    Source::Link("atom:link[not(@rel)]/@href"),
];
const ATOM_COMMENT_LINK: &[Source] = &[
    Source::Link("atom:link[@rel='replies'][@type='text/html']/@href"),
    Source::Link("atom:link[@rel='http://www.iana.org/assignments/relation/replies'][@type='text/html']/@href"),
    Source::Link("atom:link[@rel='replies'][not(@type)]/@href"),
];
const ATOM_COMMENT_FEED_LINK: &[Source] = &[
    Source::Link("atom:link[@rel='replies'][@type='application/atom+xml']/@href"),
    Source::Link("atom:link[@rel='replies'][@type='application/rss+xml']/@href"),
    Source::Link("wfw:commentRss"),
    Source::Link("wfw:commentRSS"),
];
const ATOM_COMMENT_COUNT: &[Source] = &[
    Source::Count("atom:link[@rel='replies']/@thr:count"),
    Source::Count("thr:total"),
    Source::Count("slash:comments"),
];
const ATOM_CATEGORY: Source = Source::Category {
    path: "atom:category",
    term: "@term",
    scheme: Some("@scheme"),
    label: Some("@label"),
};
const ATOM10_CATEGORIES: &[Source] = &[ATOM_CATEGORY, DC_SUBJECT[0], DC_SUBJECT[1]];
const ATOM03_CATEGORIES: &[Source] = &[
    ATOM_CATEGORY,
    Source::Category {
        path: "atom10:category",
        term: "@term",
        scheme: Some("@scheme"),
        label: Some("@label"),
    },
    DC_SUBJECT[0],
    DC_SUBJECT[1],
];
const ATOM_ENCLOSURE: &[Source] = &[
    Source::Enclosure {
        path: "atom:link[@rel='enclosure']",
        url: "@href",
        length: "@length",
        mime_type: "@type",
    },
    MEDIA_CONTENT,
];

const BASE_URL: &[Source] = &[Source::XmlBase, Source::RetrievalUrl];

const RSS_ID: &[Source] = &[
    Source::Text("rss:guid"),
    Source::Text("@rdf:about"),
    Source::Text("rss:link"),
];
const RSS_TITLE: &[Source] = &[Source::Text("rss:title"), DC_TITLE[0], DC_TITLE[1]];
const RSS_DATE: &[Source] = &[Source::Date("rss:pubDate", RSS_DATES), DC_DATE[0], DC_DATE[1]];
const RSS_AUTHORS: &[Source] = &[
    Source::RssAuthor("rss:author"),
    Source::Creator("dc11:creator"),
    Source::Creator("dc10:creator"),
    Source::Creator("itunes:author"),
];
const RSS_DESCRIPTION: &[Source] = &[
    Source::Text("rss:description"),
    DC_DESCRIPTION[0],
    DC_DESCRIPTION[1],
];
const RSS_CONTENT: &[Source] = &[
    Source::Text("content:encoded"),
    Source::Text("rss:description"),
    DC_DESCRIPTION[0],
    DC_DESCRIPTION[1],
];
const RSS_LINKS: &[Source] = &[
    Source::Link("rss:link"),
    Source::Link("rss:guid[@isPermaLink='true']"),
    Source::Link("rss:guid[not(@isPermaLink)]"),
    Source::Link("atom:link[@rel='alternate']/@href"),
];
const RSS_COMMENT_LINK: &[Source] = &[Source::Link("rss:comments")];
const RSS_COMMENT_FEED_LINK: &[Source] = &[
    Source::Link("wfw:commentRss"),
    Source::Link("wfw:commentRSS"),
];
const RSS_COMMENT_COUNT: &[Source] = &[Source::Count("slash:comments"), Source::Count("thr:total")];
const RSS_CATEGORIES: &[Source] = &[
    Source::Category {
        path: "rss:category",
        term: "text()",
        scheme: Some("@domain"),
        label: None,
    },
    DC_SUBJECT[0],
    DC_SUBJECT[1],
];
const RSS_ENCLOSURE: &[Source] = &[
    Source::Enclosure {
        path: "rss:enclosure",
        url: "@url",
        length: "@length",
        mime_type: "@type",
    },
    MEDIA_CONTENT,
];

/// Looks up the chain for a field in a version family
pub(crate) fn chain(family: VersionFamily, field: Field) -> Chain {
    use VersionFamily::{Atom03, Atom10, Rss, RssRdf};

    match (family, field) {
        (Atom10 | Atom03, Field::Id) => first(ATOM_ID),
        (Atom10 | Atom03, Field::Title) => first(ATOM_TITLE),
        (Atom10, Field::DateCreated) => first(ATOM10_CREATED),
        (Atom10, Field::DateModified) => first(ATOM10_MODIFIED),
        (Atom03, Field::DateCreated) => first(ATOM03_CREATED),
        (Atom03, Field::DateModified) => first(ATOM03_MODIFIED),
        (Atom10 | Atom03, Field::Authors) => first(ATOM_AUTHORS),
        (Atom10 | Atom03, Field::Description) => first(ATOM_DESCRIPTION),
        (Atom10 | Atom03, Field::Content) => first(ATOM_CONTENT),
        (Atom10 | Atom03, Field::Links) => first(ATOM_LINKS),
        (Atom10 | Atom03, Field::CommentLink) => first(ATOM_COMMENT_LINK),
        (Atom10 | Atom03, Field::CommentFeedLink) => first(ATOM_COMMENT_FEED_LINK),
        (Atom10 | Atom03, Field::CommentCount) => first(ATOM_COMMENT_COUNT),
        (Atom10, Field::Categories) => union(ATOM10_CATEGORIES),
        (Atom03, Field::Categories) => union(ATOM03_CATEGORIES),
        (Atom10 | Atom03, Field::Enclosure) => first(ATOM_ENCLOSURE),

        (Rss | RssRdf, Field::Id) => first(RSS_ID),
        (Rss | RssRdf, Field::Title) => first(RSS_TITLE),
        (Rss | RssRdf, Field::DateCreated | Field::DateModified) => first(RSS_DATE),
        (Rss | RssRdf, Field::Authors) => first(RSS_AUTHORS),
        (Rss | RssRdf, Field::Description) => first(RSS_DESCRIPTION),
        (Rss | RssRdf, Field::Content) => first(RSS_CONTENT),
        (Rss | RssRdf, Field::Links) => first(RSS_LINKS),
        (Rss | RssRdf, Field::CommentLink) => first(RSS_COMMENT_LINK),
        (Rss | RssRdf, Field::CommentFeedLink) => first(RSS_COMMENT_FEED_LINK),
        (Rss | RssRdf, Field::CommentCount) => first(RSS_COMMENT_COUNT),
        (Rss | RssRdf, Field::Categories) => union(RSS_CATEGORIES),
        (Rss | RssRdf, Field::Enclosure) => first(RSS_ENCLOSURE),

        (_, Field::BaseUrl) => first(BASE_URL),
    }
}
