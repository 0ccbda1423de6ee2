// crates/feed-reader/src/query.rs
//! Namespace-aware path queries over a [`Document`](crate::document::Document)
//!
//! Supports the subset of XPath the field strategies use:
//!
//! ```text
//! path      := ['/'] step ('/' step)*
//! step      := '@' name | 'text()' | nametest predicate*
//! nametest  := '*' | prefix ':' local | local
//! predicate := '[' ( '@' name '=' literal | '@' name | 'not(@' name ')' | integer ) ']'
//! ```
//!
//! Attribute and `text()` steps may only appear last.

use crate::document::Node;
use crate::error::QueryError;
use crate::namespaces::Namespaces;

#[derive(Debug, Clone, PartialEq, Eq)]
struct QName {
    prefix: Option<String>,
    local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(QName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    AttrEquals(QName, String),
    HasAttr(QName),
    NotAttr(QName),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Element {
        test: NameTest,
        predicates: Vec<Predicate>,
    },
    Attribute(QName),
    Text,
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

impl Path {
    /// Parses a path expression
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let malformed = |reason: &str| QueryError::MalformedPath {
            path: source.to_string(),
            reason: reason.to_string(),
        };

        let (absolute, body) = match source.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, source),
        };

        let raw_steps = split_steps(body).ok_or_else(|| malformed("unbalanced brackets or quotes"))?;
        let mut steps = Vec::with_capacity(raw_steps.len());
        for raw in &raw_steps {
            let step = parse_step(raw).map_err(|reason| malformed(&reason))?;
            steps.push(step);
        }

        let last = steps.len().saturating_sub(1);
        for (i, step) in steps.iter().enumerate() {
            if i != last && !matches!(step, Step::Element { .. }) {
                return Err(malformed("attribute and text() steps must come last"));
            }
        }
        if absolute && !matches!(steps.first(), Some(Step::Element { .. })) {
            return Err(malformed("absolute paths must start with an element step"));
        }

        Ok(Self {
            source: source.to_string(),
            absolute,
            steps,
        })
    }

    /// The expression as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn selects_elements(&self) -> bool {
        matches!(self.steps.last(), Some(Step::Element { .. }))
    }
}

fn split_steps(body: &str) -> Option<Vec<&str>> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.checked_sub(1)?,
                '/' if depth == 0 => {
                    steps.push(&body[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }

    if quote.is_some() || depth != 0 {
        return None;
    }
    steps.push(&body[start..]);
    Some(steps)
}

fn parse_qname(raw: &str) -> Result<QName, String> {
    let valid = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };

    match raw.split_once(':') {
        Some((prefix, local)) if valid(prefix) && valid(local) => Ok(QName {
            prefix: Some(prefix.to_string()),
            local: local.to_string(),
        }),
        None if valid(raw) => Ok(QName {
            prefix: None,
            local: raw.to_string(),
        }),
        _ => Err(format!("invalid name '{}'", raw)),
    }
}

fn parse_step(raw: &str) -> Result<Step, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty step".to_string());
    }
    if raw == "text()" {
        return Ok(Step::Text);
    }
    if let Some(name) = raw.strip_prefix('@') {
        return parse_qname(name).map(Step::Attribute);
    }

    let (name, mut rest) = match raw.find('[') {
        Some(pos) => (&raw[..pos], &raw[pos..]),
        None => (raw, ""),
    };
    let test = if name == "*" {
        NameTest::Any
    } else {
        NameTest::Name(parse_qname(name)?)
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let inner_end = closing_bracket(rest).ok_or_else(|| "unterminated predicate".to_string())?;
        predicates.push(parse_predicate(rest[1..inner_end].trim())?);
        rest = &rest[inner_end + 1..];
    }

    Ok(Step::Element { test, predicates })
}

/// Index of the `]` closing the predicate that `rest` starts with
fn closing_bracket(rest: &str) -> Option<usize> {
    if !rest.starts_with('[') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                ']' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn parse_predicate(inner: &str) -> Result<Predicate, String> {
    if let Ok(position) = inner.parse::<usize>() {
        if position == 0 {
            return Err("positions start at 1".to_string());
        }
        return Ok(Predicate::Position(position));
    }

    if let Some(name) = inner
        .strip_prefix("not(@")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_qname(name.trim()).map(Predicate::NotAttr);
    }

    let attr = inner
        .strip_prefix('@')
        .ok_or_else(|| format!("unsupported predicate '{}'", inner))?;

    match attr.split_once('=') {
        Some((name, literal)) => {
            let literal = literal.trim();
            let value = literal
                .strip_prefix('\'')
                .and_then(|l| l.strip_suffix('\''))
                .or_else(|| literal.strip_prefix('"').and_then(|l| l.strip_suffix('"')))
                .ok_or_else(|| format!("expected a quoted literal in '{}'", inner))?;
            Ok(Predicate::AttrEquals(parse_qname(name.trim())?, value.to_string()))
        }
        None => parse_qname(attr.trim()).map(Predicate::HasAttr),
    }
}

enum Item<'d> {
    Node(Node<'d>),
    Value(String),
}

impl Item<'_> {
    fn into_string(self) -> String {
        match self {
            Item::Node(node) => node.text_content(),
            Item::Value(value) => value,
        }
    }
}

/// Evaluates paths with a fixed set of prefix bindings
#[derive(Debug, Clone, Copy)]
pub struct QueryAdapter<'n> {
    namespaces: &'n Namespaces,
}

impl<'n> QueryAdapter<'n> {
    /// Creates an adapter over the given bindings
    pub fn new(namespaces: &'n Namespaces) -> Self {
        Self { namespaces }
    }

    /// Elements selected by `path`, in document order
    pub fn evaluate_node_set<'d>(
        &self,
        context: Node<'d>,
        path: &str,
    ) -> Result<Vec<Node<'d>>, QueryError> {
        let path = Path::parse(path)?;
        if !path.selects_elements() {
            return Err(QueryError::NotANodeSet(path.source));
        }
        Ok(self
            .select(context, &path)?
            .into_iter()
            .filter_map(|item| match item {
                Item::Node(node) => Some(node),
                Item::Value(_) => None,
            })
            .collect())
    }

    /// String value of the first item selected by `path`
    pub fn evaluate_string(&self, context: Node<'_>, path: &str) -> Result<Option<String>, QueryError> {
        let path = Path::parse(path)?;
        Ok(self
            .select(context, &path)?
            .into_iter()
            .next()
            .map(Item::into_string))
    }

    /// String values of every item selected by `path`
    pub fn evaluate_strings(&self, context: Node<'_>, path: &str) -> Result<Vec<String>, QueryError> {
        let path = Path::parse(path)?;
        Ok(self
            .select(context, &path)?
            .into_iter()
            .map(Item::into_string)
            .collect())
    }

    fn namespace_of(&self, path: &Path, name: &QName) -> Result<Option<&'static str>, QueryError> {
        match &name.prefix {
            None => Ok(None),
            Some(prefix) => match self.namespaces.uri(prefix) {
                Some("") => Ok(None),
                Some(uri) => Ok(Some(uri)),
                None => Err(QueryError::UnboundPrefix {
                    path: path.source.clone(),
                    prefix: prefix.clone(),
                }),
            },
        }
    }

    fn matches_name(&self, path: &Path, node: &Node<'_>, test: &NameTest) -> Result<bool, QueryError> {
        if !node.is_element() {
            return Ok(false);
        }
        match test {
            NameTest::Any => Ok(true),
            NameTest::Name(name) => {
                let namespace = self.namespace_of(path, name)?;
                Ok(node.local_name() == name.local && node.namespace() == namespace)
            }
        }
    }

    fn filter<'d>(
        &self,
        path: &Path,
        candidates: Vec<Node<'d>>,
        predicates: &[Predicate],
    ) -> Result<Vec<Node<'d>>, QueryError> {
        let mut nodes = candidates;
        for predicate in predicates {
            nodes = match predicate {
                Predicate::Position(n) => nodes.into_iter().nth(n - 1).into_iter().collect(),
                Predicate::HasAttr(name) => {
                    let ns = self.namespace_of(path, name)?;
                    nodes
                        .into_iter()
                        .filter(|node| node.attribute_ns(ns, &name.local).is_some())
                        .collect()
                }
                Predicate::NotAttr(name) => {
                    let ns = self.namespace_of(path, name)?;
                    nodes
                        .into_iter()
                        .filter(|node| node.attribute_ns(ns, &name.local).is_none())
                        .collect()
                }
                Predicate::AttrEquals(name, value) => {
                    let ns = self.namespace_of(path, name)?;
                    nodes
                        .into_iter()
                        .filter(|node| node.attribute_ns(ns, &name.local) == Some(value.as_str()))
                        .collect()
                }
            };
        }
        Ok(nodes)
    }

    fn select<'d>(&self, context: Node<'d>, path: &Path) -> Result<Vec<Item<'d>>, QueryError> {
        let mut steps = path.steps.iter();
        let mut current: Vec<Node<'d>> = vec![context];

        if path.absolute {
            let root = context.document().root();
            if let Some(Step::Element { test, predicates }) = steps.next() {
                let matched = if self.matches_name(path, &root, test)? {
                    vec![root]
                } else {
                    Vec::new()
                };
                current = self.filter(path, matched, predicates)?;
            }
        }

        for step in steps {
            match step {
                Step::Element { test, predicates } => {
                    let mut next = Vec::new();
                    for node in &current {
                        let mut matched = Vec::new();
                        for child in node.child_elements() {
                            if self.matches_name(path, &child, test)? {
                                matched.push(child);
                            }
                        }
                        next.extend(self.filter(path, matched, predicates)?);
                    }
                    current = next;
                }
                Step::Attribute(name) => {
                    let ns = self.namespace_of(path, name)?;
                    return Ok(current
                        .iter()
                        .filter_map(|node| node.attribute_ns(ns, &name.local))
                        .map(|value| Item::Value(value.to_string()))
                        .collect());
                }
                Step::Text => {
                    return Ok(current
                        .iter()
                        .map(|node| Item::Value(node.text_content()))
                        .collect());
                }
            }
        }

        Ok(current.into_iter().map(Item::Node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::version::FeedVersion;

    const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <title>Feed</title>
  <entry>
    <link rel="alternate" href="http://example.com/a"/>
    <link href="http://example.com/bare"/>
    <link rel="replies" type="text/html" href="http://example.com/c"/>
    <dc:subject>topic1</dc:subject>
    <dc:subject>topic2</dc:subject>
  </entry>
</feed>"#;

    fn with_atom<F: FnOnce(&QueryAdapter<'_>, Node<'_>)>(f: F) {
        let doc = Document::parse(ATOM).expect("Should parse");
        let namespaces = FeedVersion::Atom10.namespaces();
        let adapter = QueryAdapter::new(&namespaces);
        let entry = adapter
            .evaluate_node_set(doc.root(), "/atom:feed/atom:entry")
            .expect("Should query")
            .remove(0);
        f(&adapter, entry);
    }

    #[test]
    fn test_attribute_predicates() {
        with_atom(|q, entry| {
            assert_eq!(
                q.evaluate_string(entry, "atom:link[@rel='alternate']/@href").expect("Should query"),
                Some("http://example.com/a".to_string())
            );
            assert_eq!(
                q.evaluate_string(entry, "atom:link[not(@rel)]/@href").expect("Should query"),
                Some("http://example.com/bare".to_string())
            );
            assert_eq!(
                q.evaluate_string(entry, "atom:link[@rel='replies'][@type='text/html']/@href")
                    .expect("Should query"),
                Some("http://example.com/c".to_string())
            );
            assert_eq!(
                q.evaluate_node_set(entry, "atom:link[@rel]").expect("Should query").len(),
                2
            );
        });
    }

    #[test]
    fn test_position_and_strings() {
        with_atom(|q, entry| {
            assert_eq!(
                q.evaluate_strings(entry, "dc11:subject").expect("Should query"),
                vec!["topic1".to_string(), "topic2".to_string()]
            );
            assert_eq!(
                q.evaluate_string(entry, "dc11:subject[2]/text()").expect("Should query"),
                Some("topic2".to_string())
            );
            assert_eq!(
                q.evaluate_string(entry, "dc10:subject").expect("Should query"),
                None
            );
        });
    }

    #[test]
    fn test_absolute_path_from_entry_context() {
        with_atom(|q, entry| {
            assert_eq!(
                q.evaluate_string(entry, "/atom:feed/atom:title").expect("Should query"),
                Some("Feed".to_string())
            );
            assert!(q
                .evaluate_node_set(entry, "/rss:rss")
                .expect("Should query")
                .is_empty());
        });
    }

    #[test]
    fn test_literal_may_contain_slashes() {
        let path = Path::parse("atom:link[@type='text/html']/@href").expect("Should parse");
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.as_str(), "atom:link[@type='text/html']/@href");
    }

    #[test]
    fn test_query_errors() {
        with_atom(|q, entry| {
            assert!(matches!(
                q.evaluate_string(entry, "foo:bar"),
                Err(QueryError::UnboundPrefix { ref prefix, .. }) if prefix == "foo"
            ));
            assert!(matches!(
                q.evaluate_node_set(entry, "atom:link/@href"),
                Err(QueryError::NotANodeSet(_))
            ));
            assert!(matches!(
                q.evaluate_string(entry, "atom:link[@rel='x'"),
                Err(QueryError::MalformedPath { .. })
            ));
            assert!(matches!(
                q.evaluate_string(entry, "@href/atom:link"),
                Err(QueryError::MalformedPath { .. })
            ));
            assert!(matches!(
                q.evaluate_string(entry, "atom:link[0]"),
                Err(QueryError::MalformedPath { .. })
            ));
        });
    }

    #[test]
    fn test_empty_prefix_binding_matches_no_namespace() {
        let doc = Document::parse(r#"<rss version="2.0"><channel><item><title>T</title></item></channel></rss>"#)
            .expect("Should parse");
        let namespaces = FeedVersion::Rss20.namespaces();
        let q = QueryAdapter::new(&namespaces);
        assert_eq!(
            q.evaluate_string(doc.root(), "/rss:rss/rss:channel/rss:item/rss:title")
                .expect("Should query"),
            Some("T".to_string())
        );
    }
}
