// crates/feed-reader/src/document.rs
//! Immutable, namespace-aware XML tree
//!
//! Built once from `quick-xml` events and never mutated afterwards. Nodes are
//! stored in an arena and addressed by [`NodeId`]; [`Node`] is a cheap
//! borrowed handle used by the query adapter and the field resolver.

use crate::error::{FeedError, FeedResult};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::collections::BTreeMap;
use url::Url;

/// Namespace bound to the reserved `xml` prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// XHTML namespace; elements in it serialize without their prefix
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An attribute with its namespace resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace URI, `None` for unprefixed attributes
    pub namespace: Option<String>,
    /// Name without prefix
    pub local_name: String,
    /// Name as written in the source
    pub qualified_name: String,
    /// Decoded value
    pub value: String,
}

#[derive(Debug)]
struct Element {
    namespace: Option<String>,
    local_name: String,
    qualified_name: String,
    attributes: Vec<Attribute>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// A parsed XML document
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    namespaces: BTreeMap<String, String>,
}

impl Document {
    /// Parses a document from a string
    pub fn parse(xml: &str) -> FeedResult<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut builder = TreeBuilder::default();

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = owned_namespace(resolved);

            match event {
                Event::Start(e) => {
                    let element = read_element(&reader, &e, namespace)?;
                    builder.open(element, true)?;
                }
                Event::Empty(e) => {
                    let element = read_element(&reader, &e, namespace)?;
                    builder.open(element, false)?;
                }
                Event::End(_) => builder.close()?,
                Event::Text(e) => {
                    let text = e.unescape()?;
                    builder.text(&text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    builder.text(&text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        builder.finish()
    }

    /// Returns the root element
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    /// Returns the node with the given id
    ///
    /// Ids are only ever handed out by this document, so indexing cannot fail
    /// for ids obtained from it.
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { doc: self, id }
    }

    /// Namespace declarations on the root element, keyed by prefix (`""` for
    /// the default namespace)
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Borrowed handle to a node of a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'a> Node<'a> {
    /// Returns this node's id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Document this node belongs to
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    fn element(&self) -> Option<&'a Element> {
        match &self.doc.data(self.id).kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns true for element nodes
    pub fn is_element(&self) -> bool {
        self.element().is_some()
    }

    /// Local name of an element, empty for text nodes
    pub fn local_name(&self) -> &'a str {
        self.element().map_or("", |e| e.local_name.as_str())
    }

    /// Namespace URI of an element
    pub fn namespace(&self) -> Option<&'a str> {
        self.element().and_then(|e| e.namespace.as_deref())
    }

    /// Element name as written in the source
    pub fn qualified_name(&self) -> &'a str {
        self.element().map_or("", |e| e.qualified_name.as_str())
    }

    /// All attributes except namespace declarations
    pub fn attributes(&self) -> &'a [Attribute] {
        self.element().map_or(&[][..], |e| e.attributes.as_slice())
    }

    /// Value of an unprefixed attribute
    pub fn attribute(&self, local_name: &str) -> Option<&'a str> {
        self.attribute_ns(None, local_name)
    }

    /// Value of an attribute in the given namespace
    pub fn attribute_ns(&self, namespace: Option<&str>, local_name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Parent element, `None` for the root
    pub fn parent(&self) -> Option<Node<'a>> {
        self.doc.data(self.id).parent.map(|id| self.doc.node(id))
    }

    /// Child nodes in document order
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.element()
            .map_or(&[][..], |e| e.children.as_slice())
            .iter()
            .map(move |&id| doc.node(id))
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(|n| n.is_element())
    }

    /// Concatenated text of this node and all its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self.id];
        while let Some(id) = stack.pop() {
            match &self.doc.data(id).kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(element) => stack.extend(element.children.iter().rev().copied()),
            }
        }
        out
    }

    /// Effective `xml:base` of this node, composed through its ancestors
    pub fn base_uri(&self) -> Option<String> {
        self.base_uri_from(None)
    }

    /// Effective base of this node with `document_uri` as the outermost base.
    ///
    /// A relative `xml:base` chain is resolved against `document_uri`; with no
    /// `xml:base` at all the document URI itself is returned.
    pub fn base_uri_from(&self, document_uri: Option<&str>) -> Option<String> {
        let mut bases = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            if let Some(base) = node.attribute_ns(Some(XML_NS), "base") {
                bases.push(base);
            }
            current = node.parent();
        }

        bases
            .iter()
            .rev()
            .fold(document_uri.map(str::to_string), |resolved, base| {
                Some(match resolved {
                    Some(outer) => resolve_reference(&outer, base),
                    None => (*base).to_string(),
                })
            })
    }

    /// Serializes the children of this node as markup
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_xml(&mut out);
        }
        out
    }

    fn write_xml(&self, out: &mut String) {
        let mut stack = vec![Markup::Node(*self)];
        while let Some(item) = stack.pop() {
            let node = match item {
                Markup::Node(node) => node,
                Markup::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
            };

            let doc = node.doc;
            let element = match &doc.data(node.id).kind {
                NodeKind::Text(text) => {
                    out.push_str(&partial_escape(text.as_str()));
                    continue;
                }
                NodeKind::Element(element) => element,
            };

            let name = if element.namespace.as_deref() == Some(XHTML_NS) {
                element.local_name.as_str()
            } else {
                element.qualified_name.as_str()
            };

            out.push('<');
            out.push_str(name);
            for attr in &element.attributes {
                let attr_name = if attr.namespace.as_deref() == Some(XHTML_NS) {
                    attr.local_name.as_str()
                } else {
                    attr.qualified_name.as_str()
                };
                out.push(' ');
                out.push_str(attr_name);
                out.push_str("=\"");
                out.push_str(&escape(attr.value.as_str()));
                out.push('"');
            }

            if element.children.is_empty() {
                out.push_str("/>");
                continue;
            }

            out.push('>');
            stack.push(Markup::Close(name));
            stack.extend(
                element
                    .children
                    .iter()
                    .rev()
                    .map(|&id| Markup::Node(doc.node(id))),
            );
        }
    }
}

/// Pending serialization work: a node to open, or a tag left to close
enum Markup<'a> {
    Node(Node<'a>),
    Close(&'a str),
}

/// Resolves `reference` against `base`.
///
/// Absolute references come back verbatim. A reference that cannot be
/// resolved (relative base, unparseable input) also comes back unchanged.
pub fn resolve_reference(base: &str, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    Url::parse(base)
        .and_then(|base| base.join(reference))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

fn owned_namespace(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.0).into_owned()),
        _ => None,
    }
}

struct ParsedElement {
    element: Element,
    declarations: Vec<(String, String)>,
}

fn read_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> FeedResult<ParsedElement> {
    let qualified_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    let mut declarations = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| FeedError::InvalidXml(e.to_string()))?;
        let key = attr.key.as_ref();
        let qualified = String::from_utf8_lossy(key).into_owned();
        let value = attr.unescape_value()?.into_owned();

        if key == b"xmlns" {
            declarations.push((String::new(), value));
            continue;
        }
        if let Some(prefix) = qualified.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value));
            continue;
        }

        let (namespace, local) = if let Some(local) = qualified.strip_prefix("xml:") {
            (Some(XML_NS.to_string()), local.to_string())
        } else {
            let (resolved, local) = reader.resolve_attribute(attr.key);
            let local = String::from_utf8_lossy(local.as_ref()).into_owned();
            (owned_namespace(resolved), local)
        };

        attributes.push(Attribute {
            namespace,
            local_name: local,
            qualified_name: qualified,
            value,
        });
    }

    Ok(ParsedElement {
        element: Element {
            namespace,
            local_name,
            qualified_name,
            attributes,
            children: Vec::new(),
        },
        declarations,
    })
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    namespaces: BTreeMap<String, String>,
}

impl TreeBuilder {
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(NodeData { parent, kind });
        if let Some(parent) = parent {
            if let NodeKind::Element(element) = &mut self.nodes[parent.0].kind {
                element.children.push(id);
            }
        }
        id
    }

    fn open(&mut self, parsed: ParsedElement, has_content: bool) -> FeedResult<()> {
        if self.stack.is_empty() {
            if self.root.is_some() {
                return Err(FeedError::InvalidXml(
                    "document has more than one root element".to_string(),
                ));
            }
            self.namespaces.extend(parsed.declarations);
        }

        let id = self.push(NodeKind::Element(parsed.element));
        if self.root.is_none() {
            self.root = Some(id);
        }
        if has_content {
            self.stack.push(id);
        }
        Ok(())
    }

    fn close(&mut self) -> FeedResult<()> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| FeedError::InvalidXml("unexpected closing tag".to_string()))
    }

    fn text(&mut self, text: &str) -> FeedResult<()> {
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(FeedError::InvalidXml(
                "text content outside the root element".to_string(),
            ));
        }
        // Adjacent text and CDATA sections read as one node.
        if let Some(&parent) = self.stack.last() {
            let last_child = match &self.nodes[parent.0].kind {
                NodeKind::Element(element) => element.children.last().copied(),
                NodeKind::Text(_) => None,
            };
            if let Some(child) = last_child {
                if let NodeKind::Text(existing) = &mut self.nodes[child.0].kind {
                    existing.push_str(text);
                    return Ok(());
                }
            }
        }
        self.push(NodeKind::Text(text.to_string()));
        Ok(())
    }

    fn finish(self) -> FeedResult<Document> {
        if !self.stack.is_empty() {
            return Err(FeedError::InvalidXml(
                "document ended inside an open element".to_string(),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| FeedError::InvalidXml("document has no root element".to_string()))?;

        Ok(Document {
            nodes: self.nodes,
            root,
            namespaces: self.namespaces,
        })
    }
}
