//! XML parsing into an arena document
//!
//! OCX models are queried by qualified tag, searched deeply under a panel,
//! and walked child by child in document order. The streaming quick-xml
//! reader is therefore used once to build a [`Document`]: a flat arena of
//! nodes addressed by [`NodeId`], with namespace prefixes resolved so that
//! every element and attribute name is stored as `{uri}LocalName` (or just
//! `LocalName` when it has no namespace). [`Element`] is a borrowed, `Copy`
//! view into the arena; nothing points from a child back to its parent
//! except the index stored in the node.

mod values;

pub use values::{numeric_value, parse_f64, parse_f64_list, point3d, vector3d};

use crate::error::{Error, Result};
use quick_xml::NsReader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// Index of a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in document order
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    namespaces: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: Option<String>,
}

/// A parsed XML document stored as an arena of nodes
///
/// Nodes are stored in document order (pre-order), so comparing two
/// [`NodeId`]s compares document positions.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    source: Option<PathBuf>,
}

impl Document {
    /// Parse a document held in memory
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_reader(xml.as_bytes())
    }

    /// Parse a document from a file, remembering its path
    ///
    /// The path is used later to resolve external geometry references,
    /// which are relative to the model file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut document = Self::from_reader(std::io::BufReader::new(file))?;
        document.source = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse a document from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut reader = NsReader::from_reader(reader);
        reader.config_mut().trim_text(true);

        let mut nodes: Vec<Node> = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let id = open_element(&mut nodes, &open, &reader, e)?;
                    open.push(id);
                }
                Event::Empty(ref e) => {
                    open_element(&mut nodes, &open, &reader, e)?;
                }
                Event::End(ref e) => {
                    if open.pop().is_none() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(Error::invalid_xml_element(&name, "end tag without start tag"));
                    }
                }
                Event::Text(t) => {
                    if let Some(&current) = open.last() {
                        let raw = t.decode().map_err(quick_xml::Error::from)?;
                        let text = unescape(&raw).map_err(quick_xml::Error::from)?;
                        append_text(&mut nodes[current.0], &text);
                    }
                }
                Event::CData(c) => {
                    if let Some(&current) = open.last() {
                        let text = c.decode().map_err(quick_xml::Error::from)?;
                        append_text(&mut nodes[current.0], &text);
                    }
                }
                Event::GeneralRef(r) => {
                    if let Some(&current) = open.last() {
                        match r.resolve_char_ref()? {
                            Some(ch) => append_text(&mut nodes[current.0], ch.encode_utf8(&mut [0; 4])),
                            None => {
                                let name = r.decode().map_err(quick_xml::Error::from)?;
                                let text = resolve_predefined_entity(&name).ok_or_else(|| {
                                    Error::InvalidXml(format!("unknown entity '&{};'", name))
                                })?;
                                append_text(&mut nodes[current.0], text);
                            }
                        }
                    }
                }
                Event::DocType(_) => {
                    // DTDs can carry external entity declarations
                    return Err(Error::InvalidXml(
                        "DTD declarations are not allowed in OCX documents".to_string(),
                    ));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(&unclosed) = open.last() {
            return Err(Error::invalid_xml_element(
                &nodes[unclosed.0].name,
                "element is not closed before end of document",
            ));
        }
        if nodes.is_empty() {
            return Err(Error::InvalidXml("document has no root element".to_string()));
        }

        Ok(Self {
            nodes,
            source: None,
        })
    }

    /// The document element
    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            id: NodeId(0),
        }
    }

    /// View of the node with the given id
    ///
    /// Ids are only meaningful for the document that produced them.
    pub fn element(&self, id: NodeId) -> Element<'_> {
        Element { doc: self, id }
    }

    /// Number of elements in the document
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a parsed document has a root element
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Path the document was read from, if it came from a file
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn open_element<R>(
    nodes: &mut Vec<Node>,
    open: &[NodeId],
    reader: &NsReader<R>,
    e: &BytesStart<'_>,
) -> Result<NodeId> {
    let parent = open.last().copied();
    if parent.is_none() && !nodes.is_empty() {
        return Err(Error::InvalidXml(
            "document has more than one root element".to_string(),
        ));
    }

    let qname = e.name();
    let raw_name = String::from_utf8_lossy(qname.as_ref());
    let resolver = reader.resolver();
    let decoder = reader.decoder();

    let (namespace, local) = resolver.resolve_element(qname);
    let name = qualified_name(namespace, local.as_ref(), &raw_name)?;

    let mut namespaces = Vec::new();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        match attr.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => namespaces.push((String::new(), value)),
            Some(PrefixDeclaration::Named(prefix)) => {
                namespaces.push((String::from_utf8_lossy(prefix).into_owned(), value))
            }
            None => {
                // Unprefixed attributes are in no namespace
                let (namespace, local) = resolver.resolve_attribute(attr.key);
                attributes.push((qualified_name(namespace, local.as_ref(), &raw_name)?, value));
            }
        }
    }

    let id = NodeId(nodes.len());
    nodes.push(Node {
        name,
        attributes,
        namespaces,
        parent,
        children: Vec::new(),
        text: None,
    });
    if let Some(parent) = parent {
        nodes[parent.0].children.push(id);
    }
    Ok(id)
}

/// `{uri}Local` for a bound name, `Local` for an unbound one
fn qualified_name(namespace: ResolveResult<'_>, local: &[u8], element: &str) -> Result<String> {
    let local = std::str::from_utf8(local).map_err(|e| Error::InvalidXml(e.to_string()))?;
    match namespace {
        ResolveResult::Bound(uri) => Ok(format!(
            "{{{}}}{}",
            String::from_utf8_lossy(uri.into_inner()),
            local
        )),
        ResolveResult::Unbound => Ok(local.to_string()),
        ResolveResult::Unknown(prefix) => Err(Error::invalid_xml_element(
            element,
            &format!(
                "undeclared namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        )),
    }
}

fn append_text(node: &mut Node, text: &str) {
    match node.text {
        Some(ref mut existing) => existing.push_str(text),
        None => node.text = Some(text.to_string()),
    }
}

/// Extract the local part of a `{uri}Local` or `prefix:Local` name
pub(crate) fn get_local_name(name: &str) -> &str {
    if let Some(pos) = name.rfind('}') {
        &name[pos + 1..]
    } else if let Some(pos) = name.rfind(':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Borrowed view of one element of a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl<'a> Element<'a> {
    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id.0]
    }

    /// Arena id of this element
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document this element belongs to
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Resolved name, `{uri}Local` or `Local`
    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    /// Local part of the name
    pub fn local_name(&self) -> &'a str {
        get_local_name(self.name())
    }

    /// True when the resolved name equals `tag`
    ///
    /// An empty tag never matches; it stands for a name the schema does not
    /// declare.
    pub fn is(&self, tag: &str) -> bool {
        !tag.is_empty() && self.name() == tag
    }

    /// Attribute by resolved name
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        if name.is_empty() {
            return None;
        }
        self.node()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by local name, regardless of namespace
    pub fn attribute_by_local_name(&self, local: &str) -> Option<&'a str> {
        self.node()
            .attributes
            .iter()
            .find(|(k, _)| get_local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes as (resolved name, value) pairs
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.node()
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Namespace declarations made on this element, as (prefix, uri)
    ///
    /// The default namespace has an empty prefix.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.node()
            .namespaces
            .iter()
            .map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Text content directly inside this element
    pub fn text(&self) -> Option<&'a str> {
        self.node().text.as_deref()
    }

    /// Enclosing element
    pub fn parent(&self) -> Option<Element<'a>> {
        let doc = self.doc;
        self.node().parent.map(|id| Element { doc, id })
    }

    /// Enclosing elements, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let mut current = self.parent();
        std::iter::from_fn(move || {
            let next = current?;
            current = next.parent();
            Some(next)
        })
    }

    /// Direct children in document order
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        self.node().children.iter().map(move |&id| Element { doc, id })
    }

    /// First direct child named `tag`
    pub fn child(&self, tag: &str) -> Option<Element<'a>> {
        self.children().find(|c| c.is(tag))
    }

    /// Direct children named `tag`
    pub fn children_named(&self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.children().filter(move |c| c.is(tag))
    }

    /// All descendants in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.node().children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
        }
    }

    /// Descendants named `tag`, at any depth
    pub fn find_descendants(&self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.descendants().filter(move |d| d.is(tag))
    }

    /// First descendant named `tag`, at any depth
    pub fn find_descendant(&self, tag: &str) -> Option<Element<'a>> {
        self.descendants().find(|d| d.is(tag))
    }

    /// Short description for messages: local name plus name or id
    pub fn describe(&self) -> String {
        let label = self
            .attribute("name")
            .or_else(|| self.attribute("id"));
        match label {
            Some(label) => format!("{} '{}'", self.local_name(), label),
            None => self.local_name().to_string(),
        }
    }
}

/// Pre-order iterator over descendants of an element
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.doc.nodes[id.0];
        self.stack.extend(node.children.iter().rev().copied());
        Some(Element { doc: self.doc, id })
    }
}
