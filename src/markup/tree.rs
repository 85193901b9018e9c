//! Owned markup tree.
//!
//! `roxmltree` gives a read-only view of a document; the indenter needs to rewrite
//! whitespace, so the parsed document is copied into this ElementTree-like model where
//! every node carries its own `text` (content before the first child) and `tail`
//! (content after its closing tag, up to the next sibling).

use roxmltree::{NodeType, ParsingOptions};
use std::borrow::Cow;
use std::ops::Range;
use thiserror::Error;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>\n";
const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("content is not valid {encoding}: byte 0x{byte:02x} at offset {offset}")]
    InvalidByte {
        encoding: &'static str,
        byte: u8,
        offset: usize,
    },
    #[error("unsupported document encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("XMLSyntaxError: {0}")]
    Syntax(#[from] roxmltree::Error),
    #[error("entity reference &{0}; would be replaced by its expansion")]
    EntityReference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A namespace declared on an element; `prefix` is `None` for the default namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: String,
        namespaces: Vec<NamespaceDecl>,
        attributes: Vec<Attribute>,
    },
    /// Comment body lives in `text`
    Comment,
    /// Instruction value lives in `text`
    ProcessingInstruction { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn element(name: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                name: name.to_string(),
                namespaces: Vec::new(),
                attributes: Vec::new(),
            },
            text: None,
            tail: None,
            children: Vec::new(),
        }
    }

    pub fn comment(body: &str) -> Self {
        Self {
            kind: NodeKind::Comment,
            text: Some(body.to_string()),
            tail: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Text of the first child element with the given local name
    pub fn find_text(&self, local_name: &str) -> Option<&str> {
        self.find(local_name).map(|n| n.text.as_deref().unwrap_or(""))
    }

    pub fn find(&self, local_name: &str) -> Option<&Node> {
        self.children.iter().find(|child| {
            child
                .name()
                .map(|name| name.rsplit(':').next() == Some(local_name))
                .unwrap_or(false)
        })
    }
}

/// A parsed document: the root element plus what surrounds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub doctype: Option<String>,
    /// Comments and processing instructions before the root element
    pub prolog: Vec<Node>,
    pub root: Node,
    /// Comments and processing instructions after the root element
    pub epilog: Vec<Node>,
    /// Names of user-defined entities referenced inside the root element. The tree
    /// only holds their expansion.
    pub entity_references: Vec<String>,
}

impl Document {
    /// Parse raw bytes, decoded according to the XML declaration (UTF-8 when absent).
    /// Besides UTF-8 only ISO-8859-1 and US-ASCII are understood.
    pub fn parse(content: &[u8]) -> Result<Self, MarkupError> {
        let text = decode(content)?;
        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> Result<Self, MarkupError> {
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;
        let parsed = roxmltree::Document::parse_with_options(text, options)?;

        let root_element = parsed.root_element();
        let mut prolog = Vec::new();
        let mut prolog_ranges = Vec::new();
        let mut epilog = Vec::new();
        let mut seen_root = false;
        for child in parsed.root().children() {
            if child.id() == root_element.id() {
                seen_root = true;
                continue;
            }
            if let Some(node) = convert_misc(child) {
                if seen_root {
                    epilog.push(node);
                } else {
                    prolog_ranges.push(child.range());
                    prolog.push(node);
                }
            }
        }

        let root_range = root_element.range();
        Ok(Self {
            doctype: extract_doctype(&text[..root_range.start], &prolog_ranges),
            prolog,
            root: convert_element(root_element),
            epilog,
            entity_references: entity_references(&text[root_range]),
        })
    }

    /// Serialize with an XML declaration and a trailing newline
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::from(XML_DECLARATION);
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
            out.push('\n');
        }
        for node in &self.prolog {
            write_node(node, &mut out);
            out.push('\n');
        }
        write_node(&self.root, &mut out);
        for node in &self.epilog {
            out.push('\n');
            write_node(node, &mut out);
        }
        out.push('\n');
        out.into_bytes()
    }
}

fn convert_misc(node: roxmltree::Node<'_, '_>) -> Option<Node> {
    match node.node_type() {
        NodeType::Comment => Some(Node::comment(node.text().unwrap_or(""))),
        NodeType::PI => node.pi().map(|pi| Node {
            kind: NodeKind::ProcessingInstruction {
                target: pi.target.to_string(),
            },
            text: pi.value.map(str::to_string),
            tail: None,
            children: Vec::new(),
        }),
        _ => None,
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Node {
    let mut converted = Node {
        kind: NodeKind::Element {
            name: qualified_name(node, node.tag_name().namespace(), node.tag_name().name(), true),
            namespaces: declared_namespaces(node),
            attributes: node
                .attributes()
                .map(|attr| Attribute {
                    name: qualified_name(node, attr.namespace(), attr.name(), false),
                    value: attr.value().to_string(),
                })
                .collect(),
        },
        text: None,
        tail: None,
        children: Vec::new(),
    };

    for child in node.children() {
        match child.node_type() {
            NodeType::Text => {
                let text = child.text().unwrap_or("");
                let slot = match converted.children.last_mut() {
                    Some(last) => &mut last.tail,
                    None => &mut converted.text,
                };
                slot.get_or_insert_with(String::new).push_str(text);
            }
            NodeType::Element => converted.children.push(convert_element(child)),
            _ => {
                if let Some(misc) = convert_misc(child) {
                    converted.children.push(misc);
                }
            }
        }
    }

    converted
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str, is_element: bool) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{local}");
    }
    // Unprefixed attributes never belong to the default namespace, so an attribute
    // in a namespace always needs the prefix bound to it.
    let prefix = node
        .namespaces()
        .filter(|ns| ns.uri() == uri)
        .find(|ns| is_element || ns.name().is_some())
        .and_then(|ns| ns.name());
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// Namespaces in scope on `node` that are not inherited from its parent
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<NamespaceDecl> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect()
}

/// Encoding named in the XML declaration, if any
fn declared_encoding(content: &[u8]) -> Option<String> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    if !content.starts_with(b"<?xml") {
        return None;
    }
    let end = content.windows(2).position(|w| w == b"?>")?;
    let declaration = String::from_utf8_lossy(&content[..end]);
    let (_, rest) = declaration.split_once("encoding")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    value.find(quote).map(|close| value[..close].to_string())
}

fn decode(content: &[u8]) -> Result<Cow<'_, str>, MarkupError> {
    let Some(encoding) = declared_encoding(content) else {
        return Ok(Cow::Borrowed(std::str::from_utf8(content)?));
    };
    match encoding.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(Cow::Borrowed(std::str::from_utf8(content)?)),
        "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => {
            Ok(Cow::Owned(content.iter().map(|&b| char::from(b)).collect()))
        }
        "us-ascii" | "ascii" => match content.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(MarkupError::InvalidByte {
                encoding: "US-ASCII",
                byte: content[offset],
                offset,
            }),
            None => Ok(Cow::Borrowed(std::str::from_utf8(content)?)),
        },
        _ => Err(MarkupError::UnsupportedEncoding(encoding)),
    }
}

/// User-defined entity references in `source`, character data only (comments,
/// CDATA sections and processing instructions are skipped)
fn entity_references(source: &str) -> Vec<String> {
    const OPAQUE: [(&str, &str); 3] = [("<!--", "-->"), ("<![CDATA[", "]]>"), ("<?", "?>")];
    let mut names: Vec<String> = Vec::new();
    let mut rest = source;
    while let Some(pos) = rest.find(['<', '&']) {
        rest = &rest[pos..];
        if let Some((open, close)) = OPAQUE.iter().find(|(open, _)| rest.starts_with(open)) {
            match rest[open.len()..].find(close) {
                Some(end) => rest = &rest[open.len() + end + close.len()..],
                None => break,
            }
            continue;
        }
        if let Some(reference) = rest.strip_prefix('&')
            && let Some(end) = reference.find(';')
        {
            let name = &reference[..end];
            if !name.starts_with('#') && !PREDEFINED_ENTITIES.contains(&name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        rest = &rest[1..];
    }
    names
}

/// Raw `<!DOCTYPE ...>` declaration, internal subset included. Occurrences inside the
/// prolog's comments and processing instructions (`skipped`) do not count.
fn extract_doctype(before_root: &str, skipped: &[Range<usize>]) -> Option<String> {
    let start = before_root
        .match_indices("<!DOCTYPE")
        .map(|(index, _)| index)
        .find(|index| !skipped.iter().any(|range| range.contains(index)))?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, c) in before_root[start..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(before_root[start..=start + offset].to_string()),
            _ => {}
        }
    }
    None
}

fn write_node(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Element {
            name,
            namespaces,
            attributes,
        } => {
            out.push('<');
            out.push_str(name);
            for ns in namespaces {
                match &ns.prefix {
                    Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"")),
                    None => out.push_str(" xmlns=\""),
                }
                escape_attribute(&ns.uri, out);
                out.push('"');
            }
            for attr in attributes {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attribute(&attr.value, out);
                out.push('"');
            }
            if node.text.is_none() && node.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                if let Some(text) = &node.text {
                    escape_text(text, out);
                }
                for child in &node.children {
                    write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(node.text.as_deref().unwrap_or(""));
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction { target } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(value) = &node.text {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
    }
    if let Some(tail) = &node.tail {
        escape_text(tail, out);
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}
