//! Canonical indentation for markup trees.

use super::tree::{Document, MarkupError, Node};

/// One level of indentation
pub const INDENTATION: &str = "    ";

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Normalize whitespace-only `text`/`tail` values below `node` so that every nesting
/// level sits on its own line, indented by [`INDENTATION`] per level.
///
/// Text containing anything but whitespace is left alone. `level` is the depth of
/// `node`; the root is called with 0 and never gets a tail.
pub fn indent(node: &mut Node, level: usize) {
    let newline = format!("\n{}", INDENTATION.repeat(level));
    if node.children.is_empty() {
        if level > 0 && is_blank(&node.tail) {
            node.tail = Some(newline);
        }
        return;
    }

    if is_blank(&node.text) {
        node.text = Some(format!("{newline}{INDENTATION}"));
    }
    for child in node.children.iter_mut() {
        indent(child, level + 1);
        if is_blank(&child.tail) {
            child.tail = Some(format!("{newline}{INDENTATION}"));
        }
    }
    if let Some(last) = node.children.last_mut()
        && is_blank(&last.tail)
    {
        last.tail = Some(newline);
    }
}

/// Indented copy of `document`; the original is left untouched
pub fn indented(document: &Document) -> Document {
    let mut copy = document.clone();
    indent(&mut copy.root, 0);
    copy
}

/// Parse a document that can be written back without losing content. Entity
/// references cannot: the tree only knows their replacement text.
fn parse_for_rewrite(content: &[u8]) -> Result<Document, MarkupError> {
    let document = Document::parse(content)?;
    match document.entity_references.first() {
        Some(name) => Err(MarkupError::EntityReference(name.clone())),
        None => Ok(document),
    }
}

/// Parse, indent and serialize `content`
pub fn pretty_print(content: &[u8]) -> Result<Vec<u8>, MarkupError> {
    let mut document = parse_for_rewrite(content)?;
    indent(&mut document.root, 0);
    Ok(document.to_bytes())
}

/// Whether `content` is byte-identical to its pretty-printed form
pub fn is_pretty_printed(content: &[u8]) -> Result<bool, MarkupError> {
    let document = parse_for_rewrite(content)?;
    Ok(indented(&document).to_bytes() == content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pretty(input: &str) -> String {
        String::from_utf8(pretty_print(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_nested_elements_are_indented() {
        assert_eq!(
            pretty("<a><b><c>x</c></b><d/></a>"),
            "<?xml version='1.0' encoding='utf-8'?>\n<a>\n    <b>\n        <c>x</c>\n    </b>\n    <d/>\n</a>\n"
        );
    }

    #[test]
    fn test_whitespace_only_text_is_replaced() {
        assert_eq!(
            pretty("<a>\n\t\t<b/>  \n  <c/>\n\n</a>"),
            "<?xml version='1.0' encoding='utf-8'?>\n<a>\n    <b/>\n    <c/>\n</a>\n"
        );
    }

    #[test]
    fn test_meaningful_text_is_preserved() {
        assert_eq!(
            pretty("<p>Hello <b>world</b> again</p>"),
            "<?xml version='1.0' encoding='utf-8'?>\n<p>Hello <b>world</b> again</p>\n"
        );
    }

    #[test]
    fn test_leaf_root_gets_no_tail() {
        let mut root = Node::element("a");
        indent(&mut root, 0);
        assert_eq!(root.tail, None);
        assert_eq!(root.text, None);
    }

    #[test]
    fn test_leaf_child_tail_depends_on_level() {
        let mut leaf = Node::element("b");
        indent(&mut leaf, 2);
        assert_eq!(leaf.tail.as_deref(), Some("\n        "));
    }

    #[test]
    fn test_comments_are_children() {
        assert_eq!(
            pretty("<a><!-- note --><b/></a>"),
            "<?xml version='1.0' encoding='utf-8'?>\n<a>\n    <!-- note -->\n    <b/>\n</a>\n"
        );
    }

    #[test]
    fn test_indented_leaves_original_alone() {
        let document = Document::parse_str("<a><b/></a>").unwrap();
        let copy = indented(&document);
        assert_eq!(document.root.text, None);
        assert_eq!(copy.root.text.as_deref(), Some("\n    "));
    }

    #[test]
    fn test_pretty_print_is_idempotent() {
        let once = pretty_print(b"<a><b><c/></b>text<d>1</d></a>").unwrap();
        let twice = pretty_print(&once).unwrap();
        assert_eq!(once, twice);
        assert!(is_pretty_printed(&once).unwrap());
    }

    #[test]
    fn test_unformatted_is_detected() {
        assert!(!is_pretty_printed(b"<a><b/></a>").unwrap());
    }

    #[test]
    fn test_entity_references_are_never_expanded_into_output() {
        let content = b"<!DOCTYPE a [<!ENTITY e \"v\">]>\n<a><b>&e;</b></a>";
        let err = pretty_print(content).unwrap_err();
        assert!(matches!(err, MarkupError::EntityReference(ref name) if name == "e"));
        assert!(is_pretty_printed(content).is_err());
    }

    #[test]
    fn test_declared_but_unused_entities_are_fine() {
        let out = pretty("<!DOCTYPE a [<!ENTITY e \"v\">]>\n<a><!-- &e; --><b>&amp;&#65;</b></a>");
        assert_eq!(
            out,
            "<?xml version='1.0' encoding='utf-8'?>\n<!DOCTYPE a [<!ENTITY e \"v\">]>\n<a>\n    <!-- &e; -->\n    <b>&amp;A</b>\n</a>\n"
        );
    }
}
