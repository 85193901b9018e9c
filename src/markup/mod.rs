//! Hierarchical markup support: an owned XML tree and the indenter that
//! pretty-prints it.

pub mod indent;
pub mod tree;

pub use indent::{INDENTATION, indent, indented, is_pretty_printed, pretty_print};
pub use tree::{Attribute, Document, MarkupError, NamespaceDecl, Node, NodeKind};
