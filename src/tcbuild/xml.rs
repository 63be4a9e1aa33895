//! Namespace-tolerant helpers over `roxmltree`
//!
//! TwinCAT writes `.plcproj` files with the MSBuild default namespace while
//! `.tsproj`/`.xti` files carry none, so every tag comparison goes through
//! [`local_name`].

use super::error::{JobError, Result};
use roxmltree::{Document, Node};
use std::path::Path;

/// Strips a namespace qualifier from a tag name.
///
/// Handles Clark notation (`{uri}Name`) and prefixed names (`ns:Name`).
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.rfind('}') {
        Some(idx) => &tag[idx + 1..],
        None => tag,
    };
    match tag.rfind(':') {
        Some(idx) => &tag[idx + 1..],
        None => tag,
    }
}

/// True if `node` is an element whose local name is `key`.
pub fn is_element(node: Node<'_, '_>, key: &str) -> bool {
    node.is_element() && local_name(node.tag_name().name()) == key
}

/// First direct child element named `key`.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, key: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_element(*child, key))
}

/// Trimmed text of the first direct child element named `key`.
pub fn child_text<'a>(node: Node<'a, '_>, key: &str) -> Option<&'a str> {
    child_element(node, key)
        .and_then(|child| child.text())
        .map(str::trim)
}

pub fn parse_document<'input>(path: &Path, text: &'input str) -> Result<Document<'input>> {
    Document::parse(text).map_err(|source| JobError::Xml {
        path: path.to_path_buf(),
        source,
    })
}
