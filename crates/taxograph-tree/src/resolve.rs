//! Path resolution over a [`TaxonomyTree`].
//!
//! A path is a root-exclusive, leaf-last list of [`NodeIdentifier`]s. Since
//! every `uri` is unique within a tree, only the leaf is used to locate the
//! browsing anchor ("virtual root"); the earlier steps exist for breadcrumbs
//! and are not re-validated here.

use crate::{NodeIdentifier, TaxonomyError, TaxonomyNode, TaxonomyTree};

/// Find the single node whose `uri` equals `id`, scanning the whole tree.
pub fn find_node_by_id<'a>(
    tree: &'a TaxonomyTree,
    id: &NodeIdentifier,
) -> Result<&'a TaxonomyNode, TaxonomyError> {
    let matches = tree.all(|node| node.uri() == id);
    match matches.as_slice() {
        [node] => Ok(*node),
        [] => Err(TaxonomyError::NodeNotFound { id: id.clone() }),
        many => {
            tracing::error!(uri = %id, matches = many.len(), "taxonomy uri is not unique");
            Err(TaxonomyError::AmbiguousNode {
                id: id.clone(),
                matches: many.len(),
            })
        }
    }
}

/// The node the UI should treat as the current browsing context.
///
/// An empty path resolves to the root without traversal; otherwise the last
/// identifier is resolved and every earlier step is ignored.
pub fn resolve_virtual_root<'a>(
    tree: &'a TaxonomyTree,
    path: &[NodeIdentifier],
) -> Result<&'a TaxonomyNode, TaxonomyError> {
    match path.last() {
        None => {
            tracing::debug!("empty path, virtual root is the tree root");
            Ok(tree.root())
        }
        Some(leaf) => {
            let node = find_node_by_id(tree, leaf)?;
            tracing::debug!(uri = %leaf, depth = path.len(), "resolved virtual root");
            Ok(node)
        }
    }
}

/// Children of the virtual root, in display order. Empty means `path` ends
/// at a leaf and there is nothing further to drill into.
pub fn list_selectable_children<'a>(
    tree: &'a TaxonomyTree,
    path: &[NodeIdentifier],
) -> Result<Vec<&'a TaxonomyNode>, TaxonomyError> {
    let virtual_root = resolve_virtual_root(tree, path)?;
    Ok(tree.children(virtual_root))
}

/// Identifier named by user-typed `text` (a CLI argument, a URL fragment).
///
/// Digit-only text names the numeric uri when the tree has one; otherwise
/// the text uri with exactly that spelling, so `"007"` stays `"007"`.
pub fn identifier_from_text(tree: &TaxonomyTree, text: &str) -> NodeIdentifier {
    let text = text.trim();
    let number = match text.parse::<NodeIdentifier>() {
        Ok(number @ NodeIdentifier::Number(_)) => number,
        _ => return NodeIdentifier::from(text),
    };
    if !matches!(
        find_node_by_id(tree, &number),
        Err(TaxonomyError::NodeNotFound { .. })
    ) {
        return number;
    }

    let textual = NodeIdentifier::from(text);
    if find_node_by_id(tree, &textual).is_ok() {
        tracing::debug!(text, "digit-only text names a text uri");
        return textual;
    }
    number
}

/// [`identifier_from_text`] over a comma-separated path such as `1,3`.
pub fn identifiers_from_text(tree: &TaxonomyTree, text: &str) -> Vec<NodeIdentifier> {
    NodeIdentifier::path_segments(text)
        .into_iter()
        .map(|segment| identifier_from_text(tree, segment))
        .collect()
}
