//! Arena-backed taxonomy tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeIndex`].
//! The builder fills the arena in depth-first pre-order, so index `0` is
//! always the root and a node's children follow their display order.
//!
//! Raw input shape:
//!
//! ```text
//! { "content": "Music", "id": 0, "label": "Taxon",
//!   "children": [ { "content": "Rock", "id": 1, "label": "Taxon" }, ... ] }
//! ```

use crate::{NodeIdentifier, TaxonomyError};
use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// Nodes
// ============================================================================

/// Structural position of a node inside one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub const ROOT: NodeIndex = NodeIndex(0);

    pub const fn raw(self) -> u32 {
        self.0
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// A taxon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyNode {
    index: NodeIndex,
    uri: NodeIdentifier,
    label: String,
    content: String,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl TaxonomyNode {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn uri(&self) -> &NodeIdentifier {
        &self.uri
    }

    /// Semantic kind, e.g. `"Taxon"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Display text.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_index(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn child_indices(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            uri: self.uri.clone(),
            label: self.label.clone(),
            content: self.content.clone(),
            child_count: self.children.len(),
        }
    }
}

/// Detached, serializable view of a node (for CLI/JSON output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub uri: NodeIdentifier,
    pub label: String,
    pub content: String,
    pub child_count: usize,
}

// ============================================================================
// Tree
// ============================================================================

/// An immutable taxonomy tree. Build once, share behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTree {
    nodes: Vec<TaxonomyNode>,
}

impl TaxonomyTree {
    /// Parse and build a tree from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, TaxonomyError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| TaxonomyError::malformed("$", format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Build a tree from a nested raw description.
    ///
    /// Every node needs `content`, `label` and an identifier under `uri` or
    /// `id` (`uri` wins when both are present); a numeric identifier must be an
    /// integer that fits an `i64`. `children` is optional.
    /// Identifiers must be unique across the whole tree.
    pub fn from_value(raw: &Value) -> Result<Self, TaxonomyError> {
        let mut nodes: Vec<TaxonomyNode> = Vec::new();
        let mut seen: AHashMap<NodeIdentifier, String> = AHashMap::new();

        // (raw object, parent, location); children are pushed in reverse so
        // they pop in display order.
        let mut stack: Vec<(&Value, Option<NodeIndex>, String)> = vec![(raw, None, "$".to_string())];

        while let Some((value, parent, location)) = stack.pop() {
            let obj = value
                .as_object()
                .ok_or_else(|| TaxonomyError::malformed(&location, "expected an object"))?;

            let uri = read_identifier(obj, &location)?;
            let content = read_string(obj, "content", &location)?;
            let label = read_string(obj, "label", &location)?;

            if let Some(first) = seen.get(&uri) {
                return Err(TaxonomyError::malformed(
                    &location,
                    format!("duplicate uri {uri} (first defined at {first})"),
                ));
            }
            seen.insert(uri.clone(), location.clone());

            let index = u32::try_from(nodes.len())
                .map(NodeIndex)
                .map_err(|_| TaxonomyError::malformed(&location, "too many nodes"))?;
            if let Some(parent) = parent {
                nodes[parent.slot()].children.push(index);
            }
            nodes.push(TaxonomyNode {
                index,
                uri,
                label,
                content,
                parent,
                children: Vec::new(),
            });

            match obj.get("children") {
                None | Some(Value::Null) => {}
                Some(Value::Array(children)) => {
                    for (i, child) in children.iter().enumerate().rev() {
                        stack.push((child, Some(index), format!("{location}.children[{i}]")));
                    }
                }
                Some(_) => {
                    return Err(TaxonomyError::malformed(
                        &location,
                        "`children` must be an array",
                    ))
                }
            }
        }

        tracing::info!(
            nodes = nodes.len(),
            root = %nodes[0].uri,
            "built taxonomy tree"
        );
        Ok(Self { nodes })
    }

    pub fn root(&self) -> &TaxonomyNode {
        &self.nodes[NodeIndex::ROOT.slot()]
    }

    pub fn get(&self, index: NodeIndex) -> Option<&TaxonomyNode> {
        self.nodes.get(index.slot())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, node: &TaxonomyNode) -> Option<&TaxonomyNode> {
        node.parent.and_then(|p| self.get(p))
    }

    /// Immediate children in display order.
    pub fn children(&self, node: &TaxonomyNode) -> Vec<&TaxonomyNode> {
        node.children.iter().filter_map(|&c| self.get(c)).collect()
    }

    /// Number of edges between the root and `node` (the root is depth 0).
    pub fn depth(&self, node: &TaxonomyNode) -> usize {
        let mut depth = 0;
        let mut current = node.parent;
        while let Some(p) = current {
            depth += 1;
            current = self.nodes[p.slot()].parent;
        }
        depth
    }

    /// Deepest node depth in the tree.
    pub fn height(&self) -> usize {
        self.iter().map(|n| self.depth(n)).max().unwrap_or(0)
    }

    /// Root-to-node chain, root first, `node` last.
    pub fn path_from_root<'a>(&'a self, node: &'a TaxonomyNode) -> Vec<&'a TaxonomyNode> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Identifier path for `node`: root-exclusive, leaf-last. Feeding it back
    /// into `resolve_virtual_root` yields `node` again.
    pub fn identifier_path(&self, node: &TaxonomyNode) -> Vec<NodeIdentifier> {
        self.path_from_root(node)
            .into_iter()
            .skip(1)
            .map(|n| n.uri.clone())
            .collect()
    }

    /// Depth-first pre-order traversal of the whole tree.
    pub fn iter(&self) -> Descendants<'_> {
        self.descendants(self.root())
    }

    /// Depth-first pre-order traversal of the subtree rooted at `node`,
    /// `node` included.
    pub fn descendants<'a>(&'a self, node: &'a TaxonomyNode) -> Descendants<'a> {
        Descendants {
            tree: self,
            stack: vec![node.index],
        }
    }

    /// Every node satisfying `predicate`, in depth-first pre-order.
    pub fn all<F>(&self, mut predicate: F) -> Vec<&TaxonomyNode>
    where
        F: FnMut(&TaxonomyNode) -> bool,
    {
        self.iter().filter(|node| predicate(node)).collect()
    }

    /// Breaks the uniqueness invariant on purpose.
    #[cfg(test)]
    pub(crate) fn overwrite_uri(&mut self, index: NodeIndex, uri: NodeIdentifier) {
        self.nodes[index.slot()].uri = uri;
    }
}

/// Pre-order walk driven by an explicit stack.
pub struct Descendants<'a> {
    tree: &'a TaxonomyTree,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TaxonomyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.tree.get(index)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a TaxonomyTree {
    type Item = &'a TaxonomyNode;
    type IntoIter = Descendants<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Raw field readers
// ============================================================================

fn read_string(obj: &Map<String, Value>, key: &str, location: &str) -> Result<String, TaxonomyError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(TaxonomyError::malformed(location, format!("`{key}` must be a string"))),
        None => Err(TaxonomyError::malformed(location, format!("missing `{key}`"))),
    }
}

/// Numeric identifiers must be integers in `i64` range. Anything else that
/// needs to be opaque should be written as a string.
fn read_identifier(obj: &Map<String, Value>, location: &str) -> Result<NodeIdentifier, TaxonomyError> {
    let raw = obj
        .get("uri")
        .or_else(|| obj.get("id"))
        .ok_or_else(|| TaxonomyError::malformed(location, "missing `uri`/`id`"))?;
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(n) => Ok(NodeIdentifier::Number(n)),
            None if n.is_u64() => Err(TaxonomyError::malformed(
                location,
                format!("numeric identifier {n} is out of range (use a string)"),
            )),
            None => Err(TaxonomyError::malformed(
                location,
                format!("numeric identifier {n} must be an integer (use a string)"),
            )),
        },
        Value::String(s) => Ok(NodeIdentifier::Text(s.clone())),
        _ => Err(TaxonomyError::malformed(
            location,
            "identifier must be a number or a string",
        )),
    }
}
