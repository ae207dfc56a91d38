//! Taxograph taxonomy trees
//!
//! A taxonomy is an n-ary tree of taxons built once from nested raw data and
//! read-only afterwards. This crate provides:
//!
//! - `tree`: the arena-backed [`TaxonomyTree`] and its builder
//! - `identifier`: [`NodeIdentifier`], the opaque `uri` used to name path steps
//! - `resolve`: node lookup, virtual-root resolution, children enumeration
//!   and reading user-typed identifiers
//!
//! ```text
//!   raw JSON ──build──► TaxonomyTree ──find_node_by_id──► &TaxonomyNode
//!                            │
//!                            └──resolve_virtual_root(path)──► list_selectable_children
//! ```

pub mod identifier;
pub mod resolve;
pub mod tree;

pub use identifier::NodeIdentifier;
pub use resolve::{
    find_node_by_id, identifier_from_text, identifiers_from_text, list_selectable_children,
    resolve_virtual_root,
};
pub use tree::{Descendants, NodeIndex, NodeSummary, TaxonomyNode, TaxonomyTree};

use thiserror::Error;

/// Failures raised while building or querying a taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// The raw description is unusable; the whole build is aborted.
    #[error("malformed taxonomy at {location}: {reason}")]
    MalformedTaxonomy { location: String, reason: String },

    #[error("not found: {id}")]
    NodeNotFound { id: NodeIdentifier },

    /// More than one node carries the identifier. Trees produced by
    /// [`TaxonomyTree::from_value`] never trigger this.
    #[error("ambiguous node id {id}: {matches} nodes share it")]
    AmbiguousNode { id: NodeIdentifier, matches: usize },
}

impl TaxonomyError {
    pub(crate) fn malformed(location: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTaxonomy {
            location: location.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by asking the user again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }
}
