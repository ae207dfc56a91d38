//! Taxograph compound widgets
//!
//! A compound widget is one independent taxonomy selection: which taxonomy it
//! browses, the level-tagged path picked so far, and a couple of transient
//! interaction flags. The [`TaxonomyStore`] owns the taxonomies and the
//! ordered widget list and is the single place they are mutated.
//!
//! ```text
//!   click child ──► TaxonomyStore::select_child ──► CompoundWidget::push_level
//!                          │
//!                          ├──► selectable_children (virtual root + children)
//!                          └──► query_segments ──► search backend
//! ```

pub mod collision;
pub mod config;
pub mod query;
pub mod store;
pub mod widget;


pub use collision::{colliding_elements, colliding_with, HitTest, Tolerance};
pub use config::{ConfigError, TaxographConfig, TaxonomySource};
pub use query::{to_query_segment, QuerySegment};
pub use store::{TaxonomyStore, WidgetSlot};
pub use widget::{make_empty, CompoundWidget, PathLevel};

use std::path::PathBuf;
use taxograph_tree::{NodeIdentifier, TaxonomyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// The widget's taxonomy has not been chosen yet.
    #[error("widget has no taxonomy selected")]
    MissingTaxonomyReference,

    #[error("invalid path level {level}: expected {expected}")]
    InvalidPathLevel { level: usize, expected: usize },

    #[error("unknown widget #{index}")]
    UnknownWidget { index: usize },

    #[error("unknown taxonomy {name:?}")]
    UnknownTaxonomy { name: String },

    #[error("{id} is not a child of {parent}")]
    NotSelectable {
        id: NodeIdentifier,
        parent: NodeIdentifier,
    },

    #[error("failed to load taxonomy {}: {source}", path.display())]
    LoadTaxonomy {
        path: PathBuf,
        #[source]
        source: TaxonomyError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

impl WidgetError {
    /// Errors the UI should answer with a corrective prompt rather than a
    /// diagnostic.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingTaxonomyReference | Self::NotSelectable { .. } => true,
            Self::Taxonomy(inner) => inner.is_recoverable(),
            _ => false,
        }
    }
}
