//! The compound widget model.
//!
//! Serialized with the field names the UI uses:
//!
//! ```text
//! { "taxonomyRef": "Occupation",
//!   "selectedPath": [{ "level": 1, "value": "Manufacturing" }, ...],
//!   "isCurrentlyBeingDragged": false,
//!   "hasTentativeTaxonSelector": false }
//! ```

use crate::WidgetError;
use serde::{Deserialize, Serialize};
use taxograph_tree::NodeIdentifier;

/// One step of a widget's path. `level` is the 1-based depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLevel {
    pub level: usize,
    pub value: NodeIdentifier,
}

impl PathLevel {
    pub fn new(level: usize, value: impl Into<NodeIdentifier>) -> Self {
        Self {
            level,
            value: value.into(),
        }
    }
}

/// A single taxonomy selection unit.
///
/// Invariant: `selected_path[i].level == i + 1`. Every mutator keeps it;
/// deserialized widgets should be checked with [`CompoundWidget::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundWidget {
    taxonomy_ref: Option<String>,
    #[serde(default)]
    selected_path: Vec<PathLevel>,
    #[serde(default)]
    is_currently_being_dragged: bool,
    #[serde(default)]
    has_tentative_taxon_selector: bool,
}

/// A fresh widget with no taxonomy, no path and both flags cleared.
pub fn make_empty() -> CompoundWidget {
    CompoundWidget::default()
}

impl CompoundWidget {
    /// A widget already anchored to `taxonomy` with `values` as levels 1..=n.
    pub fn with_path<I, V>(taxonomy: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<NodeIdentifier>,
    {
        let mut widget = Self {
            taxonomy_ref: Some(taxonomy.into()),
            ..Self::default()
        };
        for value in values {
            widget.push_level(value);
        }
        widget
    }

    pub fn taxonomy_ref(&self) -> Option<&str> {
        self.taxonomy_ref.as_deref()
    }

    pub fn selected_path(&self) -> &[PathLevel] {
        &self.selected_path
    }

    pub fn depth(&self) -> usize {
        self.selected_path.len()
    }

    /// The path as plain identifiers, root-exclusive and leaf-last.
    pub fn identifiers(&self) -> Vec<NodeIdentifier> {
        self.selected_path.iter().map(|l| l.value.clone()).collect()
    }

    pub fn leaf(&self) -> Option<&NodeIdentifier> {
        self.selected_path.last().map(|l| &l.value)
    }

    pub fn is_being_dragged(&self) -> bool {
        self.is_currently_being_dragged
    }

    pub fn has_tentative_taxon_selector(&self) -> bool {
        self.has_tentative_taxon_selector
    }

    // ========================================================================
    // Path mutation
    // ========================================================================

    /// Drill down one level. Returns the new level number.
    pub fn push_level(&mut self, value: impl Into<NodeIdentifier>) -> usize {
        let level = self.selected_path.len() + 1;
        self.selected_path.push(PathLevel::new(level, value));
        level
    }

    /// Set the value at `entry.level`.
    ///
    /// `level == depth + 1` appends. A level already on the path replaces that
    /// step and drops everything below it. Anything else would leave a gap
    /// and is rejected.
    pub fn set_level(&mut self, entry: PathLevel) -> Result<(), WidgetError> {
        let next = self.selected_path.len() + 1;
        if entry.level == 0 || entry.level > next {
            return Err(WidgetError::InvalidPathLevel {
                level: entry.level,
                expected: next,
            });
        }
        self.selected_path.truncate(entry.level - 1);
        self.selected_path.push(entry);
        Ok(())
    }

    /// Back out to `depth` levels (0 clears the path).
    pub fn truncate_to(&mut self, depth: usize) {
        self.selected_path.truncate(depth);
    }

    /// Check the level invariant on a widget built elsewhere.
    pub fn validate(&self) -> Result<(), WidgetError> {
        for (i, entry) in self.selected_path.iter().enumerate() {
            if entry.level != i + 1 {
                return Err(WidgetError::InvalidPathLevel {
                    level: entry.level,
                    expected: i + 1,
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Taxonomy choice
    // ========================================================================

    pub fn open_taxonomy_selector(&mut self) {
        self.has_tentative_taxon_selector = true;
    }

    pub fn cancel_taxonomy_selector(&mut self) {
        self.has_tentative_taxon_selector = false;
    }

    /// Confirm the taxonomy. Switching to a different one clears the path,
    /// since its identifiers belong to the old tree.
    pub fn choose_taxonomy(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.taxonomy_ref.as_deref() != Some(name.as_str()) {
            self.selected_path.clear();
        }
        self.taxonomy_ref = Some(name);
        self.has_tentative_taxon_selector = false;
    }

    // ========================================================================
    // Drag state
    // ========================================================================

    pub fn begin_drag(&mut self) {
        self.is_currently_being_dragged = true;
    }

    pub fn end_drag(&mut self) {
        self.is_currently_being_dragged = false;
    }
}
