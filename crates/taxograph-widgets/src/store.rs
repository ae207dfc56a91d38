//! The shared Taxograph store.
//!
//! Holds the named taxonomy trees and the ordered list of widgets. Trees are
//! immutable once registered and handed out as `Arc`s; widgets are only
//! changed through the typed entry points below, each of which holds the
//! widget write lock for the whole read-check-write of one mutation.

use crate::{
    colliding_with, to_query_segment, CompoundWidget, HitTest, PathLevel, QuerySegment,
    TaxographConfig, Tolerance, WidgetError,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taxograph_tree::{
    list_selectable_children, resolve_virtual_root, NodeIdentifier, NodeSummary, TaxonomyTree,
};
use walkdir::WalkDir;

/// A widget plus its visibility in the widget list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSlot {
    pub widget: CompoundWidget,
    pub is_visible: bool,
}

#[derive(Clone)]
pub struct TaxonomyStore {
    config: TaxographConfig,
    taxonomies: Arc<RwLock<BTreeMap<String, Arc<TaxonomyTree>>>>,
    widgets: Arc<RwLock<Vec<WidgetSlot>>>,
}

impl TaxonomyStore {
    /// Create a store and load every taxonomy the config names.
    pub fn new(config: TaxographConfig) -> Result<Self, WidgetError> {
        let store = Self {
            config,
            taxonomies: Arc::new(RwLock::new(BTreeMap::new())),
            widgets: Arc::new(RwLock::new(Vec::new())),
        };

        for source in store.config.taxonomies.clone() {
            store.load_taxonomy_file(&source.name, &source.path)?;
        }
        if let Some(dir) = store.config.taxonomy_dir.clone() {
            store.load_taxonomy_dir(&dir)?;
        }

        Ok(store)
    }

    pub fn config(&self) -> &TaxographConfig {
        &self.config
    }

    pub fn hit_tolerance(&self) -> Tolerance {
        self.config.hit_tolerance
    }

    // ========================================================================
    // Taxonomies
    // ========================================================================

    /// Register (or replace) a taxonomy under `name`.
    pub fn register_taxonomy(&self, name: impl Into<String>, tree: TaxonomyTree) -> Arc<TaxonomyTree> {
        let name = name.into();
        let tree = Arc::new(tree);
        tracing::info!(taxonomy = %name, nodes = tree.len(), "registered taxonomy");
        self.taxonomies.write().insert(name, Arc::clone(&tree));
        tree
    }

    pub fn load_taxonomy_file(&self, name: &str, path: &Path) -> Result<Arc<TaxonomyTree>, WidgetError> {
        let text = std::fs::read_to_string(path).map_err(|source| WidgetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = TaxonomyTree::from_json_str(&text).map_err(|source| WidgetError::LoadTaxonomy {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.register_taxonomy(name, tree))
    }

    /// Load every `*.json` file directly inside `dir`, named by file stem.
    /// A malformed file aborts the load.
    pub fn load_taxonomy_dir(&self, dir: &Path) -> Result<Vec<String>, WidgetError> {
        let mut loaded = Vec::new();
        let mut files: Vec<PathBuf> = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(WidgetError::Io { path, source });
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
                tracing::debug!(path = %path.display(), "skipping non-taxonomy entry");
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();

        for path in files {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping taxonomy file with a non UTF-8 name");
                continue;
            };
            let name = name.to_string();
            self.load_taxonomy_file(&name, &path)?;
            loaded.push(name);
        }

        Ok(loaded)
    }

    pub fn taxonomy(&self, name: &str) -> Result<Arc<TaxonomyTree>, WidgetError> {
        self.taxonomies
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownTaxonomy {
                name: name.to_string(),
            })
    }

    pub fn taxonomy_names(&self) -> Vec<String> {
        self.taxonomies.read().keys().cloned().collect()
    }

    // ========================================================================
    // Widget list
    // ========================================================================

    /// Append an empty, visible widget and return its index.
    pub fn add_widget(&self) -> usize {
        let mut widgets = self.widgets.write();
        widgets.push(WidgetSlot {
            widget: crate::make_empty(),
            is_visible: true,
        });
        let index = widgets.len() - 1;
        tracing::info!(widget = index, "added widget");
        index
    }

    /// Append existing widgets (e.g. restored UI state). Indices are returned
    /// in input order. With `validate_path_levels` on, nothing is added unless
    /// every widget is valid.
    pub fn import_widgets(&self, imported: Vec<CompoundWidget>) -> Result<Vec<usize>, WidgetError> {
        if self.config.validate_path_levels {
            for widget in &imported {
                widget.validate()?;
            }
        }

        let mut widgets = self.widgets.write();
        let start = widgets.len();
        widgets.extend(imported.into_iter().map(|widget| WidgetSlot {
            widget,
            is_visible: true,
        }));
        Ok((start..widgets.len()).collect())
    }

    pub fn hide_widget(&self, index: usize) -> Result<(), WidgetError> {
        let mut widgets = self.widgets.write();
        let slot = widgets
            .get_mut(index)
            .ok_or(WidgetError::UnknownWidget { index })?;
        slot.is_visible = false;
        tracing::info!(widget = index, "hid widget");
        Ok(())
    }

    /// Move a widget to a new position (drop after a drag). Other widgets keep
    /// their relative order.
    pub fn move_widget(&self, from: usize, to: usize) -> Result<(), WidgetError> {
        let mut widgets = self.widgets.write();
        let len = widgets.len();
        if from >= len {
            return Err(WidgetError::UnknownWidget { index: from });
        }
        if to >= len {
            return Err(WidgetError::UnknownWidget { index: to });
        }
        let mut slot = widgets.remove(from);
        slot.widget.end_drag();
        widgets.insert(to, slot);
        tracing::info!(from, to, "moved widget");
        Ok(())
    }

    /// Number of widgets ever added, hidden ones included.
    pub fn defined_widget_count(&self) -> usize {
        self.widgets.read().len()
    }

    pub fn widget_visibility(&self) -> Vec<bool> {
        self.widgets.read().iter().map(|s| s.is_visible).collect()
    }

    pub fn widget(&self, index: usize) -> Result<CompoundWidget, WidgetError> {
        self.widgets
            .read()
            .get(index)
            .map(|s| s.widget.clone())
            .ok_or(WidgetError::UnknownWidget { index })
    }

    pub fn widgets(&self) -> Vec<WidgetSlot> {
        self.widgets.read().clone()
    }

    fn update_widget<T, F>(&self, index: usize, f: F) -> Result<T, WidgetError>
    where
        F: FnOnce(&mut CompoundWidget) -> Result<T, WidgetError>,
    {
        let mut widgets = self.widgets.write();
        let slot = widgets
            .get_mut(index)
            .ok_or(WidgetError::UnknownWidget { index })?;
        f(&mut slot.widget)
    }

    // ========================================================================
    // Widget mutations
    // ========================================================================

    pub fn open_taxonomy_selector(&self, index: usize) -> Result<(), WidgetError> {
        self.update_widget(index, |w| {
            w.open_taxonomy_selector();
            Ok(())
        })
    }

    pub fn cancel_taxonomy_selector(&self, index: usize) -> Result<(), WidgetError> {
        self.update_widget(index, |w| {
            w.cancel_taxonomy_selector();
            Ok(())
        })
    }

    /// Anchor the widget to a registered taxonomy.
    pub fn choose_taxonomy(&self, index: usize, name: &str) -> Result<(), WidgetError> {
        self.taxonomy(name)?;
        self.update_widget(index, |w| {
            w.choose_taxonomy(name);
            Ok(())
        })?;
        tracing::info!(widget = index, taxonomy = %name, "chose taxonomy");
        Ok(())
    }

    pub fn begin_drag(&self, index: usize) -> Result<(), WidgetError> {
        self.update_widget(index, |w| {
            w.begin_drag();
            Ok(())
        })
    }

    pub fn end_drag(&self, index: usize) -> Result<(), WidgetError> {
        self.update_widget(index, |w| {
            w.end_drag();
            Ok(())
        })
    }

    /// Drill down into `id`, which must be one of the current selectable
    /// children. Returns the new depth.
    pub fn select_child(&self, index: usize, id: NodeIdentifier) -> Result<usize, WidgetError> {
        let taxonomies = Arc::clone(&self.taxonomies);
        let level = self.update_widget(index, |w| {
            let name = w
                .taxonomy_ref()
                .ok_or(WidgetError::MissingTaxonomyReference)?;
            let tree = taxonomies
                .read()
                .get(name)
                .cloned()
                .ok_or_else(|| WidgetError::UnknownTaxonomy {
                    name: name.to_string(),
                })?;

            let path = w.identifiers();
            let children = list_selectable_children(&tree, &path)?;
            if !children.iter().any(|child| child.uri() == &id) {
                let parent = resolve_virtual_root(&tree, &path)?.uri().clone();
                return Err(WidgetError::NotSelectable { id, parent });
            }
            Ok(w.push_level(id))
        })?;
        tracing::debug!(widget = index, level, "selected child");
        Ok(level)
    }

    /// Write a raw level, appending or replacing as [`CompoundWidget::set_level`]
    /// does. The identifier is not checked against the tree.
    pub fn set_path_level(&self, index: usize, entry: PathLevel) -> Result<(), WidgetError> {
        self.update_widget(index, |w| w.set_level(entry))
    }

    /// Back out so the widget keeps only its first `depth` levels.
    pub fn back_out(&self, index: usize, depth: usize) -> Result<(), WidgetError> {
        self.update_widget(index, |w| {
            w.truncate_to(depth);
            Ok(())
        })
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    fn widget_tree(&self, index: usize) -> Result<(CompoundWidget, Arc<TaxonomyTree>), WidgetError> {
        let widget = self.widget(index)?;
        let name = widget
            .taxonomy_ref()
            .ok_or(WidgetError::MissingTaxonomyReference)?;
        let tree = self.taxonomy(name)?;
        Ok((widget, tree))
    }

    /// The widget's current browsing anchor.
    pub fn virtual_root(&self, index: usize) -> Result<NodeSummary, WidgetError> {
        let (widget, tree) = self.widget_tree(index)?;
        let node = resolve_virtual_root(&tree, &widget.identifiers())?;
        Ok(node.summary())
    }

    /// What the widget offers for its next level. Empty once a leaf is reached.
    pub fn selectable_children(&self, index: usize) -> Result<Vec<NodeSummary>, WidgetError> {
        let (widget, tree) = self.widget_tree(index)?;
        let children = list_selectable_children(&tree, &widget.identifiers())?;
        Ok(children.into_iter().map(|c| c.summary()).collect())
    }

    pub fn query_segment(&self, index: usize) -> Result<QuerySegment, WidgetError> {
        to_query_segment(&self.widget(index)?)
    }

    /// Segments for every visible widget, in list order.
    pub fn query_segments(&self) -> Result<Vec<QuerySegment>, WidgetError> {
        self.widgets
            .read()
            .iter()
            .filter(|slot| slot.is_visible)
            .map(|slot| to_query_segment(&slot.widget))
            .collect()
    }

    /// Drop targets hit by `dragged` at the configured tolerance.
    pub fn drop_targets<'a, D, E>(&self, dragged: &D, elements: &'a [E]) -> Vec<&'a E>
    where
        D: HitTest<E> + ?Sized,
    {
        colliding_with(dragged, elements, self.config.hit_tolerance)
    }
}

impl std::fmt::Debug for TaxonomyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyStore")
            .field("taxonomies", &self.taxonomy_names())
            .field("widgets", &self.defined_widget_count())
            .finish()
    }
}
