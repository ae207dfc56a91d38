//! Store configuration.
//!
//! ```json
//! {
//!   "taxonomies": [{ "name": "Music", "path": "taxonomies/music.json" }],
//!   "taxonomy_dir": "taxonomies/extra",
//!   "hit_tolerance": "50%",
//!   "validate_path_levels": true,
//!   "log_filter": "info"
//! }
//! ```
//!
//! Every field is optional. Relative paths are resolved against the directory
//! holding the config file.

use crate::Tolerance;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A named taxonomy file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySource {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxographConfig {
    /// Taxonomies loaded at startup, in order.
    pub taxonomies: Vec<TaxonomySource>,
    /// Every `*.json` directly inside is loaded, named after its file stem.
    pub taxonomy_dir: Option<PathBuf>,
    /// Overlap needed for a dragged widget to land on a drop target.
    pub hit_tolerance: Tolerance,
    /// Reject imported widgets whose path levels are not `1, 2, 3, ...`.
    /// Only `TaxonomyStore::import_widgets` reads this; store mutations such
    /// as `set_path_level` always keep the level sequence.
    pub validate_path_levels: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TaxographConfig {
    fn default() -> Self {
        Self {
            taxonomies: Vec::new(),
            taxonomy_dir: None,
            hit_tolerance: Tolerance::default(),
            validate_path_levels: true,
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TaxographConfig {
    /// Read a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Resolve relative taxonomy paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for source in &mut self.taxonomies {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
        if let Some(dir) = self.taxonomy_dir.take() {
            self.taxonomy_dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }
        self
    }

    pub fn with_taxonomy(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.taxonomies.push(TaxonomySource {
            name: name.into(),
            path: path.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TaxographConfig::default();
        assert!(config.taxonomies.is_empty());
        assert_eq!(config.hit_tolerance, Tolerance::default());
        assert!(config.validate_path_levels);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxograph.json");
        std::fs::write(
            &path,
            r#"{ "taxonomies": [{ "name": "Music", "path": "music.json" }], "hit_tolerance": "75%" }"#,
        )
        .unwrap();

        let config = TaxographConfig::from_path(&path).unwrap();
        assert_eq!(config.taxonomies[0].name, "Music");
        assert_eq!(config.taxonomies[0].path, dir.path().join("music.json"));
        assert_eq!(config.hit_tolerance.fraction(), 0.75);
        assert!(config.validate_path_levels);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let config = TaxographConfig::default()
            .with_taxonomy("Place", "/srv/taxonomies/place.json")
            .relative_to(Path::new("/etc/taxograph"));
        assert_eq!(
            config.taxonomies[0].path,
            PathBuf::from("/srv/taxonomies/place.json")
        );
    }

    #[test]
    fn test_bad_tolerance_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxograph.json");
        std::fs::write(&path, r#"{ "hit_tolerance": "lots" }"#).unwrap();
        assert!(matches!(
            TaxographConfig::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TaxographConfig::from_path(dir.path().join("nope.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
