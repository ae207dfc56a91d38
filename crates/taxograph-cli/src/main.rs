//! Taxograph CLI
//!
//! Command-line front end for:
//! - Validating taxonomy files (`check`, `tree`)
//! - Browsing a taxonomy by path (`find`, `children`)
//! - Turning saved compound widgets into backend query segments (`segments`)

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taxograph_tree::{
    find_node_by_id, identifier_from_text, identifiers_from_text, list_selectable_children,
    resolve_virtual_root, NodeSummary, TaxonomyTree,
};
use taxograph_widgets::{
    to_query_segment, CompoundWidget, QuerySegment, TaxographConfig, TaxonomyStore, WidgetSlot,
};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "taxograph")]
#[command(author, version, about = "Taxograph: hierarchical taxon selection")]
struct Cli {
    /// Config file (JSON). Taxonomies it names can be used in place of a file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a taxonomy and report its size.
    Check {
        /// Taxonomy JSON file or configured taxonomy name
        taxonomy: String,
    },

    /// Print a taxonomy as an indented outline.
    Tree {
        /// Taxonomy JSON file or configured taxonomy name
        taxonomy: String,
    },

    /// Resolve a single node by identifier.
    Find {
        /// Taxonomy JSON file or configured taxonomy name
        taxonomy: String,
        /// Node identifier (digits name a numeric uri when the taxonomy has one)
        id: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List the selectable children for a path.
    Children {
        /// Taxonomy JSON file or configured taxonomy name
        taxonomy: String,
        /// Comma-separated identifiers, root-exclusive and leaf-last
        #[arg(long, default_value = "")]
        path: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a saved widget list into query segments (JSON on stdout).
    Segments {
        /// JSON array of widgets, or of `{ widget, isVisible }` slots
        input: PathBuf,
        /// Include hidden widgets
        #[arg(long)]
        all: bool,
    },

    /// List the taxonomies named by the config.
    Taxonomies,
}

/// Widget list file: either bare widgets or slots carrying visibility.
#[derive(Deserialize)]
#[serde(untagged)]
enum WidgetFile {
    Slots(Vec<WidgetSlot>),
    Widgets(Vec<CompoundWidget>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TaxographConfig::from_path(path)?,
        None => TaxographConfig::default(),
    };
    init_tracing(cli.verbose, &config.log_filter);

    let store = TaxonomyStore::new(config).context("failed to initialise the taxonomy store")?;

    match cli.command {
        Commands::Check { taxonomy } => cmd_check(&store, &taxonomy),
        Commands::Tree { taxonomy } => cmd_tree(&store, &taxonomy),
        Commands::Find { taxonomy, id, json } => cmd_find(&store, &taxonomy, &id, json),
        Commands::Children {
            taxonomy,
            path,
            json,
        } => cmd_children(&store, &taxonomy, &path, json),
        Commands::Segments { input, all } => cmd_segments(&store, &input, all),
        Commands::Taxonomies => cmd_taxonomies(&store),
    }
}

fn init_tracing(verbose: u8, default_filter: &str) {
    let fallback = match verbose {
        0 => default_filter.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A configured taxonomy name, or else a path to a taxonomy JSON file.
fn open_taxonomy(store: &TaxonomyStore, taxonomy: &str) -> Result<Arc<TaxonomyTree>> {
    if let Ok(tree) = store.taxonomy(taxonomy) {
        return Ok(tree);
    }
    let path = Path::new(taxonomy);
    if !path.exists() {
        return Err(anyhow!(
            "{taxonomy:?} is neither a configured taxonomy nor a file (configured: {})",
            store.taxonomy_names().join(", ")
        ));
    }
    tracing::debug!(path = %path.display(), "loading taxonomy file");
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(taxonomy)
        .to_string();
    Ok(store.load_taxonomy_file(&name, path)?)
}

fn cmd_check(store: &TaxonomyStore, taxonomy: &str) -> Result<()> {
    let tree = open_taxonomy(store, taxonomy)?;
    let leaves = tree.all(|n| n.is_leaf()).len();
    println!(
        "{} {} (nodes={} leaves={} depth={})",
        "ok".green().bold(),
        tree.root().content().bold(),
        tree.len(),
        leaves,
        tree.height()
    );
    Ok(())
}

fn cmd_tree(store: &TaxonomyStore, taxonomy: &str) -> Result<()> {
    let tree = open_taxonomy(store, taxonomy)?;
    print!("{}", render::tree_outline(&tree));
    Ok(())
}

fn cmd_find(store: &TaxonomyStore, taxonomy: &str, id: &str, json: bool) -> Result<()> {
    let tree = open_taxonomy(store, taxonomy)?;
    let node = find_node_by_id(&tree, &identifier_from_text(&tree, id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&node.summary())?);
    } else {
        print!("{}", render::node_rows(&[node.summary()]));
        println!("  {} {}", "→".cyan(), render::breadcrumb(&tree, node));
    }
    Ok(())
}

fn cmd_children(store: &TaxonomyStore, taxonomy: &str, path: &str, json: bool) -> Result<()> {
    let tree = open_taxonomy(store, taxonomy)?;
    let path = identifiers_from_text(&tree, path);
    let children: Vec<NodeSummary> = list_selectable_children(&tree, &path)?
        .into_iter()
        .map(|n| n.summary())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&children)?);
        return Ok(());
    }

    let anchor = resolve_virtual_root(&tree, &path)?;
    println!(
        "{} {}",
        "Under".green().bold(),
        render::breadcrumb(&tree, anchor)
    );
    if children.is_empty() {
        println!("  {} nothing further to select", "leaf:".yellow().bold());
    } else {
        print!("{}", render::node_rows(&children));
    }
    Ok(())
}

fn cmd_segments(store: &TaxonomyStore, input: &Path, all: bool) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let file: WidgetFile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a widget list", input.display()))?;

    let slots = match file {
        WidgetFile::Slots(slots) => slots,
        WidgetFile::Widgets(widgets) => widgets
            .into_iter()
            .map(|widget| WidgetSlot {
                widget,
                is_visible: true,
            })
            .collect(),
    };

    let hidden: Vec<bool> = slots.iter().map(|s| !s.is_visible).collect();
    let indices = store.import_widgets(slots.into_iter().map(|s| s.widget).collect())?;
    for (index, hidden) in indices.iter().zip(hidden) {
        if hidden {
            store.hide_widget(*index)?;
        }
    }

    let segments: Vec<QuerySegment> = if all {
        let mut segments = Vec::with_capacity(indices.len());
        for index in indices {
            segments.push(to_query_segment(&store.widget(index)?)?);
        }
        segments
    } else {
        store.query_segments()?
    };

    eprintln!(
        "{} {} segment(s) from {}",
        "ok".green().bold(),
        segments.len(),
        input.display()
    );
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

fn cmd_taxonomies(store: &TaxonomyStore) -> Result<()> {
    let names = store.taxonomy_names();
    if names.is_empty() {
        println!("{} no taxonomies configured", "info:".yellow().bold());
        return Ok(());
    }
    for name in names {
        let tree = store.taxonomy(&name)?;
        println!("{}  ({} nodes)", name.bold(), tree.len());
    }
    Ok(())
}
