//! Plain-text rendering of trees and node lists.

use colored::Colorize;
use std::fmt::Write;
use taxograph_tree::{NodeSummary, TaxonomyNode, TaxonomyTree};

/// Indented outline of the whole tree, one node per line.
pub fn tree_outline(tree: &TaxonomyTree) -> String {
    let mut out = String::new();
    for node in tree {
        let indent = "  ".repeat(tree.depth(node));
        let _ = writeln!(
            out,
            "{indent}{} {}",
            node.content().bold(),
            format!("[{}]", node.uri()).dimmed()
        );
    }
    out
}

/// One line per node: `uri  content  (label, N children)`.
pub fn node_rows(nodes: &[NodeSummary]) -> String {
    let width = nodes
        .iter()
        .map(|n| n.uri.to_string().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for node in nodes {
        let uri = format!("{:<width$}", node.uri.to_string());
        let _ = writeln!(
            out,
            "{}  {}  ({}, {})",
            uri.cyan(),
            node.content.bold(),
            node.label,
            child_count(node.child_count)
        );
    }
    out
}

/// Breadcrumb such as `Music › Rock › Metal`.
pub fn breadcrumb(tree: &TaxonomyTree, node: &TaxonomyNode) -> String {
    tree.path_from_root(node)
        .iter()
        .map(|n| n.content())
        .collect::<Vec<_>>()
        .join(" › ")
}

fn child_count(n: usize) -> String {
    match n {
        0 => "leaf".to_string(),
        1 => "1 child".to_string(),
        n => format!("{n} children"),
    }
}
