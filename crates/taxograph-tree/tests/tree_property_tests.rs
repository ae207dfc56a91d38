use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use taxograph_tree::{
    find_node_by_id, list_selectable_children, resolve_virtual_root, NodeIdentifier,
    TaxonomyError, TaxonomyTree,
};

/// Random tree shape: `parents[i - 1]` picks the parent of node `i` among
/// nodes `0..i`, so node 0 is always the root.
fn tree_shape() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(any::<usize>(), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, pick)| pick % (i + 1))
            .collect()
    })
}

fn children_of(parents: &[usize]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); parents.len() + 1];
    for (i, &p) in parents.iter().enumerate() {
        children[p].push(i + 1);
    }
    children
}

fn raw_node(node: usize, children: &[Vec<usize>], ids: &[i64]) -> Value {
    let kids: Vec<Value> = children[node]
        .iter()
        .map(|&c| raw_node(c, children, ids))
        .collect();
    json!({
        "content": format!("taxon {node}"),
        "id": ids[node],
        "label": "Taxon",
        "children": kids,
    })
}

fn raw_tree(parents: &[usize]) -> Value {
    let ids: Vec<i64> = (0..=parents.len() as i64).collect();
    raw_node(0, &children_of(parents), &ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn built_trees_have_unique_uris(parents in tree_shape()) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        prop_assert_eq!(tree.len(), parents.len() + 1);

        let uris: HashSet<&NodeIdentifier> = tree.iter().map(|n| n.uri()).collect();
        prop_assert_eq!(uris.len(), tree.len());
        prop_assert_eq!(tree.all(|n| n.is_root()).len(), 1);
    }

    #[test]
    fn empty_path_resolves_to_root(parents in tree_shape()) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        let root = resolve_virtual_root(&tree, &[]).expect("root");
        prop_assert!(std::ptr::eq(root, tree.root()));
    }

    #[test]
    fn virtual_root_matches_leaf_lookup(
        parents in tree_shape(),
        pick in any::<usize>(),
        stale in proptest::collection::vec(any::<i64>(), 0..4),
    ) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        let nodes: Vec<_> = tree.iter().collect();
        let target = nodes[pick % nodes.len()];

        // Arbitrary (possibly invalid) intermediate steps followed by a valid leaf.
        let mut path: Vec<NodeIdentifier> = stale.into_iter().map(NodeIdentifier::from).collect();
        path.push(target.uri().clone());

        let via_path = resolve_virtual_root(&tree, &path).expect("resolve");
        let via_id = find_node_by_id(&tree, target.uri()).expect("find");
        prop_assert!(std::ptr::eq(via_path, via_id));
    }

    #[test]
    fn identifier_path_round_trips(parents in tree_shape(), pick in any::<usize>()) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        let nodes: Vec<_> = tree.iter().collect();
        let target = nodes[pick % nodes.len()];

        let path = tree.identifier_path(target);
        prop_assert_eq!(path.len(), tree.depth(target));
        let resolved = resolve_virtual_root(&tree, &path).expect("resolve");
        prop_assert!(std::ptr::eq(resolved, target));
    }

    #[test]
    fn children_empty_iff_leaf(parents in tree_shape(), pick in any::<usize>()) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        let nodes: Vec<_> = tree.iter().collect();
        let target = nodes[pick % nodes.len()];

        let children = list_selectable_children(&tree, &tree.identifier_path(target)).expect("children");
        prop_assert_eq!(children.is_empty(), target.is_leaf());
        prop_assert_eq!(children.len(), target.child_indices().len());
    }

    #[test]
    fn absent_ids_are_not_found(parents in tree_shape(), offset in 1i64..1000) {
        let tree = TaxonomyTree::from_value(&raw_tree(&parents)).expect("build");
        let missing = NodeIdentifier::from(parents.len() as i64 + offset);
        let err = find_node_by_id(&tree, &missing).unwrap_err();
        prop_assert_eq!(err, TaxonomyError::NodeNotFound { id: missing });
    }

    #[test]
    fn duplicate_ids_abort_the_build(
        parents in tree_shape().prop_filter("needs two nodes", |p| !p.is_empty()),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let n = parents.len() + 1;
        let (a, b) = (a % n, b % n);
        prop_assume!(a != b);

        let mut ids: Vec<i64> = (0..n as i64).collect();
        ids[b] = ids[a];
        let raw = raw_node(0, &children_of(&parents), &ids);

        let err = TaxonomyTree::from_value(&raw).unwrap_err();
        let is_malformed = matches!(err, TaxonomyError::MalformedTaxonomy { .. });
        prop_assert!(is_malformed);
    }
}
