//! Month and search filters. Both take a tree and return a new one.

use crate::model::MonthKey;
use crate::tree::{HierarchyNode, NodeId, Tree};
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// Keeps the nodes that have at least one date in `months`, or no dates at all.
///
/// An empty selection, or one that covers every month present in the tree, returns the tree
/// unchanged. Otherwise leaves are filtered by their own dates and every retained ancestor is
/// re-aggregated from what is left below it, so values and counts reflect the selected months.
/// Undated nodes are kept with their whole subtree.
pub fn filter_months(tree: &Tree, months: &BTreeSet<MonthKey>) -> Tree {
    if months.is_empty() || tree.available_months().is_subset(months) {
        return tree.clone();
    }

    let mut keep = HashSet::new();
    for &root in tree.roots() {
        mark_months(tree, root, months, &mut keep);
    }
    trace!("Month filter keeps {} of {} nodes", keep.len(), tree.len());

    let mut out = Tree::new();
    for &root in tree.roots() {
        tree.copy_if(root, &mut out, None, &|n: &HierarchyNode| keep.contains(n.id()));
    }
    out.rollup();
    out.without_empty()
}

/// Marks the retained part of the subtree at `id` and reports whether anything was retained.
fn mark_months<'a>(
    tree: &'a Tree,
    id: NodeId,
    months: &BTreeSet<MonthKey>,
    keep: &mut HashSet<&'a str>,
) -> bool {
    let node = tree.node(id);
    if node.dates().is_empty() {
        mark_all(tree, id, keep);
        return true;
    }
    let retained = if node.is_leaf() {
        node.dates().iter().any(|d| months.contains(&d.month()))
    } else {
        let mut any = false;
        for &child in tree.children(id) {
            any |= mark_months(tree, child, months, keep);
        }
        any
    };
    if retained {
        keep.insert(node.id());
    }
    retained
}

fn mark_all<'a>(tree: &'a Tree, id: NodeId, keep: &mut HashSet<&'a str>) {
    keep.insert(tree.node(id).id());
    for &child in tree.children(id) {
        mark_all(tree, child, keep);
    }
}

/// Keeps the nodes whose name contains `term`, ignoring case, together with their ancestors.
///
/// A matching node keeps its whole subtree. An ancestor kept only because something below it
/// matches keeps just the matching branches, but its value and count are not recomputed. An empty
/// or blank term returns the tree unchanged.
pub fn filter_search(tree: &Tree, term: &str) -> Tree {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return tree.clone();
    }
    let mut out = Tree::new();
    for &root in tree.roots() {
        copy_matching(tree, root, &mut out, None, &term);
    }
    trace!(
        "Search {:?} keeps {} of {} mothers",
        term,
        out.roots().len(),
        tree.roots().len()
    );
    out
}

fn copy_matching(tree: &Tree, id: NodeId, out: &mut Tree, parent: Option<NodeId>, term: &str) {
    if name_matches(tree.node(id), term) {
        tree.copy_if(id, out, parent, &|_: &HierarchyNode| true);
        return;
    }
    if !has_match_below(tree, id, term) {
        return;
    }
    let copied = tree.copy_node(id, out, parent);
    for &child in tree.children(id) {
        copy_matching(tree, child, out, Some(copied), term);
    }
}

fn has_match_below(tree: &Tree, id: NodeId, term: &str) -> bool {
    tree.children(id)
        .iter()
        .any(|&c| name_matches(tree.node(c), term) || has_match_below(tree, c, term))
}

fn name_matches(node: &HierarchyNode, lowercase_term: &str) -> bool {
    node.name().to_lowercase().contains(lowercase_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, LedgerDate};
    use rust_decimal::Decimal;

    fn leaf(id: &str, name: &str, value: i64, date: &str) -> HierarchyNode {
        HierarchyNode::new(id, name)
            .with_totals(Amount::new(Decimal::from(value)), 1)
            .with_dates(LedgerDate::parse(date))
    }

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let m = tree.push_root(HierarchyNode::new("0060", "Bolsas"));
        let c1 = tree.push_child(m, HierarchyNode::new("00600001", "Bolsa Pesquisa X"));
        let c2 = tree.push_child(m, HierarchyNode::new("00600002", "Bolsa Ensino"));
        tree.push_child(c1, leaf("00600001#1", "Pagamento janeiro", 10, "20240105"));
        tree.push_child(c1, leaf("00600001#2", "Pagamento fevereiro", 15, "20240210"));
        tree.push_child(c2, leaf("00600002#1", "Pagamento março", 20, "20240301"));
        let m2 = tree.push_root(HierarchyNode::new("0070", "Diárias"));
        let c3 = tree.push_child(m2, HierarchyNode::new("00700001", "Diárias nacionais"));
        tree.push_child(c3, leaf("00700001#1", "Viagem", 7, ""));
        tree.rollup();
        tree
    }

    fn ids(tree: &Tree) -> Vec<&str> {
        tree.walk().into_iter().map(|n| tree.node(n).id()).collect()
    }

    #[test]
    fn test_month_filter_no_selection_is_noop() {
        let tree = sample();
        assert_eq!(filter_months(&tree, &BTreeSet::new()), tree);
    }

    #[test]
    fn test_month_filter_all_selected_is_noop() {
        let tree = sample();
        let all = tree.available_months();
        assert_eq!(all.len(), 3);
        assert_eq!(filter_months(&tree, &all), tree);
    }

    #[test]
    fn test_month_filter_reaggregates() {
        let tree = sample();
        let filtered = filter_months(&tree, &BTreeSet::from([month("2024-02")]));
        assert_eq!(
            ids(&filtered),
            vec!["0060", "00600001", "00600001#2", "0070", "00700001", "00700001#1"]
        );
        let mother = filtered.get("0060").unwrap();
        assert_eq!(mother.value().value(), Decimal::from(15));
        assert_eq!(mother.count(), 1);
        assert_eq!(mother.dates().len(), 1);
        // Undated nodes are always retained.
        assert_eq!(filtered.get("0070").unwrap().count(), 1);
    }

    #[test]
    fn test_month_filter_drops_unmatched_mother() {
        let mut tree = sample();
        let m = tree.push_root(HierarchyNode::new("0080", "Material"));
        let c = tree.push_child(m, HierarchyNode::new("00800001", "Papel"));
        tree.push_child(c, leaf("00800001#1", "Resma", 3, "20230101"));
        tree.rollup();
        let filtered = filter_months(&tree, &BTreeSet::from([month("2024-01")]));
        assert!(filtered.get("0080").is_none());
        assert!(filtered.get("00600002").is_none());
        assert_eq!(filtered.total().value(), Decimal::from(17));
    }

    #[test]
    fn test_search_keeps_ancestors_of_matches() {
        let tree = sample();
        let found = filter_search(&tree, "pesquisa");
        assert_eq!(
            ids(&found),
            vec!["0060", "00600001", "00600001#1", "00600001#2"]
        );
        // An ancestor kept only for a matching descendant keeps its unfiltered totals, so on
        // searched trees a parent's value is not the sum of its visible children.
        let mother = found.get("0060").unwrap();
        assert_eq!(mother.value().value(), Decimal::from(45));
        assert_eq!(mother.count(), 3);
        let visible: Decimal = found
            .children_of("0060")
            .iter()
            .map(|c| c.value().value())
            .sum();
        assert_eq!(visible, Decimal::from(25));
    }

    #[test]
    fn test_search_matches_leaves() {
        let tree = sample();
        let found = filter_search(&tree, "MARÇO");
        assert_eq!(ids(&found), vec!["0060", "00600002", "00600002#1"]);
    }

    #[test]
    fn test_search_matching_mother_keeps_subtree() {
        let tree = sample();
        let found = filter_search(&tree, "diárias");
        assert_eq!(ids(&found), vec!["0070", "00700001", "00700001#1"]);
    }

    #[test]
    fn test_blank_search_is_noop() {
        let tree = sample();
        assert_eq!(filter_search(&tree, "  "), tree);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        assert!(filter_search(&sample(), "inexistente").is_empty());
    }
}
