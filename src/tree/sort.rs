use crate::tree::{NodeId, Tree};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The order of siblings at every level of the tree.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Largest value first.
    #[default]
    Value,
    /// Largest record count first.
    Count,
    /// Alphabetical, ignoring case and accents.
    Name,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

/// Sorts the mothers and the children of every node by `key`. Equal siblings keep their order.
pub fn sort(tree: &mut Tree, key: SortKey) {
    let mut roots = std::mem::take(&mut tree.roots);
    sort_ids(tree, &mut roots, key);
    tree.roots = roots;

    for ix in 0..tree.nodes.len() {
        let mut children = std::mem::take(&mut tree.nodes[ix].children);
        sort_ids(tree, &mut children, key);
        tree.nodes[ix].children = children;
    }
}

fn sort_ids(tree: &Tree, ids: &mut [NodeId], key: SortKey) {
    match key {
        SortKey::Value => ids.sort_by(|a, b| tree.node(*b).value().cmp(&tree.node(*a).value())),
        SortKey::Count => ids.sort_by(|a, b| tree.node(*b).count().cmp(&tree.node(*a).count())),
        SortKey::Name => {
            ids.sort_by_cached_key(|id| collation_key(tree.node(*id).name()));
        }
    }
}

/// A lowercase, accent-free form of `name` used for alphabetical ordering.
fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::tree::HierarchyNode;
    use rust_decimal::Decimal;

    fn node(id: &str, name: &str, value: i64, count: u64) -> HierarchyNode {
        HierarchyNode::new(id, name).with_totals(Amount::new(Decimal::from(value)), count)
    }

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let a = tree.push_root(node("0060", "Óculos", 10, 5));
        tree.push_child(a, node("00600001", "b", 1, 1));
        tree.push_child(a, node("00600002", "A", 9, 4));
        tree.push_root(node("0070", "material", 30, 1));
        tree.push_root(node("0080", "Diárias", 10, 2));
        tree
    }

    fn root_ids(tree: &Tree) -> Vec<&str> {
        tree.mothers().map(|m| m.id()).collect()
    }

    #[test]
    fn test_sort_by_value_is_stable() {
        let mut tree = sample();
        sort(&mut tree, SortKey::Value);
        assert_eq!(root_ids(&tree), vec!["0070", "0060", "0080"]);
        let children: Vec<&str> = tree.children_of("0060").iter().map(|c| c.id()).collect();
        assert_eq!(children, vec!["00600002", "00600001"]);
    }

    #[test]
    fn test_sort_by_count() {
        let mut tree = sample();
        sort(&mut tree, SortKey::Count);
        assert_eq!(root_ids(&tree), vec!["0060", "0080", "0070"]);
    }

    #[test]
    fn test_sort_by_name_folds_case_and_accents() {
        let mut tree = sample();
        sort(&mut tree, SortKey::Name);
        assert_eq!(root_ids(&tree), vec!["0080", "0070", "0060"]);
        let children: Vec<&str> = tree.children_of("0060").iter().map(|c| c.id()).collect();
        assert_eq!(children, vec!["00600002", "00600001"]);
    }

    #[test]
    fn test_collation_key() {
        assert_eq!(collation_key("Érica"), collation_key("erica"));
        assert!(collation_key("ação") < collation_key("acucar"));
    }

    #[test]
    fn test_sort_key_text() {
        assert_eq!(SortKey::Count.to_string(), "count");
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!(SortKey::default(), SortKey::Value);
    }
}
