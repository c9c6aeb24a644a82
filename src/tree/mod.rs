//! The hierarchical expense tree and the pipeline that shapes it.
//!
//! A tree has exactly three levels: mothers (4-character nature codes), children (intermediate
//! nature codes) and grandchildren (individual ledger lines). It is stored as an arena: nodes live
//! in a `Vec` addressed by `NodeId`, parents and children are linked through stored ids, and an
//! id -> `NodeId` index is built as nodes are pushed. Trees are never updated in place by the
//! filters; every change of input or query produces a fresh tree.

mod builder;
mod filter;
mod names;
mod page;
mod sort;
mod view;

pub use builder::build;
pub use filter::{filter_months, filter_search};
pub use page::{page, total_pages, Page, PageSizes, Paginator};
pub use sort::{sort, SortKey};
pub use view::Explorer;

use crate::model::{Amount, Category, LedgerData, LedgerDate, MonthKey};
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

/// Index of a node inside its `Tree`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(usize);

/// The depth of a node in the tree.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Level {
    Mother,
    Child,
    Grandchild,
}

impl Level {
    pub fn depth(&self) -> u8 {
        match self {
            Level::Mother => 0,
            Level::Child => 1,
            Level::Grandchild => 2,
        }
    }

    /// The report label for the level.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Mother => "Mãe",
            Level::Child => "Filho",
            Level::Grandchild => "Neto",
        }
    }

    fn below(&self) -> Level {
        match self {
            Level::Mother => Level::Child,
            Level::Child | Level::Grandchild => Level::Grandchild,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.depth())
    }
}

/// A node of the expense tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    id: String,
    name: String,
    value: Amount,
    count: u64,
    level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    dates: BTreeSet<LedgerDate>,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    emission_date: Option<LedgerDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settlement_date: Option<LedgerDate>,
    #[serde(skip)]
    parent: Option<NodeId>,
    #[serde(skip)]
    children: Vec<NodeId>,
}

impl HierarchyNode {
    /// Creates a detached node. Level and parent are assigned when it is pushed into a `Tree`.
    pub(crate) fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: Amount::ZERO,
            count: 0,
            level: Level::Mother,
            parent_id: None,
            dates: BTreeSet::new(),
            category: Category::default(),
            emission_date: None,
            settlement_date: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn with_totals(mut self, value: Amount, count: u64) -> Self {
        self.value = value;
        self.count = count;
        self
    }

    pub(crate) fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub(crate) fn with_dates(mut self, dates: impl IntoIterator<Item = LedgerDate>) -> Self {
        self.dates = dates.into_iter().collect();
        self
    }

    pub(crate) fn with_leaf_dates(
        mut self,
        emission: Option<LedgerDate>,
        settlement: Option<LedgerDate>,
    ) -> Self {
        self.emission_date = emission;
        self.settlement_date = settlement;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn dates(&self) -> &BTreeSet<LedgerDate> {
        &self.dates
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn emission_date(&self) -> Option<LedgerDate> {
        self.emission_date
    }

    pub fn settlement_date(&self) -> Option<LedgerDate> {
        self.settlement_date
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A copy of the node's data without its arena links.
    fn detached(&self) -> HierarchyNode {
        HierarchyNode {
            parent: None,
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// The expense tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<HierarchyNode>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mother node.
    pub(crate) fn push_root(&mut self, mut node: HierarchyNode) -> NodeId {
        node.level = Level::Mother;
        node.parent = None;
        node.parent_id = None;
        node.children.clear();
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    /// Adds `node` under `parent`. Children are always pushed after their parent, so a child's
    /// `NodeId` is greater than its parent's; `rollup` depends on this.
    pub(crate) fn push_child(&mut self, parent: NodeId, mut node: HierarchyNode) -> NodeId {
        let parent_node = &self.nodes[parent.0];
        debug_assert_ne!(parent_node.level, Level::Grandchild);
        node.level = parent_node.level.below();
        node.parent_id = Some(parent_node.id.clone());
        node.parent = Some(parent);
        node.children.clear();
        let id = self.insert(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn insert(&mut self, node: HierarchyNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(node.id.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    /// Looks a node up by its string id.
    pub fn get(&self, id: &str) -> Option<&HierarchyNode> {
        self.find(id).map(|n| self.node(n))
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// The mother nodes in their current order.
    pub fn mothers(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.roots.iter().map(|&id| self.node(id))
    }

    /// The children of the node with string id `id`, in their current order. Empty if the node
    /// does not exist.
    pub fn children_of(&self, id: &str) -> Vec<&HierarchyNode> {
        match self.find(id) {
            Some(n) => self.children(n).iter().map(|&c| self.node(c)).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, depth first, in sibling order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// The sorted set of months in which any node has a date.
    pub fn available_months(&self) -> BTreeSet<MonthKey> {
        self.nodes
            .iter()
            .flat_map(|n| n.dates.iter().map(LedgerDate::month))
            .collect()
    }

    /// The sum of all mother values.
    pub fn total(&self) -> Amount {
        self.mothers().map(|m| m.value).sum()
    }

    /// The number of leaf records counted by all mothers.
    pub fn total_count(&self) -> u64 {
        self.mothers().map(|m| m.count).sum()
    }

    /// Recomputes value, count and dates of every inner node from its children. Leaves keep their
    /// own figures.
    pub(crate) fn rollup(&mut self) {
        for node in self.nodes.iter_mut().filter(|n| !n.children.is_empty()) {
            node.value = Amount::ZERO;
            node.count = 0;
            node.dates.clear();
        }
        // Children have larger ids than their parents, so walking backwards folds every subtree
        // into its node before that node is folded into its own parent.
        for ix in (0..self.nodes.len()).rev() {
            if let Some(parent) = self.nodes[ix].parent {
                let (value, count) = (self.nodes[ix].value, self.nodes[ix].count);
                let dates = self.nodes[ix].dates.clone();
                let p = &mut self.nodes[parent.0];
                p.value += value;
                p.count += count;
                p.dates.extend(dates);
            }
        }
    }

    /// Returns a copy of the tree without nodes whose count is zero.
    pub(crate) fn without_empty(&self) -> Tree {
        let mut out = Tree::new();
        for &root in &self.roots {
            self.copy_if(root, &mut out, None, &|n: &HierarchyNode| n.count > 0);
        }
        out
    }

    /// Copies `src` and, recursively, every descendant accepted by `keep` into `dst`. `src` itself
    /// is skipped (with its subtree) if `keep` rejects it.
    pub(crate) fn copy_if(
        &self,
        src: NodeId,
        dst: &mut Tree,
        parent: Option<NodeId>,
        keep: &dyn Fn(&HierarchyNode) -> bool,
    ) -> Option<NodeId> {
        let node = self.node(src);
        if !keep(node) {
            return None;
        }
        let copied = match parent {
            Some(p) => dst.push_child(p, node.detached()),
            None => dst.push_root(node.detached()),
        };
        for &child in self.children(src) {
            self.copy_if(child, dst, Some(copied), keep);
        }
        Some(copied)
    }

    /// Copies a single node (without descendants) into `dst`.
    pub(crate) fn copy_node(&self, src: NodeId, dst: &mut Tree, parent: Option<NodeId>) -> NodeId {
        let node = self.node(src).detached();
        match parent {
            Some(p) => dst.push_child(p, node),
            None => dst.push_root(node),
        }
    }

    /// A nested, serializable rendering of the tree.
    pub fn to_nested(&self) -> Vec<NestedNode<'_>> {
        self.roots.iter().map(|&id| self.nested(id)).collect()
    }

    fn nested(&self, id: NodeId) -> NestedNode<'_> {
        NestedNode {
            node: self.node(id),
            children: self.children(id).iter().map(|&c| self.nested(c)).collect(),
        }
    }
}

/// A node with its children inlined, for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct NestedNode<'a> {
    #[serde(flatten)]
    pub node: &'a HierarchyNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedNode<'a>>,
}

/// The view parameters that shape a tree: which months, which search term, which order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub months: BTreeSet<MonthKey>,
    pub search: String,
    pub sort: SortKey,
}

/// Builds the tree for `data` from scratch and applies the month filter, the search filter and
/// the sort key of `query`.
pub fn shape(data: &LedgerData, query: &Query) -> Tree {
    let built = build(data);
    let by_month = filter_months(&built, &query.months);
    let mut searched = filter_search(&by_month, &query.search);
    sort(&mut searched, query.sort);
    searched
}
