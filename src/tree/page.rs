//! Page arithmetic and the per-node page cursors of an interactive view.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The default number of items per page at every level.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes for the three levels, configured independently.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizes {
    pub mothers: usize,
    pub children: usize,
    pub grandchildren: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            mothers: DEFAULT_PAGE_SIZE,
            children: DEFAULT_PAGE_SIZE,
            grandchildren: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Returns the 1-based page `page` of `items`. Page 0 and pages past the end are empty; a size of
/// 0 is treated as 1.
pub fn page<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let size = size.max(1);
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// The number of pages needed for `len` items. Zero items need zero pages.
pub fn total_pages(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}

/// One page of items plus the figures needed to render page controls.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    pub fn new(all: &[T], page_number: usize, size: usize) -> Self {
        Self {
            items: page(all, page_number, size).to_vec(),
            page: page_number,
            page_size: size.max(1),
            total_items: all.len(),
            total_pages: total_pages(all.len(), size),
        }
    }
}

/// Expansion state and page cursors for the mother list, each expanded mother and each expanded
/// child. Cursors that were never set read as page 1.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Paginator {
    sizes: PageSizes,
    mother_page: usize,
    expanded_mothers: BTreeSet<String>,
    /// Expanded child id -> its mother id.
    expanded_children: BTreeMap<String, String>,
    child_pages: BTreeMap<String, usize>,
    grandchild_pages: BTreeMap<String, usize>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageSizes::default())
    }
}

impl Paginator {
    pub fn new(sizes: PageSizes) -> Self {
        Self {
            sizes,
            mother_page: 1,
            expanded_mothers: BTreeSet::new(),
            expanded_children: BTreeMap::new(),
            child_pages: BTreeMap::new(),
            grandchild_pages: BTreeMap::new(),
        }
    }

    pub fn sizes(&self) -> PageSizes {
        self.sizes
    }

    pub fn mother_page(&self) -> usize {
        self.mother_page
    }

    pub fn set_mother_page(&mut self, page: usize) {
        self.mother_page = page;
    }

    pub fn is_mother_expanded(&self, mother: &str) -> bool {
        self.expanded_mothers.contains(mother)
    }

    pub fn is_child_expanded(&self, child: &str) -> bool {
        self.expanded_children.contains_key(child)
    }

    /// Expands a mother and starts its children at page 1.
    pub fn expand_mother(&mut self, mother: &str) {
        self.expanded_mothers.insert(mother.to_string());
        self.child_pages.insert(mother.to_string(), 1);
    }

    /// Collapses a mother. Its children become hidden, so their expansion and cursors go too.
    pub fn collapse_mother(&mut self, mother: &str) {
        self.expanded_mothers.remove(mother);
        self.child_pages.remove(mother);
        let hidden: Vec<String> = self
            .expanded_children
            .iter()
            .filter(|(_, m)| m.as_str() == mother)
            .map(|(c, _)| c.clone())
            .collect();
        for child in hidden {
            self.collapse_child(&child);
        }
    }

    pub fn toggle_mother(&mut self, mother: &str) {
        if self.is_mother_expanded(mother) {
            self.collapse_mother(mother);
        } else {
            self.expand_mother(mother);
        }
    }

    /// Expands a child of `mother` and starts its grandchildren at page 1.
    pub fn expand_child(&mut self, mother: &str, child: &str) {
        self.expanded_children
            .insert(child.to_string(), mother.to_string());
        self.grandchild_pages.insert(child.to_string(), 1);
    }

    pub fn collapse_child(&mut self, child: &str) {
        self.expanded_children.remove(child);
        self.grandchild_pages.remove(child);
    }

    pub fn toggle_child(&mut self, mother: &str, child: &str) {
        if self.is_child_expanded(child) {
            self.collapse_child(child);
        } else {
            self.expand_child(mother, child);
        }
    }

    pub fn children_page(&self, mother: &str) -> usize {
        self.child_pages.get(mother).copied().unwrap_or(1)
    }

    pub fn set_children_page(&mut self, mother: &str, page: usize) {
        self.child_pages.insert(mother.to_string(), page);
    }

    pub fn grandchildren_page(&self, child: &str) -> usize {
        self.grandchild_pages.get(child).copied().unwrap_or(1)
    }

    pub fn set_grandchildren_page(&mut self, child: &str, page: usize) {
        self.grandchild_pages.insert(child.to_string(), page);
    }

    /// Returns every cursor to page 1. Expansions are kept.
    pub fn reset(&mut self) {
        self.mother_page = 1;
        self.child_pages.clear();
        self.grandchild_pages.clear();
    }
}
