use crate::model::{Amount, LedgerData, MonthKey};
use crate::tree::{
    build, shape, HierarchyNode, Level, Page, PageSizes, Paginator, Query, SortKey, Tree,
};
use std::collections::BTreeSet;
use tracing::debug;

/// An interactive view over one project's ledger data.
///
/// The explorer owns the fetched data and all view state: selected months, search term, sort key,
/// expanded nodes and page cursors. Every change of data, months, search or sort rebuilds the
/// visible tree from scratch and sends all page cursors back to page 1.
#[derive(Debug, Clone)]
pub struct Explorer {
    data: LedgerData,
    query: Query,
    paginator: Paginator,
    months: BTreeSet<MonthKey>,
    visible: Tree,
}

impl Explorer {
    pub fn new(data: LedgerData, sizes: PageSizes) -> Self {
        Self::with_query(data, Query::default(), sizes)
    }

    /// Creates an explorer that starts with the months, search and sort of `query`.
    pub fn with_query(data: LedgerData, query: Query, sizes: PageSizes) -> Self {
        let mut explorer = Self {
            data: LedgerData::default(),
            query,
            paginator: Paginator::new(sizes),
            months: BTreeSet::new(),
            visible: Tree::new(),
        };
        explorer.set_data(data);
        explorer
    }

    /// Replaces the data, for example after a project change. The month selection is kept as
    /// given, so months missing from the new data still filter.
    pub fn set_data(&mut self, data: LedgerData) {
        self.months = build(&data).available_months();
        self.data = data;
        self.refresh();
    }

    pub fn data(&self) -> &LedgerData {
        &self.data
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The filtered and sorted tree, before pagination.
    pub fn tree(&self) -> &Tree {
        &self.visible
    }

    /// Months present in the data, independent of the current filters.
    pub fn available_months(&self) -> &BTreeSet<MonthKey> {
        &self.months
    }

    pub fn set_search(&mut self, term: &str) {
        self.query.search = term.to_string();
        self.refresh();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.query.sort = key;
        self.refresh();
    }

    pub fn set_months(&mut self, months: impl IntoIterator<Item = MonthKey>) {
        self.query.months = months.into_iter().collect();
        self.refresh();
    }

    pub fn toggle_month(&mut self, month: MonthKey) {
        if !self.query.months.remove(&month) {
            self.query.months.insert(month);
        }
        self.refresh();
    }

    pub fn select_all_months(&mut self) {
        self.query.months = self.months.clone();
        self.refresh();
    }

    pub fn clear_months(&mut self) {
        self.query.months.clear();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.visible = shape(&self.data, &self.query);
        self.paginator.reset();
        debug!(
            "View has {} mothers for search {:?}, {} months, sort {}",
            self.visible.roots().len(),
            self.query.search,
            self.query.months.len(),
            self.query.sort
        );
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Expansion and page changes do not rebuild the tree.
    pub fn paginator_mut(&mut self) -> &mut Paginator {
        &mut self.paginator
    }

    /// Expands the node with id `id`: a mother shows its children, a child shows its
    /// grandchildren and its mother is expanded too. Returns false if no visible node can be
    /// expanded under that id.
    pub fn expand(&mut self, id: &str) -> bool {
        let Some(node) = self.visible.get(id) else {
            return false;
        };
        match (node.level(), node.parent_id()) {
            (Level::Mother, _) => self.paginator.expand_mother(id),
            (Level::Child, Some(mother)) => {
                if !self.paginator.is_mother_expanded(mother) {
                    self.paginator.expand_mother(mother);
                }
                self.paginator.expand_child(mother, id);
            }
            _ => return false,
        }
        true
    }

    /// The current page of mothers.
    pub fn mothers_page(&self) -> Page<&HierarchyNode> {
        let mothers: Vec<&HierarchyNode> = self.visible.mothers().collect();
        Page::new(
            &mothers,
            self.paginator.mother_page(),
            self.paginator.sizes().mothers,
        )
    }

    /// The current page of `mother`'s children.
    pub fn children_page(&self, mother: &str) -> Page<&HierarchyNode> {
        Page::new(
            &self.visible.children_of(mother),
            self.paginator.children_page(mother),
            self.paginator.sizes().children,
        )
    }

    /// The current page of `child`'s grandchildren.
    pub fn grandchildren_page(&self, child: &str) -> Page<&HierarchyNode> {
        Page::new(
            &self.visible.children_of(child),
            self.paginator.grandchildren_page(child),
            self.paginator.sizes().grandchildren,
        )
    }

    /// The total of the visible tree.
    pub fn total(&self) -> Amount {
        self.visible.total()
    }

    pub fn total_count(&self) -> u64 {
        self.visible.total_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionRecord;
    use rust_decimal::Decimal;

    fn twenty_five_mothers() -> LedgerData {
        let mut records = Vec::new();
        for i in 0..25 {
            let mother = format!("{:04}", 100 + i);
            records.push(TransactionRecord::new(
                mother.as_str(),
                format!("Despesa {i}"),
                Decimal::ZERO,
            ));
            records.push(
                TransactionRecord::new(format!("{mother}0001"), "", Decimal::from(100 - i))
                    .with_debit_credit("2")
                    .with_date(if i % 2 == 0 { "20240115" } else { "20240215" }),
            );
        }
        LedgerData::new(records)
    }

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_search_resets_to_first_page() {
        let mut explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        explorer.paginator_mut().set_mother_page(3);
        let page = explorer.mothers_page();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);

        explorer.set_search("despesa");
        let page = explorer.mothers_page();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn test_month_and_sort_changes_reset_cursors() {
        let mut explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        explorer.paginator_mut().expand_mother("0100");
        explorer.paginator_mut().set_children_page("0100", 2);
        explorer.paginator_mut().set_mother_page(2);

        explorer.set_sort(SortKey::Name);
        assert_eq!(explorer.paginator().mother_page(), 1);
        assert_eq!(explorer.paginator().children_page("0100"), 1);
        assert!(explorer.paginator().is_mother_expanded("0100"));

        explorer.paginator_mut().set_mother_page(2);
        explorer.toggle_month(month("2024-01"));
        assert_eq!(explorer.paginator().mother_page(), 1);
        assert_eq!(explorer.mothers_page().total_items, 13);
    }

    #[test]
    fn test_all_months_equals_no_months() {
        let mut explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        let unfiltered = explorer.tree().clone();
        explorer.select_all_months();
        assert_eq!(explorer.tree(), &unfiltered);
        explorer.clear_months();
        assert_eq!(explorer.tree(), &unfiltered);
        assert_eq!(explorer.available_months().len(), 2);
    }

    #[test]
    fn test_sorted_by_value_by_default() {
        let explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        let first = explorer.mothers_page().items[0];
        assert_eq!(first.id(), "0100");
        assert_eq!(first.name(), "Despesa 0");
        assert_eq!(explorer.total_count(), 25);
    }

    #[test]
    fn test_child_and_grandchild_pages() {
        let sizes = PageSizes {
            mothers: 10,
            children: 1,
            grandchildren: 1,
        };
        let data = LedgerData::new(vec![
            TransactionRecord::new("00600001", "a", Decimal::ONE).with_debit_credit("2"),
            TransactionRecord::new("00600001", "b", Decimal::TWO).with_debit_credit("2"),
            TransactionRecord::new("00600002", "c", Decimal::TEN).with_debit_credit("2"),
        ]);
        let mut explorer = Explorer::new(data, sizes);
        explorer.paginator_mut().expand_mother("0060");
        let children = explorer.children_page("0060");
        assert_eq!(children.total_pages, 2);
        assert_eq!(children.items[0].id(), "00600002");

        explorer.paginator_mut().expand_child("0060", "00600001");
        explorer.paginator_mut().set_grandchildren_page("00600001", 2);
        let grandchildren = explorer.grandchildren_page("00600001");
        assert_eq!(grandchildren.items[0].name(), "a");
    }

    #[test]
    fn test_expand_child_expands_its_mother() {
        let mut explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        assert!(explorer.expand("01000001"));
        assert!(explorer.paginator().is_mother_expanded("0100"));
        assert!(explorer.paginator().is_child_expanded("01000001"));
        assert!(!explorer.expand("01000001#1"));
        assert!(!explorer.expand("9999"));
    }

    #[test]
    fn test_with_query() {
        let query = Query {
            search: "Despesa 1".to_string(),
            ..Query::default()
        };
        let explorer = Explorer::with_query(twenty_five_mothers(), query, PageSizes::default());
        // "Despesa 1" and "Despesa 10" through "Despesa 19".
        assert_eq!(explorer.mothers_page().total_items, 11);
    }

    #[test]
    fn test_months_outside_the_data_still_filter() {
        let months: BTreeSet<MonthKey> = [month("2023-12")].into();
        let query = Query {
            months: months.clone(),
            ..Query::default()
        };
        let explorer = Explorer::with_query(twenty_five_mothers(), query, PageSizes::default());
        let direct = crate::tree::filter_months(&build(&twenty_five_mothers()), &months);
        assert_eq!(explorer.query().months, months);
        assert_eq!(explorer.tree().roots().len(), direct.roots().len());
        assert!(explorer.tree().is_empty());
    }

    #[test]
    fn test_set_data_keeps_month_selection() {
        let mut explorer = Explorer::new(twenty_five_mothers(), PageSizes::default());
        explorer.set_months([month("2024-01"), month("2023-12")]);
        explorer.set_data(twenty_five_mothers());
        assert_eq!(explorer.query().months.len(), 2);
        assert_eq!(explorer.mothers_page().total_items, 13);
    }
}
