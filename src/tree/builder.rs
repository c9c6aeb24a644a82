//! Groups flat ledger records into the three-level expense tree.

use crate::model::{AggregateRow, Amount, Category, LedgerData, LedgerDate, TransactionRecord};
use crate::tree::names::NameResolver;
use crate::tree::{HierarchyNode, NodeId, Tree};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Mother code reserved by the ledger; it never becomes a mother.
const RESERVED_MOTHER: &str = "0001";

/// Codes up to this many characters are mother-level codes.
const MOTHER_CODE_LEN: usize = 4;

/// Builds the expense tree for `data`.
///
/// Leaf records (nature codes longer than 4 characters) are grouped by their intermediate code,
/// and intermediate codes by their 4-character prefix. Only leaves whose debit/credit flag marks a
/// valid debit are counted; children and mothers left without counted leaves are omitted.
///
/// When the source has no leaf records but does provide pre-aggregated rows, a two-level tree
/// (mothers and children) is built from those instead.
pub fn build(data: &LedgerData) -> Tree {
    // The reserved mother and its subtree are dropped here, so they never name other codes.
    let (mother_records, leaf_records): (Vec<&TransactionRecord>, Vec<&TransactionRecord>) = data
        .records
        .iter()
        .filter(|r| mother_prefix(r.nature_code()) != RESERVED_MOTHER)
        .partition(|r| is_mother_code(r.nature_code()));

    if leaf_records.is_empty() && !data.aggregates.is_empty() {
        debug!(
            "No intermediate-level records, building a two-level tree from {} aggregates",
            data.aggregates.len()
        );
        return build_two_level(data, &mother_records);
    }

    let names = NameResolver::new(
        mother_records
            .iter()
            .map(|r| (r.nature_code(), r.description())),
        leaf_records.iter().map(|r| (r.nature_code(), r.description())),
    );
    let mother_labels = first_labels(mother_records.iter().map(|r| (r.nature_code(), r.description())));

    let mut tree = Tree::new();
    for (mother_code, groups) in group_by_mother(&leaf_records, |r| r.nature_code()) {
        let valid: Vec<(&str, Vec<&TransactionRecord>)> = groups
            .into_iter()
            .map(|(code, records)| {
                let counted: Vec<&TransactionRecord> =
                    records.into_iter().filter(|r| r.is_valid_debit()).collect();
                (code, counted)
            })
            .filter(|(_, counted)| !counted.is_empty())
            .collect();
        if valid.is_empty() {
            trace!("Mother {mother_code} has no valid debits, omitting it");
            continue;
        }

        let mother_name = names.resolve(mother_code, mother_labels.get(mother_code).copied());
        let mother = tree.push_root(HierarchyNode::new(mother_code, mother_name));
        let mut mother_category = None;

        for (code, records) in valid {
            let label = data.intermediate_labels.get(code).map(String::as_str);
            let child_name = names.resolve(code, label);
            let child_category = leaf_category(records[0]);
            mother_category.get_or_insert(child_category);
            let child = tree.push_child(
                mother,
                HierarchyNode::new(code, child_name).with_category(child_category),
            );
            push_leaves(&mut tree, child, code, &records, &names);
        }

        set_category(&mut tree, mother, mother_category.unwrap_or_default());
    }
    tree.rollup();
    debug!(
        "Built tree with {} mothers and {} nodes from {} records",
        tree.roots().len(),
        tree.len(),
        data.records.len()
    );
    tree
}

fn push_leaves(
    tree: &mut Tree,
    child: NodeId,
    code: &str,
    records: &[&TransactionRecord],
    names: &NameResolver<'_>,
) {
    for (ordinal, record) in records.iter().enumerate() {
        let explicit = Some(record.description())
            .filter(|d| !d.trim().is_empty())
            .or(record.history());
        let name = names.resolve(code, explicit);
        let leaf = HierarchyNode::new(format!("{code}#{}", ordinal + 1), name)
            .with_totals(record.value(), 1)
            .with_category(leaf_category(record))
            .with_dates(record.effective_date())
            .with_leaf_dates(record.emission_date(), record.settlement_date());
        tree.push_child(child, leaf);
    }
}

/// Two-level fallback for sources that only report `code -> value/count`.
fn build_two_level(data: &LedgerData, mother_records: &[&TransactionRecord]) -> Tree {
    let (short, long): (Vec<&AggregateRow>, Vec<&AggregateRow>) = data
        .aggregates
        .iter()
        .filter(|a| mother_prefix(a.code.trim()) != RESERVED_MOTHER)
        .partition(|a| is_mother_code(a.code.trim()));

    let mother_pairs = mother_records
        .iter()
        .map(|r| (r.nature_code(), r.description()))
        .chain(short.iter().map(|a| (a.code.trim(), a.description.as_str())));
    let names = NameResolver::new(
        mother_pairs.clone(),
        long.iter().map(|a| (a.code.trim(), a.description.as_str())),
    );
    let mother_labels = first_labels(mother_pairs);

    let counted: Vec<&AggregateRow> = long.iter().copied().filter(|a| a.count > 0).collect();
    let mut tree = Tree::new();
    for (mother_code, groups) in group_by_mother(&counted, |a| a.code.trim()) {
        let mother_name = names.resolve(mother_code, mother_labels.get(mother_code).copied());
        let mother = tree.push_root(HierarchyNode::new(mother_code, mother_name));
        let mut mother_category = None;
        for (code, rows) in groups {
            // Duplicate codes in the aggregate list are merged into one child.
            let value: Amount = rows.iter().map(|a| a.value).sum();
            let count = rows.iter().map(|a| a.count).sum();
            let label = rows
                .iter()
                .map(|a| a.description.as_str())
                .find(|d| !d.trim().is_empty())
                .or_else(|| data.intermediate_labels.get(code).map(String::as_str));
            let category = Category::classify(label.unwrap_or_default());
            mother_category.get_or_insert(category);
            let dates = rows
                .iter()
                .flat_map(|a| a.dates.iter())
                .filter_map(|d| LedgerDate::parse(d.as_str()));
            tree.push_child(
                mother,
                HierarchyNode::new(code, names.resolve(code, label))
                    .with_totals(value, count)
                    .with_category(category)
                    .with_dates(dates),
            );
        }
        set_category(&mut tree, mother, mother_category.unwrap_or_default());
    }
    tree.rollup();
    tree
}

/// Groups `items` by code and then by the code's 4-character mother prefix, preserving first
/// appearance order at both levels. The reserved mother code is dropped.
fn group_by_mother<'a, T>(
    items: &[&'a T],
    code_of: impl Fn(&'a T) -> &'a str,
) -> Vec<(&'a str, Vec<(&'a str, Vec<&'a T>)>)> {
    let mut mothers: Vec<(&'a str, Vec<(&'a str, Vec<&'a T>)>)> = Vec::new();
    let mut mother_ix: HashMap<&'a str, usize> = HashMap::new();
    let mut code_ix: HashMap<&'a str, (usize, usize)> = HashMap::new();

    for &item in items {
        let code = code_of(item);
        if let Some(&(m, c)) = code_ix.get(code) {
            mothers[m].1[c].1.push(item);
            continue;
        }
        let mother_code = mother_prefix(code);
        if mother_code == RESERVED_MOTHER {
            continue;
        }
        let m = *mother_ix.entry(mother_code).or_insert_with(|| {
            mothers.push((mother_code, Vec::new()));
            mothers.len() - 1
        });
        mothers[m].1.push((code, vec![item]));
        code_ix.insert(code, (m, mothers[m].1.len() - 1));
    }
    mothers
}

/// The first usable label for each code, in input order.
fn first_labels<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> HashMap<&'a str, &'a str> {
    let mut labels = HashMap::new();
    for (code, label) in pairs {
        if !label.trim().is_empty() {
            labels.entry(code).or_insert(label);
        }
    }
    labels
}

fn is_mother_code(code: &str) -> bool {
    code.chars().count() <= MOTHER_CODE_LEN
}

fn mother_prefix(code: &str) -> &str {
    match code.char_indices().nth(MOTHER_CODE_LEN) {
        Some((ix, _)) => &code[..ix],
        None => code,
    }
}

/// A leaf is classified by its history text, falling back to its description.
fn leaf_category(record: &TransactionRecord) -> Category {
    match record.history() {
        Some(history) => Category::classify(history),
        None => Category::classify(record.description()),
    }
}

fn set_category(tree: &mut Tree, id: NodeId, category: Category) {
    tree.nodes[id.0].category = category;
}
