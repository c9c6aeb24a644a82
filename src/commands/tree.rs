use crate::api::{self, Ledger};
use crate::args::TreeArgs;
use crate::commands::{fetch, query, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, MonthKey};
use crate::tree::{Explorer, HierarchyNode, Page};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

/// One page of a project's expense tree, as shown by the `tree` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub project: String,
    pub months: Vec<MonthKey>,
    pub total: Amount,
    pub total_count: u64,
    /// The reconciliation total reported by the source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_total: Option<Amount>,
    pub page: usize,
    pub total_pages: usize,
    pub mothers: Vec<ViewNode>,
}

/// A node on the visible page, with the current page of its children if it is expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    #[serde(flatten)]
    pub node: HierarchyNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    fn collapsed(node: &HierarchyNode) -> Self {
        Self {
            node: node.clone(),
            page: None,
            total_pages: None,
            children: Vec::new(),
        }
    }

    fn expanded(
        node: &HierarchyNode,
        page: Page<&HierarchyNode>,
        children: Vec<ViewNode>,
    ) -> Self {
        Self {
            node: node.clone(),
            page: Some(page.page),
            total_pages: Some(page.total_pages),
            children,
        }
    }
}

/// Fetches a project's data and shows one page of its tree.
///
/// Months, search and sort shape the tree; `--page` selects the page of mothers and each
/// `--expand` id opens the first page of a mother's children or a child's grandchildren.
pub async fn tree(config: Config, args: TreeArgs) -> Result<Out<TreeView>> {
    let mut ledger = api::ledger(&config, args.view().file()).pub_result(ErrorType::Config)?;
    tree_with(ledger.as_mut(), &config, &args).await
}

pub(super) async fn tree_with(
    ledger: &mut (dyn Ledger + Send),
    config: &Config,
    args: &TreeArgs,
) -> Result<Out<TreeView>> {
    let view = args.view();
    let query = query(view, config)?;
    let data = fetch(ledger, view.project()).await?;
    let source_total = data.total;

    let mut explorer = Explorer::with_query(data, query, config.page_sizes());
    explorer.paginator_mut().set_mother_page(args.page());
    for id in args.expand() {
        if !explorer.expand(id) {
            warn!("There is no visible mother or child with id '{id}' to expand");
        }
    }

    let mothers_page = explorer.mothers_page();
    let mothers = mothers_page
        .items
        .iter()
        .map(|&mother| {
            if !explorer.paginator().is_mother_expanded(mother.id()) {
                return ViewNode::collapsed(mother);
            }
            let children_page = explorer.children_page(mother.id());
            let children = children_page
                .items
                .iter()
                .map(|&child| {
                    if !explorer.paginator().is_child_expanded(child.id()) {
                        return ViewNode::collapsed(child);
                    }
                    let leaves = explorer.grandchildren_page(child.id());
                    let grandchildren = leaves
                        .items
                        .iter()
                        .map(|&g| ViewNode::collapsed(g))
                        .collect();
                    ViewNode::expanded(child, leaves, grandchildren)
                })
                .collect();
            ViewNode::expanded(mother, children_page, children)
        })
        .collect();

    let tree_view = TreeView {
        project: view.project().to_string(),
        months: explorer.query().months.iter().copied().collect(),
        total: explorer.total(),
        total_count: explorer.total_count(),
        source_total,
        page: mothers_page.page,
        total_pages: mothers_page.total_pages,
        mothers,
    };
    Ok(Out::new(render(&tree_view), tree_view))
}

/// Renders the page as indented text, one node per line.
fn render(view: &TreeView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Project {}: {} in {} records",
        view.project, view.total, view.total_count
    );
    for mother in &view.mothers {
        render_node(&mut out, mother, 1);
    }
    let _ = write!(out, "Page {} of {}", view.page, view.total_pages);
    out
}

fn render_node(out: &mut String, node: &ViewNode, indent: usize) {
    let n = &node.node;
    let _ = writeln!(
        out,
        "{:width$}{} {} | {} | {} | {}",
        "",
        n.id(),
        n.name(),
        n.value(),
        n.count(),
        n.category(),
        width = indent * 2
    );
    for child in &node.children {
        render_node(out, child, indent + 1);
    }
    if let (Some(page), Some(total)) = (node.page, node.total_pages) {
        if total > 1 {
            let width = (indent + 1) * 2;
            let _ = writeln!(out, "{:width$}page {page} of {total}", "");
        }
    }
}
