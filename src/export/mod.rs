//! Flattening a shaped tree into report rows and rendering them as CSV, PDF or an
//! xlsx workbook.
//!
//! Exports always contain the full filtered and sorted tree down to the chosen depth. Page
//! cursors and expansion state of an interactive view do not apply.

mod csv;
#[cfg(feature = "pdf")]
mod pdf;
mod xlsx;

use crate::model::{Amount, Category, LedgerDate};
use crate::tree::{HierarchyNode, Level, NodeId, Tree};
use crate::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column headers shared by every export format.
pub(crate) const HEADERS: [&str; 7] = [
    "Nível",
    "Item",
    "Valor",
    "Quantidade",
    "Categoria",
    "Emissão",
    "Baixa",
];

/// How deep into the tree an export goes.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportDepth {
    /// Mothers only.
    Mothers,
    /// Mothers and their children.
    Children,
    /// Every level, down to individual ledger lines.
    #[default]
    Full,
}

serde_plain::derive_display_from_serialize!(ExportDepth);
serde_plain::derive_fromstr_from_deserialize!(ExportDepth);

impl ExportDepth {
    /// The report label for the depth.
    pub fn label(&self) -> &'static str {
        match self {
            ExportDepth::Mothers => "Mães",
            ExportDepth::Children => "Mães e Filhos",
            ExportDepth::Full => "Mães, Filhos e Netos",
        }
    }

    fn includes(&self, level: Level) -> bool {
        match self {
            ExportDepth::Mothers => level == Level::Mother,
            ExportDepth::Children => level != Level::Grandchild,
            ExportDepth::Full => true,
        }
    }
}

/// The file format of an export.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
    Xlsx,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// One line of an export.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub level: Level,
    pub name: String,
    pub value: Amount,
    pub count: u64,
    pub category: Category,
    pub emission_date: Option<LedgerDate>,
    pub settlement_date: Option<LedgerDate>,
}

impl From<&HierarchyNode> for ExportRow {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            level: node.level(),
            name: node.name().to_string(),
            value: node.value(),
            count: node.count(),
            category: node.category(),
            emission_date: node.emission_date(),
            settlement_date: node.settlement_date(),
        }
    }
}

impl ExportRow {
    /// The row's cells as text, in `HEADERS` order.
    pub(crate) fn cells(&self) -> [String; 7] {
        [
            self.level.label().to_string(),
            self.name.clone(),
            self.value.to_string(),
            self.count.to_string(),
            self.category.to_string(),
            self.emission_date
                .map(|d| d.display_br())
                .unwrap_or_default(),
            self.settlement_date
                .map(|d| d.display_br())
                .unwrap_or_default(),
        ]
    }
}

/// Flattens `tree` into rows, each node followed by its descendants, stopping at `depth`.
pub fn rows(tree: &Tree, depth: ExportDepth) -> Vec<ExportRow> {
    let mut out = Vec::new();
    for &root in tree.roots() {
        push_rows(tree, root, depth, &mut out);
    }
    out
}

fn push_rows(tree: &Tree, id: NodeId, depth: ExportDepth, out: &mut Vec<ExportRow>) {
    let node = tree.node(id);
    if !depth.includes(node.level()) {
        return;
    }
    out.push(ExportRow::from(node));
    for &child in tree.children(id) {
        push_rows(tree, child, depth, out);
    }
}

/// The default file name of an export, e.g. `movimentacoes_PRJ-001_full.csv`.
pub fn file_name(project_code: &str, depth: ExportDepth, format: ExportFormat) -> String {
    let safe: String = project_code
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    format!("movimentacoes_{safe}_{depth}.{}", format.extension())
}

/// Everything needed to render an export.
#[derive(Debug, Clone)]
pub struct Report {
    pub project_name: String,
    pub project_code: String,
    pub depth: ExportDepth,
    pub rows: Vec<ExportRow>,
}

impl Report {
    pub fn new(
        project_code: &str,
        project_name: Option<&str>,
        tree: &Tree,
        depth: ExportDepth,
    ) -> Self {
        Self {
            project_name: project_name.unwrap_or(project_code).to_string(),
            project_code: project_code.to_string(),
            depth,
            rows: rows(tree, depth),
        }
    }

    /// Renders the report in `format`.
    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Csv => csv::render(&self.rows),
            ExportFormat::Pdf => render_pdf(self),
            ExportFormat::Xlsx => xlsx::render(&self.rows),
        }
    }
}

#[cfg(feature = "pdf")]
fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    pdf::render(report)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_report: &Report) -> Result<Vec<u8>> {
    anyhow::bail!("PDF export is not available, rebuild with the 'pdf' feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LedgerData, TransactionRecord};
    use rust_decimal::Decimal;

    fn sample_tree() -> Tree {
        let data = LedgerData::new(vec![
            TransactionRecord::new("0060", "Bolsas", Decimal::ZERO),
            TransactionRecord::new("00600001", "", Decimal::from(40))
                .with_debit_credit("2")
                .with_history("BOLSA ENSINO JOAO")
                .with_emission_date("20240301")
                .with_settlement_date("20240315"),
            TransactionRecord::new("00600002", "", Decimal::from(60))
                .with_debit_credit("2")
                .with_history("BOLSA COORDENAÇÃO MARIA"),
        ]);
        crate::tree::build(&data)
    }

    #[test]
    fn test_rows_by_depth() {
        let tree = sample_tree();
        assert_eq!(rows(&tree, ExportDepth::Mothers).len(), 1);
        assert_eq!(rows(&tree, ExportDepth::Children).len(), 3);
        let full = rows(&tree, ExportDepth::Full);
        let levels: Vec<Level> = full.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                Level::Mother,
                Level::Child,
                Level::Grandchild,
                Level::Child,
                Level::Grandchild
            ]
        );
    }

    #[test]
    fn test_cells() {
        let tree = sample_tree();
        let full = rows(&tree, ExportDepth::Full);
        let cells = full[2].cells();
        assert_eq!(cells[0], "Neto");
        assert_eq!(cells[1], "BOLSA ENSINO JOAO");
        assert_eq!(cells[2], "R$ 40,00");
        assert_eq!(cells[3], "1");
        assert_eq!(cells[4], "Bolsa Ensino");
        assert_eq!(cells[5], "01/03/2024");
        assert_eq!(cells[6], "15/03/2024");
        assert_eq!(full[0].cells()[5], "");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name("PRJ/001", ExportDepth::Children, ExportFormat::Pdf),
            "movimentacoes_PRJ_001_children.pdf"
        );
        assert_eq!(
            file_name("PRJ-001", ExportDepth::Full, ExportFormat::Xlsx),
            "movimentacoes_PRJ-001_full.xlsx"
        );
    }

    #[test]
    fn test_report_defaults_name_to_code() {
        let report = Report::new("PRJ-001", None, &sample_tree(), ExportDepth::Mothers);
        assert_eq!(report.project_name, "PRJ-001");
        assert_eq!(report.rows.len(), 1);
    }
}
