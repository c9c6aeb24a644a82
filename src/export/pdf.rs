use crate::export::{Report, HEADERS};
use crate::Result;
use anyhow::anyhow;
use printpdf::*;
use std::io::BufWriter;

// A4 landscape (mm)
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 15.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const NAME_CHARS: usize = 40;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const COLS: [Col; 7] = [
    Col { width: 20.0, align: Align::Left },
    Col { width: 95.0, align: Align::Left },
    Col { width: 35.0, align: Align::Right },
    Col { width: 15.0, align: Align::Right },
    Col { width: 40.0, align: Align::Left },
    Col { width: 32.0, align: Align::Left },
    Col { width: 32.0, align: Align::Left },
];

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Unable to load the PDF font: {e:?}"))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Unable to load the PDF font: {e:?}"))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    /// Starts a new page, repeating the table header.
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
        self.table_header();
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(self.pdf_y())), false),
                (Point::new(Mm(PAGE_W - MARGIN_RIGHT), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, report: &Report) {
        self.text(
            &format!("Movimentações - {}", report.project_name),
            MARGIN_LEFT,
            TITLE_SIZE,
            true,
        );
        self.y += 7.0;
        for line in [
            format!("Código: {}", report.project_code),
            format!("Nível: {}", report.depth.label()),
            format!("Total de registros: {}", report.rows.len()),
        ] {
            self.text(&line, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.y += 3.0;
        self.table_header();
    }

    fn table_header(&mut self) {
        let mut headers = HEADERS;
        headers[3] = "Qtd";
        self.row(&headers, true);
        self.hline();
        self.y += 2.0;
    }

    fn row(&mut self, values: &[&str], bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in COLS.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, FONT_SIZE, bold),
                Align::Right => {
                    let tw = approx_text_width(value, FONT_SIZE);
                    self.text(value, x + col.width - tw, FONT_SIZE, bold);
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn table_row(&mut self, values: &[&str]) {
        if self.y + ROW_H > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
        self.row(values, false);
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| anyhow!("Unable to write the PDF: {e:?}"))?;
        buf.into_inner()
            .map_err(|e| anyhow!("Unable to write the PDF: {}", e.error()))
    }
}

/// Renders `report` as a landscape table with a header block naming the project, the depth and
/// the number of rows. Item names are cut at 40 characters.
pub(super) fn render(report: &Report) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(&format!("Movimentações - {}", report.project_name))?;
    pdf.header(report);
    for row in &report.rows {
        let mut cells = row.cells();
        cells[1] = cells[1].chars().take(NAME_CHARS).collect();
        let values: Vec<&str> = cells.iter().map(String::as_str).collect();
        pdf.table_row(&values);
    }
    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportDepth, ExportRow};
    use crate::model::{Amount, Category};
    use crate::tree::Level;
    use rust_decimal::Decimal;

    fn report(rows: usize) -> Report {
        Report {
            project_name: "Projeto de Extensão".to_string(),
            project_code: "PRJ-001".to_string(),
            depth: ExportDepth::Full,
            rows: (0..rows)
                .map(|i| ExportRow {
                    level: Level::Grandchild,
                    name: format!("Pagamento número {i} com uma descrição bem mais longa que quarenta"),
                    value: Amount::new(Decimal::from(i as i64)),
                    count: 1,
                    category: Category::Outros,
                    emission_date: None,
                    settlement_date: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&report(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_many_rows_paginates() {
        let bytes = render(&report(200)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
