use crate::export::{ExportRow, HEADERS};
use crate::model::LedgerDate;
use crate::Result;
use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const SHEET_NAME: &str = "Movimentações";
const CURRENCY_FORMAT: &str = "\"R$\" #,##0.00";
const WIDTHS: [f64; 7] = [8.0, 48.0, 16.0, 12.0, 20.0, 12.0, 12.0];

/// Renders `rows` as a single-sheet workbook. Values and counts are written as numbers so they
/// can be summed in the spreadsheet; dates are `dd/mm/yyyy` text.
pub(super) fn render(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), rows).context("Unable to write the worksheet")?;
    workbook
        .save_to_buffer()
        .context("Unable to save the workbook")
}

fn write_sheet(sheet: &mut Worksheet, rows: &[ExportRow]) -> std::result::Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    let currency = Format::new().set_num_format(CURRENCY_FORMAT);

    sheet.set_name(SHEET_NAME)?;
    for (col, (header, width)) in HEADERS.iter().zip(WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &bold)?;
        sheet.set_column_width(col, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (ix, row) in rows.iter().enumerate() {
        let r = ix as u32 + 1;
        let value = row.value.value().to_f64().unwrap_or_default();
        sheet.write_string(r, 0, row.level.label())?;
        sheet.write_string(r, 1, row.name.as_str())?;
        sheet.write_number_with_format(r, 2, value, &currency)?;
        sheet.write_number(r, 3, row.count as f64)?;
        sheet.write_string(r, 4, row.category.to_string())?;
        sheet.write_string(r, 5, br_date(row.emission_date))?;
        sheet.write_string(r, 6, br_date(row.settlement_date))?;
    }
    Ok(())
}

fn br_date(date: Option<LedgerDate>) -> String {
    date.map(|d| d.display_br()).unwrap_or_default()
}
