use crate::export::{ExportRow, HEADERS};
use crate::Result;
use anyhow::Context;

/// Spreadsheet tools need the byte order mark to read the file as UTF-8.
const BOM: &str = "\u{feff}";

/// Renders `rows` as `;`-separated CSV. Semicolons inside cells become commas.
pub(super) fn render(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut buf = BOM.as_bytes().to_vec();
    {
        let mut writer = ::csv::WriterBuilder::new()
            .delimiter(b';')
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        writer
            .write_record(HEADERS)
            .context("Unable to write the CSV header")?;
        for row in rows {
            let cells = row.cells().map(|cell| cell.replace(';', ","));
            writer
                .write_record(&cells)
                .context("Unable to write a CSV row")?;
        }
        writer.flush().context("Unable to flush the CSV writer")?;
    }
    Ok(buf)
}
