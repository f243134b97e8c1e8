use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

use super::ExportError;
use crate::table::Table;

/// Write `table` as delimited text: one header row, then one row per listing.
///
/// Fields are quoted with `"` only when they contain the delimiter, a quote or a
/// line break. Numbers are written in their shortest form (`4`, `4.5`).
pub fn write_csv<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote(b'"')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    writer.write_record(table.column_names())?;

    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}
