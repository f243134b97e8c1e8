use std::io::Write;

use super::ExportError;
use crate::table::Table;

/// Write `table` as a pretty-printed JSON array of row objects.
///
/// Keys follow column order and numeric cells stay numbers.
pub fn write_json<W: Write>(table: &Table, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
