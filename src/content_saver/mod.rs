//! Table export
//!
//! Writes the accumulated table either as delimited text or as JSON, to a
//! file or to any writer.

// Module declarations
mod csv_saver;
mod json_saver;

pub use csv_saver::write_csv;
pub use json_saver::write_json;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::scrape_engine::{ScrapeError, ScrapeResult};
use crate::table::Table;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("delimiter {0:?} must be a single ASCII character other than a quote or line break")]
    InvalidDelimiter(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}' (expected 'csv' or 'json')")),
        }
    }
}

/// How a table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// CSV field delimiter; ignored for JSON
    pub delimiter: char,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            delimiter: ',',
        }
    }
}

impl ExportOptions {
    #[must_use]
    pub fn csv(delimiter: char) -> Self {
        Self {
            format: ExportFormat::Csv,
            delimiter,
        }
    }

    #[must_use]
    pub fn json() -> Self {
        Self {
            format: ExportFormat::Json,
            ..Self::default()
        }
    }

    fn delimiter_byte(&self) -> Result<u8, ExportError> {
        if !is_usable_delimiter(self.delimiter) {
            return Err(ExportError::InvalidDelimiter(self.delimiter));
        }
        u8::try_from(self.delimiter).map_err(|_| ExportError::InvalidDelimiter(self.delimiter))
    }
}

/// Whether `delimiter` keeps CSV output unambiguous: one ASCII byte that is
/// neither the quote character nor a line break.
#[must_use]
pub fn is_usable_delimiter(delimiter: char) -> bool {
    delimiter.is_ascii() && !matches!(delimiter, '"' | '\n' | '\r')
}

/// Write `table` to `writer` in the requested format.
pub fn write_table<W: Write>(
    table: &Table,
    writer: W,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    match options.format {
        ExportFormat::Csv => write_csv(table, writer, options.delimiter_byte()?),
        ExportFormat::Json => write_json(table, writer),
    }
}

/// Write `table` to the file at `path`, replacing it if it exists.
///
/// On failure the table is untouched, so the export can be retried.
pub fn export_table(table: &Table, path: &Path, options: &ExportOptions) -> ScrapeResult<()> {
    let to_export_error = |source: ExportError| ScrapeError::Export {
        path: path.to_path_buf(),
        source,
    };

    options.delimiter_byte().map_err(to_export_error)?;

    let file = File::create(path).map_err(|e| to_export_error(e.into()))?;
    write_table(table, BufWriter::new(file), options).map_err(to_export_error)?;

    info!(
        "Exported {} rows x {} columns to {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(())
}
