//! Columnar accumulator for extracted listings
//!
//! The column set is fixed when the table is created and every column always
//! holds the same number of values. Rows are only ever appended.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::page_extractor::{CellValue, ColumnSpec};
use crate::scrape_engine::ScrapeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<CellValue>>,
}

impl Table {
    #[must_use]
    pub fn new(spec: &ColumnSpec) -> Self {
        Self::with_columns(spec.names().map(str::to_string).collect())
    }

    #[must_use]
    pub fn with_columns(names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); names.len()];
        Self { names, columns }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Append one row whose cells are in column order.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), ScrapeError> {
        if row.len() != self.width() {
            return Err(ScrapeError::RowShape {
                expected: self.width(),
                actual: row.len(),
            });
        }
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
        Ok(())
    }

    /// Append several rows. Either all are appended or none is.
    pub fn append_rows(&mut self, rows: Vec<Vec<CellValue>>) -> Result<usize, ScrapeError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != self.width()) {
            return Err(ScrapeError::RowShape {
                expected: self.width(),
                actual: bad.len(),
            });
        }
        let count = rows.len();
        for row in rows {
            self.push_row(row)?;
        }
        Ok(count)
    }

    /// Cells of row `index`, in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.len() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.len()).map(|i| self.columns.iter().map(|c| &c[i]).collect())
    }
}

struct RowRef<'a> {
    table: &'a Table,
    index: usize,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.width()))?;
        for (name, column) in self.table.names.iter().zip(&self.table.columns) {
            map.serialize_entry(name, &column[self.index])?;
        }
        map.end()
    }
}

/// Serializes as an array of row objects with keys in schema order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for index in 0..self.len() {
            seq.serialize_element(&RowRef { table: self, index })?;
        }
        seq.end()
    }
}
