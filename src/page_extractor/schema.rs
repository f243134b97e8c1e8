use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::scrape_engine::ScrapeError;

/// How a column finds its sub-node inside a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelector {
    /// First descendant whose `class` attribute contains this token
    Class(String),
    /// First descendant matching a CSS selector
    Css(String),
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(token) => write!(f, "class={token}"),
            Self::Css(css) => write!(f, "css={css}"),
        }
    }
}

/// Handlers that can be bound to a column from configuration alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinHandler {
    Text,
    StarRating,
}

/// One output column: its name, where its value lives, and an optional
/// built-in handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub selector: ColumnSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<BuiltinHandler>,
}

impl ColumnDef {
    #[must_use]
    pub fn class(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: ColumnSelector::Class(class.into()),
            handler: None,
        }
    }

    #[must_use]
    pub fn css(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: ColumnSelector::Css(css.into()),
            handler: None,
        }
    }

    #[must_use]
    pub fn with_handler(mut self, handler: BuiltinHandler) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// Ordered, immutable table schema.
///
/// Column names are unique and the list is never empty. Order defines both the
/// extraction order and the export header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnDef>", into = "Vec<ColumnDef>")]
pub struct ColumnSpec {
    columns: Vec<ColumnDef>,
}

impl ColumnSpec {
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, ScrapeError> {
        if columns.is_empty() {
            return Err(ScrapeError::Config(
                "column spec must contain at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(ScrapeError::Config("column name cannot be empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ScrapeError::Config(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Build a spec where every selector is a class token.
    pub fn from_classes<I, N, C>(pairs: I) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, class)| ColumnDef::class(name, class))
                .collect(),
        )
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl TryFrom<Vec<ColumnDef>> for ColumnSpec {
    type Error = ScrapeError;

    fn try_from(columns: Vec<ColumnDef>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<ColumnSpec> for Vec<ColumnDef> {
    fn from(spec: ColumnSpec) -> Self {
        spec.columns
    }
}

/// A single extracted cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// What happened when one column was extracted from one listing.
///
/// Both failure variants become a blank cell in the table; they are kept
/// distinct so callers can tell a missing node from a failing handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Value(CellValue),
    /// The selector matched nothing inside the listing
    Missing { selector: String },
    /// The handler ran and returned an error
    HandlerFailed { reason: String },
}

impl ExtractionOutcome {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Value(v) => v.is_empty(),
            Self::Missing { .. } | Self::HandlerFailed { .. } => true,
        }
    }

    #[must_use]
    pub fn into_cell(self) -> CellValue {
        match self {
            Self::Value(v) => v,
            Self::Missing { .. } | Self::HandlerFailed { .. } => CellValue::empty(),
        }
    }
}
