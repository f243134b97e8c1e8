//! Core types for scrape runs.
//!
//! Error taxonomy, run states, consent policy and the per-run report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::content_saver::ExportError;
use crate::driver::{DriverError, Locator, TabHandle};

/// Error type for scrape operations
///
/// Field-level problems never show up here; they degrade to blank cells and are
/// reported through [`ExtractionOutcome`](crate::page_extractor::ExtractionOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("consent control not found ({locator})")]
    ConsentControlMissing { locator: Locator },

    #[error("page {page} could not be loaded: {source}")]
    Navigation {
        page: u32,
        #[source]
        source: DriverError,
    },

    #[error("results container ({locator}) missing on page {page}")]
    ResultsContainerMissing { page: u32, locator: Locator },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("failed to export table to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: ExportError,
    },

    #[error("row has {actual} cells but the table has {expected} columns")]
    RowShape { expected: usize, actual: usize },
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Lifecycle of one [`ListingScraper`](super::ListingScraper) run.
///
/// Transitions only move forward. `Closed` is reached on every path out of a
/// run, including failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScrapeState {
    Created,
    Navigated,
    ConsentResolved,
    Paginated,
    Scanning,
    Closed,
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Navigated => "navigated",
            Self::ConsentResolved => "consent-resolved",
            Self::Paginated => "paginated",
            Self::Scanning => "scanning",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What to do when the consent control cannot be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentPolicy {
    /// Abort the run (after closing the session) and surface the error
    #[default]
    Required,
    /// Log, note it in the report, and keep going
    BestEffort,
}

impl FromStr for ConsentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "unknown consent policy '{other}' (expected 'required' or 'best-effort')"
            )),
        }
    }
}

/// Categorizes page failures in the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The tab for this page could not be created or focused
    TabOpen,
    /// The page never finished loading
    Navigation,
    /// The page loaded but the results container never appeared
    ResultsContainerMissing,
    /// The tab disappeared before it was scanned
    TabLost,
    /// Any other driver failure while scanning
    Driver,
}

impl FailureKind {
    #[must_use]
    pub fn classify(error: &ScrapeError) -> Self {
        match error {
            ScrapeError::Navigation { .. } => Self::Navigation,
            ScrapeError::ResultsContainerMissing { .. } => Self::ResultsContainerMissing,
            ScrapeError::Driver(DriverError::UnknownTab(_)) => Self::TabLost,
            _ => Self::Driver,
        }
    }
}

/// One page that contributed no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub page: u32,
    /// `None` when no tab was ever opened for the page
    pub tab: Option<TabHandle>,
    pub kind: FailureKind,
    pub error: String,
}

impl PageFailure {
    #[must_use]
    pub fn new(page: u32, tab: Option<TabHandle>, error: &ScrapeError) -> Self {
        Self {
            page,
            tab,
            kind: FailureKind::classify(error),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tab {
            Some(tab) => write!(f, "page {} (tab {}): {}", self.page, tab, self.error),
            None => write!(f, "page {}: {}", self.page, self.error),
        }
    }
}

/// Summary of scanning one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageScan {
    pub page: u32,
    pub tab: TabHandle,
    /// Rows appended to the table
    pub listings: usize,
    pub ads_skipped: usize,
    /// Comments and text between listings
    pub non_elements_skipped: usize,
    pub blank_cells: usize,
}

/// Outcome of a [`ListingScraper::run`](super::ListingScraper::run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub pages_requested: u32,
    pub consent_dismissed: bool,
    pub scans: Vec<PageScan>,
    pub failures: Vec<PageFailure>,
}

impl ScrapeReport {
    #[must_use]
    pub fn pages_scanned(&self) -> usize {
        self.scans.len()
    }

    #[must_use]
    pub fn rows_collected(&self) -> usize {
        self.scans.iter().map(|s| s.listings).sum()
    }

    #[must_use]
    pub fn ads_skipped(&self) -> usize {
        self.scans.iter().map(|s| s.ads_skipped).sum()
    }

    #[must_use]
    pub fn blank_cells(&self) -> usize {
        self.scans.iter().map(|s| s.blank_cells).sum()
    }

    /// Every requested page was scanned and nothing failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.pages_scanned() == self.pages_requested as usize
    }
}
