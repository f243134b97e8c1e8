//! Progress reporting abstraction for scrape runs
//!
//! Defines the `ProgressReporter` trait for lifecycle event reporting
//! and provides a no-op implementation for simple use cases.

use super::scrape_types::{PageFailure, PageScan, ScrapeState};

/// Trait for reporting scrape progress at key lifecycle events
///
/// Implementations can send updates to channels, log to console, update UI, etc.
pub trait ProgressReporter {
    /// Report a state machine transition
    fn report_state(&self, state: ScrapeState);

    /// Report that a tab was opened for `page`
    fn report_page_opened(&self, page: u32, url: &str);

    /// Report that a tab has been scanned
    fn report_page_scanned(&self, scan: &PageScan);

    /// Report a page that contributed no rows
    fn report_page_failed(&self, failure: &PageFailure);

    /// Report an error that ends the run
    fn report_error(&self, error: &str);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_state(&self, _state: ScrapeState) {}

    #[inline(always)]
    fn report_page_opened(&self, _page: u32, _url: &str) {}

    #[inline(always)]
    fn report_page_scanned(&self, _scan: &PageScan) {}

    #[inline(always)]
    fn report_page_failed(&self, _failure: &PageFailure) {}

    #[inline(always)]
    fn report_error(&self, _error: &str) {}
}
