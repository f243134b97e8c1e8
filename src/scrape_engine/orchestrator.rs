//! Scrape run orchestration
//!
//! `ListingScraper` owns the browser session and the table for one run and walks
//! the run through its states:
//! `Created -> Navigated -> ConsentResolved -> Paginated -> Scanning -> Closed`.

use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use super::consent::dismiss_consent;
use super::listing_scanner::ListingScanner;
use super::page_opener::PageOpener;
use super::progress::{NoOpProgress, ProgressReporter};
use super::scrape_types::{
    ConsentPolicy, FailureKind, PageFailure, ScrapeError, ScrapeReport, ScrapeResult, ScrapeState,
};
use crate::config::ScrapeConfig;
use crate::content_saver::{ExportOptions, export_table};
use crate::driver::{BrowserDriver, TabHandle};
use crate::page_extractor::{ExtractionPlan, HandlerRegistry};
use crate::table::Table;
use crate::utils::{PageRequest, UrlFormatter};

pub struct ListingScraper<D: BrowserDriver, P: ProgressReporter = NoOpProgress> {
    driver: D,
    config: ScrapeConfig,
    plan: ExtractionPlan,
    formatter: UrlFormatter,
    table: Table,
    state: ScrapeState,
    /// Page number each tab of this run was opened for
    pages: HashMap<TabHandle, u32>,
    progress: P,
}

impl<D: BrowserDriver> ListingScraper<D> {
    /// Scraper with the standard handlers (`star_rate` is a star rating).
    pub fn new(driver: D, config: ScrapeConfig) -> ScrapeResult<Self> {
        Self::with_handlers(driver, config, &HandlerRegistry::standard())
    }

    pub fn with_handlers(
        driver: D,
        config: ScrapeConfig,
        handlers: &HandlerRegistry,
    ) -> ScrapeResult<Self> {
        let plan = ExtractionPlan::new(config.columns(), handlers)?;
        let table = Table::new(config.columns());
        let formatter = config.url_formatter();

        Ok(Self {
            driver,
            config,
            plan,
            formatter,
            table,
            state: ScrapeState::Created,
            pages: HashMap::new(),
            progress: NoOpProgress,
        })
    }
}

impl<D: BrowserDriver, P: ProgressReporter> ListingScraper<D, P> {
    /// Swap in a progress reporter. Only meaningful before [`run`](Self::run).
    pub fn with_progress<Q: ProgressReporter>(self, progress: Q) -> ListingScraper<D, Q> {
        ListingScraper {
            driver: self.driver,
            config: self.config,
            plan: self.plan,
            formatter: self.formatter,
            table: self.table,
            state: self.state,
            pages: self.pages,
            progress,
        }
    }

    #[must_use]
    pub fn state(&self) -> ScrapeState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.table
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Drive one complete run.
    ///
    /// The browser session is closed before this returns, whatever the outcome.
    /// Rows from pages scanned before a failure stay in the table.
    pub async fn run(&mut self) -> ScrapeResult<ScrapeReport> {
        if self.state != ScrapeState::Created {
            return Err(ScrapeError::Config(format!(
                "scraper already ran (state: {})",
                self.state
            )));
        }

        let mut report = ScrapeReport {
            pages_requested: self.config.page_end(),
            ..ScrapeReport::default()
        };

        let outcome = self.drive(&mut report).await;

        self.transition(ScrapeState::Closed);
        if let Err(e) = self.driver.close().await {
            warn!("Browser session did not close cleanly: {}", e);
        }

        match outcome {
            Ok(()) => {
                info!(
                    "Scrape finished: {} rows from {}/{} pages, {} failures",
                    self.table.len(),
                    report.pages_scanned(),
                    report.pages_requested,
                    report.failures.len()
                );
                Ok(report)
            }
            Err(e) => {
                error!("Scrape aborted: {}", e);
                self.progress.report_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Write the table to the configured destination in the configured format.
    pub fn export(&self) -> ScrapeResult<()> {
        let options = ExportOptions {
            format: self.config.export_format(),
            delimiter: self.config.delimiter(),
        };
        export_table(&self.table, self.config.output_path(), &options)
    }

    fn transition(&mut self, next: ScrapeState) {
        debug!("Scrape state {} -> {}", self.state, next);
        self.state = next;
        self.progress.report_state(next);
    }

    async fn drive(&mut self, report: &mut ScrapeReport) -> ScrapeResult<()> {
        self.driver.set_implicit_wait(self.config.implicit_wait());

        // Created -> Navigated
        let first_url = self.formatter.format_request(PageRequest::new(1));
        self.driver
            .navigate(&first_url)
            .await
            .map_err(|source| ScrapeError::Navigation { page: 1, source })?;
        let first_tab = self.driver.current_tab().await?;
        self.progress.report_page_opened(1, &first_url);
        self.pages.insert(first_tab, 1);
        self.transition(ScrapeState::Navigated);

        // Navigated -> ConsentResolved
        match dismiss_consent(&mut self.driver, self.config.consent_locator()).await {
            Ok(()) => report.consent_dismissed = true,
            Err(e @ ScrapeError::ConsentControlMissing { .. })
                if self.config.consent_policy() == ConsentPolicy::BestEffort =>
            {
                warn!("{}; continuing without dismissing it", e);
            }
            Err(e) => return Err(e),
        }
        self.transition(ScrapeState::ConsentResolved);

        // ConsentResolved -> Paginated
        let page_end = self.config.page_end();
        if page_end > 1 {
            let opener = PageOpener::new(&self.formatter);
            let opened = opener
                .open(
                    &mut self.driver,
                    PageRequest::range(page_end).skip(1),
                    &self.progress,
                )
                .await;
            self.pages.extend(opened.tabs);
            report.failures.extend(opened.failures);
        }
        self.transition(ScrapeState::Paginated);

        // Paginated -> Scanning
        self.transition(ScrapeState::Scanning);
        self.scan_tabs(report).await
    }

    /// Scan every tab of this run once, in the order the browser lists them.
    async fn scan_tabs(&mut self, report: &mut ScrapeReport) -> ScrapeResult<()> {
        let tabs = self.driver.list_tabs().await?;
        let mut pending = self.pages.clone();

        let scanner = ListingScanner::new(
            &self.plan,
            self.config.results_container(),
            self.config.ad_filter(),
        );

        for tab in tabs {
            let Some(page) = pending.remove(&tab) else {
                debug!("Tab {} was not opened by this run; not scanning it", tab);
                continue;
            };

            match scanner
                .scan(&mut self.driver, &tab, page, &mut self.table)
                .await
            {
                Ok(scan) => {
                    self.progress.report_page_scanned(&scan);
                    report.scans.push(scan);
                }
                Err(e) => {
                    let failure = PageFailure::new(page, Some(tab), &e);
                    warn!("Scan failed for {}", failure);
                    self.progress.report_page_failed(&failure);
                    report.failures.push(failure);
                }
            }
        }

        let mut lost: Vec<_> = pending.into_iter().collect();
        lost.sort_by_key(|(_, page)| *page);
        for (tab, page) in lost {
            let failure = PageFailure {
                page,
                tab: Some(tab),
                kind: FailureKind::TabLost,
                error: "tab closed before it was scanned".to_string(),
            };
            warn!("Scan skipped for {}", failure);
            self.progress.report_page_failed(&failure);
            report.failures.push(failure);
        }

        Ok(())
    }
}
