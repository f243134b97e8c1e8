//! Builder methods available for all states
//!
//! Everything except the base URL and the column schema has a default, so
//! these setters can be called at any point in the chain.

use std::path::PathBuf;
use std::time::Duration;

use super::builder::ScrapeConfigBuilder;
use crate::content_saver::ExportFormat;
use crate::driver::Locator;
use crate::scrape_engine::ConsentPolicy;

impl<State> ScrapeConfigBuilder<State> {
    /// Append one query parameter. Parameters are emitted in the order added.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Replace the whole query parameter list.
    #[must_use]
    pub fn query_params(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params = params;
        self
    }

    /// Name of the query parameter that carries the page number.
    ///
    /// `None` disables substitution; every page then formats to the same URL.
    #[must_use]
    pub fn pagination_key(mut self, key: Option<String>) -> Self {
        self.pagination_key = key;
        self
    }

    /// Total number of result pages to open (default: 1)
    #[must_use]
    pub fn page_end(mut self, page_end: u32) -> Self {
        self.page_end = page_end;
        self
    }

    #[must_use]
    pub fn filter_ads(mut self, filter: bool) -> Self {
        self.filter_ads = filter;
        self
    }

    #[must_use]
    pub fn ad_class(mut self, class: impl Into<String>) -> Self {
        self.ad_class = class.into();
        self
    }

    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Field delimiter for CSV export. Must be a single ASCII character.
    #[must_use]
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    /// Set browser headless mode (default: true)
    ///
    /// A visible window is mostly useful when a site serves a different
    /// consent banner or layout than expected.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Implicit wait for every element lookup, kept to millisecond precision.
    #[must_use]
    pub fn implicit_wait(mut self, wait: Duration) -> Self {
        self.implicit_wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn implicit_wait_secs(mut self, secs: u64) -> Self {
        self.implicit_wait_ms = secs.saturating_mul(1000);
        self
    }

    /// Element whose children are the listings.
    #[must_use]
    pub fn results_container(mut self, locator: Locator) -> Self {
        self.results_container = locator;
        self
    }

    #[must_use]
    pub fn consent_locator(mut self, locator: Locator) -> Self {
        self.consent_locator = locator;
        self
    }

    #[must_use]
    pub fn consent_policy(mut self, policy: ConsentPolicy) -> Self {
        self.consent_policy = policy;
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }
}
