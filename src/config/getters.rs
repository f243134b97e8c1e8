//! Getter methods for `ScrapeConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::browser_setup::LaunchOptions;
use crate::content_saver::ExportFormat;
use crate::driver::Locator;
use crate::page_extractor::ColumnSpec;
use crate::scrape_engine::ConsentPolicy;
use crate::utils::UrlFormatter;

impl ScrapeConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    #[must_use]
    pub fn pagination_key(&self) -> Option<&str> {
        self.pagination_key.as_deref()
    }

    #[must_use]
    pub fn page_end(&self) -> u32 {
        self.page_end
    }

    #[must_use]
    pub fn filter_ads(&self) -> bool {
        self.filter_ads
    }

    #[must_use]
    pub fn ad_class(&self) -> &str {
        &self.ad_class
    }

    /// The ad marker to filter on, or `None` when ad filtering is off.
    #[must_use]
    pub fn ad_filter(&self) -> Option<&str> {
        self.filter_ads.then_some(self.ad_class.as_str())
    }

    #[must_use]
    pub fn columns(&self) -> &ColumnSpec {
        &self.columns
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    #[must_use]
    pub fn export_format(&self) -> ExportFormat {
        self.export_format
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    #[must_use]
    pub fn results_container(&self) -> &Locator {
        &self.results_container
    }

    #[must_use]
    pub fn consent_locator(&self) -> &Locator {
        &self.consent_locator
    }

    #[must_use]
    pub fn consent_policy(&self) -> ConsentPolicy {
        self.consent_policy
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&PathBuf> {
        self.chrome_executable.as_ref()
    }

    /// URL formatter for this run's base URL and query parameters.
    #[must_use]
    pub fn url_formatter(&self) -> UrlFormatter {
        UrlFormatter::new(
            self.base_url.clone(),
            self.query_params.clone(),
            self.pagination_key.clone(),
        )
    }

    /// Browser launch settings derived from this config.
    #[must_use]
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            chrome_executable: self.chrome_executable.clone(),
            user_data_dir: None,
        }
    }
}
