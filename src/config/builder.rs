//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! A config cannot be built until both the base URL and the column schema
//! have been supplied.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{
    ScrapeConfig, default_ad_class, default_consent_locator, default_delimiter,
    default_implicit_wait_ms, default_output_path, default_page_end, default_pagination_key,
    default_results_container,
};
use crate::content_saver::ExportFormat;
use crate::driver::Locator;
use crate::page_extractor::ColumnSpec;
use crate::scrape_engine::{ConsentPolicy, ScrapeError};

// Type states for the builder
pub struct WithBaseUrl;
pub struct WithColumns;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) base_url: Option<String>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) pagination_key: Option<String>,
    pub(crate) page_end: u32,
    pub(crate) filter_ads: bool,
    pub(crate) ad_class: String,
    pub(crate) columns: Option<ColumnSpec>,
    pub(crate) output_path: PathBuf,
    pub(crate) delimiter: char,
    pub(crate) export_format: ExportFormat,
    pub(crate) headless: bool,
    pub(crate) implicit_wait_ms: u64,
    pub(crate) results_container: Locator,
    pub(crate) consent_locator: Locator,
    pub(crate) consent_policy: ConsentPolicy,
    pub(crate) chrome_executable: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            base_url: None,
            query_params: Vec::new(),
            pagination_key: default_pagination_key(),
            page_end: default_page_end(),
            filter_ads: true,
            ad_class: default_ad_class(),
            columns: None,
            output_path: default_output_path(),
            delimiter: default_delimiter(),
            export_format: ExportFormat::default(),
            headless: true,
            implicit_wait_ms: default_implicit_wait_ms(),
            results_container: default_results_container(),
            consent_locator: default_consent_locator(),
            consent_policy: ConsentPolicy::default(),
            chrome_executable: None,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

impl<State> ScrapeConfigBuilder<State> {
    fn into_state<Next>(self) -> ScrapeConfigBuilder<Next> {
        ScrapeConfigBuilder {
            base_url: self.base_url,
            query_params: self.query_params,
            pagination_key: self.pagination_key,
            page_end: self.page_end,
            filter_ads: self.filter_ads,
            ad_class: self.ad_class,
            columns: self.columns,
            output_path: self.output_path,
            delimiter: self.delimiter,
            export_format: self.export_format,
            headless: self.headless,
            implicit_wait_ms: self.implicit_wait_ms,
            results_container: self.results_container,
            consent_locator: self.consent_locator,
            consent_policy: self.consent_policy,
            chrome_executable: self.chrome_executable,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfigBuilder<()> {
    /// Set the search-results URL. A missing scheme defaults to `https://`.
    pub fn base_url(mut self, url: impl Into<String>) -> ScrapeConfigBuilder<WithBaseUrl> {
        let url_string = url.into();

        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        self.base_url = Some(normalized_url);
        self.into_state()
    }
}

impl ScrapeConfigBuilder<WithBaseUrl> {
    pub fn columns(mut self, columns: ColumnSpec) -> ScrapeConfigBuilder<WithColumns> {
        self.columns = Some(columns);
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl ScrapeConfigBuilder<WithColumns> {
    pub fn build(self) -> Result<ScrapeConfig, ScrapeError> {
        let config = ScrapeConfig {
            base_url: self
                .base_url
                .ok_or_else(|| ScrapeError::Config("base_url is required".to_string()))?,
            columns: self
                .columns
                .ok_or_else(|| ScrapeError::Config("columns are required".to_string()))?,
            query_params: self.query_params,
            pagination_key: self.pagination_key,
            page_end: self.page_end,
            filter_ads: self.filter_ads,
            ad_class: self.ad_class,
            output_path: self.output_path,
            delimiter: self.delimiter,
            export_format: self.export_format,
            headless: self.headless,
            implicit_wait_ms: self.implicit_wait_ms,
            results_container: self.results_container,
            consent_locator: self.consent_locator,
            consent_policy: self.consent_policy,
            chrome_executable: self.chrome_executable,
        };
        config.validate()?;
        Ok(config)
    }
}
