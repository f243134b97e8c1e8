//! Core configuration type for a listing scrape
//!
//! `ScrapeConfig` describes one run end to end: which pages to open, how to
//! recognise listings and their fields, how to treat the consent banner, and
//! where the resulting table goes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content_saver::ExportFormat;
use crate::driver::Locator;
use crate::page_extractor::ColumnSpec;
use crate::scrape_engine::ConsentPolicy;
use crate::utils::{
    DEFAULT_AD_CLASS, DEFAULT_CONSENT_XPATH, DEFAULT_IMPLICIT_WAIT_SECS, DEFAULT_OUTPUT_FILE,
    DEFAULT_PAGE_END, DEFAULT_PAGINATION_KEY, DEFAULT_RESULTS_CONTAINER_CLASS,
};

/// Main configuration struct for scrape runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Search-results URL without a query string.
    pub(crate) base_url: String,

    /// Query parameters in emission order. The value of the pagination key is
    /// replaced per page, so its configured value is only a placeholder.
    #[serde(default)]
    pub(crate) query_params: Vec<(String, String)>,

    #[serde(default = "default_pagination_key")]
    pub(crate) pagination_key: Option<String>,

    /// Number of result pages to open, starting at page 1.
    #[serde(default = "default_page_end")]
    pub(crate) page_end: u32,

    #[serde(default = "default_true")]
    pub(crate) filter_ads: bool,

    /// Class token marking sponsored entries in the results container.
    #[serde(default = "default_ad_class")]
    pub(crate) ad_class: String,

    pub(crate) columns: ColumnSpec,

    #[serde(default = "default_output_path")]
    pub(crate) output_path: PathBuf,

    #[serde(default = "default_delimiter")]
    pub(crate) delimiter: char,

    #[serde(default)]
    pub(crate) export_format: ExportFormat,

    #[serde(default = "default_true")]
    pub(crate) headless: bool,

    /// How long every element lookup keeps polling before giving up, in
    /// milliseconds.
    #[serde(default = "default_implicit_wait_ms")]
    pub(crate) implicit_wait_ms: u64,

    #[serde(default = "default_results_container")]
    pub(crate) results_container: Locator,

    #[serde(default = "default_consent_locator")]
    pub(crate) consent_locator: Locator,

    #[serde(default)]
    pub(crate) consent_policy: ConsentPolicy,

    /// Chrome/Chromium binary. Discovered or downloaded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) chrome_executable: Option<PathBuf>,
}

pub(crate) fn default_pagination_key() -> Option<String> {
    Some(DEFAULT_PAGINATION_KEY.to_string())
}

pub(crate) fn default_page_end() -> u32 {
    DEFAULT_PAGE_END
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_ad_class() -> String {
    DEFAULT_AD_CLASS.to_string()
}

pub(crate) fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

pub(crate) fn default_delimiter() -> char {
    ','
}

pub(crate) fn default_implicit_wait_ms() -> u64 {
    DEFAULT_IMPLICIT_WAIT_SECS * 1000
}

pub(crate) fn default_results_container() -> Locator {
    Locator::class_name(DEFAULT_RESULTS_CONTAINER_CLASS)
}

pub(crate) fn default_consent_locator() -> Locator {
    Locator::xpath(DEFAULT_CONSENT_XPATH)
}
