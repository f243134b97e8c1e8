//! Configuration module for listing scrapes
//!
//! This module provides the `ScrapeConfig` struct, its type-safe builder, and
//! loading from JSON run descriptions.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithBaseUrl, WithColumns};
pub use types::ScrapeConfig;

use std::path::Path;
use tracing::{debug, warn};

use crate::content_saver::is_usable_delimiter;
use crate::scrape_engine::ScrapeError;

impl ScrapeConfig {
    /// Load and validate a run description from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&raw).map_err(|e| match e {
            ScrapeError::Config(msg) => ScrapeError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        debug!("Loaded scrape config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a run description from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, ScrapeError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| ScrapeError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Same run, written somewhere else.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Check cross-field constraints that serde cannot express.
    pub(crate) fn validate(&self) -> Result<(), ScrapeError> {
        url::Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base_url '{}': {e}", self.base_url)))?;

        if self.page_end == 0 {
            return Err(ScrapeError::Config("page_end must be at least 1".to_string()));
        }

        if !is_usable_delimiter(self.delimiter) {
            return Err(ScrapeError::Config(format!(
                "delimiter {:?} must be a single ASCII character other than a quote or line break",
                self.delimiter
            )));
        }

        if self.filter_ads && self.ad_class.trim().is_empty() {
            return Err(ScrapeError::Config(
                "ad_class must not be empty while ad filtering is enabled".to_string(),
            ));
        }

        if self.page_end > 1 && !self.url_formatter().paginates() {
            warn!(
                "page_end is {} but no query parameter carries the page number; \
                 every tab will load the same URL",
                self.page_end
            );
        }

        Ok(())
    }
}
