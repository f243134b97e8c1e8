//! Ready-made run setups.

use crate::config::{ScrapeConfig, ScrapeConfigBuilder, WithBaseUrl};
use crate::page_extractor::{BuiltinHandler, ColumnDef, ColumnSpec};
use crate::scrape_engine::ScrapeResult;

/// Results page of the zooplus.de vet directory.
pub const VET_DIRECTORY_URL: &str = "https://www.zooplus.de/tierarzt/results";

/// Column schema for vet directory listings.
pub fn vet_directory_columns() -> ScrapeResult<ColumnSpec> {
    ColumnSpec::new(vec![
        ColumnDef::class("name", "result-intro__title"),
        ColumnDef::class("job", "result-intro__subtitle"),
        ColumnDef::class("work_time", "daily-hours__range"),
        ColumnDef::class("work_status", "daily-hours__note"),
        ColumnDef::class("address", "result-intro__address"),
        ColumnDef::class("star_rate", "star-rating").with_handler(BuiltinHandler::StarRating),
        ColumnDef::class("recommendation", "result-intro__rating__note"),
    ])
}

/// Builder preloaded with the vet directory pages: the first three result
/// pages of the "all animals" search. Columns are still to be chosen.
#[must_use]
pub fn vet_directory_builder() -> ScrapeConfigBuilder<WithBaseUrl> {
    ScrapeConfig::builder()
        .base_url(VET_DIRECTORY_URL)
        .query_param("animal_99", "true")
        .query_param("page", "")
        .page_end(3)
}

/// The complete vet directory run with default output settings.
pub fn vet_directory() -> ScrapeResult<ScrapeConfig> {
    vet_directory_builder()
        .columns(vet_directory_columns()?)
        .build()
}
