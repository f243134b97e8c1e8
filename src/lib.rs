pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod driver;
pub mod page_extractor;
pub mod presets;
pub mod scrape_engine;
pub mod table;
pub mod utils;

pub use browser_setup::{LaunchOptions, download_managed_browser, find_browser_executable, launch_browser};
pub use config::ScrapeConfig;
pub use content_saver::{ExportError, ExportFormat, ExportOptions, export_table, write_table};
pub use driver::{BrowserDriver, ChromiumDriver, DriverError, Locator, TabHandle};
pub use page_extractor::{
    BuiltinHandler, CellValue, ColumnDef, ColumnSelector, ColumnSpec, ExtractionOutcome,
    ExtractionPlan, HandlerRegistry,
};
pub use scrape_engine::{
    ConsentPolicy, ListingScraper, NoOpProgress, PageFailure, PageScan, ProgressReporter,
    ScrapeError, ScrapeReport, ScrapeResult, ScrapeState,
};
pub use table::Table;
pub use utils::{PageRequest, UrlFormatter};

/// Launch Chrome, run one scrape with the standard handlers, and return the
/// table together with the run report.
///
/// The browser is closed before this returns. Export is left to the caller.
pub async fn scrape(config: ScrapeConfig) -> ScrapeResult<(Table, ScrapeReport)> {
    let driver = ChromiumDriver::launch(&config.launch_options()).await?;
    let mut scraper = ListingScraper::new(driver, config)?;
    let report = scraper.run().await?;
    Ok((scraper.into_table(), report))
}
