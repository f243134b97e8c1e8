//! Scrape engine: consent handling, page opening, listing scanning and the
//! orchestrator that sequences them over one browser session.

pub mod consent;
pub mod listing_scanner;
pub mod orchestrator;
pub mod page_opener;
pub mod progress;
pub mod scrape_types;

pub use consent::dismiss_consent;
pub use listing_scanner::{ListingScanner, PageListings, extract_listings};
pub use orchestrator::ListingScraper;
pub use page_opener::{OpenedPages, PageOpener};
pub use progress::{NoOpProgress, ProgressReporter};
pub use scrape_types::{
    ConsentPolicy, FailureKind, PageFailure, PageScan, ScrapeError, ScrapeReport, ScrapeResult,
    ScrapeState,
};
