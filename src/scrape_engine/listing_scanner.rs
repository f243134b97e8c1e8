//! Per-tab listing extraction.
//!
//! Reads the results container of one tab, splits it into listings and appends
//! one row per listing to the table.

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use super::scrape_types::{PageScan, ScrapeError, ScrapeResult};
use crate::driver::{BrowserDriver, DriverError, Locator, TabHandle};
use crate::page_extractor::{CellValue, ExtractionOutcome, ExtractionPlan};
use crate::table::Table;

/// Rows extracted from one results container, before they reach the table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageListings {
    pub rows: Vec<Vec<CellValue>>,
    pub ads_skipped: usize,
    pub non_elements_skipped: usize,
    pub blank_cells: usize,
}

/// Split the container's inner markup into listings and extract each one.
///
/// Only direct children of the container are listings. Comments and text are
/// skipped, and so is every element carrying `ad_class` when it is given.
/// Row order follows document order.
#[must_use]
pub fn extract_listings(markup: &str, plan: &ExtractionPlan, ad_class: Option<&str>) -> PageListings {
    let fragment = Html::parse_fragment(markup);
    let mut listings = PageListings::default();

    for child in fragment.root_element().children() {
        let Some(listing) = ElementRef::wrap(child) else {
            listings.non_elements_skipped += 1;
            continue;
        };

        if let Some(ad) = ad_class
            && listing.value().classes().any(|c| c == ad)
        {
            trace!("Skipping ad entry <{}>", listing.value().name());
            listings.ads_skipped += 1;
            continue;
        }

        let outcomes = plan.extract(listing);
        listings.blank_cells += outcomes.iter().filter(|o| o.is_blank()).count();
        listings
            .rows
            .push(outcomes.into_iter().map(ExtractionOutcome::into_cell).collect());
    }

    listings
}

pub struct ListingScanner<'a> {
    plan: &'a ExtractionPlan,
    container: &'a Locator,
    ad_class: Option<&'a str>,
}

impl<'a> ListingScanner<'a> {
    #[must_use]
    pub fn new(plan: &'a ExtractionPlan, container: &'a Locator, ad_class: Option<&'a str>) -> Self {
        Self {
            plan,
            container,
            ad_class,
        }
    }

    /// Scan `tab` (opened for `page`) and append its listings to `table`.
    ///
    /// The table grows by exactly the number of kept listings, in every column,
    /// or not at all when the scan fails.
    pub async fn scan<D: BrowserDriver>(
        &self,
        driver: &mut D,
        tab: &TabHandle,
        page: u32,
        table: &mut Table,
    ) -> ScrapeResult<PageScan> {
        driver.switch_to_tab(tab).await?;

        let markup = driver
            .inner_html(self.container)
            .await
            .map_err(|e| match e {
                DriverError::NotFound { locator, .. } => {
                    ScrapeError::ResultsContainerMissing { page, locator }
                }
                source @ (DriverError::Navigation { .. } | DriverError::Timeout { .. }) => {
                    ScrapeError::Navigation { page, source }
                }
                other => ScrapeError::Driver(other),
            })?;

        let listings = extract_listings(&markup, self.plan, self.ad_class);
        let appended = table.append_rows(listings.rows)?;

        debug!(
            "Page {}: {} listings, {} ads skipped, {} blank cells",
            page, appended, listings.ads_skipped, listings.blank_cells
        );

        Ok(PageScan {
            page,
            tab: tab.clone(),
            listings: appended,
            ads_skipped: listings.ads_skipped,
            non_elements_skipped: listings.non_elements_skipped,
            blank_cells: listings.blank_cells,
        })
    }
}
