//! End-to-end runs of `ListingScraper` against the in-memory driver

use listscrape::{
    BuiltinHandler, CellValue, ColumnDef, ColumnSpec, ConsentPolicy, ListingScraper,
    ProgressReporter, ScrapeConfig, ScrapeError, ScrapeState,
};
use listscrape::scrape_engine::{FailureKind, PageFailure, PageScan};
use std::cell::RefCell;
use std::rc::Rc;

mod common;
use common::{BASE_URL, FakeDriver, ad_listing, listing, page_url, results_markup};

fn columns() -> ColumnSpec {
    ColumnSpec::new(vec![
        ColumnDef::class("name", "title"),
        ColumnDef::class("rating", "stars").with_handler(BuiltinHandler::StarRating),
    ])
    .unwrap()
}

fn config(page_end: u32) -> ScrapeConfig {
    ScrapeConfig::builder()
        .base_url(BASE_URL)
        .columns(columns())
        .query_param("animal_99", "true")
        .query_param("page", "")
        .page_end(page_end)
        .implicit_wait_secs(0)
        .build()
        .unwrap()
}

fn page_with_ad(prefix: &str) -> String {
    results_markup(&[
        listing(&format!("{prefix} one"), 5, false),
        ad_listing("Sponsored clinic"),
        listing(&format!("{prefix} two"), 4, true),
        listing(&format!("{prefix} three"), 0, false),
    ])
}

fn two_page_driver() -> FakeDriver {
    FakeDriver::new()
        .with_page(page_url(1), page_with_ad("First"))
        .with_page(page_url(2), page_with_ad("Second"))
}

#[tokio::test]
async fn test_two_pages_with_ads_yield_six_rows() {
    let mut scraper = ListingScraper::new(two_page_driver(), config(2)).unwrap();
    let report = scraper.run().await.unwrap();

    let table = scraper.table();
    assert_eq!(table.len(), 6);
    assert_eq!(table.column("name").unwrap().len(), 6);
    assert_eq!(table.column("rating").unwrap().len(), 6);

    assert_eq!(report.rows_collected(), 6);
    assert_eq!(report.ads_skipped(), 2);
    assert_eq!(report.pages_scanned(), 2);
    assert!(report.consent_dismissed);
    assert!(report.is_complete());

    let names: Vec<String> = table
        .column("name")
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(!names.iter().any(|n| n.contains("Sponsored")));
    assert!(names.contains(&"Second two".to_string()));

    assert_eq!(scraper.state(), ScrapeState::Closed);
    let driver = scraper.driver();
    assert_eq!(driver.consent_clicks, 1);
    assert!(driver.closed);
    assert_eq!(driver.opened_urls, vec![page_url(2)]);
}

#[tokio::test]
async fn test_ratings_are_summed_per_listing() {
    let mut scraper = ListingScraper::new(two_page_driver(), config(1)).unwrap();
    scraper.run().await.unwrap();

    let ratings = scraper.table().column("rating").unwrap();
    assert_eq!(
        ratings,
        &[CellValue::Number(5.0), CellValue::Number(4.5), CellValue::Number(0.0)]
    );
}

#[tokio::test]
async fn test_tab_order_does_not_matter() {
    let driver = two_page_driver().reversed_tab_order();
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 6);
    assert_eq!(report.scans[0].page, 2);
    assert_eq!(report.scans[1].page, 1);

    let mut scanned = scraper.driver().scanned_urls.clone();
    scanned.sort();
    assert_eq!(scanned, vec![page_url(1), page_url(2)]);
}

#[tokio::test]
async fn test_single_page_opens_no_tabs() {
    let mut scraper = ListingScraper::new(two_page_driver(), config(1)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 3);
    assert_eq!(report.pages_scanned(), 1);
    assert!(scraper.driver().opened_urls.is_empty());
    assert_eq!(scraper.driver().tab_count(), 1);
}

#[tokio::test]
async fn test_missing_consent_control_aborts_when_required() {
    let driver = two_page_driver().without_consent_control();
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();

    let err = scraper.run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::ConsentControlMissing { .. }));
    assert!(err.to_string().contains("onetrust-reject-all-handler"));

    assert_eq!(scraper.state(), ScrapeState::Closed);
    assert!(scraper.table().is_empty());
    assert!(scraper.driver().closed);
    assert!(scraper.driver().opened_urls.is_empty());
}

#[tokio::test]
async fn test_missing_consent_control_tolerated_when_best_effort() {
    let driver = two_page_driver().without_consent_control();
    let config = ScrapeConfig::builder()
        .base_url(BASE_URL)
        .columns(columns())
        .query_param("animal_99", "true")
        .query_param("page", "")
        .page_end(2)
        .implicit_wait_secs(0)
        .consent_policy(ConsentPolicy::BestEffort)
        .build()
        .unwrap();

    let mut scraper = ListingScraper::new(driver, config).unwrap();
    let report = scraper.run().await.unwrap();

    assert!(!report.consent_dismissed);
    assert_eq!(scraper.table().len(), 6);
    assert_eq!(scraper.driver().consent_clicks, 0);
}

#[tokio::test]
async fn test_page_without_results_is_reported_and_others_kept() {
    // Page 2 never renders its results container
    let driver = FakeDriver::new().with_page(page_url(1), page_with_ad("First"));
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 3);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, FailureKind::ResultsContainerMissing);
    assert!(failure.tab.is_some());
    assert!(!report.is_complete());
    assert!(scraper.driver().closed);
}

#[tokio::test]
async fn test_refused_popup_does_not_stop_later_pages() {
    let driver = FakeDriver::new()
        .with_page(page_url(1), page_with_ad("First"))
        .with_page(page_url(2), page_with_ad("Second"))
        .with_page(page_url(3), page_with_ad("Third"))
        .refusing_popup(page_url(2));
    let mut scraper = ListingScraper::new(driver, config(3)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 6);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].page, 2);
    assert_eq!(report.failures[0].kind, FailureKind::TabOpen);
    assert_eq!(report.failures[0].tab, None);
    assert_eq!(
        scraper.driver().opened_urls,
        vec![page_url(2), page_url(3)]
    );
}

fn three_page_driver() -> FakeDriver {
    two_page_driver().with_page(page_url(3), page_with_ad("Third"))
}

#[tokio::test]
async fn test_tab_closed_before_scan_is_reported_as_lost() {
    let driver = three_page_driver().closing_tab(page_url(2));
    let mut scraper = ListingScraper::new(driver, config(3)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 6);
    assert_eq!(report.pages_scanned(), 2);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, FailureKind::TabLost);
    assert!(failure.tab.is_some());
    assert!(!report.is_complete());
    assert_eq!(scraper.driver().close_calls, 1);
}

#[tokio::test]
async fn test_last_tab_closed_while_scanning_is_reported_as_lost() {
    // Page 2 is open until the scan moves focus back to page 1
    let driver = two_page_driver().closing_tab(page_url(2));
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();
    let report = scraper.run().await.unwrap();

    assert_eq!(scraper.table().len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].page, 2);
    assert_eq!(report.failures[0].kind, FailureKind::TabLost);
    assert!(scraper.driver().closed);
}

#[tokio::test]
async fn test_results_timeout_is_a_page_navigation_failure() {
    let driver = three_page_driver().timing_out(page_url(2));
    let mut scraper = ListingScraper::new(driver, config(3)).unwrap();
    let report = scraper.run().await.unwrap();

    let names: Vec<String> = scraper
        .table()
        .column("name")
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names.len(), 6);
    assert!(names.iter().all(|n| !n.starts_with("Second")));

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, FailureKind::Navigation);
    assert!(failure.error.contains("page 2"));
    assert_eq!(scraper.driver().close_calls, 1);
}

#[tokio::test]
async fn test_report_serializes_tabs_as_strings() {
    let driver = two_page_driver().timing_out(page_url(2));
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();
    let report = scraper.run().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pages_requested"], 2);
    assert_eq!(json["scans"][0]["tab"], "tab-0");
    assert_eq!(json["scans"][0]["listings"], 3);
    assert_eq!(json["failures"][0]["tab"], "tab-1");
    assert_eq!(json["failures"][0]["kind"], "navigation");
    assert!(json["failures"][0]["error"].is_string());
}

#[tokio::test]
async fn test_first_page_navigation_failure_closes_session() {
    let driver = two_page_driver().failing_navigation(page_url(1));
    let mut scraper = ListingScraper::new(driver, config(2)).unwrap();

    let err = scraper.run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Navigation { page: 1, .. }));
    assert!(scraper.driver().closed);
    assert_eq!(scraper.driver().close_calls, 1);
}

#[tokio::test]
async fn test_scraper_runs_only_once() {
    let mut scraper = ListingScraper::new(two_page_driver(), config(1)).unwrap();
    scraper.run().await.unwrap();

    let err = scraper.run().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Config(_)));
    assert_eq!(scraper.table().len(), 3);
}

#[derive(Clone, Default)]
struct Recorder {
    states: Rc<RefCell<Vec<ScrapeState>>>,
    scanned: Rc<RefCell<Vec<u32>>>,
}

impl ProgressReporter for Recorder {
    fn report_state(&self, state: ScrapeState) {
        self.states.borrow_mut().push(state);
    }

    fn report_page_opened(&self, _page: u32, _url: &str) {}

    fn report_page_scanned(&self, scan: &PageScan) {
        self.scanned.borrow_mut().push(scan.page);
    }

    fn report_page_failed(&self, _failure: &PageFailure) {}

    fn report_error(&self, _error: &str) {}
}

#[tokio::test]
async fn test_state_machine_visits_every_state_in_order() {
    let recorder = Recorder::default();
    let mut scraper = ListingScraper::new(two_page_driver(), config(2))
        .unwrap()
        .with_progress(recorder.clone());
    scraper.run().await.unwrap();

    assert_eq!(
        *recorder.states.borrow(),
        vec![
            ScrapeState::Navigated,
            ScrapeState::ConsentResolved,
            ScrapeState::Paginated,
            ScrapeState::Scanning,
            ScrapeState::Closed,
        ]
    );
    let mut scanned = recorder.scanned.borrow().clone();
    scanned.sort_unstable();
    assert_eq!(scanned, vec![1, 2]);
}
