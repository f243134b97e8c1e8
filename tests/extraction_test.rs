//! Listing extraction over parsed results markup

use listscrape::page_extractor::{
    BuiltinHandler, CellValue, ColumnDef, ColumnSpec, ExtractionOutcome, ExtractionPlan,
    HandlerError, HandlerRegistry, HandlerResult,
};
use listscrape::scrape_engine::extract_listings;
use listscrape::{ScrapeError, Table};
use proptest::prelude::*;
use scraper::{Html, Selector};

mod common;
use common::{ad_listing, listing, results_markup};

fn plan(columns: Vec<ColumnDef>) -> ExtractionPlan {
    ExtractionPlan::new(&ColumnSpec::new(columns).unwrap(), &HandlerRegistry::new()).unwrap()
}

fn name_and_rating() -> ExtractionPlan {
    plan(vec![
        ColumnDef::class("name", "title"),
        ColumnDef::class("rating", "stars").with_handler(BuiltinHandler::StarRating),
    ])
}

#[test]
fn test_ads_and_non_elements_are_skipped() {
    let markup = results_markup(&[
        listing("A", 3, false),
        ad_listing("Ad"),
        listing("B", 2, true),
    ]);
    let page = extract_listings(&markup, &name_and_rating(), Some("dr-sam"));

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.ads_skipped, 1);
    assert!(page.non_elements_skipped >= 1);
    assert_eq!(page.rows[0], vec![CellValue::from("A"), CellValue::Number(3.0)]);
    assert_eq!(page.rows[1], vec![CellValue::from("B"), CellValue::Number(2.5)]);
}

#[test]
fn test_ads_kept_when_filtering_disabled() {
    let markup = results_markup(&[listing("A", 1, false), ad_listing("Ad")]);
    let page = extract_listings(&markup, &name_and_rating(), None);

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.ads_skipped, 0);
    assert_eq!(page.rows[1][0], CellValue::from("Ad"));
}

#[test]
fn test_missing_field_blanks_only_that_cell() {
    let markup = results_markup(&[
        r#"<div class="result"><h3 class="title">No stars here</h3></div>"#.to_string(),
    ]);
    let page = extract_listings(&markup, &name_and_rating(), Some("dr-sam"));

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0][0], CellValue::from("No stars here"));
    assert_eq!(page.rows[0][1], CellValue::empty());
    assert_eq!(page.blank_cells, 1);
}

#[test]
fn test_default_handler_cleans_text() {
    let markup = r#"<div class="result"><span class="title">  Foo
Bar  </span></div>"#;
    let page = extract_listings(markup, &plan(vec![ColumnDef::class("name", "title")]), None);
    assert_eq!(page.rows[0], vec![CellValue::from("Foo Bar")]);
}

#[test]
fn test_document_order_is_preserved() {
    let markup = results_markup(&[
        listing("first", 1, false),
        listing("second", 1, false),
        listing("third", 1, false),
    ]);
    let page = extract_listings(&markup, &plan(vec![ColumnDef::class("name", "title")]), None);
    let names: Vec<String> = page.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[test]
fn test_css_selector_column() {
    let markup = r#"<article class="result"><a href="/vet/1" class="link">Open</a><p data-kind="addr">Main St 1</p></article>"#;
    let plan = plan(vec![
        ColumnDef::css("address", "p[data-kind=addr]"),
        ColumnDef::css("link", "a.link"),
    ]);
    let page = extract_listings(markup, &plan, None);
    assert_eq!(
        page.rows[0],
        vec![CellValue::from("Main St 1"), CellValue::from("Open")]
    );
}

#[test]
fn test_class_match_ignores_the_listing_itself() {
    // The listing carries the column's class too; only descendants count
    let markup = r#"<div class="title"><span class="other">x</span></div>"#;
    let page = extract_listings(markup, &plan(vec![ColumnDef::class("name", "title")]), None);
    assert_eq!(page.rows[0], vec![CellValue::empty()]);
}

#[test]
fn test_invalid_css_selector_is_config_error() {
    let spec = ColumnSpec::new(vec![ColumnDef::css("bad", "p[")]).unwrap();
    let err = ExtractionPlan::new(&spec, &HandlerRegistry::new()).unwrap_err();
    assert!(matches!(err, ScrapeError::Config(msg) if msg.contains("bad")));
}

#[test]
fn test_registered_handler_overrides_builtin() {
    let spec = ColumnSpec::new(vec![
        ColumnDef::class("rating", "stars").with_handler(BuiltinHandler::StarRating),
    ])
    .unwrap();
    let handlers = HandlerRegistry::new()
        .with("rating", |node: scraper::ElementRef<'_>| {
            Ok(CellValue::Number(node.children().count() as f64 * 10.0))
        })
        .unwrap();
    let plan = ExtractionPlan::new(&spec, &handlers).unwrap();

    let markup = listing("A", 2, false);
    let page = extract_listings(&markup, &plan, None);
    assert_eq!(page.rows[0], vec![CellValue::Number(50.0)]);
}

#[test]
fn test_failing_handler_yields_blank_and_keeps_row() {
    let spec = ColumnSpec::new(vec![
        ColumnDef::class("name", "title"),
        ColumnDef::class("rating", "stars"),
    ])
    .unwrap();
    let handlers = HandlerRegistry::new()
        .with("rating", |_node: scraper::ElementRef<'_>| {
            Err(HandlerError::UnexpectedMarkup("no marks".to_string()))
        })
        .unwrap();
    let plan = ExtractionPlan::new(&spec, &handlers).unwrap();

    let fragment = Html::parse_fragment(&listing("A", 4, true));
    let selector = Selector::parse("div.result").unwrap();
    let node = fragment.select(&selector).next().unwrap();

    let outcomes = plan.extract(node);
    assert_eq!(outcomes[0], ExtractionOutcome::Value(CellValue::from("A")));
    assert!(matches!(
        &outcomes[1],
        ExtractionOutcome::HandlerFailed { reason } if reason.contains("no marks")
    ));
    assert_eq!(plan.extract_row(node), vec![CellValue::from("A"), CellValue::empty()]);
}

#[test]
fn test_panicking_handler_blanks_cell_and_keeps_page() {
    let spec = ColumnSpec::new(vec![
        ColumnDef::class("name", "title"),
        ColumnDef::class("code", "title"),
    ])
    .unwrap();
    let handlers = HandlerRegistry::new()
        .with("code", |node: scraper::ElementRef<'_>| {
            let text: String = node.text().collect();
            let parts: Vec<&str> = text.split('-').collect();
            Ok(CellValue::from(parts[1]))
        })
        .unwrap();
    let plan = ExtractionPlan::new(&spec, &handlers).unwrap();

    let markup = results_markup(&[listing("x", 1, false), listing("vet-42", 2, false)]);
    let page = extract_listings(&markup, &plan, None);

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0], vec![CellValue::from("x"), CellValue::empty()]);
    assert_eq!(page.rows[1], vec![CellValue::from("vet-42"), CellValue::from("42")]);
    assert_eq!(page.blank_cells, 1);
}

#[test]
fn test_panic_outcome_carries_message() {
    let spec = ColumnSpec::new(vec![ColumnDef::class("name", "title")]).unwrap();
    let handlers = HandlerRegistry::new()
        .with("name", |_node: scraper::ElementRef<'_>| -> HandlerResult {
            panic!("bad widget")
        })
        .unwrap();
    let plan = ExtractionPlan::new(&spec, &handlers).unwrap();

    let fragment = Html::parse_fragment(&listing("A", 1, false));
    let selector = Selector::parse("div.result").unwrap();
    let node = fragment.select(&selector).next().unwrap();

    assert!(matches!(
        &plan.extract(node)[0],
        ExtractionOutcome::HandlerFailed { reason } if reason.contains("bad widget")
    ));
}

#[test]
fn test_missing_outcome_names_selector() {
    let plan = plan(vec![ColumnDef::class("phone", "phone-number")]);
    let fragment = Html::parse_fragment(&listing("A", 1, false));
    let selector = Selector::parse("div.result").unwrap();
    let node = fragment.select(&selector).next().unwrap();

    assert_eq!(
        plan.extract(node),
        vec![ExtractionOutcome::Missing {
            selector: "class=phone-number".to_string()
        }]
    );
}

fn entry(kind: u8, i: usize) -> String {
    match kind {
        0 => listing(&format!("Vet {i}"), i % 6, i % 2 == 0),
        1 => ad_listing(&format!("Ad {i}")),
        2 => format!(r#"<div class="result"><span>no fields {i}</span></div>"#),
        _ => format!("<!-- gap {i} -->"),
    }
}

proptest! {
    #[test]
    fn prop_columns_stay_equal_length(kinds in prop::collection::vec(0u8..4, 0..24)) {
        let plan = name_and_rating();
        let entries: Vec<String> = kinds.iter().enumerate().map(|(i, k)| entry(*k, i)).collect();
        let kept = kinds.iter().filter(|k| **k == 0 || **k == 2).count();

        let page = extract_listings(&results_markup(&entries), &plan, Some("dr-sam"));
        let mut table = Table::with_columns(vec!["name".to_string(), "rating".to_string()]);
        table.append_rows(page.rows).unwrap();

        prop_assert_eq!(table.len(), kept);
        prop_assert_eq!(table.column("name").unwrap().len(), kept);
        prop_assert_eq!(table.column("rating").unwrap().len(), kept);
        prop_assert_eq!(page.ads_skipped, kinds.iter().filter(|k| **k == 1).count());
    }
}
