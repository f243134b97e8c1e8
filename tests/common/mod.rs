//! Test utilities and helper functions for the listscrape test suite
#![allow(dead_code)]

use listscrape::driver::{BrowserDriver, DriverError, DriverResult, Locator, TabHandle};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub const BASE_URL: &str = "https://example.test/results";

#[derive(Debug, Clone)]
struct FakeTab {
    handle: TabHandle,
    url: Option<String>,
}

/// In-memory `BrowserDriver` serving canned results markup per URL.
///
/// Every tab starts blank. `inner_html` returns the markup registered for the
/// focused tab's URL no matter which locator is asked for; a URL without markup
/// behaves like a page whose results container never appears.
#[derive(Debug)]
pub struct FakeDriver {
    pages: HashMap<String, String>,
    tabs: Vec<FakeTab>,
    current: usize,
    next_id: usize,
    consent_locator: Locator,
    consent_present: bool,
    failing_navigation: HashSet<String>,
    refused_popups: HashSet<String>,
    closing_tabs: HashSet<String>,
    timing_out: HashSet<String>,
    reverse_tab_order: bool,
    implicit_wait: Duration,
    pub consent_clicks: usize,
    pub close_calls: usize,
    pub closed: bool,
    pub opened_urls: Vec<String>,
    pub scanned_urls: Vec<String>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            tabs: vec![FakeTab {
                handle: TabHandle::new("tab-0"),
                url: None,
            }],
            current: 0,
            next_id: 1,
            consent_locator: Locator::xpath(listscrape::utils::DEFAULT_CONSENT_XPATH),
            consent_present: true,
            failing_navigation: HashSet::new(),
            refused_popups: HashSet::new(),
            closing_tabs: HashSet::new(),
            timing_out: HashSet::new(),
            reverse_tab_order: false,
            implicit_wait: Duration::ZERO,
            consent_clicks: 0,
            close_calls: 0,
            closed: false,
            opened_urls: Vec::new(),
            scanned_urls: Vec::new(),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, container_markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), container_markup.into());
        self
    }

    pub fn without_consent_control(mut self) -> Self {
        self.consent_present = false;
        self
    }

    pub fn failing_navigation(mut self, url: impl Into<String>) -> Self {
        self.failing_navigation.insert(url.into());
        self
    }

    /// `window.open` for this URL does nothing, as with a popup blocker.
    pub fn refusing_popup(mut self, url: impl Into<String>) -> Self {
        self.refused_popups.insert(url.into());
        self
    }

    /// The tab showing this URL closes as soon as focus moves to another tab.
    pub fn closing_tab(mut self, url: impl Into<String>) -> Self {
        self.closing_tabs.insert(url.into());
        self
    }

    /// Reading the results of this URL times out, as with a page that never
    /// finishes loading.
    pub fn timing_out(mut self, url: impl Into<String>) -> Self {
        self.timing_out.insert(url.into());
        self
    }

    /// Report tabs newest first.
    pub fn reversed_tab_order(mut self) -> Self {
        self.reverse_tab_order = true;
        self
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }

    fn current_markup(&self) -> Option<&String> {
        let url = self.tabs.get(self.current)?.url.as_ref()?;
        self.pages.get(url)
    }
}

fn popup_url(script: &str) -> Option<String> {
    let rest = script.strip_prefix("void window.open(")?;
    let end = rest.rfind(", '_blank')")?;
    serde_json::from_str(&rest[..end]).ok()
}

impl BrowserDriver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.ensure_open()?;
        if self.failing_navigation.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.tabs[self.current].url = Some(url.to_string());
        Ok(())
    }

    async fn execute_script(&mut self, script: &str) -> DriverResult<()> {
        self.ensure_open()?;
        let url = popup_url(script)
            .ok_or_else(|| DriverError::Script(format!("unsupported script: {script}")))?;
        self.opened_urls.push(url.clone());
        if self.refused_popups.contains(&url) {
            return Ok(());
        }
        let handle = TabHandle::new(format!("tab-{}", self.next_id));
        self.next_id += 1;
        self.tabs.push(FakeTab {
            handle,
            url: Some(url),
        });
        Ok(())
    }

    async fn list_tabs(&mut self) -> DriverResult<Vec<TabHandle>> {
        self.ensure_open()?;
        let mut handles: Vec<TabHandle> = self.tabs.iter().map(|t| t.handle.clone()).collect();
        if self.reverse_tab_order {
            handles.reverse();
        }
        Ok(handles)
    }

    async fn current_tab(&mut self) -> DriverResult<TabHandle> {
        self.ensure_open()?;
        Ok(self.tabs[self.current].handle.clone())
    }

    async fn switch_to_tab(&mut self, tab: &TabHandle) -> DriverResult<()> {
        self.ensure_open()?;
        let leaving = &self.tabs[self.current];
        if leaving.handle != *tab
            && leaving
                .url
                .as_ref()
                .is_some_and(|url| self.closing_tabs.contains(url))
        {
            self.tabs.remove(self.current);
            self.current = 0;
        }
        self.current = self
            .tabs
            .iter()
            .position(|t| &t.handle == tab)
            .ok_or_else(|| DriverError::UnknownTab(tab.clone()))?;
        Ok(())
    }

    async fn find(&mut self, locator: &Locator) -> DriverResult<bool> {
        self.ensure_open()?;
        if *locator == self.consent_locator {
            return Ok(self.consent_present);
        }
        Ok(self.current_markup().is_some())
    }

    async fn click(&mut self, locator: &Locator) -> DriverResult<()> {
        if !self.find(locator).await? {
            return Err(DriverError::NotFound {
                locator: locator.clone(),
                waited: self.implicit_wait,
            });
        }
        if *locator == self.consent_locator {
            self.consent_clicks += 1;
        }
        Ok(())
    }

    async fn inner_html(&mut self, locator: &Locator) -> DriverResult<String> {
        self.ensure_open()?;
        if self.tabs[self.current]
            .url
            .as_ref()
            .is_some_and(|url| self.timing_out.contains(url))
        {
            return Err(DriverError::Timeout {
                operation: "results wait".to_string(),
                waited: self.implicit_wait,
            });
        }
        let markup = self
            .current_markup()
            .cloned()
            .ok_or_else(|| DriverError::NotFound {
                locator: locator.clone(),
                waited: self.implicit_wait,
            })?;
        if let Some(url) = self.tabs[self.current].url.clone() {
            self.scanned_urls.push(url);
        }
        Ok(markup)
    }

    fn set_implicit_wait(&mut self, wait: Duration) {
        self.implicit_wait = wait;
    }

    fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.close_calls += 1;
        self.closed = true;
        Ok(())
    }
}

/// One result entry with a title and a star widget of `full` full marks,
/// an optional half mark, and dimmed marks up to five.
pub fn listing(name: &str, full: usize, half: bool) -> String {
    let mut stars = String::new();
    for _ in 0..full {
        stars.push_str(r#"<i class="icon star"></i>"#);
    }
    if half {
        stars.push_str(r#"<i class="icon star-rating__half-star"></i>"#);
    }
    let used = full + usize::from(half);
    for _ in used..5 {
        stars.push_str(r#"<i class="icon u-text-xxlight"></i>"#);
    }
    format!(
        r#"<div class="result"><h3 class="title">{name}</h3><div class="stars">{stars}</div></div>"#
    )
}

/// A sponsored entry carrying the default ad marker.
pub fn ad_listing(name: &str) -> String {
    format!(
        r#"<div class="result dr-sam"><h3 class="title">{name}</h3><div class="stars"><i class="icon star"></i></div></div>"#
    )
}

/// Results container markup: the entries separated by whitespace and comments,
/// the way server-rendered lists usually look.
pub fn results_markup(entries: &[String]) -> String {
    let mut markup = String::from("\n  <!-- results -->\n");
    for entry in entries {
        markup.push_str("  ");
        markup.push_str(entry);
        markup.push('\n');
    }
    markup
}

/// Page URL as produced for `animal_99=true&page=<n>`.
pub fn page_url(page: u32) -> String {
    format!("{BASE_URL}?animal_99=true&page={page}")
}
