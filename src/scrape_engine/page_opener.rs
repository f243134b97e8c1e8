//! Opens the extra result pages as browser tabs.
//!
//! Page 1 is loaded by navigating the first tab. Every further page gets its own
//! tab through `window.open`, so the browser loads them all while the scraper is
//! still busy with earlier ones.

use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::progress::ProgressReporter;
use super::scrape_types::{FailureKind, PageFailure};
use crate::driver::{BrowserDriver, DriverError, DriverResult, TabHandle};
use crate::utils::{LOCATOR_POLL_INTERVAL_MS, PageRequest, UrlFormatter};

/// Tabs opened by one [`PageOpener::open`] call.
#[derive(Debug, Default)]
pub struct OpenedPages {
    /// Tab handle and the page it was opened for, in creation order
    pub tabs: Vec<(TabHandle, u32)>,
    pub failures: Vec<PageFailure>,
}

pub struct PageOpener<'a> {
    formatter: &'a UrlFormatter,
}

/// Script that opens `url` in a new tab without yielding a value.
fn open_tab_script(url: &str) -> String {
    // A JSON string literal is a valid JS string literal
    let literal = serde_json::Value::from(url).to_string();
    format!("void window.open({literal}, '_blank');")
}

impl<'a> PageOpener<'a> {
    #[must_use]
    pub fn new(formatter: &'a UrlFormatter) -> Self {
        Self { formatter }
    }

    /// Open one tab per request, in the order given.
    ///
    /// A page whose tab cannot be opened is recorded as a failure and the
    /// remaining pages are still opened.
    pub async fn open<D, P>(
        &self,
        driver: &mut D,
        requests: impl IntoIterator<Item = PageRequest>,
        progress: &P,
    ) -> OpenedPages
    where
        D: BrowserDriver,
        P: ProgressReporter,
    {
        let mut opened = OpenedPages::default();

        for request in requests {
            let page = request.page;
            let url = self.formatter.format_request(request);
            match self.open_page(driver, &url).await {
                Ok(tab) => {
                    info!("Opened page {} in tab {}", page, tab);
                    progress.report_page_opened(page, &url);
                    opened.tabs.push((tab, page));
                }
                Err((tab, e)) => {
                    warn!("Could not open page {} ({}): {}", page, url, e);
                    let failure = PageFailure {
                        page,
                        tab,
                        kind: FailureKind::TabOpen,
                        error: e.to_string(),
                    };
                    progress.report_page_failed(&failure);
                    opened.failures.push(failure);
                }
            }
        }

        opened
    }

    /// Open `url` in a new tab and focus it.
    ///
    /// On error, also returns the new tab's handle if it was created.
    async fn open_page<D: BrowserDriver>(
        &self,
        driver: &mut D,
        url: &str,
    ) -> Result<TabHandle, (Option<TabHandle>, DriverError)> {
        let before: HashSet<TabHandle> = driver
            .list_tabs()
            .await
            .map_err(|e| (None, e))?
            .into_iter()
            .collect();

        driver
            .execute_script(&open_tab_script(url))
            .await
            .map_err(|e| (None, e))?;

        let tab = wait_for_new_tab(driver, &before)
            .await
            .map_err(|e| (None, e))?;

        driver
            .switch_to_tab(&tab)
            .await
            .map_err(|e| (Some(tab.clone()), e))?;

        Ok(tab)
    }
}

/// Poll the tab list until a handle not in `before` shows up.
async fn wait_for_new_tab<D: BrowserDriver>(
    driver: &mut D,
    before: &HashSet<TabHandle>,
) -> DriverResult<TabHandle> {
    let limit = driver.implicit_wait();
    let start = Instant::now();
    let poll_interval = Duration::from_millis(LOCATOR_POLL_INTERVAL_MS);

    loop {
        let tabs = driver.list_tabs().await?;
        if let Some(tab) = tabs.into_iter().find(|t| !before.contains(t)) {
            debug!("New tab {} appeared after {:?}", tab, start.elapsed());
            return Ok(tab);
        }

        if start.elapsed() >= limit {
            return Err(DriverError::Timeout {
                operation: "tab open".to_string(),
                waited: limit,
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}
