//! `BrowserDriver` backed by chromiumoxide
//!
//! chromiumoxide has no notion of a focused tab or of implicit waits, so this
//! driver keeps the focused `Page` itself and polls for elements until the
//! configured wait elapses.

use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::wait::with_timeout;
use super::{BrowserDriver, DriverError, DriverResult, Locator, TabHandle};
use crate::browser_setup::{LaunchOptions, launch_browser};
use crate::utils::constants::{
    BROWSER_REQUEST_TIMEOUT_SECS, DEFAULT_IMPLICIT_WAIT_SECS, LOCATOR_POLL_INTERVAL_MS,
};

pub struct ChromiumDriver {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    current: Option<Page>,
    implicit_wait: Duration,
    closed: bool,
}

fn tab_handle(page: &Page) -> TabHandle {
    TabHandle::new(page.target_id().inner().clone())
}

fn protocol(e: impl std::fmt::Display) -> DriverError {
    DriverError::Protocol(e.to_string())
}

impl ChromiumDriver {
    /// Launch a browser and open the first (blank) tab.
    pub async fn launch(options: &LaunchOptions) -> DriverResult<Self> {
        let (browser, handler, user_data_dir) = launch_browser(options)
            .await
            .map_err(|e| DriverError::Launch(format!("{e:#}")))?;

        let mut driver = Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
            current: None,
            implicit_wait: Duration::from_secs(DEFAULT_IMPLICIT_WAIT_SECS),
            closed: false,
        };

        let page = driver
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(format!("failed to open first tab: {e}")))?;
        info!("Opened first tab {}", tab_handle(&page));
        driver.current = Some(page);

        Ok(driver)
    }

    fn page(&self) -> DriverResult<&Page> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        self.current.as_ref().ok_or(DriverError::Closed)
    }

    /// Poll for `locator` until it matches or the implicit wait elapses.
    async fn locate(&self, locator: &Locator) -> DriverResult<Option<Element>> {
        let page = self.page()?;
        let start = Instant::now();
        let poll_interval = Duration::from_millis(LOCATOR_POLL_INTERVAL_MS);

        loop {
            let found = match locator {
                Locator::Css(css) => page.find_element(css.as_str()).await,
                Locator::XPath(xpath) => page.find_xpath(xpath.as_str()).await,
                Locator::ClassName(class) => page.find_element(format!(".{class}")).await,
            };

            match found {
                Ok(element) => {
                    debug!("{} matched after {:?}", locator, start.elapsed());
                    return Ok(Some(element));
                }
                Err(e) if start.elapsed() >= self.implicit_wait => {
                    trace!("{} not found: {}", locator, e);
                    return Ok(None);
                }
                Err(_) => tokio::time::sleep(poll_interval).await,
            }
        }
    }

    async fn require(&self, locator: &Locator) -> DriverResult<Element> {
        self.locate(locator)
            .await?
            .ok_or_else(|| DriverError::NotFound {
                locator: locator.clone(),
                waited: self.implicit_wait,
            })
    }

    /// Remove the temporary profile directory.
    ///
    /// Must run after the browser process has exited, otherwise Windows keeps
    /// the profile files locked.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl BrowserDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let page = self.page()?;
        info!("Navigating to {}", url);
        with_timeout(
            async {
                page.goto(url)
                    .await
                    .map_err(|e| DriverError::Navigation {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            },
            Duration::from_secs(BROWSER_REQUEST_TIMEOUT_SECS),
            "navigation",
        )
        .await
    }

    async fn execute_script(&mut self, script: &str) -> DriverResult<()> {
        let page = self.page()?;
        page.evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(())
    }

    async fn list_tabs(&mut self) -> DriverResult<Vec<TabHandle>> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        let pages = self.browser.pages().await.map_err(protocol)?;
        Ok(pages.iter().map(tab_handle).collect())
    }

    async fn current_tab(&mut self) -> DriverResult<TabHandle> {
        Ok(tab_handle(self.page()?))
    }

    async fn switch_to_tab(&mut self, tab: &TabHandle) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        let pages = self.browser.pages().await.map_err(protocol)?;
        let page = pages
            .into_iter()
            .find(|p| tab_handle(p) == *tab)
            .ok_or_else(|| DriverError::UnknownTab(tab.clone()))?;

        page.bring_to_front().await.map_err(protocol)?;
        trace!("Switched to tab {}", tab);
        self.current = Some(page);
        Ok(())
    }

    async fn find(&mut self, locator: &Locator) -> DriverResult<bool> {
        Ok(self.locate(locator).await?.is_some())
    }

    async fn click(&mut self, locator: &Locator) -> DriverResult<()> {
        let element = self.require(locator).await?;
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn inner_html(&mut self, locator: &Locator) -> DriverResult<String> {
        let element = self.require(locator).await?;
        let markup = element.inner_html().await.map_err(protocol)?;
        Ok(markup.unwrap_or_default())
    }

    fn set_implicit_wait(&mut self, wait: Duration) {
        self.implicit_wait = wait;
    }

    fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.current = None;

        let mut errors = Vec::new();

        debug!("Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {e}");
            errors.push(format!("browser close failed: {e}"));
        }

        // Wait for the process to exit before touching its profile directory
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
            errors.push(format!("browser wait failed: {e}"));
        }

        self.handler.abort();
        self.cleanup_temp_dir();

        if errors.is_empty() {
            info!("Browser session closed");
            Ok(())
        } else {
            Err(DriverError::Protocol(errors.join("; ")))
        }
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
        if !self.closed {
            warn!("ChromiumDriver dropped without close(); the browser process is killed on drop");
        }
        if self.user_data_dir.is_some() {
            self.cleanup_temp_dir();
        }
    }
}
