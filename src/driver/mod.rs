//! Browser automation seam
//!
//! The scrape engine talks to the browser only through [`BrowserDriver`]. The
//! production implementation is [`ChromiumDriver`]; tests drive the engine with an
//! in-memory implementation serving canned markup.

mod chromium;
mod wait;

pub use chromium::ChromiumDriver;
pub use wait::with_timeout;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque identifier of one open tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TabHandle(String);

impl TabHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to find an element in the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
    ClassName(String),
}

impl Locator {
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css '{s}'"),
            Self::XPath(s) => write!(f, "xpath '{s}'"),
            Self::ClassName(s) => write!(f, "class '{s}'"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("no element matched {locator} within {waited:?}")]
    NotFound { locator: Locator, waited: Duration },

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("no open tab with handle {0}")]
    UnknownTab(TabHandle),

    #[error("{operation} timeout after {waited:?}")]
    Timeout {
        operation: String,
        waited: Duration,
    },

    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("browser session is closed")]
    Closed,
}

pub type DriverResult<T> = Result<T, DriverError>;

/// The automation capability the scrape engine consumes.
///
/// Every lookup honours the implicit wait: the driver keeps polling until the
/// locator matches or the wait elapses. Calls act on the focused tab.
#[allow(async_fn_in_trait)]
pub trait BrowserDriver {
    /// Load `url` in the focused tab and wait for its load event.
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Run `script` in the focused tab, discarding its value.
    async fn execute_script(&mut self, script: &str) -> DriverResult<()>;

    /// Handles of every open tab, in the order the browser reports them.
    async fn list_tabs(&mut self) -> DriverResult<Vec<TabHandle>>;

    async fn current_tab(&mut self) -> DriverResult<TabHandle>;

    async fn switch_to_tab(&mut self, tab: &TabHandle) -> DriverResult<()>;

    /// Whether `locator` matches within the implicit wait.
    async fn find(&mut self, locator: &Locator) -> DriverResult<bool>;

    async fn click(&mut self, locator: &Locator) -> DriverResult<()>;

    /// Rendered inner markup of the first element matching `locator`.
    async fn inner_html(&mut self, locator: &Locator) -> DriverResult<String>;

    fn set_implicit_wait(&mut self, wait: Duration);

    fn implicit_wait(&self) -> Duration;

    /// Close every tab and end the session. Calling it twice is a no-op.
    async fn close(&mut self) -> DriverResult<()>;
}
