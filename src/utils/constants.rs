//! Shared configuration constants for listscrape
//!
//! Default values used by the config builder, the driver and the CLI so the
//! same numbers are not repeated across modules.

/// Default implicit wait applied to every locator lookup: 10 seconds
///
/// Matches the wait the listing site needs for its results container to be
/// rendered by client-side script after the initial load event.
pub const DEFAULT_IMPLICIT_WAIT_SECS: u64 = 10;

/// Poll interval used while an implicit wait is pending
pub const LOCATOR_POLL_INTERVAL_MS: u64 = 100;

/// Default number of result pages to open
pub const DEFAULT_PAGE_END: u32 = 1;

/// Default name of the query parameter that carries the page number
pub const DEFAULT_PAGINATION_KEY: &str = "page";

/// Class token that marks a sponsored listing
pub const DEFAULT_AD_CLASS: &str = "dr-sam";

/// Class name of the element wrapping all listings on a results page
pub const DEFAULT_RESULTS_CONTAINER_CLASS: &str = "search-results";

/// Structural locator of the "reject all" button in the cookie banner
pub const DEFAULT_CONSENT_XPATH: &str = r#"//*[@id="onetrust-reject-all-handler"]"#;

/// Destination used when no output path is configured
pub const DEFAULT_OUTPUT_FILE: &str = "example.csv";

/// Star-rating child mark worth half a star
pub const HALF_STAR_CLASS: &str = "star-rating__half-star";

/// Star-rating child mark rendered dimmed (worth nothing)
pub const EMPTY_STAR_CLASS: &str = "u-text-xxlight";

/// Chrome user agent string sent by the managed browser
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Browser window size used for rendering result pages
pub const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// CDP request timeout for the launched browser
pub const BROWSER_REQUEST_TIMEOUT_SECS: u64 = 30;
