//! Page URL construction for paginated result listings

use serde::{Deserialize, Serialize};

/// Builds the request URL for one result page.
///
/// Query parameters are emitted in their declared order. The parameter named by
/// `pagination_key` has its configured value replaced by the page number. Values
/// are written verbatim: nothing is percent-encoded, so callers must supply
/// URL-safe values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFormatter {
    base_url: String,
    query_params: Vec<(String, String)>,
    pagination_key: Option<String>,
}

impl UrlFormatter {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        query_params: Vec<(String, String)>,
        pagination_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            query_params,
            pagination_key,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the configured parameters actually carry the page number.
    ///
    /// When this is false every page formats to the same URL.
    #[must_use]
    pub fn paginates(&self) -> bool {
        self.pagination_key
            .as_deref()
            .is_some_and(|key| self.query_params.iter().any(|(k, _)| k == key))
    }

    /// Format the URL for `page` (1-based).
    #[must_use]
    pub fn format(&self, page: u32) -> String {
        if self.query_params.is_empty() {
            return self.base_url.clone();
        }

        let query = self
            .query_params
            .iter()
            .map(|(key, value)| {
                if self.pagination_key.as_deref() == Some(key.as_str()) {
                    format!("{key}={page}")
                } else {
                    format!("{key}={value}")
                }
            })
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{query}", self.base_url)
    }

    /// Format a [`PageRequest`].
    #[must_use]
    pub fn format_request(&self, request: PageRequest) -> String {
        self.format(request.page)
    }
}

/// A single result page to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRequest {
    pub page: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self { page }
    }

    /// Requests for pages `1..=page_end`, in ascending order.
    pub fn range(page_end: u32) -> impl Iterator<Item = PageRequest> {
        (1..=page_end).map(PageRequest::new)
    }
}
