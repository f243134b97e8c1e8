//! Per-listing field extraction
//!
//! An [`ExtractionPlan`] is compiled once from the column spec and handler
//! registry. Selectors are parsed and handlers resolved up front, so extracting a
//! listing is only a matter of walking the plan.

use scraper::{ElementRef, Selector};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

use super::handlers::{FieldHandler, HandlerRegistry, text_handler};
use super::schema::{CellValue, ColumnSelector, ColumnSpec, ExtractionOutcome};
use crate::scrape_engine::ScrapeError;

enum FieldMatcher {
    Class(String),
    Css(Selector),
}

struct PlannedField {
    name: String,
    selector: String,
    matcher: FieldMatcher,
    handler: Option<FieldHandler>,
}

impl PlannedField {
    /// First descendant of `listing` (the listing itself excluded) that matches.
    fn locate<'a>(&self, listing: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match &self.matcher {
            FieldMatcher::Class(token) => listing
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().classes().any(|c| c == token.as_str())),
            FieldMatcher::Css(selector) => listing
                .select(selector)
                .find(|el| el.id() != listing.id()),
        }
    }

    fn extract(&self, listing: ElementRef<'_>) -> ExtractionOutcome {
        let Some(node) = self.locate(listing) else {
            return ExtractionOutcome::Missing {
                selector: self.selector.clone(),
            };
        };

        // A panicking handler blanks this cell only
        let result = panic::catch_unwind(AssertUnwindSafe(|| match &self.handler {
            Some(handler) => handler(node),
            None => text_handler(node),
        }));

        match result {
            Ok(Ok(value)) => ExtractionOutcome::Value(value),
            Ok(Err(e)) => {
                debug!("Handler for column '{}' failed: {}", self.name, e);
                ExtractionOutcome::HandlerFailed {
                    reason: e.to_string(),
                }
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!("Handler for column '{}' panicked: {}", self.name, reason);
                ExtractionOutcome::HandlerFailed {
                    reason: format!("handler panicked: {reason}"),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Compiled extraction plan: one entry per column, in schema order.
pub struct ExtractionPlan {
    fields: Vec<PlannedField>,
}

impl ExtractionPlan {
    /// Compile `columns` against `handlers`.
    ///
    /// A handler registered in code takes precedence over a built-in handler named
    /// in the column definition. Registry entries for columns that are not in the
    /// schema are ignored.
    pub fn new(columns: &ColumnSpec, handlers: &HandlerRegistry) -> Result<Self, ScrapeError> {
        for name in handlers.columns() {
            if columns.get(name).is_none() {
                debug!("Handler registered for '{}' but no such column; ignoring", name);
            }
        }

        let fields = columns
            .columns()
            .iter()
            .map(|column| {
                let matcher = match &column.selector {
                    ColumnSelector::Class(token) => FieldMatcher::Class(token.clone()),
                    ColumnSelector::Css(css) => {
                        FieldMatcher::Css(Selector::parse(css).map_err(|e| {
                            ScrapeError::Config(format!(
                                "invalid selector '{css}' for column '{}': {e}",
                                column.name
                            ))
                        })?)
                    }
                };

                let handler = handlers
                    .get(&column.name)
                    .cloned()
                    .or_else(|| column.handler.map(|builtin| builtin.handler()));

                Ok::<_, ScrapeError>(PlannedField {
                    name: column.name.clone(),
                    selector: column.selector.to_string(),
                    matcher,
                    handler,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Extract every column of one listing, in schema order.
    ///
    /// Never fails: a missing node, a failing handler or a panicking handler
    /// yields a blank outcome for that column only.
    #[must_use]
    pub fn extract(&self, listing: ElementRef<'_>) -> Vec<ExtractionOutcome> {
        self.fields
            .iter()
            .map(|field| {
                let outcome = field.extract(listing);
                if let ExtractionOutcome::Missing { selector } = &outcome {
                    trace!("Column '{}' not found ({})", field.name, selector);
                }
                outcome
            })
            .collect()
    }

    /// [`extract`](Self::extract) collapsed to table cells.
    #[must_use]
    pub fn extract_row(&self, listing: ElementRef<'_>) -> Vec<CellValue> {
        self.extract(listing)
            .into_iter()
            .map(ExtractionOutcome::into_cell)
            .collect()
    }
}

impl std::fmt::Debug for ExtractionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|p| (&p.name, &p.selector, p.handler.is_some())))
            .finish()
    }
}
