//! Per-column value handlers
//!
//! A handler turns the sub-node located for a column into a cell value.
//! Columns without a handler go through [`text_handler`].

use scraper::{ElementRef, Node};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::schema::{BuiltinHandler, CellValue};
use crate::scrape_engine::ScrapeError;
use crate::utils::{EMPTY_STAR_CLASS, HALF_STAR_CLASS};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The node did not have the shape the handler expects
    #[error("unexpected markup: {0}")]
    UnexpectedMarkup(String),

    #[error("{0}")]
    Custom(String),
}

pub type HandlerResult = Result<CellValue, HandlerError>;

/// A registered column handler.
pub type FieldHandler = Arc<dyn Fn(ElementRef<'_>) -> HandlerResult + Send + Sync>;

/// Trim the text and turn every embedded newline into a space.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.trim().replace('\n', " ")
}

/// Default handler: the node's text content, cleaned.
pub fn text_handler(node: ElementRef<'_>) -> HandlerResult {
    let text: String = node.text().collect();
    Ok(CellValue::Text(clean_text(&text)))
}

/// Sum a star-rating widget.
///
/// Each immediate child element is one mark: a half-star mark adds 0.5, a dimmed
/// mark adds nothing, anything else adds a full star. Text and comment children
/// are not marks.
pub fn star_rating(node: ElementRef<'_>) -> HandlerResult {
    let mut rate = 0.0_f64;
    for child in node.children() {
        let Node::Element(mark) = child.value() else {
            continue;
        };
        if mark.classes().any(|c| c == HALF_STAR_CLASS) {
            rate += 0.5;
        } else if mark.classes().any(|c| c == EMPTY_STAR_CLASS) {
            // dimmed placeholder
        } else {
            rate += 1.0;
        }
    }
    Ok(CellValue::Number(rate))
}

impl BuiltinHandler {
    #[must_use]
    pub fn handler(self) -> FieldHandler {
        match self {
            Self::Text => Arc::new(text_handler),
            Self::StarRating => Arc::new(star_rating),
        }
    }
}

/// Column name to handler mapping, at most one handler per name.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, FieldHandler>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the handlers the vet-directory listings need:
    /// `star_rate` is summed with [`star_rating`].
    #[must_use]
    pub fn standard() -> Self {
        let mut handlers = HashMap::new();
        handlers.insert("star_rate".to_string(), BuiltinHandler::StarRating.handler());
        Self { handlers }
    }

    /// Register `handler` for `column`.
    ///
    /// Fails if the column already has a handler.
    pub fn register<F>(&mut self, column: impl Into<String>, handler: F) -> Result<(), ScrapeError>
    where
        F: Fn(ElementRef<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let column = column.into();
        if self.handlers.contains_key(&column) {
            return Err(ScrapeError::Config(format!(
                "a handler is already registered for column '{column}'"
            )));
        }
        self.handlers.insert(column, Arc::new(handler));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, column: impl Into<String>, handler: F) -> Result<Self, ScrapeError>
    where
        F: Fn(ElementRef<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(column, handler)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldHandler> {
        self.handlers.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.columns().collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("columns", &names)
            .finish()
    }
}
