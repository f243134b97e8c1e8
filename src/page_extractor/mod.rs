//! Listing field extraction.
//!
//! Column schema, per-column handlers, and the compiled plan that turns one
//! parsed listing node into one table row.

// Sub-modules
pub mod extractors;
pub mod handlers;
pub mod schema;

// Re-exports for public API
pub use extractors::ExtractionPlan;
pub use handlers::{
    FieldHandler, HandlerError, HandlerRegistry, HandlerResult, clean_text, star_rating,
    text_handler,
};
pub use schema::{
    BuiltinHandler, CellValue, ColumnDef, ColumnSelector, ColumnSpec, ExtractionOutcome,
};
