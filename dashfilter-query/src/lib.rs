//! # dashfilter-query
//!
//! Filter expression engine for dashboards.
//!
//! This crate provides:
//! - The per-column-type operator catalog
//! - Relative period resolution (`last 3 months`)
//! - The recursive filter tree (`QueryBlock`, `QueryFilter`) with pure editing
//! - The form state codec for temporal values
//! - The wire compiler producing `$and`/`$or` filter expressions
//! - One-line summaries of filter trees
//! - Session-scoped applied filters
//!
//! ## Compiling
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use dashfilter_query::{
//!     CompareOp, FilterContext, JsonLiteralEvaluator, Predicate, QueryBlock, QueryFilter,
//!     compile,
//! };
//! use dashfilter_schema::{Column, ColumnType, Dataset, Timezone};
//!
//! let dataset = Dataset::new("orders").with_column(Column::new("status", ColumnType::String));
//! let block: QueryBlock = QueryBlock::with_id("root")
//!     .filter(QueryFilter::new("f1", "status", Predicate::compare(CompareOp::Eq, "open")));
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let ctx = FilterContext::new(Timezone::utc(), now, &JsonLiteralEvaluator);
//! let wire = compile(&dataset, &block, &ctx).unwrap();
//!
//! assert_eq!(
//!     wire.to_json(),
//!     serde_json::json!({"$and": [], "status": {"$eq": "open"}})
//! );
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use dashfilter_query::{Predicate, QueryBlock, QueryFilter, RenderOptions, render};
//! use dashfilter_schema::{Column, ColumnType, Dataset};
//!
//! let dataset = Dataset::new("orders").with_column(Column::new("note", ColumnType::Text));
//! let block: QueryBlock = QueryBlock::with_id("root")
//!     .filter(QueryFilter::new("f1", "note", Predicate::IsNull));
//!
//! let summary = render(&dataset, &block, &RenderOptions::default()).unwrap();
//! assert_eq!(summary.as_deref(), Some("note null"));
//! ```

pub mod catalog;
pub mod codec;
pub mod compiler;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod render;
pub mod session;
pub mod temporal;
pub mod tree;
pub mod value;
pub mod wire;

pub use catalog::{CompareOp, ListOp, LogicalOp, Operator, lookup_column, operators_for};
pub use codec::{
    DomainBlock, FormBlock, FormValue, FromForm, ToForm, ValueCodec, from_form,
    from_form_selector_filter, process_predicate, to_form, to_form_selector_filter,
};
pub use compiler::{compile, resolve_manual, resolve_value, to_single_filter_input};
pub use context::{FilterContext, RenderOptions};
pub use error::{ErrorCode, ErrorContext, FilterError, FilterResult};
pub use evaluator::{
    CollectingNotifier, Evaluator, EvaluatorError, JsonLiteralEvaluator, Notifier,
    TracingNotifier,
};
pub use render::render;
pub use session::{KeyValueStore, MemoryStore, SessionFilters, SessionKey};
pub use temporal::{
    Interval, Period, RelativePeriod, TemporalValue, TimeUnit, iso_format, resolve_interval,
};
pub use tree::{
    IdGenerator, Operand, Predicate, QueryBlock, QueryFilter, Range, SelectorFilter,
    SequenceGenerator, UuidGenerator,
};
pub use value::FilterValue;
pub use wire::{ColumnFilters, DatasetFiltersInput};
