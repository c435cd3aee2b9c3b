//! # dashfilter
//!
//! Filter expressions for dashboards.
//!
//! dashfilter provides:
//! - A dataset column model with a per-type operator catalog
//! - A recursive filter tree with pure editing operations
//! - Relative periods such as `last 3 months`, resolved in the display timezone
//! - Compilation of filter trees into `$and`/`$or` wire expressions
//! - One-line human readable summaries
//!
//! ## Quick Start
//!
//! ```rust
//! use dashfilter::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let dataset = Dataset::new("orders")
//!     .with_column(Column::new("createdAt", ColumnType::DateTime).with_alias("Created"));
//!
//! let block: QueryBlock = QueryBlock::with_id("root").filter(QueryFilter::new(
//!     "f1",
//!     "createdAt",
//!     Predicate::relative(RelativePeriod::last(7, TimeUnit::Day)),
//! ));
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
//! let ctx = FilterContext::new(Timezone::utc(), now, &JsonLiteralEvaluator);
//! let wire = compile(&dataset, &block, &ctx).unwrap();
//! assert_eq!(
//!     wire.to_json()["createdAt"]["$between"][0],
//!     "2024-03-03T12:00:00+00:00"
//! );
//!
//! let summary = render(&dataset, &block, &RenderOptions::default()).unwrap();
//! assert_eq!(summary.as_deref(), Some("Created for last 7 days"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Dataset columns, timezones and configuration.
pub mod schema {
    pub use dashfilter_schema::*;
}

/// Filter trees, compilation and rendering.
pub mod query {
    pub use dashfilter_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::query::{
        CompareOp, DatasetFiltersInput, FilterContext, FilterError, FilterResult, FilterValue,
        FormBlock, FormValue, JsonLiteralEvaluator, ListOp, LogicalOp, Operator, Predicate,
        QueryBlock, QueryFilter, RelativePeriod, RenderOptions, TimeUnit, compile, from_form,
        operators_for, render, to_form,
    };
    pub use crate::schema::{Column, ColumnType, Dataset, FilterConfig, Timezone};
}

// Re-export key types at the crate root
pub use query::{FilterError, FilterResult, QueryBlock};
pub use schema::{Dataset, SchemaError};
