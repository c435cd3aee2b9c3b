//! # dashfilter-schema
//!
//! Dataset column model and configuration for the dashfilter engine.
//!
//! This crate provides:
//! - Column types and their filtering categories
//! - The dataset column map that filters are checked against
//! - Display timezone handling
//! - Configuration parser for `dashfilter.toml` files
//!
//! ## Example
//!
//! ```rust
//! use dashfilter_schema::{Column, ColumnType, Dataset};
//!
//! let dataset = Dataset::new("orders")
//!     .with_column(Column::new("status", ColumnType::String))
//!     .with_column(Column::new("createdAt", ColumnType::DateTime).with_alias("Created"));
//!
//! let created = dataset.column("createdAt").unwrap();
//! assert!(created.column_type.is_temporal());
//! assert_eq!(created.display_name(), "Created");
//! ```

pub mod column;
pub mod config;
pub mod dataset;
pub mod error;
pub mod timezone;

pub use column::{Column, ColumnCategory, ColumnType, TemporalKind};
pub use config::{DisplayConfig, DisplayFormats, FilterConfig, SessionConfig};
pub use dataset::Dataset;
pub use error::{SchemaError, SchemaResult};
pub use timezone::Timezone;
