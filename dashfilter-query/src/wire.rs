//! The wire filter expression sent to the dataset query API.
//!
//! ```json
//! {
//!   "$and": [{"name": {"$contains": "a"}}],
//!   "name": {"$contains": "b"},
//!   "createdAt": {"$between": ["2024-01-01", "2024-03-31"]}
//! }
//! ```
//!
//! `$and`, `$or` and `$not` nest expressions of the same shape; every other
//! key is a column mapping operators to values.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::catalog::Operator;
use crate::value::FilterValue;

/// Operators and values applied to one column.
pub type ColumnFilters = IndexMap<Operator, FilterValue>;

/// A wire filter expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetFiltersInput {
    /// `$and` conjuncts.
    pub and: Option<Vec<DatasetFiltersInput>>,
    /// `$or` disjuncts.
    pub or: Option<Vec<DatasetFiltersInput>>,
    /// `$not` negation.
    pub not: Option<Box<DatasetFiltersInput>>,
    /// Column predicates, in insertion order.
    pub columns: IndexMap<String, ColumnFilters>,
}

impl DatasetFiltersInput {
    /// An expression with an empty `$and`, the starting point of every compiled block.
    pub fn new() -> Self {
        Self {
            and: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// A standalone `{ column: { op: value } }` entry.
    pub fn column_entry(column: impl Into<String>, op: Operator, value: FilterValue) -> Self {
        let mut entry = Self::default();
        entry.insert(column, op, value);
        entry
    }

    /// `{ $or: [...] }`.
    pub fn any_of(entries: Vec<DatasetFiltersInput>) -> Self {
        Self {
            or: Some(entries),
            ..Self::default()
        }
    }

    /// `{ $not: inner }`.
    pub fn negate(inner: DatasetFiltersInput) -> Self {
        Self {
            not: Some(Box::new(inner)),
            ..Self::default()
        }
    }

    /// Set `column.op`, replacing any previous value.
    pub fn insert(&mut self, column: impl Into<String>, op: Operator, value: FilterValue) {
        self.columns.entry(column.into()).or_default().insert(op, value);
    }

    /// Append a conjunct, creating `$and` if needed.
    pub fn push_and(&mut self, entry: DatasetFiltersInput) {
        self.and.get_or_insert_with(Vec::new).push(entry);
    }

    /// The value of `column.op` at this level.
    pub fn get(&self, column: &str, op: Operator) -> Option<&FilterValue> {
        self.columns.get(column).and_then(|ops| ops.get(&op))
    }

    /// The `$and` conjuncts, empty when absent.
    pub fn and_entries(&self) -> &[DatasetFiltersInput] {
        self.and.as_deref().unwrap_or_default()
    }

    /// Columns with a value withheld anywhere in the expression.
    ///
    /// A withheld value means a manual expression failed to evaluate; the
    /// expression should not be submitted while this is non-empty.
    pub fn withheld_columns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_withheld(&mut out);
        out
    }

    fn collect_withheld(&self, out: &mut Vec<String>) {
        for (column, ops) in &self.columns {
            if ops.values().any(FilterValue::contains_withheld) && !out.contains(column) {
                out.push(column.clone());
            }
        }
        let nested = self
            .and
            .iter()
            .flatten()
            .chain(self.or.iter().flatten())
            .chain(self.not.as_deref());
        for entry in nested {
            entry.collect_withheld(out);
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

struct OperatorValues<'a>(&'a ColumnFilters);

impl Serialize for OperatorValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.0.iter().filter(|(_, v)| !v.is_withheld());
        let mut map = serializer.serialize_map(None)?;
        for (op, value) in present {
            map.serialize_entry(op.as_str(), value)?;
        }
        map.end()
    }
}

impl Serialize for DatasetFiltersInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(and) = &self.and {
            map.serialize_entry("$and", and)?;
        }
        if let Some(or) = &self.or {
            map.serialize_entry("$or", or)?;
        }
        if let Some(not) = &self.not {
            map.serialize_entry("$not", not)?;
        }
        for (column, ops) in &self.columns {
            map.serialize_entry(column, &OperatorValues(ops))?;
        }
        map.end()
    }
}
