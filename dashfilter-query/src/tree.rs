//! The recursive filter tree.
//!
//! A [`QueryBlock`] combines leaf [`QueryFilter`]s and nested blocks under a
//! [`LogicalOp`]. Leaves carry a [`Predicate`] whose shape is fixed by the
//! operator, so a relative period can only ever appear on `$between` and a
//! manual expression only where the operand is a single value or a bound.
//!
//! Trees are persisted in a flat JSON shape:
//!
//! ```json
//! {
//!   "id": "b1",
//!   "logicalOp": "AND",
//!   "filters": [
//!     {"id": "f1", "columnName": "createdAt", "op": "$between", "value": null,
//!      "show": true, "extra": {"period": "LAST", "unit": "MONTH", "value": 3}}
//!   ],
//!   "blocks": []
//! }
//! ```
//!
//! Editing is done with the `with_*` methods, which return a new tree and
//! leave the receiver untouched.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::{CompareOp, ListOp, LogicalOp, Operator};
use crate::error::{FilterError, FilterResult};
use crate::temporal::{Period, RelativePeriod, TimeUnit};
use crate::value::FilterValue;

/// Source of identifiers for new blocks and filters.
pub trait IdGenerator {
    /// Produce the next identifier.
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` identifiers.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    prefix: String,
    next: u64,
}

impl SequenceGenerator {
    /// Start a sequence at 1.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// A single operand: either a picked value or a raw expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<V = FilterValue> {
    /// A picked value.
    Value(V),
    /// An expression resolved by the evaluator at compile time.
    Manual(String),
}

impl<V> Operand<V> {
    /// Check if this operand is an expression.
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

/// Bounds of a `$between` predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Range<V = FilterValue> {
    /// Explicit bounds.
    Fixed {
        /// Lower bound.
        left: Operand<V>,
        /// Upper bound.
        right: Operand<V>,
    },
    /// A window relative to the compile-time instant.
    Relative(RelativePeriod),
}

/// What a leaf filter tests, keyed by operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<V = FilterValue> {
    /// `$null`.
    IsNull,
    /// `$notNull`.
    IsNotNull,
    /// A single-operand comparison.
    Compare {
        /// The operator.
        op: CompareOp,
        /// The operand.
        operand: Operand<V>,
    },
    /// `$between`.
    Between(Range<V>),
    /// `$in` / `$notIn` over a comma separated list as typed by the user.
    List {
        /// The operator.
        op: ListOp,
        /// Raw comma separated values.
        values: String,
    },
}

impl<V> Predicate<V> {
    /// Compare against a picked value.
    pub fn compare(op: CompareOp, value: impl Into<V>) -> Self {
        Self::Compare {
            op,
            operand: Operand::Value(value.into()),
        }
    }

    /// Compare against an expression.
    pub fn manual(op: CompareOp, expression: impl Into<String>) -> Self {
        Self::Compare {
            op,
            operand: Operand::Manual(expression.into()),
        }
    }

    /// Fixed range with picked bounds.
    pub fn between(left: impl Into<V>, right: impl Into<V>) -> Self {
        Self::Between(Range::Fixed {
            left: Operand::Value(left.into()),
            right: Operand::Value(right.into()),
        })
    }

    /// Relative range.
    pub fn relative(period: RelativePeriod) -> Self {
        Self::Between(Range::Relative(period))
    }

    /// List membership.
    pub fn list(op: ListOp, values: impl Into<String>) -> Self {
        Self::List {
            op,
            values: values.into(),
        }
    }

    /// The wire operator.
    pub fn op(&self) -> Operator {
        match self {
            Self::IsNull => Operator::IsNull,
            Self::IsNotNull => Operator::IsNotNull,
            Self::Compare { op, .. } => (*op).into(),
            Self::Between(_) => Operator::Between,
            Self::List { op, .. } => (*op).into(),
        }
    }
}

/// A leaf predicate on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter<V = FilterValue> {
    /// Identifier.
    pub id: String,
    /// Column the predicate applies to.
    pub column_name: String,
    /// Whether the filter appears in the summary. Never affects compilation.
    pub show: bool,
    /// The predicate.
    pub predicate: Predicate<V>,
}

impl<V> QueryFilter<V> {
    /// Create a visible filter.
    pub fn new(id: impl Into<String>, column_name: impl Into<String>, predicate: Predicate<V>) -> Self {
        Self {
            id: id.into(),
            column_name: column_name.into(),
            show: true,
            predicate,
        }
    }

    /// Hide the filter from summaries.
    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    /// The wire operator.
    pub fn op(&self) -> Operator {
        self.predicate.op()
    }
}

/// A predicate outside any tree, as used by single-column selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorFilter<V = FilterValue> {
    /// Column the predicate applies to.
    pub column_name: String,
    /// The predicate.
    pub predicate: Predicate<V>,
}

impl<V> SelectorFilter<V> {
    /// Create a selector filter.
    pub fn new(column_name: impl Into<String>, predicate: Predicate<V>) -> Self {
        Self {
            column_name: column_name.into(),
            predicate,
        }
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "QueryFilter<V>: Deserialize<'de>"
))]
pub struct QueryBlock<V = FilterValue> {
    /// Identifier.
    pub id: String,
    /// How filters and sub-blocks combine.
    #[serde(default)]
    pub logical_op: LogicalOp,
    /// Leaf filters.
    #[serde(default)]
    pub filters: Vec<QueryFilter<V>>,
    /// Nested blocks.
    #[serde(default)]
    pub blocks: Vec<QueryBlock<V>>,
}

impl<V> QueryBlock<V> {
    /// A fresh `AND` block with no children.
    pub fn empty(ids: &mut impl IdGenerator) -> Self {
        Self::with_id(ids.next_id())
    }

    /// A fresh `AND` block with the given identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            logical_op: LogicalOp::And,
            filters: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Set the logical operator.
    pub fn or(mut self) -> Self {
        self.logical_op = LogicalOp::Or;
        self
    }

    /// Append a filter.
    pub fn filter(mut self, filter: QueryFilter<V>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append a sub-block.
    pub fn block(mut self, block: QueryBlock<V>) -> Self {
        self.blocks.push(block);
        self
    }

    /// Check if the block has neither filters nor sub-blocks.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.blocks.is_empty()
    }

    /// Find a block anywhere in the tree.
    pub fn find_block(&self, id: &str) -> Option<&QueryBlock<V>> {
        if self.id == id {
            return Some(self);
        }
        self.blocks.iter().find_map(|b| b.find_block(id))
    }

    /// Find a filter anywhere in the tree.
    pub fn find_filter(&self, id: &str) -> Option<&QueryFilter<V>> {
        self.filters
            .iter()
            .find(|f| f.id == id)
            .or_else(|| self.blocks.iter().find_map(|b| b.find_filter(id)))
    }

    /// Visit every filter, depth first.
    pub fn filters_recursive(&self) -> Vec<&QueryFilter<V>> {
        let mut out: Vec<&QueryFilter<V>> = self.filters.iter().collect();
        for block in &self.blocks {
            out.extend(block.filters_recursive());
        }
        out
    }

    fn edit_block(&mut self, id: &str, edit: &mut dyn FnMut(&mut QueryBlock<V>)) -> bool {
        if self.id == id {
            edit(self);
            return true;
        }
        self.blocks.iter_mut().any(|b| b.edit_block(id, edit))
    }

    fn edit_all(&mut self, edit: &mut dyn FnMut(&mut QueryBlock<V>)) {
        edit(self);
        for block in &mut self.blocks {
            block.edit_all(edit);
        }
    }
}

impl<V: Clone> QueryBlock<V> {
    /// Copy of the tree with `filter` appended to block `block_id`.
    pub fn with_filter_added(&self, block_id: &str, filter: QueryFilter<V>) -> Self {
        let mut tree = self.clone();
        let mut filter = Some(filter);
        tree.edit_block(block_id, &mut |b| b.filters.extend(filter.take()));
        tree
    }

    /// Copy of the tree without the filter `filter_id`.
    pub fn with_filter_removed(&self, filter_id: &str) -> Self {
        let mut tree = self.clone();
        tree.edit_all(&mut |b| b.filters.retain(|f| f.id != filter_id));
        tree
    }

    /// Copy of the tree with the filter of the same id replaced.
    pub fn with_filter_replaced(&self, filter: QueryFilter<V>) -> Self {
        let mut tree = self.clone();
        tree.edit_all(&mut |b| {
            for slot in b.filters.iter_mut().filter(|f| f.id == filter.id) {
                *slot = filter.clone();
            }
        });
        tree
    }

    /// Copy of the tree with `block` nested under `parent_id`.
    pub fn with_block_added(&self, parent_id: &str, block: QueryBlock<V>) -> Self {
        let mut tree = self.clone();
        let mut block = Some(block);
        tree.edit_block(parent_id, &mut |b| b.blocks.extend(block.take()));
        tree
    }

    /// Copy of the tree without the sub-block `block_id`. The root cannot be removed.
    pub fn with_block_removed(&self, block_id: &str) -> Self {
        let mut tree = self.clone();
        tree.edit_all(&mut |b| b.blocks.retain(|child| child.id != block_id));
        tree
    }

    /// Copy of the tree with block `block_id` combining its children with `op`.
    pub fn with_logical_op(&self, block_id: &str, op: LogicalOp) -> Self {
        let mut tree = self.clone();
        tree.edit_block(block_id, &mut |b| b.logical_op = op);
        tree
    }
}

// ============== Persisted shape ==============

fn default_show() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Serialize)]
#[serde(untagged)]
enum RawValueRef<'a, V> {
    Value(&'a V),
    Expr(&'a str),
    Null,
}

impl<'a, V> From<&'a Operand<V>> for RawValueRef<'a, V> {
    fn from(operand: &'a Operand<V>) -> Self {
        match operand {
            Operand::Value(v) => Self::Value(v),
            Operand::Manual(expr) => Self::Expr(expr),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawExtraRef<'a, V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    is_manual: bool,
    #[serde(skip_serializing_if = "is_false")]
    is_manual_left: bool,
    #[serde(skip_serializing_if = "is_false")]
    is_manual_right: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<RawValueRef<'a, V>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<RawValueRef<'a, V>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawFilterRef<'a, V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    column_name: &'a str,
    op: Operator,
    value: RawValueRef<'a, V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    show: Option<bool>,
    extra: RawExtraRef<'a, V>,
}

impl<'a, V> RawFilterRef<'a, V> {
    fn new(column_name: &'a str, predicate: &'a Predicate<V>) -> Self {
        let mut extra = RawExtraRef {
            period: None,
            unit: None,
            value: None,
            is_manual: false,
            is_manual_left: false,
            is_manual_right: false,
            left: None,
            right: None,
        };
        let value = match predicate {
            Predicate::IsNull | Predicate::IsNotNull => RawValueRef::Null,
            Predicate::Compare { operand, .. } => {
                extra.is_manual = operand.is_manual();
                operand.into()
            }
            Predicate::Between(Range::Fixed { left, right }) => {
                extra.period = Some(Period::Arbitrary);
                extra.is_manual_left = left.is_manual();
                extra.is_manual_right = right.is_manual();
                extra.left = Some(left.into());
                extra.right = Some(right.into());
                RawValueRef::Null
            }
            Predicate::Between(Range::Relative(rp)) => {
                extra.period = Some(rp.period);
                extra.unit = Some(rp.unit);
                extra.value = Some(rp.amount);
                RawValueRef::Null
            }
            Predicate::List { values, .. } => RawValueRef::Expr(values),
        };
        Self {
            id: None,
            column_name,
            op: predicate.op(),
            value,
            show: None,
            extra,
        }
    }
}

impl<V: Serialize> Serialize for QueryFilter<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut raw = RawFilterRef::new(&self.column_name, &self.predicate);
        raw.id = Some(&self.id);
        raw.show = Some(self.show);
        raw.serialize(serializer)
    }
}

impl<V: Serialize> Serialize for SelectorFilter<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawFilterRef::new(&self.column_name, &self.predicate).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    #[serde(default)]
    id: String,
    column_name: String,
    op: Operator,
    #[serde(default)]
    value: FilterValue,
    #[serde(default = "default_show")]
    show: bool,
    #[serde(default)]
    extra: Option<RawExtra>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawExtra {
    period: Option<Period>,
    unit: Option<TimeUnit>,
    value: Option<u32>,
    is_manual: bool,
    is_manual_left: bool,
    is_manual_right: bool,
    left: FilterValue,
    right: FilterValue,
}

fn operand_from_raw(value: FilterValue, manual: bool) -> FilterResult<Operand> {
    if !manual {
        return Ok(Operand::Value(value));
    }
    match value {
        FilterValue::String(expr) => Ok(Operand::Manual(expr)),
        FilterValue::Null => Ok(Operand::Value(FilterValue::Null)),
        other => Err(FilterError::illegal_argument(format!(
            "manual values must be expression strings, found {}",
            other.display_text()
        ))),
    }
}

fn list_from_raw(value: FilterValue) -> String {
    match value {
        FilterValue::String(s) => s,
        FilterValue::List(items) => items
            .iter()
            .map(FilterValue::display_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.display_text(),
    }
}

fn predicate_from_raw(op: Operator, value: FilterValue, extra: RawExtra) -> FilterResult<Predicate> {
    if op != Operator::Between && matches!(extra.period, Some(Period::Last | Period::Next)) {
        return Err(FilterError::illegal_argument(format!(
            "relative periods only apply to $between, not {}",
            op
        ))
        .with_operator(op.as_str()));
    }

    Ok(match op {
        Operator::IsNull => Predicate::IsNull,
        Operator::IsNotNull => Predicate::IsNotNull,
        Operator::In => Predicate::list(ListOp::In, list_from_raw(value)),
        Operator::NotIn => Predicate::list(ListOp::NotIn, list_from_raw(value)),
        Operator::Between => match extra.period.unwrap_or(Period::Arbitrary) {
            Period::Arbitrary => Predicate::Between(Range::Fixed {
                left: operand_from_raw(extra.left, extra.is_manual_left)?,
                right: operand_from_raw(extra.right, extra.is_manual_right)?,
            }),
            period => {
                let (Some(unit), Some(amount)) = (extra.unit, extra.value) else {
                    return Err(FilterError::illegal_argument(format!(
                        "{} period needs both a unit and an amount",
                        period.title()
                    ))
                    .with_operator(op.as_str()));
                };
                Predicate::relative(RelativePeriod::new(period, unit, amount))
            }
        },
        other => {
            let op = CompareOp::try_from(other)
                .map_err(|op| FilterError::internal(format!("unmapped operator {}", op)))?;
            Predicate::Compare {
                op,
                operand: operand_from_raw(value, extra.is_manual)?,
            }
        }
    })
}

impl QueryFilter {
    fn from_raw(raw: RawFilter) -> FilterResult<Self> {
        let predicate = predicate_from_raw(raw.op, raw.value, raw.extra.unwrap_or_default())
            .map_err(|e| e.with_column(&raw.column_name))?;
        Ok(Self {
            id: raw.id,
            column_name: raw.column_name,
            show: raw.show,
            predicate,
        })
    }
}

impl<'de> Deserialize<'de> for QueryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawFilter::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SelectorFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let filter = QueryFilter::<FilterValue>::deserialize(deserializer)?;
        Ok(Self {
            column_name: filter.column_name,
            predicate: filter.predicate,
        })
    }
}
