//! Conversion between canonical filters and editable form state.
//!
//! Canonical (stored) filters keep temporal values as ISO strings. Form
//! state holds them as pickable [`TemporalValue`]s instead. Both directions
//! walk the tree the same way and differ only in how a single value is
//! converted, which is what [`ValueCodec`] captures.

use dashfilter_schema::{Column, Dataset, TemporalKind, Timezone};
use serde::Serialize;
use tracing::debug;

use crate::catalog::lookup_column;
use crate::error::{FilterError, FilterResult};
use crate::temporal::{TemporalValue, iso_format};
use crate::tree::{Operand, Predicate, QueryBlock, QueryFilter, Range, SelectorFilter};
use crate::value::FilterValue;

/// A value in form state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Passed through unchanged.
    Plain(FilterValue),
    /// A picked date, time or datetime.
    Temporal(TemporalValue),
}

impl FormValue {
    /// The temporal value, if this is one.
    pub fn as_temporal(&self) -> Option<&TemporalValue> {
        match self {
            Self::Temporal(t) => Some(t),
            Self::Plain(_) => None,
        }
    }
}

impl From<FilterValue> for FormValue {
    fn from(v: FilterValue) -> Self {
        Self::Plain(v)
    }
}

impl From<TemporalValue> for FormValue {
    fn from(v: TemporalValue) -> Self {
        Self::Temporal(v)
    }
}

/// Editable tree.
pub type FormBlock = QueryBlock<FormValue>;

/// Canonical tree.
pub type DomainBlock = QueryBlock<FilterValue>;

/// One direction of the value conversion.
pub trait ValueCodec {
    /// Input value type.
    type Input: Clone;
    /// Output value type.
    type Output;

    /// Convert a value of a non-temporal position.
    fn plain(&self, value: &Self::Input) -> Self::Output;

    /// Convert a value of a temporal column.
    fn temporal(&self, value: &Self::Input, kind: TemporalKind) -> FilterResult<Self::Output>;
}

/// Canonical to form.
#[derive(Debug, Clone, Copy)]
pub struct ToForm {
    /// Display timezone.
    pub timezone: Timezone,
}

impl ValueCodec for ToForm {
    type Input = FilterValue;
    type Output = FormValue;

    fn plain(&self, value: &FilterValue) -> FormValue {
        FormValue::Plain(value.clone())
    }

    fn temporal(&self, value: &FilterValue, kind: TemporalKind) -> FilterResult<FormValue> {
        match value {
            FilterValue::Null => Ok(FormValue::Plain(FilterValue::Null)),
            FilterValue::String(s) => {
                TemporalValue::parse(s, kind, self.timezone).map(FormValue::Temporal)
            }
            other => Err(FilterError::malformed_literal(
                "an ISO string",
                other.display_text(),
            )),
        }
    }
}

/// Form to canonical.
#[derive(Debug, Clone, Copy)]
pub struct FromForm {
    /// Display timezone.
    pub timezone: Timezone,
}

impl FromForm {
    fn iso(&self, value: &TemporalValue, kind: TemporalKind) -> FilterResult<String> {
        use chrono::{NaiveTime, TimeZone};

        let iso = match (value, kind) {
            (TemporalValue::DateTime(dt), kind) => iso_format(Some(dt), kind, self.timezone),
            (TemporalValue::Date(d), TemporalKind::DateTime) => {
                let midnight = self
                    .timezone
                    .offset()
                    .from_local_datetime(&d.and_time(NaiveTime::MIN))
                    .single();
                iso_format(midnight.as_ref(), kind, self.timezone)
            }
            (TemporalValue::Date(_), TemporalKind::Date)
            | (TemporalValue::Time(_), TemporalKind::Time) => Some(value.to_iso()),
            _ => None,
        };
        iso.ok_or_else(|| {
            FilterError::illegal_argument(format!(
                "{} cannot be stored in a {:?} column",
                value.to_iso(),
                kind
            ))
        })
    }
}

impl ValueCodec for FromForm {
    type Input = FormValue;
    type Output = FilterValue;

    fn plain(&self, value: &FormValue) -> FilterValue {
        match value {
            FormValue::Plain(v) => v.clone(),
            FormValue::Temporal(t) => FilterValue::String(t.to_iso()),
        }
    }

    fn temporal(&self, value: &FormValue, kind: TemporalKind) -> FilterResult<FilterValue> {
        match value {
            FormValue::Temporal(t) => self.iso(t, kind).map(FilterValue::String),
            FormValue::Plain(FilterValue::Null) => Ok(FilterValue::Null),
            FormValue::Plain(FilterValue::String(s)) => {
                let parsed = TemporalValue::parse(s, kind, self.timezone)?;
                self.iso(&parsed, kind).map(FilterValue::String)
            }
            FormValue::Plain(other) => Err(FilterError::malformed_literal(
                "a date or time",
                other.display_text(),
            )),
        }
    }
}

fn convert_operand<C: ValueCodec>(
    operand: &Operand<C::Input>,
    kind: Option<TemporalKind>,
    codec: &C,
) -> FilterResult<Operand<C::Output>> {
    Ok(match (operand, kind) {
        (Operand::Manual(expr), _) => Operand::Manual(expr.clone()),
        (Operand::Value(v), Some(kind)) => Operand::Value(codec.temporal(v, kind)?),
        (Operand::Value(v), None) => Operand::Value(codec.plain(v)),
    })
}

/// Convert one predicate for a column.
///
/// Only single-value comparisons and fixed `$between` bounds on temporal
/// columns are converted; manual expressions and relative periods are
/// left as they are.
pub fn process_predicate<C: ValueCodec>(
    column: &Column,
    predicate: &Predicate<C::Input>,
    codec: &C,
) -> FilterResult<Predicate<C::Output>> {
    let kind = column.temporal_kind();
    Ok(match predicate {
        Predicate::IsNull => Predicate::IsNull,
        Predicate::IsNotNull => Predicate::IsNotNull,
        Predicate::Compare { op, operand } => {
            let kind = kind.filter(|_| op.is_single_value_comparison());
            Predicate::Compare {
                op: *op,
                operand: convert_operand(operand, kind, codec)?,
            }
        }
        Predicate::Between(Range::Fixed { left, right }) => Predicate::Between(Range::Fixed {
            left: convert_operand(left, kind, codec)?,
            right: convert_operand(right, kind, codec)?,
        }),
        Predicate::Between(Range::Relative(period)) => Predicate::relative(*period),
        Predicate::List { op, values } => Predicate::list(*op, values.clone()),
    })
}

fn convert_block<C: ValueCodec>(
    dataset: &Dataset,
    block: &QueryBlock<C::Input>,
    codec: &C,
) -> FilterResult<QueryBlock<C::Output>> {
    let filters = block
        .filters
        .iter()
        .map(|filter| {
            let column = lookup_column(dataset, &filter.column_name)?;
            Ok(QueryFilter {
                id: filter.id.clone(),
                column_name: filter.column_name.clone(),
                show: filter.show,
                predicate: process_predicate(column, &filter.predicate, codec)
                    .map_err(|e| e.with_column(&filter.column_name))?,
            })
        })
        .collect::<FilterResult<Vec<_>>>()?;

    let blocks = block
        .blocks
        .iter()
        .map(|child| convert_block(dataset, child, codec))
        .collect::<FilterResult<Vec<_>>>()?;

    Ok(QueryBlock {
        id: block.id.clone(),
        logical_op: block.logical_op,
        filters,
        blocks,
    })
}

fn convert_selector<C: ValueCodec>(
    dataset: &Dataset,
    filter: &SelectorFilter<C::Input>,
    codec: &C,
) -> FilterResult<SelectorFilter<C::Output>> {
    let column = lookup_column(dataset, &filter.column_name)?;
    Ok(SelectorFilter {
        column_name: filter.column_name.clone(),
        predicate: process_predicate(column, &filter.predicate, codec)
            .map_err(|e| e.with_column(&filter.column_name))?,
    })
}

/// Canonical tree to editable form state.
pub fn to_form(dataset: &Dataset, timezone: Timezone, block: &DomainBlock) -> FilterResult<FormBlock> {
    debug!(dataset = dataset.name(), block = %block.id, %timezone, "Converting filters to form state");
    convert_block(dataset, block, &ToForm { timezone })
}

/// Editable form state to canonical tree.
pub fn from_form(dataset: &Dataset, timezone: Timezone, block: &FormBlock) -> FilterResult<DomainBlock> {
    debug!(dataset = dataset.name(), block = %block.id, %timezone, "Converting form state to filters");
    convert_block(dataset, block, &FromForm { timezone })
}

/// Canonical selector filter to form state.
pub fn to_form_selector_filter(
    dataset: &Dataset,
    timezone: Timezone,
    filter: &SelectorFilter,
) -> FilterResult<SelectorFilter<FormValue>> {
    convert_selector(dataset, filter, &ToForm { timezone })
}

/// Form state selector filter to canonical.
pub fn from_form_selector_filter(
    dataset: &Dataset,
    timezone: Timezone,
    filter: &SelectorFilter<FormValue>,
) -> FilterResult<SelectorFilter> {
    convert_selector(dataset, filter, &FromForm { timezone })
}
