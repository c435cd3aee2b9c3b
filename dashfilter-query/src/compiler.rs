//! Compilation of canonical filter trees into wire expressions.

use dashfilter_schema::{Column, Dataset, TemporalKind};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::catalog::{LogicalOp, Operator, lookup_column};
use crate::context::FilterContext;
use crate::error::{FilterError, FilterResult};
use crate::temporal::iso_format;
use crate::tree::{Operand, Predicate, QueryBlock, QueryFilter, Range, SelectorFilter};
use crate::value::FilterValue;
use crate::wire::DatasetFiltersInput;

/// Compile a canonical block into a wire expression.
///
/// Filters on the same column and operator are grouped: the last one's
/// value sits at the top level and the earlier ones become standalone
/// `$and` conjuncts. Sub-blocks are compiled recursively and appended to
/// `$and`, wrapped in `{ $or: [...] }` when their logical operator is `OR`.
pub fn compile(
    dataset: &Dataset,
    block: &QueryBlock,
    ctx: &FilterContext<'_>,
) -> FilterResult<DatasetFiltersInput> {
    debug!(
        dataset = dataset.name(),
        block = %block.id,
        filters = block.filters.len(),
        blocks = block.blocks.len(),
        "Compiling block"
    );

    let mut result = DatasetFiltersInput::new();

    let mut groups: IndexMap<&str, IndexMap<Operator, Vec<&QueryFilter>>> = IndexMap::new();
    for filter in &block.filters {
        groups
            .entry(filter.column_name.as_str())
            .or_default()
            .entry(filter.op())
            .or_default()
            .push(filter);
    }

    for (column_name, by_op) in groups {
        let column = lookup_column(dataset, column_name)?;
        for (op, filters) in by_op {
            let mut values = filters
                .iter()
                .map(|f| resolve_value(column, &f.predicate, ctx))
                .collect::<FilterResult<Vec<_>>>()?;
            let Some(last) = values.pop() else {
                continue;
            };
            for earlier in values {
                result.push_and(DatasetFiltersInput::column_entry(column_name, op, earlier));
            }
            result.insert(column_name, op, last);
        }
    }

    for child in &block.blocks {
        let compiled = compile(dataset, child, ctx)?;
        match child.logical_op {
            LogicalOp::And => result.push_and(compiled),
            LogicalOp::Or => result.push_and(DatasetFiltersInput::any_of(vec![compiled])),
        }
    }

    Ok(result)
}

/// Compile one filter outside of any tree, bypassing grouping.
pub fn to_single_filter_input(
    dataset: &Dataset,
    filter: &SelectorFilter,
    ctx: &FilterContext<'_>,
) -> FilterResult<DatasetFiltersInput> {
    let column = lookup_column(dataset, &filter.column_name)?;
    let value = resolve_value(column, &filter.predicate, ctx)?;
    Ok(DatasetFiltersInput::column_entry(
        &filter.column_name,
        filter.predicate.op(),
        value,
    ))
}

/// The wire value of a predicate on `column`.
pub fn resolve_value(
    column: &Column,
    predicate: &Predicate,
    ctx: &FilterContext<'_>,
) -> FilterResult<FilterValue> {
    let value = match predicate {
        Predicate::IsNull | Predicate::IsNotNull => FilterValue::Bool(true),
        Predicate::Compare { operand, .. } => resolve_operand(operand, ctx),
        Predicate::Between(Range::Fixed { left, right }) => FilterValue::List(vec![
            resolve_operand(left, ctx),
            resolve_operand(right, ctx),
        ]),
        Predicate::Between(Range::Relative(period)) => {
            let kind = column.temporal_kind().ok_or_else(|| {
                FilterError::illegal_argument(format!(
                    "relative period on non-temporal column of type {}",
                    column.column_type
                ))
                .with_column(&column.name)
            })?;
            let interval = period.resolve(ctx.local_now())?;
            FilterValue::List(vec![
                iso_value(Some(&interval.start), kind, ctx),
                iso_value(Some(&interval.end), kind, ctx),
            ])
        }
        Predicate::List { values, .. } => split_list(column, values)?,
    };

    trace!(column = %column.name, op = %predicate.op(), value = ?value, "Resolved value");
    Ok(value)
}

fn iso_value(
    instant: Option<&chrono::DateTime<chrono::FixedOffset>>,
    kind: TemporalKind,
    ctx: &FilterContext<'_>,
) -> FilterValue {
    iso_format(instant, kind, ctx.timezone).into()
}

fn resolve_operand(operand: &Operand, ctx: &FilterContext<'_>) -> FilterValue {
    match operand {
        Operand::Value(v) => v.clone(),
        Operand::Manual(expr) => resolve_manual(expr, ctx),
    }
}

/// Evaluate a manual expression.
///
/// A failure is reported through the context's notifier and yields
/// [`FilterValue::Withheld`]; it never aborts compilation of other values.
pub fn resolve_manual(expression: &str, ctx: &FilterContext<'_>) -> FilterValue {
    match ctx.evaluator.evaluate(expression) {
        Ok(value) => value,
        Err(e) => {
            let err = FilterError::evaluator_failure(expression, e.message.clone()).with_source(e);
            ctx.notifier.notify(&err);
            FilterValue::Withheld
        }
    }
}

fn split_list(column: &Column, raw: &str) -> FilterResult<FilterValue> {
    let items = raw.split(',').map(str::trim).filter(|s| !s.is_empty());
    if !column.column_type.is_numeric() {
        return Ok(FilterValue::List(items.map(FilterValue::from).collect()));
    }

    items
        .map(|item| {
            item.parse::<i64>()
                .map(FilterValue::Int)
                .or_else(|_| item.parse::<f64>().map(FilterValue::Float))
                .map_err(|_| {
                    FilterError::malformed_literal("a number", item).with_column(&column.name)
                })
        })
        .collect::<FilterResult<Vec<_>>>()
        .map(FilterValue::List)
}
