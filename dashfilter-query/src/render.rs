//! One-line human readable summaries of filter trees.

use dashfilter_schema::{Column, Dataset};

use crate::catalog::lookup_column;
use crate::context::RenderOptions;
use crate::error::FilterResult;
use crate::temporal::TemporalValue;
use crate::tree::{Operand, Predicate, QueryBlock, QueryFilter, Range};
use crate::value::FilterValue;

/// Render a canonical block.
///
/// Hidden filters are skipped and nested blocks are wrapped in parentheses.
/// Returns `None` when nothing in the block is visible.
pub fn render(
    dataset: &Dataset,
    block: &QueryBlock,
    options: &RenderOptions,
) -> FilterResult<Option<String>> {
    let mut items = Vec::new();

    for filter in block.filters.iter().filter(|f| f.show) {
        let column = lookup_column(dataset, &filter.column_name)?;
        items.push(render_filter(column, filter, options));
    }

    for child in &block.blocks {
        if let Some(nested) = render(dataset, child, options)? {
            items.push(format!("({})", nested));
        }
    }

    if items.is_empty() {
        return Ok(None);
    }
    let separator = format!(" {} ", block.logical_op.title());
    Ok(Some(items.join(&separator)))
}

fn render_filter(column: &Column, filter: &QueryFilter, options: &RenderOptions) -> String {
    let name = column.display_name();
    let title = filter.op().title();

    let value = match &filter.predicate {
        Predicate::IsNull | Predicate::IsNotNull => String::new(),
        Predicate::Between(Range::Relative(period)) => {
            return format!("{} for {}", name, period.title());
        }
        Predicate::Between(Range::Fixed { left, right }) => format!(
            "{} - {}",
            format_operand(column, left, options),
            format_operand(column, right, options)
        ),
        Predicate::Compare { operand, .. } => format_operand(column, operand, options),
        Predicate::List { values, .. } => values
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    };

    format!("{} {} {}", name, title, value).trim_end().to_string()
}

fn format_operand(column: &Column, operand: &Operand, options: &RenderOptions) -> String {
    match operand {
        Operand::Manual(expr) => expr.clone(),
        Operand::Value(value) => format_value(column, value, options),
    }
}

fn format_value(column: &Column, value: &FilterValue, options: &RenderOptions) -> String {
    match (column.temporal_kind(), value) {
        (Some(kind), FilterValue::String(s)) => TemporalValue::parse(s, kind, options.timezone)
            .map(|t| t.display(&options.formats))
            .unwrap_or_else(|_| s.clone()),
        _ => value.display_text(),
    }
}
