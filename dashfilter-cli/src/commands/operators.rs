//! `dashfilter operators` command - List the operators a column type admits.

use dashfilter_query::operators_for;
use dashfilter_schema::{ColumnCategory, ColumnType};

use crate::cli::OperatorsArgs;
use crate::error::CliResult;
use crate::output;

/// Run the operators command
pub async fn run(args: OperatorsArgs) -> CliResult<()> {
    let column_type = ColumnType::parse(&args.column_type);
    let operators = operators_for(&column_type)?;

    let category = match column_type.category() {
        Some(ColumnCategory::StringLike) => "string-like",
        Some(ColumnCategory::Numeric) => "numeric",
        Some(ColumnCategory::Temporal) => "temporal",
        Some(ColumnCategory::Boolean) => "boolean",
        None => "unsupported",
    };

    output::header(&format!("Operators for {} ({})", column_type, category));
    for op in operators {
        output::list_item(&format!("{:<14} {}", op.as_str(), op.title()));
    }

    Ok(())
}
