//! `dashfilter compile` command - Compile a filter tree into a wire expression.

use chrono::Utc;
use dashfilter_query::{CollectingNotifier, FilterContext, JsonLiteralEvaluator, compile};

use crate::cli::CompileArgs;
use crate::config::Inputs;
use crate::error::{CliError, CliResult};
use crate::output;

/// Run the compile command
pub async fn run(args: CompileArgs) -> CliResult<()> {
    let inputs = Inputs::load(&args.input).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let notifier = CollectingNotifier::new();
    let ctx = FilterContext::new(inputs.config.display.timezone, now, &JsonLiteralEvaluator)
        .with_notifier(&notifier);

    let wire = compile(&inputs.dataset, &inputs.block, &ctx)?;

    for message in notifier.messages() {
        output::warn(&message);
    }

    let withheld = wire.withheld_columns();
    if !withheld.is_empty() {
        let message = format!("Values withheld for: {}", withheld.join(", "));
        if args.strict {
            return Err(CliError::Validation(message));
        }
        output::warn(&message);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&wire)?
    } else {
        serde_json::to_string(&wire)?
    };
    output::plain(&json);

    Ok(())
}
