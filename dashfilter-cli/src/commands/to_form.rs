//! `dashfilter to-form` command - Convert stored filters into form state.

use dashfilter_query::to_form;

use crate::cli::ToFormArgs;
use crate::config::Inputs;
use crate::error::CliResult;
use crate::output;

/// Run the to-form command
pub async fn run(args: ToFormArgs) -> CliResult<()> {
    let inputs = Inputs::load(&args.input).await?;
    let form = to_form(
        &inputs.dataset,
        inputs.config.display.timezone,
        &inputs.block,
    )?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&form)?
    } else {
        serde_json::to_string(&form)?
    };
    output::plain(&json);

    Ok(())
}
