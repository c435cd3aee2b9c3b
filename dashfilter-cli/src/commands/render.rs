//! `dashfilter render` command - Print a one-line summary of a filter tree.

use dashfilter_query::{RenderOptions, render};

use crate::cli::RenderArgs;
use crate::config::Inputs;
use crate::error::CliResult;
use crate::output;

/// Run the render command
pub async fn run(args: RenderArgs) -> CliResult<()> {
    let inputs = Inputs::load(&args.input).await?;
    let options = RenderOptions::from(&inputs.config.display);

    match render(&inputs.dataset, &inputs.block, &options)? {
        Some(summary) => output::plain(&summary),
        None => output::info("No visible filters"),
    }

    Ok(())
}
