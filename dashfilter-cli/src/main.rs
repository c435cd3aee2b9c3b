//! dashfilter CLI - compile and render dashboard filter trees.

use clap::Parser;

use dashfilter_cli::cli::{Cli, Command};
use dashfilter_cli::commands;
use dashfilter_cli::error::CliResult;
use dashfilter_cli::output;

#[tokio::main]
async fn main() {
    dashfilter_query::logging::init();

    if let Err(e) = run().await {
        output::error(&e.display_full());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => commands::compile::run(args).await,
        Command::Render(args) => commands::render::run(args).await,
        Command::ToForm(args) => commands::to_form::run(args).await,
        Command::Operators(args) => commands::operators::run(args).await,
        Command::Version => commands::version::run().await,
    }
}
