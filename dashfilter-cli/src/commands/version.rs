//! `dashfilter version` command - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::header("dashfilter");

    kv("Version", VERSION);
    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    output::newline();

    output::section("Components");
    kv("dashfilter-schema", env!("CARGO_PKG_VERSION"));
    kv("dashfilter-query", env!("CARGO_PKG_VERSION"));

    output::newline();
    output::dim("Logging: set DASHFILTER_DEBUG=1 or DASHFILTER_LOG_LEVEL");

    Ok(())
}
