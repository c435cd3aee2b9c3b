//! CLI argument definitions using clap.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use dashfilter_schema::Timezone;
use std::path::PathBuf;

/// dashfilter - compile and render dashboard filter trees
#[derive(Parser, Debug)]
#[command(name = "dashfilter")]
#[command(version)]
#[command(about = "dashfilter - compile and render dashboard filter trees", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a filter tree into a wire filter expression
    Compile(CompileArgs),

    /// Print a one-line summary of a filter tree
    Render(RenderArgs),

    /// Convert stored filters into editable form state
    ToForm(ToFormArgs),

    /// List the operators a column type admits
    Operators(OperatorsArgs),

    /// Display version information
    Version,
}

/// Inputs shared by commands that read a dataset and a filter tree
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Dataset definition (.json or .toml)
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Filter tree (JSON)
    #[arg(short, long)]
    pub filters: PathBuf,

    /// Config file (defaults to ./dashfilter.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Environment overrides to apply from the config
    #[arg(short, long, env = "DASHFILTER_ENV")]
    pub env: Option<String>,

    /// Display timezone, overriding the config (e.g. UTC, +03:00)
    #[arg(short, long)]
    pub timezone: Option<Timezone>,
}

// =============================================================================
// Compile Command
// =============================================================================

/// Arguments for the `compile` command
#[derive(Args, Debug)]
pub struct CompileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reference instant for relative periods (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Fail when a manual value could not be evaluated
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Render Command
// =============================================================================

/// Arguments for the `render` command
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// =============================================================================
// ToForm Command
// =============================================================================

/// Arguments for the `to-form` command
#[derive(Args, Debug)]
pub struct ToFormArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

// =============================================================================
// Operators Command
// =============================================================================

/// Arguments for the `operators` command
#[derive(Args, Debug)]
pub struct OperatorsArgs {
    /// Column type name (string, int, datetime, ...)
    pub column_type: String,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 instant: {}", e))
}
