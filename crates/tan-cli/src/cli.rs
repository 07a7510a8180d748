//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tan",
    version,
    about = "Trial Asset Navigator - filter, inspect and browse clinical asset data",
    long_about = "Browse a clinical asset collection: compile declarative filters into \n\
                  backing-store queries, run them against a JSON fixture, and drill \n\
                  through the Site → Subject → Event → Procedure hierarchy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow subject-level (PHI) values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a filter query against an asset fixture and print the page.
    Query(QueryArgs),

    /// Compile a filter and print the rendered SQL and parameters.
    Sql(SqlArgs),

    /// Drill through a hierarchy fixture level by level.
    Browse(BrowseArgs),
}

#[derive(Args)]
pub struct QueryArgs {
    /// Path to the asset fixture (JSON array of storage rows).
    #[arg(value_name = "ASSETS_JSON")]
    pub assets: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print the full API envelope as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,

    /// Base path used when building pagination links.
    #[arg(long = "link-base", default_value = "/api/assets")]
    pub link_base: String,
}

#[derive(Args)]
pub struct SqlArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct BrowseArgs {
    /// Path to the hierarchy fixture (JSON tree of sites).
    #[arg(value_name = "TREE_JSON")]
    pub tree: PathBuf,

    /// Site to drill into.
    #[arg(long = "site")]
    pub site: Option<String>,

    /// Subject to drill into (requires --site).
    #[arg(long = "subject", requires = "site")]
    pub subject: Option<String>,

    /// Event to drill into (requires --subject).
    #[arg(long = "event", requires = "subject")]
    pub event: Option<String>,

    /// Procedure to drill into (requires --event).
    #[arg(long = "procedure", requires = "event")]
    pub procedure: Option<String>,
}

/// Filter dimensions shared by `query` and `sql`.
///
/// Either a complete spec file (`--spec`) or individual flags; flags
/// win over the file for the fields they set.
#[derive(Args)]
pub struct FilterArgs {
    /// Read a full FilterSpec from a JSON file.
    #[arg(long = "spec", value_name = "SPEC_JSON")]
    pub spec: Option<PathBuf>,

    /// Restrict to a trial (repeatable).
    #[arg(long = "trial")]
    pub trials: Vec<String>,

    /// Restrict to a site (repeatable).
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Restrict to a library (repeatable).
    #[arg(long = "library")]
    pub libraries: Vec<String>,

    /// Restrict to a country display name (repeatable).
    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Restrict to a study arm (repeatable).
    #[arg(long = "study-arm")]
    pub study_arms: Vec<String>,

    /// Restrict to a procedure name (repeatable).
    #[arg(long = "procedure")]
    pub procedures: Vec<String>,

    /// Earliest creation date (YYYY-MM-DD, inclusive).
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<String>,

    /// Latest creation date (YYYY-MM-DD, inclusive of the whole day).
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<String>,

    /// Review status filter.
    #[arg(long = "review", value_enum)]
    pub review: Option<ReviewArg>,

    /// Processed status filter.
    #[arg(long = "processed", value_enum)]
    pub processed: Option<ProcessedArg>,

    /// Free-text search over filename, subject number, trial and container.
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Sort field (uploadDate, filename, trialName, fileSize, ...).
    #[arg(long = "sort-by")]
    pub sort_by: Option<String>,

    /// Sort direction.
    #[arg(long = "order", value_enum)]
    pub order: Option<OrderArg>,

    /// 1-based page number.
    #[arg(long = "page")]
    pub page: Option<i64>,

    /// Page size.
    #[arg(long = "limit")]
    pub limit: Option<i64>,

    /// View mode: all, sites or library.
    #[arg(long = "view", value_enum)]
    pub view: Option<ViewArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReviewArg {
    All,
    Reviewed,
    Pending,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProcessedArg {
    All,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    All,
    Sites,
    Library,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
