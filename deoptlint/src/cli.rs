use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.deoptlint.toml, or a \"deoptlint\" key in package.json):
  Create this file in your project root to set defaults.

  [deoptlint]
  exclude_folders = [\"dist\", \"coverage\"]
  include_folders = [\"vendor/own\"]  # Force-include these
  extensions = [\"js\", \"mjs\", \"cjs\", \"jsx\"]
  ignore = []                # Rule ids to switch off
  max_fix_passes = 10        # Fix passes per file

SUPPRESSION:
  // deoptlint-disable-line [DL-P001]
  // deoptlint-disable-next-line [DL-P001]
  // eslint-disable-line no-computed-inline-function
";

/// Report format.
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Text,
    /// The full analysis result as JSON.
    Json,
    /// SARIF 2.1.0, including fixes.
    Sarif,
    /// GitHub Actions workflow annotations.
    Github,
}

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose output for debugging (shows files being analyzed).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary (no detailed tables).
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 1 if any finding remains.
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Options controlling auto-fix.
#[derive(Args, Debug, Default, Clone)]
pub struct FixArgs {
    /// Rewrite files, moving computed-key functions out of object literals.
    #[arg(long, conflicts_with = "fix_dry_run")]
    pub fix: bool,

    /// Report what --fix would change without writing anything.
    #[arg(long)]
    pub fix_dry_run: bool,
}

impl FixArgs {
    /// Whether any fix mode was requested.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.fix || self.fix_dry_run
    }
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "deoptlint - find and fix object literals that define functions under computed keys",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Option<Commands>,

    /// Paths to analyze (files or directories).
    /// When no paths are provided, defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Analyze a pre-parsed ESTree JSON file instead of parsing.
    /// Requires exactly one path: the source file the tree was built from.
    #[arg(long, value_name = "FILE")]
    pub ast: Option<PathBuf>,

    /// Fix options.
    #[command(flatten)]
    pub fix: FixArgs,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Folders to exclude from analysis.
    #[arg(long, alias = "exclude-folder")]
    pub exclude: Vec<String>,

    /// Folders to force-include in analysis (overrides default exclusions).
    #[arg(long, alias = "include-folder")]
    pub include: Vec<String>,

    /// File extensions to analyze (comma separated, e.g. `js,mjs`).
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// List the available rules
    Rules {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write a default .deoptlint.toml into the current directory
    Init,
}
