//! Analyzer module.
//!
//! - `types`: Result types (`AnalysisResult`, `ParseError`, `AnalysisSummary`)
//! - `builder`: Builder-style configuration of [`DeoptLint`]
//! - `processing`: File discovery, parallel processing and aggregation

mod builder;
mod processing;
/// Result types and analysis summaries.
pub mod types;

pub use types::{AnalysisResult, AnalysisSummary, ParseError};

use crate::config::Config;

/// The main analyzer struct.
/// Configuration options for the analysis are stored here.
pub struct DeoptLint {
    /// Folders to exclude from analysis (in addition to the defaults).
    pub exclude_folders: Vec<String>,
    /// Folders to force-include in analysis (overrides default exclusions).
    pub include_folders: Vec<String>,
    /// File extensions to analyze, without the dot.
    pub extensions: Vec<String>,
    /// Total number of files analyzed.
    pub total_files_analyzed: usize,
    /// Total number of lines analyzed.
    pub total_lines_analyzed: usize,
    /// Configuration object.
    pub config: Config,
    /// Progress bar for tracking analysis progress (thread-safe).
    pub progress_bar: Option<std::sync::Arc<indicatif::ProgressBar>>,
    /// Whether to enable verbose logging.
    pub verbose: bool,
}

impl Default for DeoptLint {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
