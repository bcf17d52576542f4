//! Type definitions for analysis results.

use crate::rules::Finding;
use serde::Serialize;

/// Represents a parsing error in a file.
#[derive(Debug, Serialize, Clone)]
pub struct ParseError {
    /// The file where the error occurred.
    pub file: std::path::PathBuf,
    /// The error message.
    pub error: String,
}

/// Holds the results of the analysis.
/// This struct is serialized to JSON if requested.
#[derive(Debug, Serialize, Default)]
pub struct AnalysisResult {
    /// Findings of every rule, ordered by file then position.
    pub findings: Vec<Finding>,
    /// List of parse errors encountered.
    pub parse_errors: Vec<ParseError>,
    /// Summary statistics of the analysis.
    pub analysis_summary: AnalysisSummary,
}

impl AnalysisResult {
    /// Number of findings that carry a fix.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.findings.iter().filter(|f| f.fix.is_some()).count()
    }
}

/// Summary statistics for the analysis result.
#[derive(Debug, Serialize, Default, Clone, Copy)]
pub struct AnalysisSummary {
    /// Total number of files scanned.
    pub total_files: usize,
    /// Total number of lines analyzed.
    pub total_lines_analyzed: usize,
    /// Total number of findings reported.
    pub findings_count: usize,
    /// Findings that carry an auto-fix.
    pub fixable_count: usize,
    /// Findings hidden by suppression comments.
    pub suppressed_count: usize,
    /// Total number of parse errors found.
    pub parse_errors_count: usize,
}
