//! File processing and aggregation.

use super::{AnalysisResult, AnalysisSummary, DeoptLint, ParseError};
use crate::ast::SyntaxTree;
use crate::cst;
use crate::linter::analyze_with_context;
use crate::rules::{Context, Finding};
use crate::utils::{
    collect_source_files, get_ignored_lines, is_line_suppressed, parse_exclude_folders, LineIndex,
};
use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Files are processed in chunks so peak memory stays bounded on large trees.
const CHUNK_SIZE: usize = 500;

/// Result of analyzing one file.
struct FileOutcome {
    findings: Vec<Finding>,
    suppressed: usize,
    lines: usize,
    parse_error: Option<ParseError>,
}

impl FileOutcome {
    fn failed(file: &Path, error: String) -> Self {
        Self {
            findings: Vec::new(),
            suppressed: 0,
            lines: 0,
            parse_error: Some(ParseError {
                file: file.to_path_buf(),
                error,
            }),
        }
    }
}

impl DeoptLint {
    /// Analyzes the given files and directories.
    ///
    /// Directories are walked with gitignore support; an empty `paths`
    /// analyzes the current directory. Files that fail to read or parse are
    /// reported as [`ParseError`]s and do not stop the run.
    ///
    /// # Errors
    /// Returns an error if one of `paths` does not exist.
    pub fn analyze_paths(&mut self, paths: &[PathBuf]) -> Result<AnalysisResult> {
        if let Some(missing) = paths.iter().find(|path| !path.exists()) {
            anyhow::bail!("Path does not exist: {}", missing.display());
        }

        let files = self.collect_files(paths);
        self.total_files_analyzed = files.len();
        tracing::debug!(files = files.len(), "collected source files");

        let mut outcomes = Vec::with_capacity(files.len());
        for chunk in files.chunks(CHUNK_SIZE) {
            let chunk_outcomes: Vec<FileOutcome> = chunk
                .par_iter()
                .map(|file| self.process_file(file))
                .collect();
            outcomes.extend(chunk_outcomes);
        }

        let result = aggregate(outcomes, files.len());
        self.total_lines_analyzed = result.analysis_summary.total_lines_analyzed;
        Ok(result)
    }

    /// Analyzes a source string as if it were the file `file_path`.
    #[must_use]
    pub fn analyze_code(&self, code: &str, file_path: PathBuf) -> AnalysisResult {
        aggregate(vec![self.analyze_source(code, &file_path)], 1)
    }

    /// Analyzes an already-built tree (e.g. lowered from ESTree JSON).
    #[must_use]
    pub fn analyze_tree(&self, tree: &SyntaxTree, file_path: PathBuf) -> AnalysisResult {
        aggregate(vec![self.check_tree(tree, &file_path)], 1)
    }

    pub(super) fn collect_files(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let roots = if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths.to_vec()
        };
        let excludes = parse_exclude_folders(&self.exclude_folders, true, &self.include_folders);

        let mut files = Vec::new();
        for root in &roots {
            let (found, dirs) = collect_source_files(root, &excludes, &self.extensions);
            tracing::debug!(root = %root.display(), files = found.len(), dirs, "walked");
            files.extend(found);
        }
        files.sort();
        files.dedup();
        files
    }

    fn process_file(&self, file: &Path) -> FileOutcome {
        let outcome = match fs::read_to_string(file) {
            Ok(source) => self.analyze_source(&source, file),
            Err(e) => FileOutcome::failed(file, format!("Failed to read file: {e}")),
        };
        if let Some(bar) = &self.progress_bar {
            bar.inc(1);
        }
        outcome
    }

    fn analyze_source(&self, source: &str, file: &Path) -> FileOutcome {
        match cst::parse_source(source) {
            Ok(tree) => self.check_tree(&tree, file),
            Err(e) => {
                tracing::debug!(file = %file.display(), error = %e, "parse failed");
                FileOutcome::failed(file, e.to_string())
            }
        }
    }

    fn check_tree(&self, tree: &SyntaxTree, file: &Path) -> FileOutcome {
        let context = Context {
            filename: file.to_path_buf(),
            line_index: LineIndex::new(tree.source()),
            config: self.config.clone(),
        };
        let ignored = get_ignored_lines(tree.source());
        let (findings, suppressed): (Vec<_>, Vec<_>) = analyze_with_context(tree, context)
            .into_iter()
            .partition(|finding| {
                !is_line_suppressed(&ignored, finding.line, &finding.rule_id, &finding.rule_name)
            });

        FileOutcome {
            findings,
            suppressed: suppressed.len(),
            lines: tree.source().lines().count(),
            parse_error: None,
        }
    }
}

fn aggregate(outcomes: Vec<FileOutcome>, total_files: usize) -> AnalysisResult {
    let mut result = AnalysisResult::default();
    let mut summary = AnalysisSummary {
        total_files,
        ..AnalysisSummary::default()
    };

    for outcome in outcomes {
        summary.total_lines_analyzed += outcome.lines;
        summary.suppressed_count += outcome.suppressed;
        result.findings.extend(outcome.findings);
        result.parse_errors.extend(outcome.parse_error);
    }

    summary.findings_count = result.findings.len();
    summary.fixable_count = result.fixable_count();
    summary.parse_errors_count = result.parse_errors.len();
    result.analysis_summary = summary;
    result
}
