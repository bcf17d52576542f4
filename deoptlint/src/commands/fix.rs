//! Auto-fix command.
//!
//! Fixes are applied the way ESLint applies them: every pass takes the
//! findings in source order, keeps each fix that does not touch a fix already
//! accepted in that pass, applies the accepted edits together and re-analyzes
//! the result. Fixes withheld because of a later computed entry become
//! applicable once that entry has moved, so a few passes reach a fixed point.

use crate::analyzer::{AnalysisResult, DeoptLint};
use crate::ast::SyntaxTree;
use crate::fix::{ByteRangeRewriter, Fix};
use crate::rules::Finding;
use crate::utils::normalize_display_path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options for the fix command
#[derive(Debug, Default, Clone, Copy)]
pub struct FixOptions {
    /// Dry-run mode (report what would change, write nothing)
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Result of fixing one source text.
#[derive(Debug, Clone, Serialize)]
pub struct FixOutcome {
    /// The rewritten source.
    pub source: String,
    /// Number of fixes applied over all passes.
    pub applied: usize,
    /// Number of passes that applied at least one fix.
    pub passes: usize,
    /// Findings left in the rewritten source.
    pub remaining: Vec<Finding>,
}

impl FixOutcome {
    /// Whether any fix was applied.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Result of the fix command for one file
#[derive(Debug, Serialize)]
pub struct FixResult {
    /// File that was fixed
    pub file: String,
    /// Number of fixes applied
    pub fixes_applied: usize,
    /// Findings that could not be fixed
    pub remaining: usize,
}

/// Picks the findings whose fixes can be applied together, first come first
/// served. Returns indices into `findings`.
#[must_use]
pub fn select_fixes(findings: &[Finding]) -> Vec<usize> {
    let mut accepted: Vec<(usize, &Fix)> = Vec::new();
    for (index, finding) in findings.iter().enumerate() {
        let Some(fix) = &finding.fix else { continue };
        if accepted.iter().all(|(_, other)| !other.conflicts_with(fix)) {
            accepted.push((index, fix));
        }
    }
    accepted.into_iter().map(|(index, _)| index).collect()
}

/// Applies the fixes of `findings[selected]` to `source` in one rewrite.
fn apply_fixes(source: &str, findings: &[Finding], selected: &[usize]) -> Result<String> {
    let mut rewriter = ByteRangeRewriter::new(source);
    for fix in selected.iter().filter_map(|&i| findings[i].fix.as_ref()) {
        rewriter.add_edits(fix.edits().iter().cloned());
    }
    rewriter.apply().context("Failed to apply fixes")
}

/// Repeatedly analyzes and fixes `source` until no fix applies or the
/// configured pass limit is reached.
///
/// A pass whose output no longer parses is discarded and fixing stops with
/// the last good text.
///
/// # Errors
/// Returns an error if `source` itself does not parse.
pub fn fix_source(analyzer: &DeoptLint, source: &str, file: &Path) -> Result<FixOutcome> {
    let max_passes = analyzer.config.deoptlint.max_fix_passes();
    let mut current = source.to_owned();
    let mut applied = 0;
    let mut passes = 0;

    let mut result = analyze_checked(analyzer, &current, file)
        .with_context(|| format!("Cannot fix {}", normalize_display_path(file)))?;

    while passes < max_passes {
        let selected = select_fixes(&result.findings);
        if selected.is_empty() {
            break;
        }
        let next = apply_fixes(&current, &result.findings, &selected)?;
        let next_result = match analyze_checked(analyzer, &next, file) {
            Ok(next_result) => next_result,
            Err(e) => {
                tracing::warn!(
                    file = %file.display(),
                    pass = passes + 1,
                    error = %e,
                    "fix pass produced unparsable output, discarding it"
                );
                break;
            }
        };
        applied += selected.len();
        passes += 1;
        tracing::debug!(file = %file.display(), pass = passes, fixes = selected.len(), "applied fix pass");
        current = next;
        result = next_result;
    }

    Ok(FixOutcome {
        source: current,
        applied,
        passes,
        remaining: result.findings,
    })
}

/// Applies the fixes found in an already-built tree.
///
/// A tree supplied as ESTree JSON cannot be rebuilt after rewriting, so only
/// one pass runs.
///
/// # Errors
/// Returns an error if the fixes cannot be applied to the tree's source.
pub fn fix_tree(analyzer: &DeoptLint, tree: &SyntaxTree, file: &Path) -> Result<FixOutcome> {
    let result = analyzer.analyze_tree(tree, file.to_path_buf());
    let selected = select_fixes(&result.findings);
    let source = if selected.is_empty() {
        tree.source().to_owned()
    } else {
        apply_fixes(tree.source(), &result.findings, &selected)?
    };

    let remaining = result
        .findings
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !selected.contains(index))
        .map(|(_, finding)| finding)
        .collect();

    Ok(FixOutcome {
        source,
        applied: selected.len(),
        passes: usize::from(!selected.is_empty()),
        remaining,
    })
}

fn analyze_checked(analyzer: &DeoptLint, source: &str, file: &Path) -> Result<AnalysisResult> {
    let mut result = analyzer.analyze_code(source, file.to_path_buf());
    if let Some(error) = result.parse_errors.pop() {
        anyhow::bail!("{}", error.error);
    }
    Ok(result)
}

/// Apply `--fix` to every file of `results` that has a fixable finding.
///
/// # Errors
///
/// Returns an error if writing the output or a fixed file fails.
pub fn run_fix<W: Write>(
    analyzer: &DeoptLint,
    results: &AnalysisResult,
    options: FixOptions,
    mut writer: W,
) -> Result<Vec<FixResult>> {
    if options.dry_run {
        writeln!(writer, "\n{}", "[DRY-RUN] Fixes that would be applied:".yellow())?;
    } else {
        writeln!(writer, "\n{}", "Applying fixes...".cyan())?;
    }

    let files = files_with_fixes(results);
    if files.is_empty() {
        writeln!(writer, "  No fixable findings.")?;
        return Ok(vec![]);
    }

    if options.verbose {
        let total: usize = files.values().sum();
        writeln!(writer, "[VERBOSE] Fix Statistics:")?;
        writeln!(writer, "   Files to modify: {}", files.len())?;
        writeln!(writer, "   Fixable findings: {total}")?;
        writeln!(writer)?;
    }

    let mut all_results = Vec::new();
    for file in files.keys() {
        if let Some(res) = fix_file(analyzer, &mut writer, file, options)? {
            all_results.push(res);
        }
    }
    Ok(all_results)
}

fn files_with_fixes(results: &AnalysisResult) -> BTreeMap<PathBuf, usize> {
    let mut files = BTreeMap::new();
    for finding in results.findings.iter().filter(|f| f.fix.is_some()) {
        *files.entry(finding.file.clone()).or_insert(0) += 1;
    }
    files
}

fn fix_file<W: Write>(
    analyzer: &DeoptLint,
    writer: &mut W,
    file: &Path,
    options: FixOptions,
) -> Result<Option<FixResult>> {
    let display = normalize_display_path(file);
    let content = match fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            writeln!(writer, "  {} {}: {}", "Skip:".yellow(), display, e)?;
            return Ok(None);
        }
    };

    let outcome = match fix_source(analyzer, &content, file) {
        Ok(outcome) => outcome,
        Err(e) => {
            writeln!(writer, "  {} {}: {:#}", "Parse error:".red(), display, e)?;
            return Ok(None);
        }
    };
    if !outcome.changed() {
        return Ok(None);
    }

    if options.dry_run {
        writeln!(
            writer,
            "  Would apply {} fix(es) to {} in {} pass(es)",
            outcome.applied, display, outcome.passes
        )?;
    } else {
        fs::write(file, &outcome.source)
            .with_context(|| format!("Failed to write {display}"))?;
        writeln!(
            writer,
            "  {} {} ({} fixed)",
            "Fixed:".green(),
            display,
            outcome.applied
        )?;
    }
    for finding in &outcome.remaining {
        writeln!(
            writer,
            "    {} {}:{} {}",
            "Unfixed:".dimmed(),
            display,
            finding.line,
            finding.notes.first().map_or("", String::as_str)
        )?;
    }

    Ok(Some(FixResult {
        file: display,
        fixes_applied: outcome.applied,
        remaining: outcome.remaining.len(),
    }))
}

#[cfg(all(test, feature = "cst"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fix(code: &str) -> FixOutcome {
        fix_source(&DeoptLint::default(), code, Path::new("test.js")).unwrap()
    }

    #[test]
    fn test_fix_method_shorthand() {
        let outcome = fix("const obj = { [computedKey]() {} };");
        assert_eq!(
            outcome.source,
            "const obj = {};\nobj[computedKey] = function() {};"
        );
        assert_eq!(outcome.applied, 1);
        assert!(outcome.remaining.is_empty());
    }

    #[test]
    fn test_withheld_fix_applies_in_later_pass() {
        let outcome = fix("const o = { [a]: function() {}, [b]: () => 1 };");
        assert_eq!(outcome.applied, 2);
        assert_eq!(outcome.passes, 2);
        assert_eq!(
            outcome.source,
            "const o = {};\no[a] = function() {};\no[b] = () => 1;"
        );
    }

    #[test]
    fn test_pass_limit_respected() {
        let mut analyzer = DeoptLint::default();
        analyzer.config.deoptlint.max_fix_passes = Some(1);
        let outcome = fix_source(
            &analyzer,
            "const o = { [a]: function() {}, [b]: () => 1 };",
            Path::new("t.js"),
        )
        .unwrap();
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.remaining.len(), 1);
    }

    #[test]
    fn test_unparsable_source_is_error() {
        assert!(fix_source(&DeoptLint::default(), "const = ;", Path::new("bad.js")).is_err());
    }

    #[test]
    fn test_run_fix_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        let code = "const obj = { [k]: function() {} };\n";
        fs::write(&file, code).unwrap();

        let mut analyzer = DeoptLint::default();
        let results = analyzer.analyze_paths(&[file.clone()]).unwrap();
        let mut out = Vec::new();
        let options = FixOptions {
            dry_run: true,
            verbose: false,
        };
        let fixed = run_fix(&analyzer, &results, options, &mut out).unwrap();

        assert_eq!(fixed.len(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), code);
        assert!(String::from_utf8(out).unwrap().contains("Would apply 1 fix"));
    }

    #[test]
    fn test_run_fix_writes_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "const obj = { [k]: function() {} };\n").unwrap();

        let mut analyzer = DeoptLint::default();
        let results = analyzer.analyze_paths(&[file.clone()]).unwrap();
        run_fix(&analyzer, &results, FixOptions::default(), Vec::<u8>::new()).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "const obj = {};\nobj[k] = function() {};\n"
        );
    }
}
