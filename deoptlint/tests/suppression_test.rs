//! Suppression comments on flagged lines.
#![cfg(feature = "cst")]
#![allow(clippy::unwrap_used)]

use deoptlint::analyzer::{AnalysisResult, DeoptLint};
use std::path::PathBuf;

fn run(code: &str) -> AnalysisResult {
    DeoptLint::default().analyze_code(code, PathBuf::from("test.js"))
}

#[test]
fn test_disable_line_all_rules() {
    let result = run("const o = { [k]() {} }; // deoptlint-disable-line\n");
    assert!(result.findings.is_empty());
    assert_eq!(result.analysis_summary.suppressed_count, 1);
}

#[test]
fn test_disable_line_by_id_and_name() {
    for comment in [
        "// deoptlint-disable-line DL-P001",
        "// eslint-disable-line no-computed-inline-function",
        "/* eslint-disable-line local/no-computed-inline-function -- generated */",
    ] {
        let code = format!("const o = {{ [k]() {{}} }}; {comment}\n");
        assert!(run(&code).findings.is_empty(), "{comment}");
    }
}

#[test]
fn test_disable_other_rule_keeps_finding() {
    let result = run("const o = { [k]() {} }; // eslint-disable-line no-unused-vars\n");
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.analysis_summary.suppressed_count, 0);
}

#[test]
fn test_disable_next_line() {
    let code = "// deoptlint-disable-next-line DL-P001\nconst a = { [k]() {} };\nconst b = { [k]() {} };\n";
    let result = run(code);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].line, 3);
}

#[test]
fn test_comment_on_other_line_does_not_apply() {
    let code = "const a = { [k]() {} };\n// deoptlint-disable-line\n";
    assert_eq!(run(code).findings.len(), 1);
}
