use crate::analyzer::AnalysisResult;
use crate::rules::Finding;
use std::io::Write;

/// Generates GitHub Actions workflow commands.
///
/// See: <https://docs.github.com/en/actions/using-workflows/workflow-commands-for-github-actions>
///
/// # Errors
///
/// Returns an error if writing to the `writer` fails.
pub fn print_github(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    for finding in &result.findings {
        write_annotation(writer, finding)?;
    }

    for error in &result.parse_errors {
        writeln!(
            writer,
            "::error file={},title=ParseError::{}",
            escape_property(&error.file.to_string_lossy().replace('\\', "/")),
            escape_data(&error.error)
        )?;
    }

    Ok(())
}

fn write_annotation(writer: &mut impl Write, finding: &Finding) -> std::io::Result<()> {
    // GitHub supports: debug, notice, warning, error
    let level = match finding.severity.to_lowercase().as_str() {
        "error" => "error",
        "info" | "note" => "notice",
        _ => "warning",
    };
    let mut message = finding.message.clone();
    if finding.fix.is_some() {
        message.push_str(" (auto-fixable with --fix)");
    }

    writeln!(
        writer,
        "::{} file={},line={},col={},title={}::{}",
        level,
        escape_property(&finding.file.to_string_lossy().replace('\\', "/")),
        finding.line,
        finding.col,
        escape_property(&format!("{} {}", finding.rule_id, finding.rule_name)),
        escape_data(&message)
    )
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
