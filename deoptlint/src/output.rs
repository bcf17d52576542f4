use crate::analyzer::{AnalysisResult, AnalysisSummary, ParseError};
use crate::rules::Finding;
use crate::utils::normalize_display_path;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let mut defaults: Vec<&str> = crate::constants::DEFAULT_EXCLUDE_FOLDERS()
            .iter()
            .copied()
            .collect();
        defaults.sort_unstable();
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            defaults.join(", ").dimmed()
        )?;
    } else {
        writeln!(
            writer,
            "{} {}",
            "Excluding:".yellow().bold(),
            folders.join(", ")
        )?;
    }
    Ok(())
}

/// Create a progress bar with file count.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("analyzing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick();
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  JavaScript Deopt Lint Results         ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(
    writer: &mut impl Write,
    summary: &AnalysisSummary,
) -> std::io::Result<()> {
    fn pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().red().bold())
        }
    }

    writeln!(
        writer,
        "{}  {}  {}  {}",
        pill("Findings", summary.findings_count),
        pill("Fixable", summary.fixable_count),
        pill("Suppressed", summary.suppressed_count),
        pill("Parse Errors", summary.parse_errors_count),
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print analysis statistics (files and lines processed).
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_analysis_stats(
    writer: &mut impl Write,
    summary: &AnalysisSummary,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}",
        format!(
            "Analyzed {} files ({} lines)",
            summary.total_files.to_string().bold(),
            summary.total_lines_analyzed.to_string().bold()
        )
        .dimmed()
    )?;
    writeln!(writer)?;
    Ok(())
}

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn get_severity_color(severity: &str) -> Color {
    match severity.to_lowercase().as_str() {
        "error" => Color::Red,
        "warning" => Color::Yellow,
        "info" | "note" => Color::Blue,
        _ => Color::White,
    }
}

/// Print a table of findings.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_findings(
    writer: &mut impl Write,
    title: &str,
    findings: &[Finding],
) -> std::io::Result<()> {
    if findings.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", title.bold().underline())?;

    let mut table = create_table(vec!["Rule ID", "Message", "Location", "Severity", "Fix"]);

    for f in findings {
        let location = format!("{}:{}:{}", normalize_display_path(&f.file), f.line, f.col);
        let fix = if f.fix.is_some() {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").add_attribute(Attribute::Dim)
        };

        table.add_row(vec![
            Cell::new(&f.rule_id).add_attribute(Attribute::Dim),
            Cell::new(&f.message).add_attribute(Attribute::Bold),
            Cell::new(location),
            Cell::new(&f.severity).fg(get_severity_color(&f.severity)),
            fix,
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print a list of parse errors.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_parse_errors(writer: &mut impl Write, errors: &[ParseError]) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Parse Errors".bold().underline().red())?;

    let mut table = create_table(vec!["File", "Error"]);
    for e in errors {
        table.add_row(vec![
            Cell::new(normalize_display_path(&e.file)).add_attribute(Attribute::Bold),
            Cell::new(&e.error).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the full text report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(writer: &mut impl Write, result: &AnalysisResult) -> std::io::Result<()> {
    print_header(writer)?;

    if result.findings.is_empty() && result.parse_errors.is_empty() {
        writeln!(writer, "{}", "✓ All clean! No issues found.".green())?;
    } else {
        print_findings(writer, "Performance Issues", &result.findings)?;
        print_parse_errors(writer, &result.parse_errors)?;
        writeln!(writer)?;
    }

    print_summary_pills(writer, &result.analysis_summary)?;
    print_analysis_stats(writer, &result.analysis_summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn finding(fixable: bool) -> Finding {
        Finding {
            rule_id: "DL-P001".to_owned(),
            rule_name: "no-computed-inline-function".to_owned(),
            category: "Performance".to_owned(),
            severity: "warning".to_owned(),
            message: "computed inline function".to_owned(),
            file: PathBuf::from("src/a.js"),
            line: 3,
            col: 5,
            start_byte: 10,
            end_byte: 20,
            fix: fixable
                .then(|| crate::fix::Fix::new(vec![], "").ok())
                .flatten(),
            notes: vec![],
        }
    }

    #[test]
    fn test_report_lists_findings() {
        colored::control::set_override(false);
        let result = AnalysisResult {
            findings: vec![finding(true)],
            parse_errors: vec![],
            analysis_summary: AnalysisSummary {
                total_files: 1,
                findings_count: 1,
                fixable_count: 1,
                ..AnalysisSummary::default()
            },
        };
        let mut out = Vec::new();
        print_report(&mut out, &result).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("DL-P001"));
        assert!(text.contains("src/a.js:3:5"));
        assert!(text.contains("Findings: 1"));
    }

    #[test]
    fn test_report_all_clean() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_report(&mut out, &AnalysisResult::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("All clean"));
    }

    #[test]
    fn test_exclusion_list_defaults() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_exclusion_list(&mut out, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("node_modules"));
    }
}
