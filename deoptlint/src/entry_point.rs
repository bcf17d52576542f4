use crate::analyzer::{AnalysisResult, DeoptLint};
use crate::ast::estree;
use crate::cli::{Cli, Commands, OutputFormat};
use crate::commands::{self, FixOptions};
use crate::config::Config;
use crate::utils::normalize_display_path;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `--verbose` enables `debug`; otherwise `RUST_LOG` applies, defaulting to
/// `warn`. A subscriber that is already installed is left in place.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs the analyzer (or a subcommand) with the given arguments.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run deoptlint with the given arguments, writing output to `writer`.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Returns the process exit code.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["deoptlint".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(2);
            }
        },
    };

    init_tracing(cli.output.verbose);

    match cli.command {
        Some(Commands::Rules { json }) => {
            commands::run_rules(json, &mut *writer)?;
            return Ok(0);
        }
        Some(Commands::Init) => {
            commands::run_init(writer)?;
            return Ok(0);
        }
        None => {}
    }

    for path in &cli.paths {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return Ok(1);
        }
    }

    let config_path = cli.paths.first().map_or(Path::new("."), PathBuf::as_path);
    let config = Config::load_from_path(config_path);
    if cli.output.verbose {
        eprintln!("[VERBOSE] deoptlint v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        match &config.config_file_path {
            Some(path) => eprintln!("[VERBOSE] Config: {}", path.display()),
            None => eprintln!("[VERBOSE] Config: defaults"),
        }
        eprintln!();
    }

    let analyzer = DeoptLint::new(config)
        .with_excludes(cli.exclude.clone())
        .with_includes(cli.include.clone())
        .with_extensions(cli.extensions.clone())
        .with_verbose(cli.output.verbose);

    if let Some(ast_path) = &cli.ast {
        return run_ast(&cli, &analyzer, ast_path, writer);
    }
    run_paths(&cli, analyzer, writer)
}

fn run_paths<W: Write>(cli: &Cli, mut analyzer: DeoptLint, writer: &mut W) -> Result<i32> {
    let text = cli.output.format == OutputFormat::Text;
    if text && !cli.output.quiet {
        crate::output::print_exclusion_list(writer, &analyzer.exclude_folders)?;
    }

    let progress = if text {
        let total_files = analyzer.count_files(&cli.paths);
        let bar = Arc::new(crate::output::create_progress_bar(total_files as u64));
        analyzer = analyzer.with_progress(Arc::clone(&bar));
        Some(bar)
    } else {
        None
    };

    let start_time = std::time::Instant::now();
    let mut result = analyzer.analyze_paths(&cli.paths)?;
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    analyzer.progress_bar = None;

    if cli.fix.enabled() {
        let options = FixOptions {
            dry_run: cli.fix.fix_dry_run,
            verbose: cli.output.verbose,
        };
        // Machine-readable formats own stdout.
        if text {
            commands::run_fix(&analyzer, &result, options, &mut *writer)?;
        } else {
            commands::run_fix(&analyzer, &result, options, std::io::stderr())?;
        }
        if cli.fix.fix {
            result = analyzer.analyze_paths(&cli.paths)?;
        }
    }

    if cli.output.verbose {
        eprintln!(
            "[VERBOSE] Analysis completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        eprintln!("   Files analyzed: {}", result.analysis_summary.total_files);
        eprintln!(
            "   Lines analyzed: {}",
            result.analysis_summary.total_lines_analyzed
        );
        eprintln!();
    }

    let root = match cli.paths.as_slice() {
        [single] if single.is_dir() => Some(single.as_path()),
        _ => None,
    };
    write_report(cli, &result, root, writer)?;

    if text {
        writeln!(
            writer,
            "[TIME] Completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        )?;
    }

    Ok(exit_code(cli, &result))
}

/// Analyzes a source file through its pre-built ESTree JSON.
fn run_ast<W: Write>(
    cli: &Cli,
    analyzer: &DeoptLint,
    ast_path: &Path,
    writer: &mut W,
) -> Result<i32> {
    let [source_path] = cli.paths.as_slice() else {
        eprintln!("Error: --ast requires exactly one path, the source file the tree was built from.");
        return Ok(1);
    };

    let json = std::fs::read_to_string(ast_path)
        .with_context(|| format!("Failed to read {}", ast_path.display()))?;
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;
    let tree = estree::from_json(&json, source)
        .with_context(|| format!("Invalid ESTree JSON in {}", ast_path.display()))?;

    let mut result = analyzer.analyze_tree(&tree, source_path.clone());

    if cli.fix.enabled() {
        let outcome = commands::fix_tree(analyzer, &tree, source_path)?;
        let display = normalize_display_path(source_path);
        let mut log: Box<dyn Write + '_> = if cli.output.format == OutputFormat::Text {
            Box::new(&mut *writer)
        } else {
            Box::new(std::io::stderr())
        };
        if cli.fix.fix_dry_run {
            writeln!(log, "Would apply {} fix(es) to {display}", outcome.applied)?;
        } else if outcome.changed() {
            std::fs::write(source_path, &outcome.source)
                .with_context(|| format!("Failed to write {display}"))?;
            writeln!(log, "Fixed: {display} ({} fixed)", outcome.applied)?;
            result.findings = outcome.remaining;
            result.analysis_summary.findings_count = result.findings.len();
            result.analysis_summary.fixable_count = result.fixable_count();
        }
    }

    write_report(cli, &result, None, writer)?;
    Ok(exit_code(cli, &result))
}

fn write_report<W: Write>(
    cli: &Cli,
    result: &AnalysisResult,
    root: Option<&Path>,
    writer: &mut W,
) -> Result<()> {
    match cli.output.format {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(result)?)?;
        }
        OutputFormat::Sarif => crate::report::sarif::print_sarif_with_root(writer, result, root)?,
        OutputFormat::Github => crate::report::github::print_github(writer, result)?,
        OutputFormat::Text if cli.output.quiet => {
            crate::output::print_summary_pills(writer, &result.analysis_summary)?;
        }
        OutputFormat::Text => crate::output::print_report(writer, result)?,
    }
    Ok(())
}

fn exit_code(cli: &Cli, result: &AnalysisResult) -> i32 {
    i32::from(cli.output.fail_on_findings && !result.findings.is_empty())
}
