use crate::constants::{CONFIG_FILENAME, PACKAGE_JSON_FILENAME};

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Default contents of `.deoptlint.toml`
const DEFAULT_CONFIG: &str = r#"
[deoptlint]
# Path filters
exclude_folders = ["node_modules", "dist", "build", "coverage"]
include_folders = []       # Force-include these folders even if excluded by default
extensions = ["js", "mjs", "cjs", "jsx"]

# Rules
ignore = []                # Rule ids to switch off, e.g. ["DL-P001"]

# Auto-fix
max_fix_passes = 10        # Re-analyze and fix at most this many times per file
"#;

/// Executes the init command in the current directory.
///
/// Creates `.deoptlint.toml` unless a configuration already exists.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing deoptlint configuration...")?;

    let config_path = root.join(CONFIG_FILENAME);
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
    } else if package_json_has_section(&root.join(PACKAGE_JSON_FILENAME))? {
        writeln!(
            writer,
            "  • {PACKAGE_JSON_FILENAME} already contains a \"deoptlint\" key - skipping."
        )?;
    } else {
        fs::write(&config_path, format!("{}\n", DEFAULT_CONFIG.trim()))
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        writeln!(
            writer,
            "  • Created {CONFIG_FILENAME} with default configuration."
        )?;
    }

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}

fn package_json_has_section(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid package.json");
            return Ok(false);
        }
    };
    Ok(value.get("deoptlint").is_some())
}
