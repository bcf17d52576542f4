//! Path utilities.
//!
//! - Cross-platform path normalization for display
//! - Source file discovery with gitignore support

use std::path::{Path, PathBuf};

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use deoptlint::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\app.js")), "src/app.js");
/// assert_eq!(normalize_display_path(Path::new("./lib/index.mjs")), "lib/index.mjs");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|exclude| match exclude.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => name.ends_with(suffix),
        _ => name == exclude,
    })
}

/// Collects source files under `root` with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude and the
/// global gitignore on top of `excludes`, which are matched against
/// directory and file names. A `root` that is a file is returned as is when
/// its extension matches.
///
/// # Returns
/// Sorted files found, and the number of directories visited.
#[must_use]
pub fn collect_source_files(
    root: &Path,
    excludes: &[String],
    extensions: &[String],
) -> (Vec<PathBuf>, usize) {
    use ignore::WalkBuilder;

    let has_extension = |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
    };

    if root.is_file() {
        let files = if has_extension(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
        return (files, 0);
    }

    let excludes_for_filter = excludes.to_vec();
    let root_for_filter = root.to_path_buf();

    // Prune excluded directories at traversal time so we never descend
    // into node_modules and friends.
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_excluded(name, &excludes_for_filter))
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }
                if has_extension(path) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => tracing::warn!(error = %e, "walk error"),
        }
    }

    files.sort();
    (files, dir_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec!["js".to_owned(), "mjs".to_owned()]
    }

    #[test]
    fn test_is_excluded_patterns() {
        let excludes = vec!["node_modules".to_owned(), "*.min.js".to_owned()];
        assert!(is_excluded("node_modules", &excludes));
        assert!(is_excluded("vendor.min.js", &excludes));
        assert!(!is_excluded("app.js", &excludes));
    }

    #[test]
    fn test_collect_skips_excluded_dirs() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("src"))?;
        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::write(root.join("src/app.js"), "const a = 1;")?;
        fs::write(root.join("src/util.mjs"), "export const b = 2;")?;
        fs::write(root.join("src/readme.md"), "# docs")?;
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = {};")?;

        let (files, dirs) = collect_source_files(root, &["node_modules".to_owned()], &exts());
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["app.js", "util.mjs"]);
        assert_eq!(dirs, 1);
        Ok(())
    }

    #[test]
    fn test_collect_single_file() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let file = temp.path().join("one.js");
        fs::write(&file, "x;")?;
        let (files, _) = collect_source_files(&file, &[], &exts());
        assert_eq!(files, vec![file]);
        Ok(())
    }

    #[test]
    fn test_normalize_display_path() {
        assert_eq!(normalize_display_path(Path::new("./a/b.js")), "a/b.js");
    }
}
