use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{CONFIG_FILENAME, DEFAULT_MAX_FIX_PASSES, PACKAGE_JSON_FILENAME};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section.
    pub deoptlint: DeoptLintConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options.
pub struct DeoptLintConfig {
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include even if excluded by default.
    pub include_folders: Option<Vec<String>>,
    /// File extensions to analyze, without the dot.
    pub extensions: Option<Vec<String>>,
    /// List of rule ids to ignore.
    pub ignore: Option<Vec<String>>,
    /// Maximum number of fix passes per file.
    pub max_fix_passes: Option<usize>,
}

impl DeoptLintConfig {
    /// Configured fix pass limit, at least one.
    #[must_use]
    pub fn max_fix_passes(&self) -> usize {
        self.max_fix_passes.unwrap_or(DEFAULT_MAX_FIX_PASSES).max(1)
    }

    /// Whether `rule_id` is switched off.
    #[must_use]
    pub fn is_ignored(&self, rule_id: &str) -> bool {
        self.ignore
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id.eq_ignore_ascii_case(rule_id)))
    }
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    deoptlint: Option<DeoptLintConfig>,
}

impl Config {
    /// Loads configuration from the current directory and its parents.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// In each directory `.deoptlint.toml` wins over a `"deoptlint"` key in
    /// `package.json`. Unreadable or invalid files are skipped.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let dedicated = current.join(CONFIG_FILENAME);
            if dedicated.exists() {
                match fs::read_to_string(&dedicated)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        toml::from_str::<Config>(&content).map_err(|e| e.to_string())
                    }) {
                    Ok(mut config) => {
                        config.config_file_path = Some(dedicated);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %dedicated.display(), error = %e, "ignoring invalid config file");
                    }
                }
            }

            let manifest = current.join(PACKAGE_JSON_FILENAME);
            if manifest.exists() {
                if let Ok(content) = fs::read_to_string(&manifest) {
                    if let Ok(PackageJson {
                        deoptlint: Some(section),
                    }) = serde_json::from_str::<PackageJson>(&content)
                    {
                        return Config {
                            deoptlint: section,
                            config_file_path: Some(manifest),
                        };
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_path_no_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(dir.path());
        assert!(config.deoptlint.exclude_folders.is_none());
        assert_eq!(config.deoptlint.max_fix_passes(), DEFAULT_MAX_FIX_PASSES);
    }

    #[test]
    fn test_load_from_path_dedicated_toml() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILENAME)).unwrap();
        writeln!(
            file,
            r#"[deoptlint]
extensions = ["js", "ts"]
max_fix_passes = 3
ignore = ["dl-p001"]
"#
        )
        .unwrap();

        let config = Config::load_from_path(dir.path());
        assert_eq!(
            config.deoptlint.extensions,
            Some(vec!["js".to_owned(), "ts".to_owned()])
        );
        assert_eq!(config.deoptlint.max_fix_passes(), 3);
        assert!(config.deoptlint.is_ignored("DL-P001"));
        assert!(config.config_file_path.is_some());
    }

    #[test]
    fn test_load_from_package_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PACKAGE_JSON_FILENAME),
            r#"{ "name": "demo", "deoptlint": { "exclude_folders": ["vendor"] } }"#,
        )
        .unwrap();

        let config = Config::load_from_path(dir.path());
        assert_eq!(
            config.deoptlint.exclude_folders,
            Some(vec!["vendor".to_owned()])
        );
    }

    #[test]
    fn test_package_json_without_section_is_skipped() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("pkg");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(PACKAGE_JSON_FILENAME), r#"{ "name": "inner" }"#).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[deoptlint]\nmax_fix_passes = 2\n",
        )
        .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(config.deoptlint.max_fix_passes(), 2);
    }

    #[test]
    fn test_load_from_path_traverses_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[deoptlint]\ninclude_folders = [\"build\"]\n",
        )
        .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(
            config.deoptlint.include_folders,
            Some(vec!["build".to_owned()])
        );
    }

    #[test]
    fn test_zero_passes_clamped() {
        let config: Config = toml::from_str("[deoptlint]\nmax_fix_passes = 0\n").unwrap();
        assert_eq!(config.deoptlint.max_fix_passes(), 1);
    }
}
