//! Builder-style methods for the analyzer.

use super::DeoptLint;
use crate::config::Config;
use crate::constants::DEFAULT_EXTENSIONS;

impl DeoptLint {
    /// Creates a new analyzer, taking folders and extensions from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let section = &config.deoptlint;
        let extensions = section.extensions.clone().unwrap_or_else(|| {
            DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_owned())
                .collect()
        });
        Self {
            exclude_folders: section.exclude_folders.clone().unwrap_or_default(),
            include_folders: section.include_folders.clone().unwrap_or_default(),
            extensions,
            total_files_analyzed: 0,
            total_lines_analyzed: 0,
            config,
            progress_bar: None,
            verbose: false,
        }
    }

    /// Builder-style method to set verbose mode.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder-style method to add excluded folders.
    #[must_use]
    pub fn with_excludes(mut self, folders: Vec<String>) -> Self {
        for folder in folders {
            if !self.exclude_folders.contains(&folder) {
                self.exclude_folders.push(folder);
            }
        }
        self
    }

    /// Builder-style method to add force-included folders.
    #[must_use]
    pub fn with_includes(mut self, folders: Vec<String>) -> Self {
        self.include_folders.extend(folders);
        self
    }

    /// Builder-style method to replace the analyzed extensions.
    ///
    /// Leading dots are stripped, so `.js` and `js` are equivalent.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        if !extensions.is_empty() {
            self.extensions = extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_owned())
                .collect();
        }
        self
    }

    /// Builder-style method to attach a progress bar.
    #[must_use]
    pub fn with_progress(mut self, bar: std::sync::Arc<indicatif::ProgressBar>) -> Self {
        self.progress_bar = Some(bar);
        self
    }

    /// Counts the files an analysis of `paths` would visit.
    ///
    /// Useful for setting up a progress bar before analysis.
    #[must_use]
    pub fn count_files(&self, paths: &[std::path::PathBuf]) -> usize {
        self.collect_files(paths).len()
    }
}
