use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Dedicated configuration file name.
pub const CONFIG_FILENAME: &str = ".deoptlint.toml";

/// npm manifest; its `"deoptlint"` key is read as configuration.
pub const PACKAGE_JSON_FILENAME: &str = "package.json";

/// Upper bound on fix passes when none is configured.
pub const DEFAULT_MAX_FIX_PASSES: usize = 10;

/// File extensions analyzed when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

/// Regex for suppression comments.
///
/// Matches `deoptlint-disable-line` and `deoptlint-disable-next-line`, each
/// optionally followed by rule ids, and `eslint-disable-line` /
/// `eslint-disable-next-line` naming rules. Group 1 is the directive
/// (`line` or `next-line`), group 2 the optional rule list.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_suppression_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(
            r"(?://|/\*)\s*(?:deoptlint|eslint)-disable-(line|next-line)\b[ \t]*([A-Za-z0-9_\-/@, \t]*)",
        )
        .expect("Invalid suppression regex pattern")
    })
}

/// Set of folders to exclude by default.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("node_modules");
        s.insert(".git");
        s.insert("dist");
        s.insert("build");
        s.insert("coverage");
        s.insert(".next");
        s.insert("*.min.js");
        s
    })
}

pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_suppression_re as SUPPRESSION_RE;
