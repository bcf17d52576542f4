//! Utilities shared by the analyzer and the commands.

mod paths;

pub use paths::{collect_source_files, is_excluded, normalize_display_path};

use crate::constants::{DEFAULT_EXCLUDE_FOLDERS, SUPPRESSION_RE};
use rustc_hash::{FxHashMap, FxHashSet};

/// Converts byte offsets to 1-indexed line and column numbers.
///
/// Columns count characters, not bytes, so they match what editors show.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte index of the start of each line.
    line_starts: Vec<usize>,
    /// Whether every line is ASCII, in which case byte and char columns agree.
    ascii: bool,
    source: String,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        // '\n' is always a single byte in UTF-8
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            ascii: source.is_ascii(),
            source: source.to_owned(),
        }
    }

    /// Converts a byte offset to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Converts a byte offset to a 1-indexed column number.
    #[must_use]
    pub fn column_index(&self, offset: usize) -> usize {
        let line = self.line_index(offset);
        let start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        if self.ascii {
            return offset.saturating_sub(start) + 1;
        }
        self.source
            .get(start..offset)
            .map_or(offset.saturating_sub(start), |text| text.chars().count())
            + 1
    }

    /// Leading spaces and tabs of the line containing `offset`.
    #[must_use]
    pub fn indentation(&self, offset: usize) -> &str {
        let line = self.line_index(offset);
        let start = self.line_starts.get(line - 1).copied().unwrap_or(0);
        let rest = self.source.get(start..).unwrap_or("");
        let width = rest
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &rest[..width]
    }
}

/// Suppression specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Suppression {
    /// Suppress all findings.
    All,
    /// Suppress findings for specific rule ids or names (stored upper-cased).
    Specific(FxHashSet<String>),
}

/// Detects a suppression comment on a line.
///
/// Returns the line the comment applies to, relative to this one (`0` for
/// `disable-line`, `1` for `disable-next-line`), and what it suppresses.
///
/// Supported forms:
/// - `// deoptlint-disable-line` (all rules)
/// - `// deoptlint-disable-next-line DL-P001`
/// - `// eslint-disable-line no-computed-inline-function`
#[must_use]
pub fn get_line_suppression(line: &str) -> Option<(usize, Suppression)> {
    let caps = SUPPRESSION_RE().captures(line)?;
    let delta = usize::from(caps.get(1).is_some_and(|m| m.as_str() == "next-line"));

    // `-- reason` ends the rule list
    let list = caps.get(2).map_or("", |m| m.as_str());
    let list = list.split("--").next().unwrap_or("");

    let rules: FxHashSet<String> = list
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|rule| {
            // `plugin/rule-name` names the rule as `rule-name`
            rule.rsplit('/').next().unwrap_or(rule).to_uppercase()
        })
        .collect();

    if rules.is_empty() {
        Some((delta, Suppression::All))
    } else {
        Some((delta, Suppression::Specific(rules)))
    }
}

/// Detects lines with suppression comments in a source file.
///
/// Returns a map of line numbers (1-indexed) to suppression specs.
#[must_use]
pub fn get_ignored_lines(source: &str) -> FxHashMap<usize, Suppression> {
    let mut ignored: FxHashMap<usize, Suppression> = FxHashMap::default();
    for (i, line) in source.lines().enumerate() {
        let Some((delta, suppression)) = get_line_suppression(line) else {
            continue;
        };
        let target = i + 1 + delta;
        match (ignored.get_mut(&target), suppression) {
            (Some(Suppression::Specific(existing)), Suppression::Specific(more)) => {
                existing.extend(more);
            }
            (Some(Suppression::All), _) => {}
            (_, suppression) => {
                ignored.insert(target, suppression);
            }
        }
    }
    ignored
}

/// Checks if a finding of the given rule is suppressed on `line`.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn is_line_suppressed(
    ignored_lines: &FxHashMap<usize, Suppression>,
    line: usize,
    rule_id: &str,
    rule_name: &str,
) -> bool {
    match ignored_lines.get(&line) {
        Some(Suppression::All) => true,
        Some(Suppression::Specific(rules)) => {
            rules.contains(&rule_id.to_uppercase()) || rules.contains(&rule_name.to_uppercase())
        }
        None => false,
    }
}

/// Parses exclude folders, combining defaults with user inputs.
#[must_use]
pub fn parse_exclude_folders(
    user_exclude_folders: &[String],
    use_defaults: bool,
    include_folders: &[String],
) -> Vec<String> {
    let mut exclude_folders: Vec<String> = Vec::new();
    if use_defaults {
        let mut defaults: Vec<&str> = DEFAULT_EXCLUDE_FOLDERS().iter().copied().collect();
        defaults.sort_unstable();
        exclude_folders.extend(defaults.into_iter().map(str::to_owned));
    }
    for folder in user_exclude_folders {
        if !exclude_folders.contains(folder) {
            exclude_folders.push(folder.clone());
        }
    }
    exclude_folders.retain(|folder| !include_folders.contains(folder));
    exclude_folders
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_index(0), 1);
        assert_eq!(index.line_index(3), 2);
        assert_eq!(index.column_index(4), 2);
    }

    #[test]
    fn test_column_counts_chars() {
        let source = "const é = { [k]() {} };";
        let index = LineIndex::new(source);
        let offset = source.find('{').unwrap();
        assert_eq!(index.column_index(offset), 11);
    }

    #[test]
    fn test_indentation() {
        let source = "if (x) {\n\t  const a = 1;\n}";
        let index = LineIndex::new(source);
        let offset = source.find("const").unwrap();
        assert_eq!(index.indentation(offset), "\t  ");
        assert_eq!(index.indentation(0), "");
    }

    #[test]
    fn test_bare_disable_line() {
        assert_eq!(
            get_line_suppression("foo(); // deoptlint-disable-line"),
            Some((0, Suppression::All))
        );
    }

    #[test]
    fn test_specific_next_line() {
        let (delta, suppression) =
            get_line_suppression("// deoptlint-disable-next-line dl-p001, other -- reason").unwrap();
        assert_eq!(delta, 1);
        let Suppression::Specific(rules) = suppression else {
            panic!("expected specific rules");
        };
        assert!(rules.contains("DL-P001"));
        assert!(rules.contains("OTHER"));
        assert!(!rules.contains("REASON"));
    }

    #[test]
    fn test_eslint_plugin_prefix() {
        let ignored = get_ignored_lines(
            "const a = 1; // eslint-disable-line deoptlint/no-computed-inline-function\n",
        );
        assert!(is_line_suppressed(
            &ignored,
            1,
            "DL-P001",
            "no-computed-inline-function"
        ));
    }

    #[test]
    fn test_other_rule_not_suppressed() {
        let ignored = get_ignored_lines("x(); // eslint-disable-line no-console\n");
        assert!(!is_line_suppressed(
            &ignored,
            1,
            "DL-P001",
            "no-computed-inline-function"
        ));
    }

    #[test]
    fn test_plain_comment_ignored() {
        assert!(get_line_suppression("// nothing to see").is_none());
    }

    #[test]
    fn test_parse_exclude_folders() {
        let folders = parse_exclude_folders(&["vendor".to_owned()], true, &["dist".to_owned()]);
        assert!(folders.contains(&"node_modules".to_owned()));
        assert!(folders.contains(&"vendor".to_owned()));
        assert!(!folders.contains(&"dist".to_owned()));
    }
}
