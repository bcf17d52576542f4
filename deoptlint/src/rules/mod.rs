use crate::ast::{NodeId, SyntaxTree};
use crate::config::Config;
use crate::fix::Fix;
use crate::utils::LineIndex;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
/// Context passed to rules during analysis.
pub struct Context {
    /// Path to the file being analyzed.
    pub filename: PathBuf,
    /// Line index for accurate line/column mapping.
    pub line_index: LineIndex,
    /// Configuration settings.
    pub config: Config,
}

impl Context {
    /// Context for `source` with default configuration.
    #[must_use]
    pub fn for_source(filename: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            filename: filename.into(),
            line_index: LineIndex::new(source),
            config: Config::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// A single issue found by a rule.
pub struct Finding {
    /// ID of the rule that triggered the finding.
    pub rule_id: String,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Category of the rule.
    pub category: String,
    /// Severity level (e.g., "warning", "error").
    pub severity: String,
    /// Description of the issue.
    pub message: String,
    /// File where the issue was found.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub col: usize,
    /// Start byte offset of the flagged node.
    pub start_byte: usize,
    /// End byte offset of the flagged node.
    pub end_byte: usize,
    /// Proposed fix, when one can be built safely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    /// Extra remarks, e.g. why no fix is offered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
/// Metadata associated with a rule.
pub struct RuleMetadata {
    /// Unique code/ID of the rule.
    pub id: &'static str,
    /// Kebab-case rule name, as used in `eslint-disable` comments.
    pub name: &'static str,
    /// Category of the rule.
    pub category: &'static str,
    /// Whether the rule can propose fixes.
    pub fixable: bool,
    /// One-line description.
    pub summary: &'static str,
}

/// Trait defining a linting rule.
pub trait Rule: Send + Sync {
    /// Returns the descriptive name of the rule.
    fn name(&self) -> &'static str {
        self.metadata().name
    }
    /// Returns the unique code/ID of the rule.
    fn code(&self) -> &'static str {
        self.metadata().id
    }
    /// Returns the category/functional group of the rule.
    fn category(&self) -> &'static str {
        self.metadata().category
    }
    /// Returns the full metadata for the rule.
    fn metadata(&self) -> RuleMetadata;
    /// Called when entering a node, before its children.
    fn check_node(
        &mut self,
        _node: NodeId,
        _tree: &SyntaxTree,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called when leaving a node, after its children.
    fn leave_node(
        &mut self,
        _node: NodeId,
        _tree: &SyntaxTree,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
}

/// Returns every rule not switched off by `config`.
#[must_use]
pub fn get_rules(config: &Config) -> Vec<Box<dyn Rule>> {
    performance::get_performance_rules()
        .into_iter()
        .filter(|rule| !config.deoptlint.is_ignored(rule.code()))
        .collect()
}

/// Metadata of every rule, for listings.
#[must_use]
pub fn all_rules_metadata() -> Vec<RuleMetadata> {
    performance::get_performance_rules()
        .iter()
        .map(|rule| rule.metadata())
        .collect()
}

/// Module containing rule ID constants.
pub mod ids;
/// Module containing performance rules.
pub mod performance;
