use crate::ast::TextRange;
use crate::rules::{ids, Context, Finding, Rule, RuleMetadata};

mod computed_inline_function;
pub mod hoist_fix;

pub use computed_inline_function::{is_computed_inline_function, ComputedInlineFunctionRule};

/// Category constant for performance rules.
pub const CAT_PERFORMANCE: &str = "Performance";

pub(super) const META_COMPUTED_INLINE_FUNCTION: RuleMetadata = RuleMetadata {
    id: ids::RULE_ID_COMPUTED_INLINE_FUNCTION,
    name: ids::RULE_NAME_COMPUTED_INLINE_FUNCTION,
    category: CAT_PERFORMANCE,
    fixable: true,
    summary: "Object literal entry with a computed key and an inline function value",
};

/// Returns a list of all performance rules.
#[must_use]
pub fn get_performance_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(ComputedInlineFunctionRule)]
}

/// Create a Finding with accurate line/column mapping from a node range.
pub(super) fn create_finding(
    msg: &str,
    metadata: RuleMetadata,
    context: &Context,
    range: TextRange,
    severity: &str,
) -> Finding {
    let line = context.line_index.line_index(range.start);
    let col = context.line_index.column_index(range.start);
    Finding {
        message: msg.to_owned(),
        rule_id: metadata.id.to_owned(),
        rule_name: metadata.name.to_owned(),
        category: metadata.category.to_owned(),
        file: context.filename.clone(),
        line,
        col,
        start_byte: range.start,
        end_byte: range.end,
        severity: severity.to_owned(),
        fix: None,
        notes: Vec::new(),
    }
}
