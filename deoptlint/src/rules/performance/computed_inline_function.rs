use super::{create_finding, hoist_fix, META_COMPUTED_INLINE_FUNCTION};
use crate::ast::{NodeId, NodeKind, SyntaxTree};
use crate::rules::{Context, Finding, Rule, RuleMetadata};

const MESSAGE: &str = "Computed property key with an inline function value: engines such as V8 and JSC deoptimize this construction pattern (often an order of magnitude slower); assign the function after the object is created";

/// Flags object literal entries such as `{ [key]() {} }` or
/// `{ [key]: () => {} }` and attaches a hoisting fix where it is safe.
pub struct ComputedInlineFunctionRule;

impl Rule for ComputedInlineFunctionRule {
    fn metadata(&self) -> RuleMetadata {
        META_COMPUTED_INLINE_FUNCTION
    }

    fn check_node(
        &mut self,
        node: NodeId,
        tree: &SyntaxTree,
        context: &Context,
    ) -> Option<Vec<Finding>> {
        if !is_computed_inline_function(tree, node) {
            return None;
        }
        let range = tree.range(node)?;
        let mut finding = create_finding(
            MESSAGE,
            META_COMPUTED_INLINE_FUNCTION,
            context,
            range,
            "warning",
        );

        match hoist_fix::build_fix(tree, node, &context.line_index) {
            Ok(fix) => finding.fix = Some(fix),
            Err(reason) => {
                tracing::debug!(
                    file = %context.filename.display(),
                    line = finding.line,
                    %reason,
                    "fix withheld"
                );
                finding.notes.push(format!("auto-fix unavailable: {reason}"));
            }
        }

        Some(vec![finding])
    }
}

/// Whether `node` is an object literal entry with a computed key whose value
/// is a function written in place (function expression, arrow function or
/// method shorthand, including accessors).
#[must_use]
pub fn is_computed_inline_function(tree: &SyntaxTree, node: NodeId) -> bool {
    let Some(NodeKind::Property(prop)) = tree.kind(node) else {
        return false;
    };
    if !prop.computed {
        return false;
    }
    let in_object_literal = tree
        .parent(node)
        .and_then(|parent| tree.kind(parent))
        .is_some_and(|kind| matches!(kind, NodeKind::ObjectExpression { .. }));
    if !in_object_literal {
        return false;
    }
    prop.method
        || prop.kind.is_accessor()
        || tree
            .kind(prop.value)
            .is_some_and(NodeKind::is_inline_function)
}
