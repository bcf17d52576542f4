use crate::ast::{NodeId, SyntaxTree};
use crate::rules::{get_rules, Context, Finding, Rule};

/// Visitor for traversing the syntax tree and applying linter rules.
pub struct LinterVisitor {
    rules: Vec<Box<dyn Rule>>,
    context: Context,
    /// List of findings collected during the traversal.
    pub findings: Vec<Finding>,
}

impl LinterVisitor {
    /// Creates a new `LinterVisitor` with the given rules and context.
    #[must_use]
    pub fn new(rules: Vec<Box<dyn Rule>>, context: Context) -> Self {
        Self {
            rules,
            context,
            findings: Vec::new(),
        }
    }

    /// Visits every node of `tree` in source order, calling `check_node` on
    /// the way down and `leave_node` on the way up.
    ///
    /// Iterative, so deeply nested input cannot overflow the stack.
    pub fn visit_tree(&mut self, tree: &SyntaxTree) {
        enum Step {
            Enter(NodeId),
            Leave(NodeId),
        }

        let mut stack = vec![Step::Enter(tree.root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    for rule in &mut self.rules {
                        if let Some(mut findings) = rule.check_node(id, tree, &self.context) {
                            self.findings.append(&mut findings);
                        }
                    }
                    stack.push(Step::Leave(id));
                    if let Some(kind) = tree.kind(id) {
                        stack.extend(kind.children().into_iter().rev().map(Step::Enter));
                    }
                }
                Step::Leave(id) => {
                    for rule in &mut self.rules {
                        if let Some(mut findings) = rule.leave_node(id, tree, &self.context) {
                            self.findings.append(&mut findings);
                        }
                    }
                }
            }
        }
    }

    /// Consumes the visitor, returning its findings ordered by position.
    #[must_use]
    pub fn into_findings(mut self) -> Vec<Finding> {
        self.findings
            .sort_by_key(|finding| (finding.start_byte, finding.end_byte));
        self.findings
    }
}

/// Run every rule over `tree` with default configuration.
///
/// Pure and synchronous; findings are ordered by position and carry the
/// placeholder file name `<input>`.
#[must_use]
pub fn analyze(tree: &SyntaxTree) -> Vec<Finding> {
    analyze_with_context(tree, Context::for_source("<input>", tree.source()))
}

/// Run the rules enabled by `context.config` over `tree`.
#[must_use]
pub fn analyze_with_context(tree: &SyntaxTree, context: Context) -> Vec<Finding> {
    let rules = get_rules(&context.config);
    let mut visitor = LinterVisitor::new(rules, context);
    visitor.visit_tree(tree);
    visitor.into_findings()
}
