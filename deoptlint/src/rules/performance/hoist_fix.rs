//! Fix for computed-key inline functions: move the function out of the
//! object literal into an assignment right after the declaration.
//!
//! ```text
//! const handlers = { a: 1, [key]() { ... } };
//! ```
//! becomes
//! ```text
//! const handlers = { a: 1 };
//! handlers[key] = function() { ... };
//! ```
//!
//! A fix is only built when the assignment provably behaves like the
//! original definition. Own-property enumeration order and the inferred
//! `Function.prototype.name` of the moved function do change.

use crate::ast::{LiteralValue, NodeId, NodeKind, Property, SyntaxTree};
use crate::fix::{Edit, Fix, RewriteError};
use crate::utils::LineIndex;

/// Why no fix is offered for a flagged entry.
#[derive(Debug, thiserror::Error)]
pub enum Unfixable {
    /// The tree does not have the expected shape around the entry
    #[error("syntax tree around the entry is incomplete")]
    Malformed,
    /// `get [k]() {}` / `set [k](v) {}`
    #[error("getters and setters cannot be replaced by an assignment")]
    Accessor,
    /// The literal is not the initializer of a plain `const|let|var N = {...}`
    #[error("object literal is not the initializer of a simple variable binding")]
    NotSimpleBinding,
    /// `const a = {...}, b = 1;`
    #[error("declaration declares more than one variable")]
    MultipleDeclarators,
    /// Declaration inside a `for` head, a label or a braceless `if`
    #[error("declaration is not a standalone statement")]
    NotAStatement,
    /// Key other than a literal, an identifier or a property chain
    #[error("computed key may have side effects or depend on evaluation order")]
    UnsupportedKey,
    /// `const o = { [o.k]() {} }`: the key is evaluated before `o` is bound
    #[error("computed key reads the variable being declared")]
    SelfReference,
    /// Method body uses `super`, which a function expression cannot
    #[error("method body references `super`")]
    UsesSuper,
    /// Assignment would run the literal's setter instead of defining a property
    #[error("object literal defines getters or setters")]
    AccessorInObject,
    /// Assignment to `__proto__` would change the prototype
    #[error("entry or object literal involves `__proto__`")]
    ProtoKey,
    /// A spread after the entry may redefine its key
    #[error("a spread element follows the entry")]
    SpreadAfter,
    /// Later computed entries are moved first
    #[error("a later entry has a computed key; fix that one first")]
    LaterComputed,
    /// The later definition would be overwritten by the assignment
    #[error("a later entry defines the same key")]
    DuplicateKey,
    /// A later value could change what the key evaluates to
    #[error("a later entry's value may have side effects")]
    ImpureSibling,
    /// The edits could not be validated
    #[error("edits are invalid: {0}")]
    Rewrite(#[from] RewriteError),
}

/// Shape of the moved entry's key.
enum KeyShape {
    /// Literal key with a known property name
    Named(String),
    /// Identifier or property chain, evaluated at run time
    Reference,
}

/// The binding that receives the assignment.
struct Binding<'t> {
    name: &'t str,
    declarator: NodeId,
    statement: NodeId,
}

/// Build the hoisting fix for the entry `prop_id`.
///
/// # Errors
/// Returns the reason the entry cannot be rewritten safely.
pub fn build_fix(
    tree: &SyntaxTree,
    prop_id: NodeId,
    line_index: &LineIndex,
) -> Result<Fix, Unfixable> {
    let Some(NodeKind::Property(prop)) = tree.kind(prop_id) else {
        return Err(Unfixable::Malformed);
    };
    if prop.kind.is_accessor() {
        return Err(Unfixable::Accessor);
    }
    let object = tree.parent(prop_id).ok_or(Unfixable::Malformed)?;
    let Some(NodeKind::ObjectExpression { properties }) = tree.kind(object) else {
        return Err(Unfixable::Malformed);
    };

    let binding = find_binding(tree, object)?;
    let key = classify_key(tree, prop.key, binding.name)?;
    if prop.method && references_super(tree, prop.value) {
        return Err(Unfixable::UsesSuper);
    }
    let index = properties
        .iter()
        .position(|id| *id == prop_id)
        .ok_or(Unfixable::Malformed)?;
    check_siblings(tree, properties, index, &key)?;

    let key_text = tree.node_text(prop.key).ok_or(Unfixable::Malformed)?;
    let function = function_text(tree, prop)?;
    let removal = removal_edit(tree, object, properties, index)?;
    let mut edits = vec![removal];
    edits.extend(insertion_edits(tree, &binding, line_index, key_text, &function)?);

    Ok(Fix::new(edits, tree.source())?)
}

fn find_binding(tree: &SyntaxTree, object: NodeId) -> Result<Binding<'_>, Unfixable> {
    let declarator = tree.parent(object).ok_or(Unfixable::NotSimpleBinding)?;
    let Some(NodeKind::VariableDeclarator(decl)) = tree.kind(declarator) else {
        return Err(Unfixable::NotSimpleBinding);
    };
    if decl.init != Some(object) {
        return Err(Unfixable::NotSimpleBinding);
    }
    let Some(NodeKind::Identifier { name }) = tree.kind(decl.id) else {
        return Err(Unfixable::NotSimpleBinding);
    };

    let declaration = tree.parent(declarator).ok_or(Unfixable::NotAStatement)?;
    let Some(NodeKind::VariableDeclaration(declaration_kind)) = tree.kind(declaration) else {
        return Err(Unfixable::NotSimpleBinding);
    };
    if declaration_kind.declarations.len() != 1 {
        return Err(Unfixable::MultipleDeclarators);
    }

    let mut statement = declaration;
    let mut container = tree.parent(declaration).ok_or(Unfixable::NotAStatement)?;
    if let Some(NodeKind::ExportNamedDeclaration {
        declaration: Some(inner),
    }) = tree.kind(container)
    {
        if *inner == declaration {
            statement = container;
            container = tree.parent(container).ok_or(Unfixable::NotAStatement)?;
        }
    }
    if !matches!(
        tree.kind(container),
        Some(
            NodeKind::Program { .. } | NodeKind::BlockStatement { .. } | NodeKind::SwitchCase(_)
        )
    ) {
        return Err(Unfixable::NotAStatement);
    }

    Ok(Binding {
        name: name.as_str(),
        declarator,
        statement,
    })
}

fn classify_key(tree: &SyntaxTree, key: NodeId, binding: &str) -> Result<KeyShape, Unfixable> {
    let shape = match tree.kind(key) {
        Some(NodeKind::Literal(literal)) => {
            KeyShape::Named(literal_name(literal).ok_or(Unfixable::UnsupportedKey)?)
        }
        Some(NodeKind::Identifier { .. } | NodeKind::MemberExpression(_)) => {
            let root = chain_root(tree, key).ok_or(Unfixable::UnsupportedKey)?;
            if root == binding {
                return Err(Unfixable::SelfReference);
            }
            KeyShape::Reference
        }
        _ => return Err(Unfixable::UnsupportedKey),
    };
    if matches!(&shape, KeyShape::Named(name) if name == "__proto__") {
        return Err(Unfixable::ProtoKey);
    }
    Ok(shape)
}

/// Root identifier of `a`, `a.b`, `a.b.c`: non-computed, non-optional
/// access rooted at an identifier.
fn chain_root(tree: &SyntaxTree, id: NodeId) -> Option<&str> {
    let mut current = id;
    loop {
        match tree.kind(current)? {
            NodeKind::Identifier { name } => return Some(name.as_str()),
            NodeKind::MemberExpression(member)
                if !member.computed
                    && !member.optional
                    && matches!(tree.kind(member.property), Some(NodeKind::Identifier { .. })) =>
            {
                current = member.object;
            }
            _ => return None,
        }
    }
}

fn literal_name(literal: &LiteralValue) -> Option<String> {
    match literal {
        LiteralValue::String {
            value,
            escaped: false,
        } => Some(value.to_string()),
        LiteralValue::Number(n) => Some(number_key(*n)),
        _ => None,
    }
}

/// Property name of a numeric key, as `ToString` spells it for common values.
#[allow(clippy::float_cmp)]
fn number_key(n: f64) -> String {
    if n == 0.0 {
        return "0".to_owned();
    }
    format!("{n}")
}

/// Static property name of a non-computed entry.
fn static_name(tree: &SyntaxTree, prop: &Property) -> Option<String> {
    match tree.kind(prop.key)? {
        NodeKind::Identifier { name } if !prop.computed => Some(name.to_string()),
        NodeKind::Literal(literal) => literal_name(literal),
        _ => None,
    }
}

fn check_siblings(
    tree: &SyntaxTree,
    properties: &[NodeId],
    index: usize,
    key: &KeyShape,
) -> Result<(), Unfixable> {
    for (i, &sibling) in properties.iter().enumerate() {
        match tree.kind(sibling) {
            Some(NodeKind::Property(other)) => {
                if other.kind.is_accessor() {
                    return Err(Unfixable::AccessorInObject);
                }
                // `{ __proto__: p }` sets the prototype, whose setters the
                // assignment could hit
                if !other.computed
                    && !other.shorthand
                    && !other.method
                    && static_name(tree, other).as_deref() == Some("__proto__")
                {
                    return Err(Unfixable::ProtoKey);
                }
                if i <= index {
                    continue;
                }
                if other.computed {
                    return Err(Unfixable::LaterComputed);
                }
                match key {
                    KeyShape::Named(name) => {
                        if static_name(tree, other).as_deref() == Some(name.as_str()) {
                            return Err(Unfixable::DuplicateKey);
                        }
                    }
                    KeyShape::Reference => {
                        if !is_pure_value(tree, other.value) {
                            return Err(Unfixable::ImpureSibling);
                        }
                    }
                }
            }
            Some(NodeKind::SpreadElement { .. }) => {
                if i > index {
                    return Err(Unfixable::SpreadAfter);
                }
            }
            _ => return Err(Unfixable::Malformed),
        }
    }
    Ok(())
}

/// Expressions whose evaluation cannot run user code that changes bindings.
fn is_pure_value(tree: &SyntaxTree, id: NodeId) -> bool {
    let mut pending = vec![id];
    while let Some(id) = pending.pop() {
        match tree.kind(id) {
            Some(
                NodeKind::Literal(_)
                | NodeKind::Identifier { .. }
                | NodeKind::ThisExpression
                | NodeKind::FunctionExpression(_)
                | NodeKind::ArrowFunctionExpression(_),
            ) => {}
            Some(NodeKind::MemberExpression(_)) if chain_root(tree, id).is_some() => {}
            Some(NodeKind::ObjectExpression { properties }) => {
                for entry in properties {
                    match tree.kind(*entry) {
                        Some(NodeKind::Property(prop))
                            if !prop.computed && !prop.kind.is_accessor() =>
                        {
                            pending.push(prop.value);
                        }
                        _ => return false,
                    }
                }
            }
            _ => return false,
        }
    }
    true
}

/// Whether a method body uses `super` bound to the method's home object.
fn references_super(tree: &SyntaxTree, function: NodeId) -> bool {
    let mut walk = tree.preorder(function);
    // the method itself
    let _ = walk.next();
    while let Some(id) = walk.next() {
        match tree.kind(id) {
            Some(NodeKind::Super) => return true,
            Some(kind) if kind.rebinds_super() => walk.skip_children(id),
            _ => {}
        }
    }
    false
}

fn function_text(tree: &SyntaxTree, prop: &Property) -> Result<String, Unfixable> {
    let value_text = tree.node_text(prop.value).ok_or(Unfixable::Malformed)?;
    if !prop.method {
        return Ok(value_text.to_owned());
    }
    let Some(NodeKind::FunctionExpression(function)) = tree.kind(prop.value) else {
        return Err(Unfixable::Malformed);
    };
    // Method functions span parameters through body
    if !value_text.starts_with('(') {
        return Err(Unfixable::Malformed);
    }
    let mut text = String::with_capacity(value_text.len() + 16);
    if function.is_async {
        text.push_str("async ");
    }
    text.push_str("function");
    if function.generator {
        text.push('*');
    }
    text.push_str(value_text);
    Ok(text)
}

fn removal_edit(
    tree: &SyntaxTree,
    object: NodeId,
    properties: &[NodeId],
    index: usize,
) -> Result<Edit, Unfixable> {
    let own = tree
        .range(properties[index])
        .ok_or(Unfixable::Malformed)?;

    let edit = if properties.len() == 1 {
        let outer = tree.range(object).ok_or(Unfixable::Malformed)?;
        let text = tree.text(outer).ok_or(Unfixable::Malformed)?;
        if outer.len() < 2 || !text.starts_with('{') || !text.ends_with('}') {
            return Err(Unfixable::Malformed);
        }
        Edit::delete(outer.start + 1, outer.end - 1)
    } else if index + 1 == properties.len() {
        let previous = tree
            .range(properties[index - 1])
            .ok_or(Unfixable::Malformed)?;
        Edit::delete(previous.end, own.end)
    } else {
        let next = tree
            .range(properties[index + 1])
            .ok_or(Unfixable::Malformed)?;
        Edit::delete(own.start, next.start)
    };

    Ok(edit.described("remove computed entry"))
}

/// Insert the assignment on its own line after the declaration, keeping a
/// trailing `// comment` on the declaration's line.
///
/// Termination is read right after the declarator, since the statement's
/// range may already cover a trailing comment.
fn insertion_edits(
    tree: &SyntaxTree,
    binding: &Binding<'_>,
    line_index: &LineIndex,
    key_text: &str,
    function: &str,
) -> Result<Vec<Edit>, Unfixable> {
    let statement = tree.range(binding.statement).ok_or(Unfixable::Malformed)?;
    let indent = line_index.indentation(statement.start);
    let assignment = format!("\n{indent}{}[{key_text}] = {function};", binding.name);
    let describe = |edit: Edit| edit.described("assign function after declaration");

    let source = tree.source();
    let anchor = tree
        .range(binding.declarator)
        .ok_or(Unfixable::Malformed)?
        .end;
    let after = source.get(anchor..).ok_or(Unfixable::Malformed)?;
    let rest = after.trim_start();
    if rest.starts_with(';') {
        let end = anchor + (after.len() - rest.len()) + 1;
        let position = trailing_comment_end(source, end).unwrap_or(end);
        return Ok(vec![describe(Edit::insert(position, assignment))]);
    }

    let edits = match trailing_comment_end(source, anchor) {
        Some(comment_end) => vec![
            Edit::insert(anchor, ";").described("terminate declaration"),
            describe(Edit::insert(comment_end, assignment)),
        ],
        None => vec![describe(Edit::insert(anchor, format!(";{assignment}")))],
    };
    Ok(edits)
}

/// End of a `// comment` that follows `from` on the same line.
fn trailing_comment_end(source: &str, from: usize) -> Option<usize> {
    let rest = source.get(from..)?;
    let line = rest.split('\n').next().unwrap_or(rest);
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.trim_start()
        .starts_with("//")
        .then_some(from + line.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_key_spelling() {
        assert_eq!(number_key(1.0), "1");
        assert_eq!(number_key(-0.0), "0");
        assert_eq!(number_key(0.5), "0.5");
    }

    #[test]
    fn test_trailing_comment_end() {
        let source = "const a = {}; // note\nnext();";
        let end = source.find(';').unwrap() + 1;
        assert_eq!(trailing_comment_end(source, end), source.find('\n'));
        assert_eq!(trailing_comment_end("x; y();\n", 2), None);
    }

    #[test]
    fn test_literal_name_rejects_escapes() {
        let escaped = LiteralValue::String {
            value: "a\\u0062".into(),
            escaped: true,
        };
        assert_eq!(literal_name(&escaped), None);
        assert_eq!(literal_name(&LiteralValue::Boolean(true)), None);
    }
}
