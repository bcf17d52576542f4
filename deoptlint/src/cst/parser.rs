//! Tree-sitter based parser for JavaScript source code.

use super::CstError;
use crate::ast::lowering::{self, lower_tree, Field, Lowering, Plan};
use crate::ast::{
    ArrowFunction, ClassMember, Function, LiteralValue, MemberExpression, NodeId, NodeKind,
    Other, Property, PropertyKind, SwitchCase, SyntaxTree, TextRange, TreeBuilder,
    VariableDeclaration, VariableDeclarator, VariableKind,
};
use compact_str::CompactString;
use tree_sitter::{Node, Parser};

/// Tree-sitter based CST parser
pub struct CstParser {
    parser: Parser,
}

impl CstParser {
    /// Create a new CST parser for JavaScript
    ///
    /// # Errors
    /// Returns error if parser creation fails
    pub fn new() -> Result<Self, CstError> {
        let mut parser = Parser::new();

        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| CstError::ParserCreation(e.to_string()))?;

        Ok(Self { parser })
    }

    /// Parse source code into a [`SyntaxTree`]
    ///
    /// # Errors
    /// Returns error if parsing fails or the source contains syntax errors
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, CstError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(CstError::ParseFailed)?;
        let root = tree.root_node();

        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(CstError::Syntax {
                line: at.row + 1,
                column: at.column + 1,
            });
        }

        lower_tree(&mut Lowerer { source }, root, source).ok_or(CstError::ParseFailed)
    }
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

fn range_of(node: Node<'_>) -> TextRange {
    TextRange::new(node.start_byte(), node.end_byte())
}

/// Named children, without comments.
fn named<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether `node` has the anonymous token `token` starting before `before`.
fn has_token(node: Node<'_>, token: &str, before: usize) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token && child.start_byte() < before);
    found
}

/// Unwraps `[expr]` to `expr`.
fn property_key(name: Node<'_>) -> Option<(Node<'_>, bool)> {
    if name.kind() == "computed_property_name" {
        named(name).into_iter().next().map(|inner| (inner, true))
    } else {
        Some((name, false))
    }
}

/// What a tree-sitter node lowers to, decided before its children are.
enum Shape {
    Program,
    Block,
    SwitchCase,
    Declaration(VariableKind),
    Declarator,
    Export,
    Expression,
    Return,
    Object,
    Pair { computed: bool },
    Shorthand(CompactString),
    Spread,
    Method(MethodShape),
    ClassBody,
    Field { computed: bool, is_static: bool },
    Function { declaration: bool, is_async: bool, generator: bool },
    Arrow { is_async: bool, expression: bool },
    Member { computed: bool, optional: bool },
    Leaf(NodeKind),
    Other,
}

/// Object literal methods become `Property` nodes and class methods
/// `MethodDefinition` nodes; both get a synthesized `FunctionExpression`
/// spanning parameters through body.
struct MethodShape {
    kind: PropertyKind,
    computed: bool,
    in_class: bool,
    is_static: bool,
    is_async: bool,
    generator: bool,
    function_range: TextRange,
}

type NodePlan<'t> = lowering::Planned<Node<'t>, Shape>;
type ChildFields<'t> = Vec<Field<Node<'t>>>;

struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Shape and children of a node kind the rules inspect; `None` when a
    /// required child is missing.
    fn shape<'t>(&self, node: Node<'t>) -> Option<(Shape, ChildFields<'t>)> {
        let planned = match node.kind() {
            "program" => (Shape::Program, vec![Field::Many(named(node))]),
            "statement_block" => (Shape::Block, vec![Field::Many(named(node))]),
            "switch_case" | "switch_default" => {
                let mut cursor = node.walk();
                let body: Vec<_> = node
                    .children_by_field_name("body", &mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .collect();
                (
                    Shape::SwitchCase,
                    vec![
                        Field::One(node.child_by_field_name("value")),
                        Field::Many(body),
                    ],
                )
            }
            "lexical_declaration" | "variable_declaration" => {
                let kind = if node.kind() == "variable_declaration" {
                    VariableKind::Var
                } else {
                    let keyword = node.child_by_field_name("kind")?;
                    VariableKind::from_keyword(self.text(keyword))?
                };
                let declarators = named(node)
                    .into_iter()
                    .filter(|child| child.kind() == "variable_declarator")
                    .collect();
                (Shape::Declaration(kind), vec![Field::Many(declarators)])
            }
            "variable_declarator" => {
                let name = node.child_by_field_name("name")?;
                (
                    Shape::Declarator,
                    vec![
                        Field::One(Some(name)),
                        Field::One(node.child_by_field_name("value")),
                    ],
                )
            }
            "export_statement" => {
                let declaration = node.child_by_field_name("declaration")?;
                (Shape::Export, vec![Field::One(Some(declaration))])
            }
            "expression_statement" => {
                let expression = named(node).into_iter().next()?;
                (Shape::Expression, vec![Field::One(Some(expression))])
            }
            "return_statement" => (
                Shape::Return,
                vec![Field::One(named(node).into_iter().next())],
            ),
            "object" => (Shape::Object, vec![Field::Many(named(node))]),
            "pair" => {
                let (key, computed) = property_key(node.child_by_field_name("key")?)?;
                let value = node.child_by_field_name("value")?;
                (
                    Shape::Pair { computed },
                    vec![Field::One(Some(key)), Field::One(Some(value))],
                )
            }
            "shorthand_property_identifier" => {
                (Shape::Shorthand(self.text(node).into()), Vec::new())
            }
            "spread_element" => {
                let argument = named(node).into_iter().next()?;
                (Shape::Spread, vec![Field::One(Some(argument))])
            }
            "method_definition" => return method_shape(node),
            "class_body" => (Shape::ClassBody, vec![Field::Many(named(node))]),
            "field_definition" => {
                let name = node.child_by_field_name("property")?;
                let (key, computed) = property_key(name)?;
                (
                    Shape::Field {
                        computed,
                        is_static: has_token(node, "static", name.start_byte()),
                    },
                    vec![
                        Field::One(Some(key)),
                        Field::One(node.child_by_field_name("value")),
                    ],
                )
            }
            "function_expression"
            | "function"
            | "generator_function"
            | "function_declaration"
            | "generator_function_declaration" => {
                let parameters = node.child_by_field_name("parameters")?;
                let body = node.child_by_field_name("body")?;
                let before = parameters.start_byte();
                (
                    Shape::Function {
                        declaration: node.kind().ends_with("_declaration"),
                        is_async: has_token(node, "async", before),
                        generator: node.kind().starts_with("generator_")
                            || has_token(node, "*", before),
                    },
                    vec![
                        Field::One(node.child_by_field_name("name")),
                        Field::Many(named(parameters)),
                        Field::One(Some(body)),
                    ],
                )
            }
            "arrow_function" => {
                let body = node.child_by_field_name("body")?;
                let params = match node.child_by_field_name("parameter") {
                    Some(single) => vec![single],
                    None => node
                        .child_by_field_name("parameters")
                        .map(named)
                        .unwrap_or_default(),
                };
                (
                    Shape::Arrow {
                        is_async: has_token(node, "async", body.start_byte()),
                        expression: body.kind() != "statement_block",
                    },
                    vec![Field::Many(params), Field::One(Some(body))],
                )
            }
            "member_expression" | "subscript_expression" => {
                let computed = node.kind() == "subscript_expression";
                let object = node.child_by_field_name("object")?;
                let property =
                    node.child_by_field_name(if computed { "index" } else { "property" })?;
                let mut cursor = node.walk();
                let optional = node
                    .children(&mut cursor)
                    .any(|child| child.kind() == "optional_chain");
                (
                    Shape::Member { computed, optional },
                    vec![Field::One(Some(object)), Field::One(Some(property))],
                )
            }
            _ => (Shape::Leaf(self.leaf(node)?), Vec::new()),
        };
        Some(planned)
    }

    fn leaf(&self, node: Node<'_>) -> Option<NodeKind> {
        let kind = match node.kind() {
            "identifier" | "property_identifier" | "undefined" => NodeKind::Identifier {
                name: self.text(node).into(),
            },
            "string" => NodeKind::Literal(string_value(self.text(node))),
            "number" => NodeKind::Literal(number_value(self.text(node))),
            "true" => NodeKind::Literal(LiteralValue::Boolean(true)),
            "false" => NodeKind::Literal(LiteralValue::Boolean(false)),
            "null" => NodeKind::Literal(LiteralValue::Null),
            "regex" => NodeKind::Literal(LiteralValue::Raw(self.text(node).into())),
            "this" => NodeKind::ThisExpression,
            "super" => NodeKind::Super,
            _ => return None,
        };
        Some(kind)
    }
}

fn method_shape<'t>(node: Node<'t>) -> Option<(Shape, ChildFields<'t>)> {
    let name = node.child_by_field_name("name")?;
    let (key, computed) = property_key(name)?;
    let parameters = node.child_by_field_name("parameters")?;
    let body = node.child_by_field_name("body")?;

    let before_name = name.start_byte();
    let kind = if has_token(node, "get", before_name) {
        PropertyKind::Get
    } else if has_token(node, "set", before_name) {
        PropertyKind::Set
    } else {
        PropertyKind::Init
    };
    let shape = MethodShape {
        kind,
        computed,
        in_class: node.parent().is_some_and(|p| p.kind() == "class_body"),
        is_static: has_token(node, "static", before_name),
        is_async: has_token(node, "async", before_name),
        generator: has_token(node, "*", before_name),
        function_range: TextRange::new(parameters.start_byte(), body.end_byte()),
    };
    Some((
        Shape::Method(shape),
        vec![
            Field::One(Some(key)),
            Field::Many(named(parameters)),
            Field::One(Some(body)),
        ],
    ))
}

impl<'s> Lowering for Lowerer<'s> {
    type Input = Node<'s>;
    type Shape = Shape;

    fn plan(&mut self, node: Node<'s>, _fallback: TextRange) -> NodePlan<'s> {
        if node.kind() == "parenthesized_expression" {
            if let Some(inner) = named(node).into_iter().next() {
                return lowering::Planned::Replace(inner);
            }
        }
        let (shape, fields) = self
            .shape(node)
            .unwrap_or_else(|| (Shape::Other, vec![Field::Many(named(node))]));
        lowering::Planned::Node(Plan {
            range: range_of(node),
            shape,
            fields,
        })
    }

    fn assemble(
        &mut self,
        builder: &mut TreeBuilder,
        node: Node<'s>,
        shape: Shape,
        id: NodeId,
        mut fields: lowering::Fields,
    ) -> NodeKind {
        let known = assemble_known(builder, node, shape, id, &mut fields);
        known.unwrap_or_else(|| {
            NodeKind::Other(Other {
                type_name: node.kind().into(),
                children: fields.into_all(),
            })
        })
    }
}

/// Kind for `shape` from its lowered children; `None` falls back to
/// [`NodeKind::Other`].
fn assemble_known(
    builder: &mut TreeBuilder,
    node: Node<'_>,
    shape: Shape,
    id: NodeId,
    fields: &mut lowering::Fields,
) -> Option<NodeKind> {
    let kind = match shape {
        Shape::Program => NodeKind::Program {
            body: fields.many(),
        },
        Shape::Block => NodeKind::BlockStatement {
            body: fields.many(),
        },
        Shape::SwitchCase => NodeKind::SwitchCase(SwitchCase {
            test: fields.one(),
            consequent: fields.many(),
        }),
        Shape::Declaration(kind) => NodeKind::VariableDeclaration(VariableDeclaration {
            kind,
            declarations: fields.many(),
        }),
        Shape::Declarator => NodeKind::VariableDeclarator(VariableDeclarator {
            id: fields.one()?,
            init: fields.one(),
        }),
        Shape::Export => NodeKind::ExportNamedDeclaration {
            declaration: Some(fields.one()?),
        },
        Shape::Expression => NodeKind::ExpressionStatement {
            expression: fields.one()?,
        },
        Shape::Return => NodeKind::ReturnStatement {
            argument: fields.one(),
        },
        Shape::Object => NodeKind::ObjectExpression {
            properties: fields.many(),
        },
        Shape::Pair { computed } => NodeKind::Property(Property {
            key: fields.one()?,
            value: fields.one()?,
            kind: PropertyKind::Init,
            computed,
            method: false,
            shorthand: false,
        }),
        Shape::Shorthand(name) => {
            let range = range_of(node);
            let key = builder.reserve(range, Some(id));
            builder.finish_node(key, NodeKind::Identifier { name: name.clone() });
            let value = builder.reserve(range, Some(id));
            builder.finish_node(value, NodeKind::Identifier { name });
            NodeKind::Property(Property {
                key,
                value,
                kind: PropertyKind::Init,
                computed: false,
                method: false,
                shorthand: true,
            })
        }
        Shape::Spread => NodeKind::SpreadElement {
            argument: fields.one()?,
        },
        Shape::Method(method) => {
            let key = fields.one()?;
            let params = fields.many();
            let body = fields.one()?;
            let function = builder.reserve(method.function_range, Some(id));
            for child in params.iter().chain(std::iter::once(&body)) {
                builder.set_parent(*child, function);
            }
            builder.finish_node(
                function,
                NodeKind::FunctionExpression(Function {
                    id: None,
                    params,
                    body,
                    is_async: method.is_async,
                    generator: method.generator,
                }),
            );
            if method.in_class {
                NodeKind::MethodDefinition(ClassMember {
                    key,
                    value: Some(function),
                    kind: method.kind,
                    computed: method.computed,
                    is_static: method.is_static,
                })
            } else {
                NodeKind::Property(Property {
                    key,
                    value: function,
                    kind: method.kind,
                    computed: method.computed,
                    method: !method.kind.is_accessor(),
                    shorthand: false,
                })
            }
        }
        Shape::ClassBody => NodeKind::ClassBody {
            body: fields.many(),
        },
        Shape::Field {
            computed,
            is_static,
        } => NodeKind::PropertyDefinition(ClassMember {
            key: fields.one()?,
            value: fields.one(),
            kind: PropertyKind::Init,
            computed,
            is_static,
        }),
        Shape::Function {
            declaration,
            is_async,
            generator,
        } => {
            let function = Function {
                id: fields.one(),
                params: fields.many(),
                body: fields.one()?,
                is_async,
                generator,
            };
            if declaration {
                NodeKind::FunctionDeclaration(function)
            } else {
                NodeKind::FunctionExpression(function)
            }
        }
        Shape::Arrow {
            is_async,
            expression,
        } => NodeKind::ArrowFunctionExpression(ArrowFunction {
            params: fields.many(),
            body: fields.one()?,
            is_async,
            expression,
        }),
        Shape::Member { computed, optional } => NodeKind::MemberExpression(MemberExpression {
            object: fields.one()?,
            property: fields.one()?,
            computed,
            optional,
        }),
        Shape::Leaf(kind) => kind,
        Shape::Other => return None,
    };
    Some(kind)
}

fn string_value(raw: &str) -> LiteralValue {
    let inner = if raw.len() >= 2 {
        raw.get(1..raw.len() - 1).unwrap_or_default()
    } else {
        ""
    };
    LiteralValue::String {
        value: inner.into(),
        escaped: inner.contains('\\'),
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_value(raw: &str) -> LiteralValue {
    let clean: String = raw
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    let radix = |digits: &str, radix: u32| {
        u64::from_str_radix(digits, radix)
            .ok()
            .map(|v| v as f64)
    };
    let value = if let Some(hex) = clean.strip_prefix("0x") {
        radix(hex, 16)
    } else if let Some(octal) = clean.strip_prefix("0o") {
        radix(octal, 8)
    } else if let Some(binary) = clean.strip_prefix("0b") {
        radix(binary, 2)
    } else if clean.ends_with('n')
        || (clean.len() > 1 && clean.starts_with('0') && clean.bytes().all(|b| b.is_ascii_digit()))
    {
        // bigint, legacy octal
        None
    } else {
        clean.parse::<f64>().ok()
    };
    value.map_or_else(|| LiteralValue::Raw(raw.into()), LiteralValue::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SyntaxTree {
        CstParser::new().unwrap().parse(source).unwrap()
    }

    fn kinds(tree: &SyntaxTree) -> Vec<String> {
        tree.preorder(tree.root())
            .filter_map(|id| tree.kind(id).map(|k| k.type_name().to_owned()))
            .collect()
    }

    fn find(tree: &SyntaxTree, type_name: &str) -> NodeId {
        tree.preorder(tree.root())
            .find(|id| tree.kind(*id).is_some_and(|k| k.type_name() == type_name))
            .unwrap()
    }

    #[test]
    fn test_declaration_shape() {
        let tree = parse("const o = { a: 1 };");
        assert_eq!(
            kinds(&tree)[..5],
            [
                "Program",
                "VariableDeclaration",
                "VariableDeclarator",
                "Identifier",
                "ObjectExpression"
            ]
        );
    }

    #[test]
    fn test_method_function_spans_params_to_body() {
        let source = "const o = { async *[k](a) { yield a; } };";
        let tree = parse(source);
        let prop = find(&tree, "Property");
        let Some(NodeKind::Property(p)) = tree.kind(prop) else {
            panic!("expected property");
        };
        assert!(p.computed);
        assert!(p.method);
        assert_eq!(tree.node_text(p.key), Some("k"));
        assert_eq!(tree.node_text(p.value), Some("(a) { yield a; }"));
        let Some(NodeKind::FunctionExpression(f)) = tree.kind(p.value) else {
            panic!("expected function");
        };
        assert!(f.is_async);
        assert!(f.generator);
    }

    #[test]
    fn test_accessor_is_not_method() {
        let tree = parse("const o = { get [k]() { return 1; } };");
        let Some(NodeKind::Property(p)) = tree.kind(find(&tree, "Property")) else {
            panic!("expected property");
        };
        assert_eq!(p.kind, PropertyKind::Get);
        assert!(!p.method);
    }

    #[test]
    fn test_class_methods_are_method_definitions() {
        let tree = parse("class C { static [Symbol.x]() {} }");
        let Some(NodeKind::MethodDefinition(m)) = tree.kind(find(&tree, "MethodDefinition"))
        else {
            panic!("expected method definition");
        };
        assert!(m.computed);
        assert!(m.is_static);
        assert!(!kinds(&tree).iter().any(|k| k == "Property"));
    }

    #[test]
    fn test_parenthesized_value_unwrapped() {
        let tree = parse("const o = { [k]: (function () {}) };");
        let Some(NodeKind::Property(p)) = tree.kind(find(&tree, "Property")) else {
            panic!("expected property");
        };
        assert!(matches!(
            tree.kind(p.value),
            Some(NodeKind::FunctionExpression(_))
        ));
    }

    #[test]
    fn test_shorthand_property() {
        let tree = parse("const o = { a };");
        let Some(NodeKind::Property(p)) = tree.kind(find(&tree, "Property")) else {
            panic!("expected property");
        };
        assert!(p.shorthand);
        assert_eq!(tree.node_text(p.value), Some("a"));
    }

    #[test]
    fn test_deep_nesting_does_not_exhaust_stack() {
        let depth = 5_000;
        let source = format!(
            "const o = {{ [k]() {{}} }};\nx = {}{};\n",
            "[".repeat(depth),
            "]".repeat(depth)
        );
        let tree = parse(&source);
        assert!(tree.preorder(tree.root()).count() > depth);
        let prop = find(&tree, "Property");
        assert_eq!(
            tree.ancestors(prop).count(),
            4,
            "Property -> ObjectExpression -> VariableDeclarator -> VariableDeclaration -> Program"
        );
    }

    #[test]
    fn test_method_children_belong_to_synthesized_function() {
        let tree = parse("const o = { [k](a) { return a; } };");
        let Some(NodeKind::Property(p)) = tree.kind(find(&tree, "Property")) else {
            panic!("expected property");
        };
        let Some(NodeKind::FunctionExpression(f)) = tree.kind(p.value) else {
            panic!("expected function");
        };
        assert_eq!(tree.parent(f.body), Some(p.value));
        assert!(f.params.iter().all(|param| tree.parent(*param) == Some(p.value)));
        assert_eq!(tree.parent(p.key), Some(find(&tree, "Property")));
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = CstParser::new().unwrap().parse("const = {").unwrap_err();
        assert!(matches!(err, CstError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(number_value("0x10"), LiteralValue::Number(16.0));
        assert_eq!(number_value("1_000"), LiteralValue::Number(1000.0));
        assert_eq!(number_value("10n"), LiteralValue::Raw("10n".into()));
        assert_eq!(
            string_value("'a\\'b'"),
            LiteralValue::String {
                value: "a\\'b".into(),
                escaped: true
            }
        );
    }
}
