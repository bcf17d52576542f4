//! Lowering of ESTree JSON into a [`SyntaxTree`].
//!
//! Accepts the output of any ESTree-conformant parser (espree, acorn,
//! `@typescript-eslint/typescript-estree`, Babel with or without the `estree`
//! plugin). Babel's own node kinds for object and class members and for
//! literals are mapped onto their ESTree counterparts.
//!
//! Spans are read from `range: [start, end]` or from `start`/`end`, and are
//! interpreted as UTF-16 code unit offsets, the way JavaScript tooling counts
//! them; they are converted to byte offsets with the source text.
//!
//! Malformed nodes (no usable span, or missing a field their type requires)
//! are lowered as [`NodeKind::Other`] so one odd node cannot hide findings in
//! the rest of the file.

use super::lowering::{lower_tree, Field, Fields, Lowering, Plan, Planned};
use super::{
    ArrowFunction, ClassMember, Function, LiteralValue, MemberExpression, NodeId, NodeKind, Other,
    Property, PropertyKind, SwitchCase, SyntaxTree, TextRange, TreeBuilder, VariableDeclaration,
    VariableDeclarator, VariableKind,
};
use compact_str::CompactString;
use serde_json::{Map, Value};

/// Errors raised while reading ESTree input.
#[derive(Debug, thiserror::Error)]
pub enum EstreeError {
    /// The input is not JSON
    #[error("invalid ESTree JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The root node is not a `Program` (or a Babel `File` wrapping one)
    #[error("expected a Program node at the root, found {0}")]
    NotAProgram(String),
}

/// Fields that never hold child nodes.
const SKIPPED_FIELDS: &[&str] = &[
    "type",
    "loc",
    "range",
    "start",
    "end",
    "extra",
    "comments",
    "tokens",
    "leadingComments",
    "trailingComments",
    "innerComments",
];

/// Parse ESTree JSON text for `source`.
///
/// # Errors
/// Returns an error if `json` is not valid JSON or has no `Program` root.
pub fn from_json(json: &str, source: impl Into<String>) -> Result<SyntaxTree, EstreeError> {
    let value: Value = serde_json::from_str(json)?;
    from_value(&value, source)
}

/// Lower an already-deserialized ESTree value for `source`.
///
/// # Errors
/// Returns an error if the root is not a `Program` node.
pub fn from_value(value: &Value, source: impl Into<String>) -> Result<SyntaxTree, EstreeError> {
    let source = source.into();
    let mut root = value;
    if node_type(root) == Some("File") {
        if let Some(program) = root.get("program") {
            root = program;
        }
    }
    match node_type(root) {
        Some("Program") => {}
        other => {
            return Err(EstreeError::NotAProgram(
                other.unwrap_or("a non-node value").to_owned(),
            ))
        }
    }

    let mut lowerer = Lowerer {
        offsets: OffsetMap::new(&source),
        source: &source,
    };
    lower_tree(&mut lowerer, root, &source)
        .ok_or_else(|| EstreeError::NotAProgram("Program".to_owned()))
}

/// UTF-16 code unit offset to byte offset conversion.
struct OffsetMap {
    /// `None` when the source is ASCII and offsets coincide.
    utf16_to_byte: Option<Vec<usize>>,
    len: usize,
}

impl OffsetMap {
    fn new(source: &str) -> Self {
        if source.is_ascii() {
            return Self {
                utf16_to_byte: None,
                len: source.len(),
            };
        }
        let mut table = Vec::with_capacity(source.len() + 1);
        for (byte, ch) in source.char_indices() {
            for _ in 0..ch.len_utf16() {
                table.push(byte);
            }
        }
        table.push(source.len());
        Self {
            utf16_to_byte: Some(table),
            len: source.len(),
        }
    }

    fn byte(&self, utf16: usize) -> Option<usize> {
        match &self.utf16_to_byte {
            None => (utf16 <= self.len).then_some(utf16),
            Some(table) => table.get(utf16).copied(),
        }
    }

    fn range(&self, start: usize, end: usize) -> Option<TextRange> {
        let start = self.byte(start)?;
        let end = self.byte(end)?;
        (start <= end).then(|| TextRange::new(start, end))
    }
}

fn node_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn is_node(value: &Value) -> bool {
    node_type(value).is_some()
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn flag(obj: &Map<String, Value>, name: &str) -> bool {
    obj.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn member_kind(obj: &Map<String, Value>) -> PropertyKind {
    obj.get("kind")
        .and_then(Value::as_str)
        .map_or(PropertyKind::Init, PropertyKind::from_estree)
}

/// Child node; a present but non-node value counts as absent.
fn node_field<'v>(obj: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    obj.get(name).filter(|v| is_node(v))
}

/// Array of child nodes; holes and non-node entries are dropped.
fn node_array<'v>(obj: &'v Map<String, Value>, name: &str) -> Option<Vec<&'v Value>> {
    obj.get(name)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|v| is_node(v)).collect())
}

/// What an ESTree node lowers to, decided before its children are.
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
    Property {
        kind: PropertyKind,
        computed: bool,
        method: bool,
        shorthand: bool,
    },
    Spread,
    ClassBody,
    ClassMember {
        method: bool,
        kind: PropertyKind,
        computed: bool,
        is_static: bool,
    },
    Function {
        declaration: bool,
        is_async: bool,
        generator: bool,
    },
    Arrow {
        is_async: bool,
        expression: bool,
    },
    /// Babel `ObjectMethod` and `ClassMethod`, whose function node is
    /// synthesized the way ESTree has it
    Method(MethodShape),
    Member {
        computed: bool,
        optional: bool,
    },
    Leaf(NodeKind),
    Other,
}

struct MethodShape {
    kind: PropertyKind,
    computed: bool,
    in_class: bool,
    is_static: bool,
    is_async: bool,
    generator: bool,
    function_range: TextRange,
}

type ChildFields<'v> = Vec<Field<&'v Value>>;

struct Lowerer<'v> {
    offsets: OffsetMap,
    source: &'v str,
}

impl<'v> Lowerer<'v> {
    fn read_range(&self, obj: &Map<String, Value>) -> Option<TextRange> {
        if let Some([start, end]) = obj.get("range").and_then(Value::as_array).map(Vec::as_slice)
        {
            return self.offsets.range(as_usize(start)?, as_usize(end)?);
        }
        let start = obj.get("start").and_then(as_usize)?;
        let end = obj.get("end").and_then(as_usize)?;
        self.offsets.range(start, end)
    }

    fn start_of(&self, value: &Value) -> Option<usize> {
        self.read_range(value.as_object()?).map(|range| range.start)
    }

    /// Shape and children of a node kind the rules inspect; `None` when a
    /// required field is missing.
    #[allow(clippy::too_many_lines)]
    fn shape(
        &self,
        obj: &'v Map<String, Value>,
        type_name: &str,
    ) -> Option<(Shape, ChildFields<'v>)> {
        let planned = match type_name {
            "Program" => (Shape::Program, vec![Field::Many(node_array(obj, "body")?)]),
            "BlockStatement" | "StaticBlock" => {
                (Shape::Block, vec![Field::Many(node_array(obj, "body")?)])
            }
            "SwitchCase" => {
                let consequent = node_array(obj, "consequent")?;
                (
                    Shape::SwitchCase,
                    vec![Field::One(node_field(obj, "test")), Field::Many(consequent)],
                )
            }
            "VariableDeclaration" => {
                let kind = obj
                    .get("kind")
                    .and_then(Value::as_str)
                    .and_then(VariableKind::from_keyword)?;
                let declarations = node_array(obj, "declarations")?;
                (Shape::Declaration(kind), vec![Field::Many(declarations)])
            }
            "VariableDeclarator" => {
                let target = node_field(obj, "id")?;
                (
                    Shape::Declarator,
                    vec![Field::One(Some(target)), Field::One(node_field(obj, "init"))],
                )
            }
            "ExportNamedDeclaration" => (
                Shape::Export,
                vec![Field::One(node_field(obj, "declaration"))],
            ),
            "ExpressionStatement" => {
                let expression = node_field(obj, "expression")?;
                (Shape::Expression, vec![Field::One(Some(expression))])
            }
            "ReturnStatement" => (
                Shape::Return,
                vec![Field::One(node_field(obj, "argument"))],
            ),
            "ObjectExpression" => (
                Shape::Object,
                vec![Field::Many(node_array(obj, "properties")?)],
            ),
            "Property" | "ObjectProperty" => {
                let key = node_field(obj, "key")?;
                let value = node_field(obj, "value")?;
                (
                    Shape::Property {
                        kind: member_kind(obj),
                        computed: flag(obj, "computed"),
                        method: flag(obj, "method"),
                        shorthand: flag(obj, "shorthand"),
                    },
                    vec![Field::One(Some(key)), Field::One(Some(value))],
                )
            }
            "ObjectMethod" | "ClassMethod" => return self.method_shape(obj, type_name),
            "SpreadElement" => {
                let argument = node_field(obj, "argument")?;
                (Shape::Spread, vec![Field::One(Some(argument))])
            }
            "ClassBody" => (Shape::ClassBody, vec![Field::Many(node_array(obj, "body")?)]),
            "MethodDefinition" | "PropertyDefinition" | "ClassProperty" => {
                let key = node_field(obj, "key")?;
                (
                    Shape::ClassMember {
                        method: type_name == "MethodDefinition",
                        kind: member_kind(obj),
                        computed: flag(obj, "computed"),
                        is_static: flag(obj, "static"),
                    },
                    vec![Field::One(Some(key)), Field::One(node_field(obj, "value"))],
                )
            }
            "FunctionExpression" | "FunctionDeclaration" => {
                let body = node_field(obj, "body")?;
                let params = node_array(obj, "params").unwrap_or_default();
                (
                    Shape::Function {
                        declaration: type_name == "FunctionDeclaration",
                        is_async: flag(obj, "async"),
                        generator: flag(obj, "generator"),
                    },
                    vec![
                        Field::One(node_field(obj, "id")),
                        Field::Many(params),
                        Field::One(Some(body)),
                    ],
                )
            }
            "ArrowFunctionExpression" => {
                let body = node_field(obj, "body")?;
                let params = node_array(obj, "params").unwrap_or_default();
                let expression = obj
                    .get("expression")
                    .and_then(Value::as_bool)
                    .unwrap_or_else(|| node_type(body) != Some("BlockStatement"));
                (
                    Shape::Arrow {
                        is_async: flag(obj, "async"),
                        expression,
                    },
                    vec![Field::Many(params), Field::One(Some(body))],
                )
            }
            "MemberExpression" | "OptionalMemberExpression" => {
                let object = node_field(obj, "object")?;
                let property = node_field(obj, "property")?;
                (
                    Shape::Member {
                        computed: flag(obj, "computed"),
                        optional: flag(obj, "optional"),
                    },
                    vec![Field::One(Some(object)), Field::One(Some(property))],
                )
            }
            "Identifier" => {
                let name = obj.get("name").and_then(Value::as_str)?;
                (Shape::Leaf(NodeKind::Identifier { name: name.into() }), Vec::new())
            }
            "Literal" | "StringLiteral" | "NumericLiteral" | "BooleanLiteral" | "NullLiteral"
            | "RegExpLiteral" | "BigIntLiteral" => (
                Shape::Leaf(NodeKind::Literal(literal_value(type_name, obj))),
                Vec::new(),
            ),
            "Super" => (Shape::Leaf(NodeKind::Super), Vec::new()),
            "ThisExpression" => (Shape::Leaf(NodeKind::ThisExpression), Vec::new()),
            _ => return None,
        };
        Some(planned)
    }

    /// Babel methods carry params and body directly; the function spans from
    /// the opening parenthesis after the key through the body.
    fn method_shape(
        &self,
        obj: &'v Map<String, Value>,
        type_name: &str,
    ) -> Option<(Shape, ChildFields<'v>)> {
        let key = node_field(obj, "key")?;
        let body = node_field(obj, "body")?;
        let params = node_array(obj, "params").unwrap_or_default();

        let key_end = self.read_range(key.as_object()?)?.end;
        let body_range = self.read_range(body.as_object()?)?;
        let open = self.source.get(key_end..body_range.start)?.find('(')?;
        let kind = member_kind(obj);
        let shape = MethodShape {
            kind,
            computed: flag(obj, "computed"),
            in_class: type_name == "ClassMethod",
            is_static: flag(obj, "static"),
            is_async: flag(obj, "async"),
            generator: flag(obj, "generator"),
            function_range: TextRange::new(key_end + open, body_range.end),
        };
        Some((
            Shape::Method(shape),
            vec![
                Field::One(Some(key)),
                Field::Many(params),
                Field::One(Some(body)),
            ],
        ))
    }

    /// Every child node, ordered by position.
    fn other_children(&self, obj: &'v Map<String, Value>, fallback: usize) -> Vec<&'v Value> {
        let mut values = Vec::new();
        for (field, value) in obj {
            if SKIPPED_FIELDS.contains(&field.as_str()) {
                continue;
            }
            match value {
                Value::Array(items) => values.extend(items.iter().filter(|v| is_node(v))),
                Value::Object(_) if is_node(value) => values.push(value),
                _ => {}
            }
        }
        values.sort_by_key(|value| self.start_of(value).unwrap_or(fallback));
        values
    }
}

impl<'v> Lowering for Lowerer<'v> {
    type Input = &'v Value;
    type Shape = Shape;

    fn plan(&mut self, value: &'v Value, fallback: TextRange) -> Planned<&'v Value, Shape> {
        let Some(obj) = value.as_object() else {
            return Planned::Skip;
        };
        let Some(type_name) = obj.get("type").and_then(Value::as_str) else {
            return Planned::Skip;
        };

        // Transparent wrappers: the wrapped expression takes their place.
        if matches!(type_name, "ParenthesizedExpression" | "ChainExpression") {
            if let Some(inner) = node_field(obj, "expression") {
                return Planned::Replace(inner);
            }
        }

        let range = self.read_range(obj);
        let own = range.unwrap_or(fallback);
        let (shape, fields) = range
            .and_then(|_| self.shape(obj, type_name))
            .unwrap_or_else(|| {
                (
                    Shape::Other,
                    vec![Field::Many(self.other_children(obj, own.start))],
                )
            });
        Planned::Node(Plan {
            range: own,
            shape,
            fields,
        })
    }

    fn assemble(
        &mut self,
        builder: &mut TreeBuilder,
        value: &'v Value,
        shape: Shape,
        id: NodeId,
        mut fields: Fields,
    ) -> NodeKind {
        let known = assemble_known(builder, shape, id, &mut fields);
        known.unwrap_or_else(|| {
            NodeKind::Other(Other {
                type_name: CompactString::from(node_type(value).unwrap_or_default()),
                children: fields.into_all(),
            })
        })
    }
}

/// Kind for `shape` from its lowered children; `None` falls back to
/// [`NodeKind::Other`].
fn assemble_known(
    builder: &mut TreeBuilder,
    shape: Shape,
    id: NodeId,
    fields: &mut Fields,
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
            declaration: fields.one(),
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
        Shape::Property {
            kind,
            computed,
            method,
            shorthand,
        } => NodeKind::Property(Property {
            key: fields.one()?,
            value: fields.one()?,
            kind,
            computed,
            method,
            shorthand,
        }),
        Shape::Spread => NodeKind::SpreadElement {
            argument: fields.one()?,
        },
        Shape::ClassBody => NodeKind::ClassBody {
            body: fields.many(),
        },
        Shape::ClassMember {
            method,
            kind,
            computed,
            is_static,
        } => {
            let member = ClassMember {
                key: fields.one()?,
                value: fields.one(),
                kind,
                computed,
                is_static,
            };
            if method {
                NodeKind::MethodDefinition(member)
            } else {
                NodeKind::PropertyDefinition(member)
            }
        }
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

fn literal_value(type_name: &str, obj: &Map<String, Value>) -> LiteralValue {
    let raw = obj
        .get("raw")
        .or_else(|| obj.get("extra").and_then(|extra| extra.get("raw")))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if matches!(type_name, "RegExpLiteral" | "BigIntLiteral")
        || obj.contains_key("regex")
        || obj.contains_key("bigint")
    {
        return LiteralValue::Raw(raw.into());
    }
    match obj.get("value") {
        Some(Value::String(s)) => LiteralValue::String {
            value: s.as_str().into(),
            escaped: raw.contains('\\'),
        },
        Some(Value::Number(n)) => n
            .as_f64()
            .map_or_else(|| LiteralValue::Raw(raw.into()), LiteralValue::Number),
        Some(Value::Bool(b)) => LiteralValue::Boolean(*b),
        Some(Value::Null) | None => LiteralValue::Null,
        Some(_) => LiteralValue::Raw(raw.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_map_ascii_identity() {
        let map = OffsetMap::new("abc");
        assert_eq!(map.byte(2), Some(2));
        assert_eq!(map.byte(3), Some(3));
        assert_eq!(map.byte(4), None);
    }

    #[test]
    fn test_offset_map_multibyte() {
        // 'é' is 2 bytes / 1 unit, '𝒳' is 4 bytes / 2 units
        let map = OffsetMap::new("é𝒳a");
        assert_eq!(map.byte(0), Some(0));
        assert_eq!(map.byte(1), Some(2));
        assert_eq!(map.byte(3), Some(6));
        assert_eq!(map.byte(4), Some(7));
    }

    #[test]
    fn test_rejects_non_program_root() {
        let err = from_json(r#"{"type":"Identifier","name":"x"}"#, "x").unwrap_err();
        assert!(matches!(err, EstreeError::NotAProgram(ref t) if t == "Identifier"));
    }

    #[test]
    fn test_unknown_nodes_keep_children_in_order() {
        let json = r#"{
            "type": "Program", "range": [0, 5],
            "body": [{
                "type": "ExpressionStatement", "range": [0, 5],
                "expression": {
                    "type": "BinaryExpression", "range": [0, 5], "operator": "+",
                    "right": {"type": "Identifier", "name": "b", "range": [4, 5]},
                    "left": {"type": "Identifier", "name": "a", "range": [0, 1]}
                }
            }]
        }"#;
        let tree = from_json(json, "a + b").unwrap();
        let names: Vec<String> = tree
            .preorder(tree.root())
            .filter_map(|id| match tree.kind(id) {
                Some(NodeKind::Identifier { name }) => Some(name.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_node_without_range_is_other() {
        let json = r#"{
            "type": "Program", "range": [0, 1],
            "body": [{"type": "ExpressionStatement", "expression": {"type": "Identifier", "name": "a", "range": [0, 1]}}]
        }"#;
        let tree = from_json(json, "a").unwrap();
        let kinds: Vec<&str> = tree
            .preorder(tree.root())
            .filter_map(|id| tree.kind(id).map(NodeKind::type_name))
            .collect();
        assert_eq!(kinds, vec!["Program", "ExpressionStatement", "Identifier"]);
        assert!(matches!(
            tree.kind(tree.preorder(tree.root()).nth(1).unwrap()),
            Some(NodeKind::Other(_))
        ));
    }
}
