//! Syntax model the rules read.
//!
//! Parsing is done elsewhere: [`estree`] lowers ESTree JSON produced by any
//! conventional ECMAScript parser, and `crate::cst` lowers a tree-sitter
//! JavaScript tree. Both produce the same [`SyntaxTree`], an arena of
//! [`SyntaxNode`]s with parent links and UTF-8 byte ranges.
//!
//! The node kinds form a closed set covering only what the rules inspect.
//! Everything else becomes [`NodeKind::Other`], which keeps its children so
//! traversal still reaches nested object literals.

pub mod estree;
pub(crate) mod lowering;

use compact_str::CompactString;
use smallvec::SmallVec;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct TextRange {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl TextRange {
    /// Create a new range
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Whether `other` lies entirely within this range
    #[must_use]
    pub const fn contains_range(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Child list; most nodes have only a few.
pub type NodeList = SmallVec<[NodeId; 4]>;

/// Keyword of a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

impl VariableKind {
    /// Parse the declaration keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "var" => Some(Self::Var),
            "let" => Some(Self::Let),
            "const" => Some(Self::Const),
            _ => None,
        }
    }
}

/// ESTree `Property.kind` / `MethodDefinition.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Plain value, shorthand method or constructor
    Init,
    /// `get` accessor
    Get,
    /// `set` accessor
    Set,
}

impl PropertyKind {
    /// Parse an ESTree kind string. Unknown kinds map to `Init`.
    #[must_use]
    pub fn from_estree(kind: &str) -> Self {
        match kind {
            "get" => Self::Get,
            "set" => Self::Set,
            _ => Self::Init,
        }
    }

    /// Whether this is a getter or setter
    #[must_use]
    pub const fn is_accessor(self) -> bool {
        matches!(self, Self::Get | Self::Set)
    }
}

/// Value of a `Literal` node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String literal. `escaped` is set when the source spelling contains
    /// escape sequences; `value` is only the exact property name when it is
    /// not.
    String {
        /// Contents between the quotes
        value: CompactString,
        /// Whether the raw text contains a backslash
        escaped: bool,
    },
    /// Numeric literal
    Number(f64),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,
    /// Regex, bigint and anything else, kept as raw text
    Raw(CompactString),
}

/// `VariableDeclaration`
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    /// Declaration keyword
    pub kind: VariableKind,
    /// Declarators in source order
    pub declarations: NodeList,
}

/// `VariableDeclarator`
#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    /// Binding target (identifier or pattern)
    pub id: NodeId,
    /// Initializer expression
    pub init: Option<NodeId>,
}

/// Object literal entry (`Property`).
#[derive(Debug, Clone)]
pub struct Property {
    /// Key expression; for computed keys this is the expression inside `[...]`
    pub key: NodeId,
    /// Value expression; for methods and accessors a `FunctionExpression`
    pub value: NodeId,
    /// Init, getter or setter
    pub kind: PropertyKind,
    /// `[key]: ...`
    pub computed: bool,
    /// `key() {}`
    pub method: bool,
    /// `{ key }`
    pub shorthand: bool,
}

/// Class member (`MethodDefinition` or `PropertyDefinition`).
#[derive(Debug, Clone)]
pub struct ClassMember {
    /// Member key
    pub key: NodeId,
    /// Method function or field initializer
    pub value: Option<NodeId>,
    /// Init, getter or setter
    pub kind: PropertyKind,
    /// `[key]`
    pub computed: bool,
    /// `static`
    pub is_static: bool,
}

/// `FunctionExpression` / `FunctionDeclaration`.
///
/// For methods the node range starts at the parameter list, matching ESTree.
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name
    pub id: Option<NodeId>,
    /// Parameters
    pub params: NodeList,
    /// Body block
    pub body: NodeId,
    /// `async`
    pub is_async: bool,
    /// `function*`
    pub generator: bool,
}

/// `ArrowFunctionExpression`
#[derive(Debug, Clone)]
pub struct ArrowFunction {
    /// Parameters
    pub params: NodeList,
    /// Block or expression body
    pub body: NodeId,
    /// `async`
    pub is_async: bool,
    /// Whether the body is an expression rather than a block
    pub expression: bool,
}

/// `MemberExpression` (`a.b`, `a[b]`, `a?.b`)
#[derive(Debug, Clone)]
pub struct MemberExpression {
    /// Object expression
    pub object: NodeId,
    /// Property; an `Identifier` when not computed
    pub property: NodeId,
    /// `a[b]`
    pub computed: bool,
    /// `a?.b`
    pub optional: bool,
}

/// `SwitchCase`
#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `case` test; `None` for `default`
    pub test: Option<NodeId>,
    /// Statements under the label
    pub consequent: NodeList,
}

/// Any node kind the rules do not inspect.
#[derive(Debug, Clone)]
pub struct Other {
    /// Original node type, ESTree or tree-sitter spelling
    pub type_name: CompactString,
    /// Children in source order
    pub children: NodeList,
}

/// Closed set of node kinds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Root
    Program {
        /// Top-level statements
        body: NodeList,
    },
    /// `{ ... }` statement block
    BlockStatement {
        /// Statements
        body: NodeList,
    },
    /// `case x:` / `default:`
    SwitchCase(SwitchCase),
    /// `const a = 1, b = 2;`
    VariableDeclaration(VariableDeclaration),
    /// `a = 1`
    VariableDeclarator(VariableDeclarator),
    /// `export <declaration>`
    ExportNamedDeclaration {
        /// Wrapped declaration, if any
        declaration: Option<NodeId>,
    },
    /// Expression used as a statement
    ExpressionStatement {
        /// The expression
        expression: NodeId,
    },
    /// `return x;`
    ReturnStatement {
        /// Returned expression
        argument: Option<NodeId>,
    },
    /// Object literal
    ObjectExpression {
        /// Entries in source order
        properties: NodeList,
    },
    /// Object literal entry
    Property(Property),
    /// `...x`
    SpreadElement {
        /// Spread operand
        argument: NodeId,
    },
    /// Class body
    ClassBody {
        /// Members in source order
        body: NodeList,
    },
    /// Class method, accessor or constructor
    MethodDefinition(ClassMember),
    /// Class field
    PropertyDefinition(ClassMember),
    /// `function () {}` in expression position
    FunctionExpression(Function),
    /// `function f() {}` statement
    FunctionDeclaration(Function),
    /// `() => {}`
    ArrowFunctionExpression(ArrowFunction),
    /// Identifier reference or property name
    Identifier {
        /// Identifier text
        name: CompactString,
    },
    /// Literal
    Literal(LiteralValue),
    /// Property access
    MemberExpression(MemberExpression),
    /// `super`
    Super,
    /// `this`
    ThisExpression,
    /// Uninspected node
    Other(Other),
}

impl NodeKind {
    /// ESTree type name of this node.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Program { .. } => "Program",
            Self::BlockStatement { .. } => "BlockStatement",
            Self::SwitchCase(_) => "SwitchCase",
            Self::VariableDeclaration(_) => "VariableDeclaration",
            Self::VariableDeclarator(_) => "VariableDeclarator",
            Self::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::ReturnStatement { .. } => "ReturnStatement",
            Self::ObjectExpression { .. } => "ObjectExpression",
            Self::Property(_) => "Property",
            Self::SpreadElement { .. } => "SpreadElement",
            Self::ClassBody { .. } => "ClassBody",
            Self::MethodDefinition(_) => "MethodDefinition",
            Self::PropertyDefinition(_) => "PropertyDefinition",
            Self::FunctionExpression(_) => "FunctionExpression",
            Self::FunctionDeclaration(_) => "FunctionDeclaration",
            Self::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            Self::Identifier { .. } => "Identifier",
            Self::Literal(_) => "Literal",
            Self::MemberExpression(_) => "MemberExpression",
            Self::Super => "Super",
            Self::ThisExpression => "ThisExpression",
            Self::Other(other) => &other.type_name,
        }
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> NodeList {
        let mut out = NodeList::new();
        match self {
            Self::Program { body } | Self::BlockStatement { body } | Self::ClassBody { body } => {
                out.extend_from_slice(body);
            }
            Self::ObjectExpression { properties } => out.extend_from_slice(properties),
            Self::SwitchCase(case) => {
                out.extend(case.test);
                out.extend_from_slice(&case.consequent);
            }
            Self::VariableDeclaration(decl) => out.extend_from_slice(&decl.declarations),
            Self::VariableDeclarator(decl) => {
                out.push(decl.id);
                out.extend(decl.init);
            }
            Self::ExportNamedDeclaration { declaration } => out.extend(*declaration),
            Self::ExpressionStatement { expression } => out.push(*expression),
            Self::ReturnStatement { argument } => out.extend(*argument),
            Self::Property(prop) => {
                out.push(prop.key);
                out.push(prop.value);
            }
            Self::SpreadElement { argument } => out.push(*argument),
            Self::MethodDefinition(member) | Self::PropertyDefinition(member) => {
                out.push(member.key);
                out.extend(member.value);
            }
            Self::FunctionExpression(func) | Self::FunctionDeclaration(func) => {
                out.extend(func.id);
                out.extend_from_slice(&func.params);
                out.push(func.body);
            }
            Self::ArrowFunctionExpression(arrow) => {
                out.extend_from_slice(&arrow.params);
                out.push(arrow.body);
            }
            Self::MemberExpression(member) => {
                out.push(member.object);
                out.push(member.property);
            }
            Self::Other(other) => out.extend_from_slice(&other.children),
            Self::Identifier { .. } | Self::Literal(_) | Self::Super | Self::ThisExpression => {}
        }
        out
    }

    /// Function expression or arrow function.
    #[must_use]
    pub const fn is_inline_function(&self) -> bool {
        matches!(
            self,
            Self::FunctionExpression(_) | Self::ArrowFunctionExpression(_)
        )
    }

    /// Whether a `super` inside this node refers to something else than the
    /// enclosing method's home object.
    #[must_use]
    pub const fn rebinds_super(&self) -> bool {
        matches!(
            self,
            Self::FunctionExpression(_) | Self::FunctionDeclaration(_) | Self::ClassBody { .. }
        )
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Kind and kind-specific fields
    pub kind: NodeKind,
    /// Byte range in the source
    pub range: TextRange,
    /// Parent node; `None` for the root
    pub parent: Option<NodeId>,
}

/// Parsed source plus its node arena.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    /// Source text the ranges refer to
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root node (`Program`)
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Kind of a node
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    /// Range of a node
    #[must_use]
    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.get(id).map(|node| node.range)
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Source slice for a range; `None` if out of bounds or not on a char boundary
    #[must_use]
    pub fn text(&self, range: TextRange) -> Option<&str> {
        self.source.get(range.start..range.end)
    }

    /// Source slice of a node
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        self.range(id).and_then(|range| self.text(range))
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`.
    #[must_use]
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Iterator over ancestors, see [`SyntaxTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Iterator over a subtree, see [`SyntaxTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Preorder<'_> {
    /// Do not descend into the children of the node returned last.
    pub fn skip_children(&mut self, of: NodeId) {
        if let Some(node) = self.tree.get(of) {
            let count = node.kind.children().len();
            let keep = self.stack.len().saturating_sub(count);
            self.stack.truncate(keep);
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.get(id) {
            self.stack.extend(node.kind.children().into_iter().rev());
        }
        Some(id)
    }
}

/// Incremental arena construction used by the tree adapters.
///
/// A node is reserved before its children are lowered so the children can
/// point at it, then completed with its final kind.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn reserve(&mut self, range: TextRange, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind: NodeKind::Other(Other {
                type_name: CompactString::const_new("Unfinished"),
                children: NodeList::new(),
            }),
            range,
            parent,
        });
        id
    }

    pub(crate) fn finish_node(&mut self, id: NodeId, kind: NodeKind) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.kind = kind;
        }
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.parent = Some(parent);
        }
    }

    pub(crate) fn finish(self, source: String, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            source,
            nodes: self.nodes,
            root,
        }
    }
}
