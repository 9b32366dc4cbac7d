//! Syntax tree nodes.
//!
//! The tree is a flat vector of [`Node`]s addressed by [`NodeId`]. Node
//! payloads refer to their children by id, so the tree can be shared between
//! threads and walked without lifetimes.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use vanadium_core::text::{TextPos, TextRange};
use vanadium_diagnostics::{Diagnostic, DiagnosticMessage};

/// Index of a node within its [`SyntaxTree`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
}

// ============================================================================
// Node payloads
// ============================================================================

#[derive(Debug, Clone)]
pub struct Root {
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: Option<NodeId>,
    pub defs: Vec<NodeId>,
}

/// A module-level definition with its optional visibility keyword.
#[derive(Debug, Clone)]
pub struct Definition {
    pub visibility: Option<Visibility>,
    pub def: NodeId,
}

#[derive(Debug, Clone)]
pub struct ImportItem {
    pub kind: ImportKind,
    pub range: TextRange,
    /// Names listed after the kind keyword. Empty for `all`.
    pub names: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum ImportSpec {
    /// `import from M all;`
    All,
    /// `import from M { ... };`
    List(Vec<ImportItem>),
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub module: Option<NodeId>,
    pub spec: ImportSpec,
}

impl ImportDecl {
    /// A transit import re-imports the imports of the named module:
    /// `import from M { import all };`.
    pub fn is_transit(&self) -> bool {
        match &self.spec {
            ImportSpec::All => false,
            ImportSpec::List(items) => items
                .first()
                .is_some_and(|item| item.kind == ImportKind::Import),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub kind: ValueKind,
    pub ty: Option<NodeId>,
    pub declarators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Option<NodeId>,
    pub dims: Vec<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TemplateDecl {
    pub ty: Option<NodeId>,
    pub name: Option<NodeId>,
    pub params: Option<NodeId>,
    pub base: Option<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub kind: FuncKind,
    pub modifiers: ModifierFlags,
    pub name: Option<NodeId>,
    pub params: Option<NodeId>,
    pub runs_on: Option<NodeId>,
    pub mtc: Option<NodeId>,
    pub system: Option<NodeId>,
    pub ret: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FormalPars {
    pub list: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FormalPar {
    pub direction: Option<ParDirection>,
    pub is_template: bool,
    pub ty: Option<NodeId>,
    pub name: Option<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ComponentTypeDecl {
    pub name: Option<NodeId>,
    pub extends: Vec<NodeId>,
    pub defs: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct StructTypeDecl {
    pub kind: StructKind,
    pub name: Option<NodeId>,
    pub fields: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub ty: Option<NodeId>,
    pub name: Option<NodeId>,
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct ListTypeDecl {
    pub kind: ListKind,
    pub element: Option<NodeId>,
    pub name: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SubTypeDecl {
    pub ty: Option<NodeId>,
    pub name: Option<NodeId>,
    pub constraint: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumTypeDecl {
    pub name: Option<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: Option<NodeId>,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct PortTypeDecl {
    pub kind: PortKind,
    pub name: Option<NodeId>,
    pub messages: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ClassTypeDecl {
    pub modifiers: ModifierFlags,
    pub name: Option<NodeId>,
    pub extends: Vec<NodeId>,
    pub runs_on: Option<NodeId>,
    pub mtc: Option<NodeId>,
    pub system: Option<NodeId>,
    pub defs: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub params: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ControlPart {
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub stmts: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Option<NodeId>,
    pub then: Option<NodeId>,
    pub else_: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub post: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Option<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: SyntaxKind,
    pub x: NodeId,
    pub y: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: SyntaxKind,
    pub x: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: NodeId,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub fun: NodeId,
    /// A [`NodeKind::ParenExpr`] holding the arguments.
    pub args: NodeId,
}

#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub x: NodeId,
    pub sel: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub x: NodeId,
    pub index: Option<NodeId>,
}

/// The closed set of syntax node kinds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root(Root),
    Module(Module),
    Definition(Definition),
    ImportDecl(ImportDecl),
    ValueDecl(ValueDecl),
    Declarator(Declarator),
    TemplateDecl(TemplateDecl),
    FuncDecl(FuncDecl),
    FormalPars(FormalPars),
    FormalPar(FormalPar),
    ComponentTypeDecl(ComponentTypeDecl),
    StructTypeDecl(StructTypeDecl),
    Field(Field),
    ListTypeDecl(ListTypeDecl),
    SubTypeDecl(SubTypeDecl),
    EnumTypeDecl(EnumTypeDecl),
    EnumValue(EnumValue),
    PortTypeDecl(PortTypeDecl),
    ClassTypeDecl(ClassTypeDecl),
    ConstructorDecl(ConstructorDecl),
    ControlPart(ControlPart),

    BlockStmt(BlockStmt),
    ExprStmt(NodeId),
    IfStmt(IfStmt),
    ForStmt(ForStmt),
    WhileStmt(WhileStmt),
    DoWhileStmt(WhileStmt),
    ReturnStmt(Option<NodeId>),
    BreakStmt,
    ContinueStmt,

    Ident,
    ValueLiteral(LiteralKind),
    BinaryExpr(BinaryExpr),
    UnaryExpr(UnaryExpr),
    AssignmentExpr(AssignmentExpr),
    CallExpr(CallExpr),
    ParenExpr(Vec<NodeId>),
    SelectorExpr(SelectorExpr),
    IndexExpr(IndexExpr),
    CompositeLiteral(Vec<NodeId>),

    /// Placeholder produced by error recovery.
    Error,
}

impl NodeKind {
    /// Short human-readable name, used in debug output.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root(_) => "Root",
            NodeKind::Module(_) => "Module",
            NodeKind::Definition(_) => "Definition",
            NodeKind::ImportDecl(_) => "ImportDecl",
            NodeKind::ValueDecl(_) => "ValueDecl",
            NodeKind::Declarator(_) => "Declarator",
            NodeKind::TemplateDecl(_) => "TemplateDecl",
            NodeKind::FuncDecl(_) => "FuncDecl",
            NodeKind::FormalPars(_) => "FormalPars",
            NodeKind::FormalPar(_) => "FormalPar",
            NodeKind::ComponentTypeDecl(_) => "ComponentTypeDecl",
            NodeKind::StructTypeDecl(_) => "StructTypeDecl",
            NodeKind::Field(_) => "Field",
            NodeKind::ListTypeDecl(_) => "ListTypeDecl",
            NodeKind::SubTypeDecl(_) => "SubTypeDecl",
            NodeKind::EnumTypeDecl(_) => "EnumTypeDecl",
            NodeKind::EnumValue(_) => "EnumValue",
            NodeKind::PortTypeDecl(_) => "PortTypeDecl",
            NodeKind::ClassTypeDecl(_) => "ClassTypeDecl",
            NodeKind::ConstructorDecl(_) => "ConstructorDecl",
            NodeKind::ControlPart(_) => "ControlPart",
            NodeKind::BlockStmt(_) => "BlockStmt",
            NodeKind::ExprStmt(_) => "ExprStmt",
            NodeKind::IfStmt(_) => "IfStmt",
            NodeKind::ForStmt(_) => "ForStmt",
            NodeKind::WhileStmt(_) => "WhileStmt",
            NodeKind::DoWhileStmt(_) => "DoWhileStmt",
            NodeKind::ReturnStmt(_) => "ReturnStmt",
            NodeKind::BreakStmt => "BreakStmt",
            NodeKind::ContinueStmt => "ContinueStmt",
            NodeKind::Ident => "Ident",
            NodeKind::ValueLiteral(_) => "ValueLiteral",
            NodeKind::BinaryExpr(_) => "BinaryExpr",
            NodeKind::UnaryExpr(_) => "UnaryExpr",
            NodeKind::AssignmentExpr(_) => "AssignmentExpr",
            NodeKind::CallExpr(_) => "CallExpr",
            NodeKind::ParenExpr(_) => "ParenExpr",
            NodeKind::SelectorExpr(_) => "SelectorExpr",
            NodeKind::IndexExpr(_) => "IndexExpr",
            NodeKind::CompositeLiteral(_) => "CompositeLiteral",
            NodeKind::Error => "Error",
        }
    }
}

// ============================================================================
// Syntax tree
// ============================================================================

/// A syntax error produced by the scanner or parser.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub range: TextRange,
    pub message: &'static DiagnosticMessage,
    pub arg: Option<String>,
}

impl SyntaxError {
    pub fn new(range: TextRange, message: &'static DiagnosticMessage) -> Self {
        Self { range, message, arg: None }
    }

    pub fn with_arg(range: TextRange, message: &'static DiagnosticMessage, arg: impl Into<String>) -> Self {
        Self { range, message, arg: Some(arg.into()) }
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let arg = self.arg.as_deref().unwrap_or_default();
        Diagnostic::with_location(file, self.range, self.message, &[arg])
    }
}

/// The parsed form of one source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    pub errors: Vec<SyntaxError>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId::INVALID,
            errors: Vec::new(),
        }
    }

    /// Append a node. Parents are filled in by [`SyntaxTree::finish`].
    pub fn alloc(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            range,
            parent: None,
        });
        id
    }

    /// Replace the payload of an already allocated node.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    /// Seal the tree: record the root and link every node to its parent.
    pub fn finish(&mut self, root: NodeId) {
        self.root = root;
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let mut children = Vec::new();
            crate::visitor::for_each_child(&self.nodes[parent.index()].kind, |child| {
                children.push(child)
            });
            for child in children {
                self.nodes[child.index()].parent = Some(parent);
                stack.push(child);
            }
        }
    }

    /// The root node, or [`NodeId::INVALID`] before [`SyntaxTree::finish`].
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The source text of a node.
    pub fn text<'t>(&self, source: &'t str, id: NodeId) -> &'t str {
        self.range(id).slice(source)
    }

    /// Walk up from `id` (exclusive) to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// The deepest node whose range contains `pos`.
    pub fn node_at(&self, pos: TextPos) -> Option<NodeId> {
        let mut current = self.root;
        if current == NodeId::INVALID || !self.range(current).contains(pos) {
            return None;
        }
        loop {
            let mut next = None;
            crate::visitor::for_each_child(self.kind(current), |child| {
                if next.is_none() && self.range(child).contains(pos) {
                    next = Some(child);
                }
            });
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_tree() -> (SyntaxTree, NodeId, NodeId) {
        // module M { }
        let mut tree = SyntaxTree::new();
        let name = tree.alloc(NodeKind::Ident, TextRange::new(7, 8));
        let module = tree.alloc(
            NodeKind::Module(Module {
                name: Some(name),
                defs: Vec::new(),
            }),
            TextRange::new(0, 12),
        );
        let root = tree.alloc(
            NodeKind::Root(Root {
                nodes: vec![module],
            }),
            TextRange::new(0, 12),
        );
        tree.finish(root);
        (tree, module, name)
    }

    #[test]
    fn test_finish_links_parents() {
        let (tree, module, name) = tiny_tree();
        assert_eq!(tree.parent(name), Some(module));
        assert_eq!(tree.parent(module), Some(tree.root()));
        assert_eq!(tree.ancestors(name).count(), 2);
        assert_eq!(tree.text("module M { }", name), "M");
    }

    #[test]
    fn test_node_at() {
        let (tree, module, name) = tiny_tree();
        assert_eq!(tree.node_at(7), Some(name));
        assert_eq!(tree.node_at(10), Some(module));
        assert_eq!(tree.node_at(40), None);
    }

    #[test]
    fn test_transit_import() {
        let transit = ImportDecl {
            module: None,
            spec: ImportSpec::List(vec![ImportItem {
                kind: ImportKind::Import,
                range: TextRange::default(),
                names: Vec::new(),
            }]),
        };
        let plain = ImportDecl {
            module: None,
            spec: ImportSpec::All,
        };
        assert!(transit.is_transit());
        assert!(!plain.is_transit());
    }
}
