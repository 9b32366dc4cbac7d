//! Generic child iteration over the syntax tree.
//!
//! `for_each_child` yields the direct children of a node in source order;
//! `walk` performs a pre-order traversal that can prune subtrees.

use crate::node::*;

fn opt(id: Option<NodeId>, f: &mut impl FnMut(NodeId)) {
    if let Some(id) = id {
        f(id);
    }
}

fn list(ids: &[NodeId], f: &mut impl FnMut(NodeId)) {
    for &id in ids {
        f(id);
    }
}

/// Invoke `f` on every direct child of a node, in source order.
pub fn for_each_child(kind: &NodeKind, mut f: impl FnMut(NodeId)) {
    let f = &mut f;
    match kind {
        NodeKind::Root(n) => list(&n.nodes, f),
        NodeKind::Module(n) => {
            opt(n.name, f);
            list(&n.defs, f);
        }
        NodeKind::Definition(n) => f(n.def),
        NodeKind::ImportDecl(n) => {
            opt(n.module, f);
            if let ImportSpec::List(items) = &n.spec {
                for item in items {
                    list(&item.names, f);
                }
            }
        }
        NodeKind::ValueDecl(n) => {
            opt(n.ty, f);
            list(&n.declarators, f);
        }
        NodeKind::Declarator(n) => {
            opt(n.name, f);
            list(&n.dims, f);
            opt(n.value, f);
        }
        NodeKind::TemplateDecl(n) => {
            opt(n.ty, f);
            opt(n.name, f);
            opt(n.params, f);
            opt(n.base, f);
            opt(n.value, f);
        }
        NodeKind::FuncDecl(n) => {
            opt(n.name, f);
            opt(n.params, f);
            opt(n.runs_on, f);
            opt(n.mtc, f);
            opt(n.system, f);
            opt(n.ret, f);
            opt(n.body, f);
        }
        NodeKind::FormalPars(n) => list(&n.list, f),
        NodeKind::FormalPar(n) => {
            opt(n.ty, f);
            opt(n.name, f);
            opt(n.value, f);
        }
        NodeKind::ComponentTypeDecl(n) => {
            opt(n.name, f);
            list(&n.extends, f);
            list(&n.defs, f);
        }
        NodeKind::StructTypeDecl(n) => {
            opt(n.name, f);
            list(&n.fields, f);
        }
        NodeKind::Field(n) => {
            opt(n.ty, f);
            opt(n.name, f);
        }
        NodeKind::ListTypeDecl(n) => {
            opt(n.element, f);
            opt(n.name, f);
        }
        NodeKind::SubTypeDecl(n) => {
            opt(n.ty, f);
            opt(n.name, f);
            list(&n.constraint, f);
        }
        NodeKind::EnumTypeDecl(n) => {
            opt(n.name, f);
            list(&n.values, f);
        }
        NodeKind::EnumValue(n) => {
            opt(n.name, f);
            opt(n.value, f);
        }
        NodeKind::PortTypeDecl(n) => {
            opt(n.name, f);
            list(&n.messages, f);
        }
        NodeKind::ClassTypeDecl(n) => {
            opt(n.name, f);
            list(&n.extends, f);
            opt(n.runs_on, f);
            opt(n.mtc, f);
            opt(n.system, f);
            list(&n.defs, f);
        }
        NodeKind::ConstructorDecl(n) => {
            opt(n.params, f);
            opt(n.body, f);
        }
        NodeKind::ControlPart(n) => opt(n.body, f),
        NodeKind::BlockStmt(n) => list(&n.stmts, f),
        NodeKind::ExprStmt(x) => f(*x),
        NodeKind::IfStmt(n) => {
            opt(n.cond, f);
            opt(n.then, f);
            opt(n.else_, f);
        }
        NodeKind::ForStmt(n) => {
            opt(n.init, f);
            opt(n.cond, f);
            opt(n.post, f);
            opt(n.body, f);
        }
        NodeKind::WhileStmt(n) => {
            opt(n.cond, f);
            opt(n.body, f);
        }
        NodeKind::DoWhileStmt(n) => {
            opt(n.body, f);
            opt(n.cond, f);
        }
        NodeKind::ReturnStmt(x) => opt(*x, f),
        NodeKind::BinaryExpr(n) => {
            f(n.x);
            opt(n.y, f);
        }
        NodeKind::UnaryExpr(n) => opt(n.x, f),
        NodeKind::AssignmentExpr(n) => {
            f(n.target);
            opt(n.value, f);
        }
        NodeKind::CallExpr(n) => {
            f(n.fun);
            f(n.args);
        }
        NodeKind::ParenExpr(items) | NodeKind::CompositeLiteral(items) => list(items, f),
        NodeKind::SelectorExpr(n) => {
            f(n.x);
            opt(n.sel, f);
        }
        NodeKind::IndexExpr(n) => {
            f(n.x);
            opt(n.index, f);
        }
        NodeKind::BreakStmt
        | NodeKind::ContinueStmt
        | NodeKind::Ident
        | NodeKind::ValueLiteral(_)
        | NodeKind::Error => {}
    }
}

/// Pre-order traversal. Returning `false` from `f` skips the node's children.
pub fn walk(tree: &SyntaxTree, id: NodeId, f: &mut impl FnMut(NodeId, &NodeKind) -> bool) {
    let kind = tree.kind(id);
    if f(id, kind) {
        for_each_child(kind, |child| walk(tree, child, f));
    }
}

/// Collect the direct children of a node.
pub fn children(tree: &SyntaxTree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for_each_child(tree.kind(id), |child| out.push(child));
    out
}
