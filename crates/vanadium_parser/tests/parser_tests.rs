//! Parser integration tests.
//!
//! Verifies tree shape, ranges and error recovery for TTCN-3 sources.

use vanadium_ast::node::*;
use vanadium_ast::types::*;
use vanadium_ast::visitor::{children, walk};
use vanadium_parser::parse;

/// Helper: the single module of a parsed file.
fn module_of(tree: &SyntaxTree) -> &Module {
    let NodeKind::Root(root) = tree.kind(tree.root()) else {
        panic!("root expected");
    };
    let NodeKind::Module(module) = tree.kind(root.nodes[0]) else {
        panic!("module expected");
    };
    module
}

/// Helper: the payload of the n-th definition of the module.
fn def_kind(tree: &SyntaxTree, n: usize) -> &NodeKind {
    let NodeKind::Definition(def) = tree.kind(module_of(tree).defs[n]) else {
        panic!("definition expected");
    };
    tree.kind(def.def)
}

/// Helper: count nodes matching a predicate.
fn count_nodes(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> usize {
    let mut count = 0;
    walk(tree, tree.root(), &mut |_, kind| {
        if pred(kind) {
            count += 1;
        }
        true
    });
    count
}

// ============================================================================
// Modules and imports
// ============================================================================

#[test]
fn test_empty_module() {
    let src = "module ModuleA {\n}";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    let module = module_of(&tree);
    assert_eq!(tree.text(src, module.name.unwrap()), "ModuleA");
    assert!(module.defs.is_empty());
}

#[test]
fn test_imports() {
    let src = "module B {
        import from ModuleA all;
        public import from ModuleC { import all };
        import from ModuleD { type T1, T2; const c };
    }";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);

    let NodeKind::ImportDecl(plain) = def_kind(&tree, 0) else { panic!() };
    assert!(!plain.is_transit());
    assert_eq!(tree.text(src, plain.module.unwrap()), "ModuleA");

    let NodeKind::Definition(def) = tree.kind(module_of(&tree).defs[1]) else { panic!() };
    assert_eq!(def.visibility, Some(Visibility::Public));
    let NodeKind::ImportDecl(transit) = tree.kind(def.def) else { panic!() };
    assert!(transit.is_transit());

    let NodeKind::ImportDecl(selective) = def_kind(&tree, 2) else { panic!() };
    let ImportSpec::List(items) = &selective.spec else { panic!() };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, ImportKind::Type);
    assert_eq!(items[0].names.len(), 2);
    assert!(!selective.is_transit());
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn test_component_and_testcase() {
    let src = "module A {
        type component Provider { var integer imported_name; timer t; }
        testcase target() runs on Provider system Provider { imported_name := 1; }
    }";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);

    let NodeKind::ComponentTypeDecl(comp) = def_kind(&tree, 0) else { panic!() };
    assert_eq!(comp.defs.len(), 2);

    let NodeKind::FuncDecl(func) = def_kind(&tree, 1) else { panic!() };
    assert_eq!(func.kind, FuncKind::Testcase);
    assert_eq!(tree.text(src, func.runs_on.unwrap()), "Provider");
    assert!(func.system.is_some());
    let body = func.body.unwrap();
    let NodeKind::BlockStmt(block) = tree.kind(body) else { panic!() };
    let NodeKind::ExprStmt(expr) = tree.kind(block.stmts[0]) else { panic!() };
    assert!(matches!(tree.kind(*expr), NodeKind::AssignmentExpr(_)));
}

#[test]
fn test_types() {
    let src = "module A {
        type record R { integer a, charstring b optional }
        type record of R RList;
        type union U { integer i }
        type enumerated E { e_one, e_two(2) }
        type integer Small (0..10);
        type port P message { inout R; in integer }
    }";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    let NodeKind::StructTypeDecl(rec) = def_kind(&tree, 0) else { panic!() };
    assert_eq!(rec.kind, StructKind::Record);
    assert_eq!(rec.fields.len(), 2);
    assert!(matches!(def_kind(&tree, 1), NodeKind::ListTypeDecl(l) if l.kind == ListKind::RecordOf));
    assert!(matches!(def_kind(&tree, 2), NodeKind::StructTypeDecl(u) if u.kind == StructKind::Union));
    let NodeKind::EnumTypeDecl(en) = def_kind(&tree, 3) else { panic!() };
    assert_eq!(en.values.len(), 2);
    let NodeKind::SubTypeDecl(sub) = def_kind(&tree, 4) else { panic!() };
    assert_eq!(sub.constraint.len(), 1);
    let NodeKind::PortTypeDecl(port) = def_kind(&tree, 5) else { panic!() };
    assert_eq!(port.messages.len(), 2);
}

#[test]
fn test_class() {
    let src = "module A {
        type class @abstract Shape extends Base runs on C {
            var integer x;
            create(integer x) { this.x := x; }
            function @abstract area() return float;
        }
    }";
    let tree = parse(src);
    let NodeKind::ClassTypeDecl(class) = def_kind(&tree, 0) else { panic!() };
    assert!(class.modifiers.contains(ModifierFlags::ABSTRACT));
    assert_eq!(class.extends.len(), 1);
    assert!(class.runs_on.is_some());
    assert_eq!(class.defs.len(), 3);
    assert!(matches!(tree.kind(class.defs[1]), NodeKind::ConstructorDecl(_)));
    let NodeKind::FuncDecl(area) = tree.kind(class.defs[2]) else { panic!() };
    assert!(area.modifiers.contains(ModifierFlags::ABSTRACT));
    assert!(area.body.is_none());
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
}

#[test]
fn test_template_modifies() {
    let src = "module A { template R t2 modifies t1 := { a := 2 } }";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    let NodeKind::TemplateDecl(t) = def_kind(&tree, 0) else { panic!() };
    assert_eq!(tree.text(src, t.base.unwrap()), "t1");
    assert!(matches!(tree.kind(t.value.unwrap()), NodeKind::CompositeLiteral(_)));
}

// ============================================================================
// Statements and expressions
// ============================================================================

#[test]
fn test_statements() {
    let src = "module A { control {
        var integer i := 0;
        for (var integer j := 0; j < 10; j := j + 1) { i := i + j; }
        while (i > 0) { i := i - 1; }
        do { i := i + 1 } while (i < 3);
        if (i == 3) { log(i) } else if (i == 4) { } else { }
        f(x := 1).field[2];
    } }";
    let tree = parse(src);
    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::ForStmt(_))), 1);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::WhileStmt(_))), 1);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::DoWhileStmt(_))), 1);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::IfStmt(_))), 2);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::CallExpr(_))), 2);
    assert_eq!(count_nodes(&tree, |k| matches!(k, NodeKind::IndexExpr(_))), 1);
}

#[test]
fn test_precedence() {
    let src = "module A { const integer c := 1 + 2 * 3; }";
    let tree = parse(src);
    let NodeKind::ValueDecl(decl) = def_kind(&tree, 0) else { panic!() };
    let NodeKind::Declarator(d) = tree.kind(decl.declarators[0]) else { panic!() };
    let NodeKind::BinaryExpr(add) = tree.kind(d.value.unwrap()) else { panic!() };
    assert_eq!(tree.text(src, add.x), "1");
    assert_eq!(tree.text(src, add.y.unwrap()), "2 * 3");
}

// ============================================================================
// Ranges, parents and recovery
// ============================================================================

#[test]
fn test_parents_and_ranges() {
    let src = "module A { function f() { var integer x := y; } }";
    let tree = parse(src);
    let mut idents = Vec::new();
    walk(&tree, tree.root(), &mut |id, kind| {
        if matches!(kind, NodeKind::Ident) {
            idents.push(id);
        }
        true
    });
    let y = *idents
        .iter()
        .find(|&&id| tree.text(src, id) == "y")
        .unwrap();
    for ancestor in tree.ancestors(y) {
        assert!(tree.range(ancestor).covers(tree.range(y)));
    }
    assert_eq!(tree.node_at(tree.range(y).pos), Some(y));
    assert_eq!(children(&tree, tree.root()).len(), 1);
}

#[test]
fn test_recovery_keeps_following_definitions() {
    let src = "module A {
        const integer a := ;
        garbage here;
        const integer b := 2;
    }";
    let tree = parse(src);
    assert!(!tree.errors.is_empty());
    let defs = &module_of(&tree).defs;
    assert_eq!(defs.len(), 2);
}

#[test]
fn test_two_modules() {
    let tree = parse("module A {} module B {}");
    let NodeKind::Root(root) = tree.kind(tree.root()) else { panic!() };
    assert_eq!(root.nodes.len(), 2);
}
