//! Binder integration tests over parsed TTCN-3 snippets.

use pretty_assertions::assert_eq;
use vanadium_ast::{NodeKind, SyntaxTree};
use vanadium_binder::*;
use vanadium_core::intern::StringInterner;
use vanadium_diagnostics::SemanticErrorKind;

struct Bound {
    text: String,
    tree: SyntaxTree,
    result: BindResult,
    interner: StringInterner,
}

impl Bound {
    fn new(text: &str) -> Self {
        let interner = StringInterner::new();
        let tree = vanadium_parser::parse(text);
        assert!(tree.errors.is_empty(), "syntax errors: {:?}", tree.errors);
        let result = bind(&tree, text, &interner);
        Self {
            text: text.to_string(),
            tree,
            result,
            interner,
        }
    }

    fn module(&self) -> &BoundModule {
        self.result.module.as_ref().expect("module should be bound")
    }

    fn names(&self, group: &ExternallyResolvedGroup) -> Vec<String> {
        group
            .idents
            .iter()
            .map(|ident| self.interner.resolve(ident.name).to_string())
            .collect()
    }

    fn primary(&self) -> Vec<String> {
        self.names(&self.module().externals.primary)
    }

    fn secondary(&self) -> Vec<String> {
        self.names(&self.module().externals.secondary)
    }

    fn error_kinds(&self) -> Vec<SemanticErrorKind> {
        self.result.errors.iter().map(|e| e.kind).collect()
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        let name = self.interner.intern(name);
        self.result.model.resolve_own(self.module().scope, name)
    }

    fn offset_of(&self, needle: &str) -> u32 {
        self.text.find(needle).expect("needle should exist") as u32
    }
}

// ============================================================================
// Hoisting and groups
// ============================================================================

#[test]
fn test_forward_references_are_local() {
    let b = Bound::new(
        "module M {
            function f() { g(); var integer y := c; }
            function g() {}
            const integer c := 1;
        }",
    );
    assert!(b.primary().is_empty());
    assert!(b.secondary().is_empty());
    assert!(b.result.errors.is_empty());
}

#[test]
fn test_type_references_go_to_primary() {
    let b = Bound::new(
        "module M {
            import from A all;
            const ImportedType c := imported_value;
            function f(in ParType p) return RetType { var LocalType x := other; }
        }",
    );
    // Clause types are visited before the formal parameters.
    assert_eq!(b.primary(), vec!["ImportedType", "RetType", "ParType", "LocalType"]);
    assert_eq!(b.secondary(), vec!["imported_value", "other"]);
}

#[test]
fn test_builtins_are_never_external() {
    let b = Bound::new(
        "module M {
            function f() { var charstring s := int2str(lengthof(\"abc\")); setverdict(pass); }
        }",
    );
    assert!(b.primary().is_empty());
    assert!(b.secondary().is_empty());
}

#[test]
fn test_selector_and_field_names() {
    let b = Bound::new(
        "module M {
            function f() { var R r := { field1 := a, field2 := b.x.y }; r.z := c(d := e); }
        }",
    );
    assert_eq!(b.primary(), vec!["R"]);
    assert_eq!(b.secondary(), vec!["a", "b", "c", "e"]);
}

// ============================================================================
// Symbols
// ============================================================================

#[test]
fn test_redefinition_keeps_second() {
    let b = Bound::new(
        "module M {
            const integer x := 1;
            const integer x := 2;
        }",
    );
    assert_eq!(b.error_kinds(), vec![SemanticErrorKind::Redefinition]);
    let error = &b.result.errors[0];
    assert_eq!(error.name.as_deref(), Some("x"));

    let sym = b.lookup("x").expect("x should resolve");
    let decl = b.result.model.symbol(sym).declaration;
    assert!(b.tree.range(decl).pos > b.offset_of(":= 1"));
}

#[test]
fn test_symbol_kinds_and_containment() {
    let b = Bound::new(
        "module M {
            type record R { integer a, boolean b optional }
            type union U { integer i }
            type enumerated E { e_one, e_two(2) }
            type component C { var integer v; timer t; }
            type record of integer L;
            type integer Small (0 .. 10);
            type port P message { inout integer; }
            template integer tmpl := 5;
            control { var integer z; }
        }",
    );
    assert!(b.result.errors.is_empty(), "{:?}", b.result.errors);
    let model = &b.result.model;
    let flags = |name: &str| model.symbol(b.lookup(name).expect(name)).flags;

    assert!(flags("R").contains(SymbolFlags::STRUCT_TYPE));
    assert!(flags("U").contains(SymbolFlags::UNION_TYPE));
    assert!(flags("C").contains(SymbolFlags::COMPONENT_TYPE));
    assert!(flags("L").contains(SymbolFlags::LIST_TYPE));
    assert!(flags("Small").contains(SymbolFlags::SUBTYPE_TYPE));
    assert!(flags("P").contains(SymbolFlags::PORT_TYPE));
    assert!(flags("tmpl").contains(SymbolFlags::TEMPLATE));
    // Enum members are visible at module scope.
    assert!(flags("e_two").contains(SymbolFlags::ENUM_MEMBER));

    let record = b.lookup("R").expect("R");
    let fields = model.members(record).expect("record members");
    assert_eq!(model.table(fields).len(), 2);
    assert_eq!(model.originated_scope(record), None);

    let component = b.lookup("C").expect("C");
    let scope = model.originated_scope(component).expect("component scope");
    assert_eq!(model.table(model.scope(scope).symbols).len(), 2);

    // The control part is hidden from enumeration.
    let root_table = model.scope(b.module().scope).symbols;
    let visible: Vec<_> = model
        .enumerate(root_table)
        .map(|id| b.interner.resolve(model.symbol(id).name).to_string())
        .collect();
    assert!(!visible.contains(&"control".to_string()));
    assert!(visible.contains(&"tmpl".to_string()));
}

#[test]
fn test_class_scope() {
    let b = Bound::new(
        "module M {
            type class K {
                var integer count;
                create(integer start) { count := start; }
                function get() return integer { return this.count + later; }
                var integer later;
            }
        }",
    );
    assert!(b.result.errors.is_empty());
    assert!(b.secondary().is_empty(), "{:?}", b.secondary());
    let model = &b.result.model;
    let class = b.lookup("K").expect("K");
    let scope = model.originated_scope(class).expect("class scope");
    let table = model.table(model.scope(scope).symbols);
    for name in ["this", "create", "count", "get", "later"] {
        assert!(table.contains(b.interner.intern(name)), "{name}");
    }
}

#[test]
fn test_class_members_are_hoisted_only_inside_the_class() {
    let b = Bound::new(
        "module M {
            type class K { function get() return integer { return count; } var integer count; }
            function f() { var integer y := count; }
        }",
    );
    assert_eq!(b.secondary(), vec!["count"]);
    let ident = &b.module().externals.secondary.idents[0];
    assert_eq!(b.tree.range(ident.node).pos, b.offset_of(":= count") + 3);
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_imports_are_recorded() {
    let b = Bound::new(
        "module M {
            import from A all;
            public import from B all;
            import from C { import all };
            import from A { type T };
            function f() { A.x := 1; }
        }",
    );
    let imports: Vec<_> = b
        .module()
        .imports()
        .map(|i| (b.interner.resolve(i.module).to_string(), i.transit, i.public))
        .collect();
    assert_eq!(
        imports,
        vec![
            ("A".to_string(), false, false),
            ("B".to_string(), false, true),
            ("C".to_string(), true, false),
            ("A".to_string(), false, false),
        ]
    );
    assert!(b.result.errors.is_empty(), "re-importing A is not a redefinition");

    let model = &b.result.model;
    assert!(model.symbol(b.lookup("A").expect("A")).flags.contains(SymbolFlags::IMPORTED_MODULE));
    assert!(b.lookup("C").is_none(), "transit imports declare no module symbol");
    assert!(b.module().required_imports.contains(&b.interner.intern("A")));
    assert!(b.secondary().is_empty());
}

// ============================================================================
// Augmentation
// ============================================================================

#[test]
fn test_runs_on_local_component() {
    let b = Bound::new(
        "module M {
            type component C { var integer field; }
            testcase t() runs on C { field := 1; }
        }",
    );
    assert!(b.module().externals.augmented.is_empty());
    assert!(b.secondary().is_empty());

    let model = &b.result.model;
    let testcase = b.lookup("t").expect("t");
    let scope = model.originated_scope(testcase).expect("testcase scope");
    let component = b.lookup("C").expect("C");
    let field = b.interner.intern("field");
    let members = model.members(component).expect("members");
    assert_eq!(model.resolve_own(scope, field), model.table(members).get(field));
    assert_eq!(model.resolve_direct(scope, field), None);
}

#[test]
fn test_runs_on_later_component() {
    let b = Bound::new(
        "module M {
            testcase t() runs on C { field := 1; missing := 2; }
            type component C { var integer field; }
        }",
    );
    assert!(b.module().externals.augmented.is_empty());
    assert_eq!(b.secondary(), vec!["missing"]);
}

#[test]
fn test_runs_on_external_component() {
    let b = Bound::new(
        "module M {
            import from Other all;
            testcase t() runs on Provider { imported_name := 1; }
            function g() runs on Provider { other_name := 2; }
        }",
    );
    let externals = &b.module().externals;
    assert_eq!(b.primary(), vec!["Provider", "Provider"]);
    assert_eq!(externals.augmented.len(), 1, "one group per provider list");
    let group = &externals.augmented[0];
    assert_eq!(group.providers.len(), 1);
    assert_eq!(b.interner.resolve(group.providers[0].name), "Provider");
    assert_eq!(group.scopes.len(), 2);
    assert_eq!(b.names(group), vec!["imported_name", "other_name"]);
    assert!(b.secondary().is_empty());
}

#[test]
fn test_local_chain_with_external_base() {
    let b = Bound::new(
        "module M {
            type component C extends Base { var integer own; }
            testcase t() runs on C { own := 1; inherited := 2; }
        }",
    );
    let externals = &b.module().externals;
    assert_eq!(externals.augmented.len(), 1);
    let group = &externals.augmented[0];
    assert_eq!(b.interner.resolve(group.providers[0].name), "Base");
    assert_eq!(b.names(group), vec!["inherited"]);

    let model = &b.result.model;
    let component = b.lookup("C").expect("C");
    let bases: Vec<_> = model
        .extension_bases(component)
        .iter()
        .map(|base| b.interner.resolve(base.name).to_string())
        .collect();
    assert_eq!(bases, vec!["Base"]);
}

#[test]
fn test_local_chain_is_followed() {
    let b = Bound::new(
        "module M {
            type component A { var integer a; }
            type component B extends A { var integer b; }
            function f() runs on B { a := b; }
        }",
    );
    assert!(b.module().externals.augmented.is_empty());
    assert!(b.secondary().is_empty());
}

#[test]
fn test_modified_template_sees_local_base_parameters() {
    let b = Bound::new(
        "module M {
            type record R { integer a }
            template R derived modifies base := { a := p + 1 };
            template R base(integer p) := { a := p };
        }",
    );
    assert!(b.module().externals.augmented.is_empty());
    assert!(b.secondary().is_empty(), "{:?}", b.secondary());

    let model = &b.result.model;
    let derived = b.lookup("derived").expect("derived");
    let bases: Vec<_> = model
        .extension_bases(derived)
        .iter()
        .map(|base| b.interner.resolve(base.name).to_string())
        .collect();
    assert_eq!(bases, vec!["base"]);
}

#[test]
fn test_modified_template_with_external_base() {
    let b = Bound::new(
        "module M {
            template R derived modifies base := { a := p + q };
            const integer q := 1;
        }",
    );
    let externals = &b.module().externals;
    assert_eq!(externals.augmented.len(), 1);
    let group = &externals.augmented[0];
    assert_eq!(b.interner.resolve(group.providers[0].name), "base");
    assert_eq!(group.providers[0].required, SymbolFlags::TEMPLATE);
    assert_eq!(b.names(group), vec!["p"]);
    assert_eq!(b.secondary(), vec!["base"]);
    assert_eq!(b.primary(), vec!["R"]);
}

// ============================================================================
// Semantic errors
// ============================================================================

#[test]
fn test_extension_target_kinds() {
    let b = Bound::new(
        "module M {
            type record R { integer a }
            type component C { }
            testcase t() runs on R { }
            type component D extends R { }
            type class K extends C { }
        }",
    );
    let mut kinds = b.error_kinds();
    kinds.sort_by_key(|k| format!("{k:?}"));
    assert_eq!(
        kinds,
        vec![
            SemanticErrorKind::ClassCanBeExtendedByClassOnly,
            SemanticErrorKind::ComponentCanBeExtendedByComponentOnly,
            SemanticErrorKind::RunsOnRequiresComponent,
        ]
    );
}

#[test]
fn test_abstract_functions() {
    let b = Bound::new(
        "module M {
            type class @abstract Shape { function @abstract area() return float; }
            type class Square { function @abstract area() return float; }
        }",
    );
    assert_eq!(
        b.error_kinds(),
        vec![SemanticErrorKind::CannotHaveAbstractFunctionInNonAbstractClass]
    );
    assert!(b.result.errors[0].range.pos > b.offset_of("Square"));
}

#[test]
fn test_second_module_is_not_bound() {
    let b = Bound::new("module First { const integer a := 1; } module Second { const integer b := 2; }");
    assert_eq!(b.error_kinds(), vec![SemanticErrorKind::MultipleModulesInFile]);
    assert_eq!(b.interner.resolve(b.module().name), "First");
    assert!(b.lookup("b").is_none());
}

#[test]
fn test_no_module() {
    let interner = StringInterner::new();
    let tree = vanadium_parser::parse("");
    let result = bind(&tree, "", &interner);
    assert!(result.module.is_none());
    assert_eq!(result.model.root_scope(), None);
}

// ============================================================================
// Scope tree
// ============================================================================

#[test]
fn test_scope_at() {
    let b = Bound::new(
        "module M {
            function f(integer p) {
                if (p > 0) { var integer inner := p; }
            }
            function g() { }
        }",
    );
    let model = &b.result.model;
    let root = b.module().scope;
    let f_scope = model.originated_scope(b.lookup("f").expect("f")).expect("f scope");
    let g_scope = model.originated_scope(b.lookup("g").expect("g")).expect("g scope");
    assert_eq!(model.scope(root).children, vec![f_scope, g_scope]);

    let inner = model.scope_at(&b.tree, b.offset_of("inner")).expect("scope");
    assert_eq!(model.scope(inner).parent, Some(f_scope));
    assert!(matches!(b.tree.kind(model.scope(inner).container), NodeKind::BlockStmt(_)));

    assert_eq!(model.scope_at(&b.tree, b.offset_of("p)")), Some(f_scope));
    assert_eq!(model.scope_at(&b.tree, b.offset_of("function g") - 1), Some(root));
}
