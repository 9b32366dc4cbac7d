//! The binder implementation.
//!
//! Walks one file's syntax tree and builds its scope tree and symbol tables.
//! Handles:
//! - Hoisting of module-level names so forward references stay local
//! - Scope creation for functions, templates, classes, components, blocks
//! - Symbol creation for every declaration, with redefinition reporting
//! - Import recording (transit / public) and imported-module symbols
//! - Routing of unresolved references into externally resolved groups
//! - Same-file `extends` / `runs on` augmentation and deferred providers

use crate::externals::*;
use crate::model::{ExtensionBase, SemanticModel};
use crate::symbol::*;
use rustc_hash::{FxHashMap, FxHashSet};
use vanadium_ast::visitor::for_each_child;
use vanadium_ast::*;
use vanadium_core::intern::{InternedString, StringInterner};
use vanadium_core::text::TextRange;
use vanadium_diagnostics::{SemanticError, SemanticErrorKind};

/// One `import from` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportInfo {
    pub module: InternedString,
    /// The `ImportDecl` node.
    pub declaration: NodeId,
    /// Range of the imported module's name.
    pub range: TextRange,
    /// `import from M { import all }`: re-imports the imports of `M`.
    pub transit: bool,
    /// Declared `public`, so importers of this module may see through it.
    pub public: bool,
}

/// The module a file declares, as seen after single-file binding.
#[derive(Debug, Clone)]
pub struct BoundModule {
    pub name: InternedString,
    pub declaration: NodeId,
    pub name_range: TextRange,
    pub scope: ScopeId,
    /// Imports in declaration order.
    pub imports: Vec<ImportInfo>,
    pub externals: ModuleExternals,
    /// Imported modules whose symbol was referenced as a qualifier.
    pub required_imports: FxHashSet<InternedString>,
}

impl BoundModule {
    /// Imports in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportInfo> {
        self.imports.iter()
    }
}

#[derive(Debug, Clone)]
pub struct BindResult {
    pub model: SemanticModel,
    pub module: Option<BoundModule>,
    pub errors: Vec<SemanticError>,
}

/// Bind a parsed file.
pub fn bind(tree: &SyntaxTree, text: &str, interner: &StringInterner) -> BindResult {
    let mut binder = Binder::new(tree, text, interner);
    binder.bind_root();
    if let Some(module) = &binder.module {
        tracing::debug!(
            module = interner.resolve(module.name),
            scopes = binder.model.scope_count(),
            symbols = binder.model.symbol_count(),
            externals = module.externals.total_len(),
            augmented = module.externals.augmented.len(),
            errors = binder.errors.len(),
            "bound module"
        );
    }
    BindResult {
        model: binder.model,
        module: binder.module,
        errors: binder.errors,
    }
}

/// An `extends` / `runs on` clause whose target kind is checked once the
/// whole module is bound.
struct Clause {
    node: NodeId,
    required: SymbolFlags,
    kind: SemanticErrorKind,
}

struct Binder<'a> {
    tree: &'a SyntaxTree,
    text: &'a str,
    interner: &'a StringInterner,
    model: SemanticModel,
    errors: Vec<SemanticError>,
    /// The current scope.
    scope: ScopeId,
    /// The group receiving unresolved value references.
    group: GroupId,
    externals: ModuleExternals,
    /// Augmented group index per provider name list.
    augmented_keys: FxHashMap<Vec<InternedString>, usize>,
    hoisted: FxHashSet<InternedString>,
    imports: Vec<ImportInfo>,
    required_imports: FxHashSet<InternedString>,
    enum_members: Vec<SymbolId>,
    clauses: Vec<Clause>,
    /// `Some(is_abstract)` while binding class members.
    abstract_class: Option<bool>,
    module: Option<BoundModule>,
}

impl<'a> Binder<'a> {
    fn new(tree: &'a SyntaxTree, text: &'a str, interner: &'a StringInterner) -> Self {
        Self {
            tree,
            text,
            interner,
            model: SemanticModel::new(interner),
            errors: Vec::new(),
            scope: ScopeId::ROOT,
            group: GroupId::Secondary,
            externals: ModuleExternals::default(),
            augmented_keys: FxHashMap::default(),
            hoisted: FxHashSet::default(),
            imports: Vec::new(),
            required_imports: FxHashSet::default(),
            enum_members: Vec::new(),
            clauses: Vec::new(),
            abstract_class: None,
            module: None,
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn text_of(&self, node: NodeId) -> &'a str {
        self.tree.text(self.text, node)
    }

    fn intern_node(&self, node: NodeId) -> Option<InternedString> {
        let text = self.text_of(node);
        (!text.is_empty()).then(|| self.interner.intern(text))
    }

    fn error(&mut self, kind: SemanticErrorKind, range: TextRange) {
        self.errors.push(SemanticError::new(kind, range));
    }

    fn with_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = prev;
        result
    }

    fn with_group<R>(&mut self, group: GroupId, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = std::mem::replace(&mut self.group, group);
        let result = f(self);
        self.group = prev;
        result
    }

    fn open_scope(&mut self, container: NodeId) -> ScopeId {
        self.model.new_scope(container, Some(self.scope))
    }

    fn current_table(&self) -> TableId {
        self.model.scope(self.scope).symbols
    }

    /// Name and name node of a type reference. Qualified references
    /// (`M.T`) report the selected name and `true`.
    fn type_ref_name(&self, node: NodeId) -> Option<(InternedString, NodeId, bool)> {
        match self.tree.kind(node) {
            NodeKind::Ident => Some((self.intern_node(node)?, node, false)),
            NodeKind::SelectorExpr(s) => {
                let sel = s.sel?;
                Some((self.intern_node(sel)?, sel, true))
            }
            _ => None,
        }
    }

    fn extension_bases(&self, nodes: &[NodeId]) -> Vec<ExtensionBase> {
        nodes
            .iter()
            .filter_map(|&n| self.type_ref_name(n))
            .map(|(name, node, _)| ExtensionBase { name, node })
            .collect()
    }

    // ========================================================================
    // Declaring symbols
    // ========================================================================

    fn insert_symbol(
        &mut self,
        table: TableId,
        name: InternedString,
        declaration: NodeId,
        range: TextRange,
        flags: SymbolFlags,
        containment: Containment,
    ) -> SymbolId {
        let symbol = Symbol::new(name, declaration, flags).with_containment(containment);
        let id = self.model.add_symbol(symbol);
        if self.model.table_mut(table).insert(name, id).is_some() {
            self.errors
                .push(SemanticError::redefinition(range, self.interner.resolve(name)));
        }
        id
    }

    /// Declare the symbol named by `name` in `table`. The declaration is the
    /// name's parent node. Nameless declarations are skipped.
    fn declare_in(
        &mut self,
        table: TableId,
        name: Option<NodeId>,
        flags: SymbolFlags,
        containment: Containment,
    ) -> Option<SymbolId> {
        let node = name?;
        let interned = self.intern_node(node)?;
        let declaration = self.tree.parent(node).unwrap_or(node);
        let range = self.tree.range(node);
        Some(self.insert_symbol(table, interned, declaration, range, flags, containment))
    }

    fn declare(
        &mut self,
        name: Option<NodeId>,
        flags: SymbolFlags,
        containment: Containment,
    ) -> Option<SymbolId> {
        let table = self.current_table();
        self.declare_in(table, name, flags, containment)
    }

    // ========================================================================
    // Hoisting
    // ========================================================================

    fn hoist_name(&mut self, name: Option<NodeId>) {
        if let Some(name) = name.and_then(|n| self.intern_node(n)) {
            self.hoisted.insert(name);
        }
    }

    fn hoist(&mut self, defs: &[NodeId]) {
        let tree = self.tree;
        for &def in defs {
            let node = match tree.kind(def) {
                NodeKind::Definition(d) => d.def,
                _ => def,
            };
            match tree.kind(node) {
                NodeKind::ValueDecl(d) => {
                    for &decl in &d.declarators {
                        if let NodeKind::Declarator(dc) = tree.kind(decl) {
                            self.hoist_name(dc.name);
                        }
                    }
                }
                NodeKind::TemplateDecl(d) => self.hoist_name(d.name),
                NodeKind::FuncDecl(d) => self.hoist_name(d.name),
                NodeKind::ComponentTypeDecl(d) => self.hoist_name(d.name),
                NodeKind::StructTypeDecl(d) => self.hoist_name(d.name),
                NodeKind::ListTypeDecl(d) => self.hoist_name(d.name),
                NodeKind::SubTypeDecl(d) => self.hoist_name(d.name),
                NodeKind::PortTypeDecl(d) => self.hoist_name(d.name),
                NodeKind::EnumTypeDecl(d) => {
                    self.hoist_name(d.name);
                    for &value in &d.values {
                        if let NodeKind::EnumValue(v) = tree.kind(value) {
                            self.hoist_name(v.name);
                        }
                    }
                }
                NodeKind::ClassTypeDecl(d) => {
                    self.hoist_name(d.name);
                    self.hoisted.insert(self.interner.intern_static("create"));
                }
                _ => {}
            }
        }
    }

    // ========================================================================
    // Modules and definitions
    // ========================================================================

    fn bind_root(&mut self) {
        let tree = self.tree;
        let root = tree.root();
        if root == NodeId::INVALID {
            return;
        }
        let NodeKind::Root(r) = tree.kind(root) else {
            return;
        };
        for &node in &r.nodes {
            let NodeKind::Module(m) = tree.kind(node) else {
                continue;
            };
            if self.module.is_some() {
                let range = m.name.map_or(tree.range(node), |n| tree.range(n));
                self.error(SemanticErrorKind::MultipleModulesInFile, range);
                continue;
            }
            self.bind_module(node, m);
        }
    }

    fn bind_module(&mut self, node: NodeId, m: &'a Module) {
        let Some(name_node) = m.name else {
            return;
        };
        let Some(name) = self.intern_node(name_node) else {
            return;
        };
        let root = self.model.new_scope(node, None);
        self.scope = root;

        self.hoist(&m.defs);
        for &def in &m.defs {
            self.bind_definition(def);
        }

        for member in std::mem::take(&mut self.enum_members) {
            let member_name = self.model.symbol(member).name;
            let table = self.model.scope(root).symbols;
            self.model.table_mut(table).insert_if_absent(member_name, member);
        }
        self.finish_augmentation(root);
        self.check_clauses(root);

        self.module = Some(BoundModule {
            name,
            declaration: node,
            name_range: self.tree.range(name_node),
            scope: root,
            imports: std::mem::take(&mut self.imports),
            externals: std::mem::take(&mut self.externals),
            required_imports: std::mem::take(&mut self.required_imports),
        });
    }

    fn bind_definition(&mut self, def: NodeId) {
        match self.tree.kind(def) {
            NodeKind::Definition(d) => self.bind_decl(d.def, d.visibility),
            _ => self.bind_decl(def, None),
        }
    }

    fn bind_decl(&mut self, node: NodeId, visibility: Option<Visibility>) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::ImportDecl(d) => self.bind_import(node, d, visibility),
            NodeKind::ValueDecl(d) => self.bind_value_decl(d),
            NodeKind::TemplateDecl(d) => self.bind_template(node, d),
            NodeKind::FuncDecl(d) => self.bind_func(node, d),
            NodeKind::ComponentTypeDecl(d) => self.bind_component(node, d),
            NodeKind::ClassTypeDecl(d) => self.bind_class(node, d),
            NodeKind::StructTypeDecl(d) => self.bind_struct(d),
            NodeKind::EnumTypeDecl(d) => self.bind_enum(d),
            NodeKind::ListTypeDecl(d) => {
                self.visit_type(d.element);
                self.declare(d.name, SymbolFlags::LIST_TYPE, Containment::None);
            }
            NodeKind::SubTypeDecl(d) => {
                self.visit_type(d.ty);
                for &c in &d.constraint {
                    self.visit_expr(Some(c));
                }
                self.declare(d.name, SymbolFlags::SUBTYPE_TYPE, Containment::None);
            }
            NodeKind::PortTypeDecl(d) => {
                for &message in &d.messages {
                    self.visit_type(Some(message));
                }
                self.declare(d.name, SymbolFlags::PORT_TYPE, Containment::None);
            }
            NodeKind::ConstructorDecl(d) => self.bind_constructor(node, d),
            NodeKind::ControlPart(d) => self.bind_control(node, d),
            NodeKind::Error => {}
            _ => self.bind_stmt(node),
        }
    }

    fn bind_import(&mut self, node: NodeId, d: &ImportDecl, visibility: Option<Visibility>) {
        let Some(module_node) = d.module else {
            return;
        };
        let Some(module) = self.intern_node(module_node) else {
            return;
        };
        let transit = d.is_transit();
        self.imports.push(ImportInfo {
            module,
            declaration: node,
            range: self.tree.range(module_node),
            transit,
            public: visibility == Some(Visibility::Public),
        });
        if !transit {
            // Importing the same module twice is not a redefinition.
            let table = self.current_table();
            if !self.model.table(table).contains(module) {
                let id = self.model.add_symbol(Symbol::new(
                    module,
                    node,
                    SymbolFlags::IMPORTED_MODULE,
                ));
                self.model.table_mut(table).insert_if_absent(module, id);
            }
        }
    }

    fn bind_value_decl(&mut self, d: &ValueDecl) {
        self.visit_type(d.ty);
        let flags = match d.kind {
            ValueKind::Const | ValueKind::ModulePar => {
                SymbolFlags::VARIABLE | SymbolFlags::VISIBILITY_STATIC
            }
            ValueKind::VarTemplate => SymbolFlags::VARIABLE | SymbolFlags::TEMPLATE,
            ValueKind::Var | ValueKind::Timer | ValueKind::Port => SymbolFlags::VARIABLE,
        };
        let tree = self.tree;
        for &decl in &d.declarators {
            let NodeKind::Declarator(dc) = tree.kind(decl) else {
                continue;
            };
            for &dim in &dc.dims {
                self.visit_expr(Some(dim));
            }
            self.visit_expr(dc.value);
            self.declare(dc.name, flags, Containment::None);
        }
    }

    fn bind_formal_pars(&mut self, params: Option<NodeId>) {
        let tree = self.tree;
        let Some(NodeKind::FormalPars(pars)) = params.map(|p| tree.kind(p)) else {
            return;
        };
        for &par in &pars.list {
            let NodeKind::FormalPar(p) = tree.kind(par) else {
                continue;
            };
            self.visit_type(p.ty);
            self.visit_expr(p.value);
            let mut flags = SymbolFlags::ARGUMENT | SymbolFlags::VARIABLE;
            if p.is_template {
                flags |= SymbolFlags::TEMPLATE;
            }
            self.declare(p.name, flags, Containment::None);
        }
    }

    fn bind_template(&mut self, node: NodeId, d: &'a TemplateDecl) {
        self.visit_type(d.ty);
        let scope = self.open_scope(node);
        if let Some(sym) = self.declare(d.name, SymbolFlags::TEMPLATE, Containment::Scope(scope)) {
            let bases = self.extension_bases(d.base.as_slice());
            self.model.set_bases(sym, bases);
        }
        self.with_scope(scope, |b| {
            b.bind_formal_pars(d.params);
            b.visit_expr(d.base);
            // A modified template sees the parameters of its base.
            let group = d
                .base
                .and_then(|base| b.augment(scope, &[(base, SymbolFlags::TEMPLATE)]));
            b.with_group(group.unwrap_or(b.group), |b| b.visit_expr(d.value));
        });
    }

    fn bind_func(&mut self, node: NodeId, d: &'a FuncDecl) {
        self.visit_type(d.runs_on);
        self.visit_type(d.mtc);
        self.visit_type(d.system);
        self.visit_type(d.ret);
        if let Some(runs_on) = d.runs_on {
            self.clauses.push(Clause {
                node: runs_on,
                required: SymbolFlags::COMPONENT,
                kind: SemanticErrorKind::RunsOnRequiresComponent,
            });
        }
        if d.modifiers.contains(ModifierFlags::ABSTRACT) && self.abstract_class != Some(true) {
            let range = d.name.map_or(self.tree.range(node), |n| self.tree.range(n));
            self.error(
                SemanticErrorKind::CannotHaveAbstractFunctionInNonAbstractClass,
                range,
            );
        }

        let scope = self.open_scope(node);
        self.declare(d.name, SymbolFlags::FUNCTION, Containment::Scope(scope));
        self.with_scope(scope, |b| {
            b.bind_formal_pars(d.params);
            let group = d
                .runs_on
                .and_then(|target| b.augment(scope, &[(target, SymbolFlags::COMPONENT)]));
            b.with_group(group.unwrap_or(b.group), |b| b.bind_block_contents(d.body));
        });
    }

    fn bind_component(&mut self, node: NodeId, d: &'a ComponentTypeDecl) {
        for &base in &d.extends {
            self.visit_type(Some(base));
            self.clauses.push(Clause {
                node: base,
                required: SymbolFlags::COMPONENT,
                kind: SemanticErrorKind::ComponentCanBeExtendedByComponentOnly,
            });
        }
        let scope = self.open_scope(node);
        if let Some(sym) = self.declare(d.name, SymbolFlags::COMPONENT_TYPE, Containment::Scope(scope)) {
            let bases = self.extension_bases(&d.extends);
            self.model.set_bases(sym, bases);
        }
        self.with_scope(scope, |b| {
            for &def in &d.defs {
                b.bind_decl(def, None);
            }
        });
    }

    fn bind_class(&mut self, node: NodeId, d: &'a ClassTypeDecl) {
        let mut targets = Vec::with_capacity(d.extends.len() + 1);
        for &base in &d.extends {
            self.visit_type(Some(base));
            self.clauses.push(Clause {
                node: base,
                required: SymbolFlags::CLASS,
                kind: SemanticErrorKind::ClassCanBeExtendedByClassOnly,
            });
            targets.push((base, SymbolFlags::CLASS));
        }
        self.visit_type(d.runs_on);
        self.visit_type(d.mtc);
        self.visit_type(d.system);
        if let Some(runs_on) = d.runs_on {
            self.clauses.push(Clause {
                node: runs_on,
                required: SymbolFlags::COMPONENT,
                kind: SemanticErrorKind::RunsOnRequiresComponent,
            });
            targets.push((runs_on, SymbolFlags::COMPONENT));
        }

        let scope = self.open_scope(node);
        if let Some(sym) = self.declare(d.name, SymbolFlags::CLASS_TYPE, Containment::Scope(scope)) {
            let bases = self.extension_bases(&d.extends);
            self.model.set_bases(sym, bases);
        }
        // Member names stay hoisted only while the class body is bound.
        let outer_hoisted = self.hoisted.clone();
        self.hoist(&d.defs);

        let is_abstract = d.modifiers.contains(ModifierFlags::ABSTRACT);
        self.with_scope(scope, |b| {
            let this = b.interner.intern_static("this");
            let table = b.current_table();
            let range = d.name.map_or(b.tree.range(node), |n| b.tree.range(n));
            b.insert_symbol(table, this, node, range, SymbolFlags::THIS, Containment::Scope(scope));

            let group = b.augment(scope, &targets);
            let prev = b.abstract_class.replace(is_abstract);
            b.with_group(group.unwrap_or(b.group), |b| {
                for &def in &d.defs {
                    b.bind_decl(def, None);
                }
            });
            b.abstract_class = prev;
        });
        self.hoisted = outer_hoisted;
    }

    fn bind_constructor(&mut self, node: NodeId, d: &'a ConstructorDecl) {
        let scope = self.open_scope(node);
        let create = self.interner.intern_static("create");
        let table = self.current_table();
        let flags = SymbolFlags::CONSTRUCTOR | SymbolFlags::FUNCTION;
        let range = self.tree.range(node);
        self.insert_symbol(table, create, node, range, flags, Containment::Scope(scope));
        self.with_scope(scope, |b| {
            b.bind_formal_pars(d.params);
            b.bind_block_contents(d.body);
        });
    }

    fn bind_control(&mut self, node: NodeId, d: &'a ControlPart) {
        let scope = self.open_scope(node);
        let control = self.interner.intern_static("control");
        let table = self.current_table();
        let flags = SymbolFlags::CONTROL | SymbolFlags::ANONYMOUS;
        let range = self.tree.range(node);
        self.insert_symbol(table, control, node, range, flags, Containment::Scope(scope));
        self.with_scope(scope, |b| b.bind_block_contents(d.body));
    }

    fn bind_struct(&mut self, d: &StructTypeDecl) {
        let table = self.model.new_table();
        let flags = match d.kind {
            StructKind::Union => SymbolFlags::UNION_TYPE,
            StructKind::Record | StructKind::Set => SymbolFlags::STRUCT_TYPE,
        };
        self.declare(d.name, flags, Containment::Members(table));
        let tree = self.tree;
        for &field in &d.fields {
            if let NodeKind::Field(f) = tree.kind(field) {
                self.visit_type(f.ty);
                self.declare_in(table, f.name, SymbolFlags::FIELD, Containment::None);
            }
        }
    }

    fn bind_enum(&mut self, d: &EnumTypeDecl) {
        let table = self.model.new_table();
        self.declare(d.name, SymbolFlags::ENUM_TYPE, Containment::Members(table));
        let tree = self.tree;
        for &value in &d.values {
            if let NodeKind::EnumValue(v) = tree.kind(value) {
                self.visit_expr(v.value);
                if let Some(id) = self.declare_in(table, v.name, SymbolFlags::ENUM_MEMBER, Containment::None) {
                    self.enum_members.push(id);
                }
            }
        }
    }

    // ========================================================================
    // Augmentation
    // ========================================================================

    /// Push the member tables of the `(target, required flags)` clauses onto
    /// `scope`. Targets that cannot be found in this file yet become the
    /// providers of an augmented group, whose id is returned.
    fn augment(&mut self, scope: ScopeId, targets: &[(NodeId, SymbolFlags)]) -> Option<GroupId> {
        let mut pending = Vec::new();
        let mut visited = FxHashSet::default();
        for &(target, required) in targets {
            let Some((name, node, qualified)) = self.type_ref_name(target) else {
                continue;
            };
            let provider = AugmentationProvider {
                name,
                node,
                required,
            };
            if qualified {
                push_unique(&mut pending, provider);
                continue;
            }
            match self.model.resolve_own(ScopeId::ROOT, name) {
                Some(sym) if self.model.symbol(sym).flags.contains(required) => {
                    self.inject_local_chain(scope, sym, required, &mut visited, &mut pending);
                }
                Some(_) => {}
                None if self.model.resolve_builtin(name).is_some() => {}
                None => push_unique(&mut pending, provider),
            }
        }
        (!pending.is_empty()).then(|| self.augmented_group(pending, scope))
    }

    /// Inject `sym`'s members into `scope` and follow its `extends` chain
    /// through this file. Chain links not found here are added to `pending`.
    fn inject_local_chain(
        &mut self,
        scope: ScopeId,
        sym: SymbolId,
        required: SymbolFlags,
        visited: &mut FxHashSet<SymbolId>,
        pending: &mut Vec<AugmentationProvider>,
    ) {
        if !visited.insert(sym) {
            return;
        }
        if let Some(table) = self.model.members(sym) {
            self.model.augment(scope, table);
        }
        for base in self.model.extension_bases(sym).to_vec() {
            match self.model.resolve_own(ScopeId::ROOT, base.name) {
                Some(next) if self.model.symbol(next).flags.contains(required) => {
                    self.inject_local_chain(scope, next, required, visited, pending);
                }
                Some(_) => {}
                None if self.model.resolve_builtin(base.name).is_some() => {}
                None => push_unique(
                    pending,
                    AugmentationProvider {
                        name: base.name,
                        node: base.node,
                        required,
                    },
                ),
            }
        }
    }

    fn augmented_group(&mut self, providers: Vec<AugmentationProvider>, scope: ScopeId) -> GroupId {
        let key: Vec<InternedString> = providers.iter().map(|p| p.name).collect();
        let index = match self.augmented_keys.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.externals.augmented.len();
                self.externals.augmented.push(ExternallyResolvedGroup {
                    providers,
                    ..Default::default()
                });
                self.augmented_keys.insert(key, index);
                index
            }
        };
        let group = &mut self.externals.augmented[index];
        if !group.scopes.contains(&scope) {
            group.scopes.push(scope);
        }
        GroupId::Augmented(index)
    }

    /// Providers declared later in the same file are only known once the
    /// module is bound. Inject them now, drop the references they explain
    /// and hand groups without remaining providers over to `secondary`.
    fn finish_augmentation(&mut self, root: ScopeId) {
        let mut groups = std::mem::take(&mut self.externals.augmented);
        for group in &mut groups {
            let mut remaining = Vec::new();
            for provider in std::mem::take(&mut group.providers) {
                match self.model.resolve_own(root, provider.name) {
                    Some(sym) if self.model.symbol(sym).flags.contains(provider.required) => {
                        for &scope in &group.scopes {
                            let mut visited = FxHashSet::default();
                            self.inject_local_chain(
                                scope,
                                sym,
                                provider.required,
                                &mut visited,
                                &mut remaining,
                            );
                        }
                    }
                    Some(_) => {}
                    None => push_unique(&mut remaining, provider),
                }
            }
            group.providers = remaining;

            for ident in std::mem::take(&mut group.idents) {
                if self.model.resolve_own(ident.scope, ident.name).is_some() {
                    continue;
                }
                if group.is_augmented() {
                    group.idents.push(ident);
                } else {
                    self.externals.secondary.push(ident);
                }
            }
        }
        groups.retain(ExternallyResolvedGroup::is_augmented);
        self.externals.augmented = groups;
    }

    fn check_clauses(&mut self, root: ScopeId) {
        for clause in std::mem::take(&mut self.clauses) {
            let Some((name, _, false)) = self.type_ref_name(clause.node) else {
                continue;
            };
            if let Some(sym) = self.model.resolve_own(root, name) {
                if !self.model.symbol(sym).flags.contains(clause.required) {
                    self.error(clause.kind, self.tree.range(clause.node));
                }
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Bind the statements of a block directly in the current scope.
    fn bind_block_contents(&mut self, body: Option<NodeId>) {
        let Some(body) = body else {
            return;
        };
        let tree = self.tree;
        match tree.kind(body) {
            NodeKind::BlockStmt(block) => {
                for &stmt in &block.stmts {
                    self.bind_stmt(stmt);
                }
            }
            _ => self.bind_stmt(body),
        }
    }

    fn bind_stmt(&mut self, node: NodeId) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::BlockStmt(_) => {
                let scope = self.open_scope(node);
                self.with_scope(scope, |b| b.bind_block_contents(Some(node)));
            }
            NodeKind::ValueDecl(d) => self.bind_value_decl(d),
            NodeKind::TemplateDecl(d) => self.bind_template(node, d),
            NodeKind::ExprStmt(expr) => self.visit_expr(Some(*expr)),
            NodeKind::IfStmt(s) => {
                self.visit_expr(s.cond);
                self.bind_opt_stmt(s.then);
                self.bind_opt_stmt(s.else_);
            }
            NodeKind::ForStmt(s) => {
                let scope = self.open_scope(node);
                self.with_scope(scope, |b| {
                    b.bind_opt_stmt(s.init);
                    b.visit_expr(s.cond);
                    b.visit_expr(s.post);
                    b.bind_opt_stmt(s.body);
                });
            }
            NodeKind::WhileStmt(s) => {
                self.visit_expr(s.cond);
                self.bind_opt_stmt(s.body);
            }
            NodeKind::DoWhileStmt(s) => {
                self.bind_opt_stmt(s.body);
                self.visit_expr(s.cond);
            }
            NodeKind::ReturnStmt(value) => self.visit_expr(*value),
            NodeKind::BreakStmt | NodeKind::ContinueStmt | NodeKind::Error => {}
            _ => self.visit_expr(Some(node)),
        }
    }

    fn bind_opt_stmt(&mut self, node: Option<NodeId>) {
        if let Some(node) = node {
            self.bind_stmt(node);
        }
    }

    // ========================================================================
    // References
    // ========================================================================

    /// Visit a type reference. Its leading identifier goes to `primary`.
    fn visit_type(&mut self, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        match self.tree.kind(node) {
            NodeKind::Ident => self.bind_reference(node, GroupId::Primary),
            NodeKind::SelectorExpr(s) => self.visit_type(Some(s.x)),
            NodeKind::IndexExpr(i) => {
                self.visit_type(Some(i.x));
                self.visit_expr(i.index);
            }
            _ => self.visit_expr(Some(node)),
        }
    }

    fn visit_expr(&mut self, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Ident => self.bind_reference(node, self.group),
            // Only the start of a selector chain can be resolved by scope.
            NodeKind::SelectorExpr(s) => self.visit_expr(Some(s.x)),
            // Field names on the left of `:=` are not references.
            NodeKind::ParenExpr(items) | NodeKind::CompositeLiteral(items) => {
                for &item in items {
                    match tree.kind(item) {
                        NodeKind::AssignmentExpr(a) => self.visit_expr(a.value),
                        _ => self.visit_expr(Some(item)),
                    }
                }
            }
            kind => for_each_child(kind, |child| self.visit_expr(Some(child))),
        }
    }

    fn bind_reference(&mut self, node: NodeId, group: GroupId) {
        let Some(name) = self.intern_node(node) else {
            return;
        };
        if let Some(sym) = self.model.resolve_own(self.scope, name) {
            if self.model.symbol(sym).flags.contains(SymbolFlags::IMPORTED_MODULE) {
                self.required_imports.insert(name);
            }
            return;
        }
        if self.hoisted.contains(&name) || self.model.resolve_builtin(name).is_some() {
            return;
        }
        self.externals.group_mut(group).push(ExternalIdent {
            node,
            name,
            scope: self.scope,
        });
    }
}

fn push_unique(providers: &mut Vec<AugmentationProvider>, provider: AugmentationProvider) {
    if !providers.iter().any(|p| p.name == provider.name) {
        providers.push(provider);
    }
}
