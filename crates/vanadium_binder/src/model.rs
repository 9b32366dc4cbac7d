//! Per-file storage for scopes, symbol tables and symbols.
//!
//! A [`SemanticModel`] is the arena of one bound file: every scope, table and
//! symbol the binder creates lives here and is addressed by index. Rebinding a
//! file builds a fresh model, which invalidates every id into the old one at
//! once.

use crate::builtins::{BUILTINS, BUILTIN_MEMBERS};
use crate::symbol::*;
use rustc_hash::FxHashMap;
use vanadium_ast::{NodeId, SyntaxTree};
use vanadium_core::intern::{InternedString, StringInterner};
use vanadium_core::text::TextPos;

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The syntax node whose range this scope covers.
    pub container: NodeId,
    pub parent: Option<ScopeId>,
    /// Child scopes in source order. Their containers never overlap.
    pub children: Vec<ScopeId>,
    pub symbols: TableId,
    /// Additional same-file tables searched after `symbols`.
    pub augmentation: Vec<TableId>,
}

/// A name listed in an `extends` clause, kept so chains can be followed
/// across modules.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExtensionBase {
    pub name: InternedString,
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct SemanticModel {
    scopes: Vec<Scope>,
    tables: Vec<SymbolTable>,
    symbols: Vec<Symbol>,
    bases: FxHashMap<SymbolId, Vec<ExtensionBase>>,
    builtins: TableId,
}

impl SemanticModel {
    /// Create an empty model with the builtin table populated.
    pub fn new(interner: &StringInterner) -> Self {
        let mut model = Self {
            scopes: Vec::new(),
            tables: Vec::new(),
            symbols: Vec::new(),
            bases: FxHashMap::default(),
            builtins: TableId(0),
        };
        model.builtins = model.new_table();
        for &(name, kind) in BUILTINS {
            let name = interner.intern_static(name);
            let id = model.add_symbol(Symbol::new(name, NodeId::INVALID, kind.flags()));
            model.tables[model.builtins.index()].insert(name, id);
        }
        for &(name, members) in BUILTIN_MEMBERS {
            let table = model.new_table();
            for &member in members {
                let member = interner.intern_static(member);
                let flags = SymbolFlags::BUILTIN | SymbolFlags::FUNCTION;
                let id = model.add_symbol(Symbol::new(member, NodeId::INVALID, flags));
                model.tables[table.index()].insert(member, id);
            }
            let name = interner.intern_static(name);
            let flags = SymbolFlags::BUILTIN | SymbolFlags::CLASS_TYPE;
            let id = model.add_symbol(
                Symbol::new(name, NodeId::INVALID, flags).with_containment(Containment::Members(table)),
            );
            model.tables[model.builtins.index()].insert(name, id);
        }
        model
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn new_table(&mut self) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.tables.push(SymbolTable::new());
        id
    }

    /// Create a scope and append it to its parent's children.
    pub fn new_scope(&mut self, container: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let symbols = self.new_table();
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            container,
            parent,
            children: Vec::new(),
            symbols,
            augmentation: Vec::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub(crate) fn table_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.index()]
    }

    pub(crate) fn augment(&mut self, scope: ScopeId, table: TableId) {
        let augmentation = &mut self.scopes[scope.index()].augmentation;
        if !augmentation.contains(&table) {
            augmentation.push(table);
        }
    }

    pub(crate) fn set_bases(&mut self, symbol: SymbolId, bases: Vec<ExtensionBase>) {
        if !bases.is_empty() {
            self.bases.insert(symbol, bases);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn table(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.index()]
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// The module scope, if the file bound a module.
    pub fn root_scope(&self) -> Option<ScopeId> {
        (!self.scopes.is_empty()).then_some(ScopeId::ROOT)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn builtins(&self) -> TableId {
        self.builtins
    }

    /// The table holding a symbol's members, whichever containment it uses.
    pub fn members(&self, id: SymbolId) -> Option<TableId> {
        match self.symbol(id).containment {
            Containment::None => None,
            Containment::Scope(scope) => Some(self.scope(scope).symbols),
            Containment::Members(table) => Some(table),
        }
    }

    pub fn originated_scope(&self, id: SymbolId) -> Option<ScopeId> {
        match self.symbol(id).containment {
            Containment::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    pub fn extension_bases(&self, id: SymbolId) -> &[ExtensionBase] {
        self.bases.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Symbols of a table in declaration order, skipping anonymous ones.
    pub fn enumerate(&self, table: TableId) -> impl Iterator<Item = SymbolId> + '_ {
        self.table(table)
            .iter()
            .map(|(_, id)| id)
            .filter(|&id| !self.symbol(id).flags.contains(SymbolFlags::ANONYMOUS))
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Own table, then same-file augmentation, then the parent scope. Never
    /// leaves the file and never consults builtins.
    pub fn resolve_own(&self, scope: ScopeId, name: InternedString) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(found) = self.table(scope.symbols).get(name) {
                return Some(found);
            }
            for &table in &scope.augmentation {
                if let Some(found) = self.table(table).get(name) {
                    return Some(found);
                }
            }
            current = scope.parent;
        }
        None
    }

    /// Own table and ancestors only, skipping augmentation.
    pub fn resolve_direct(&self, scope: ScopeId, name: InternedString) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(found) = self.table(scope.symbols).get(name) {
                return Some(found);
            }
            current = scope.parent;
        }
        None
    }

    pub fn resolve_builtin(&self, name: InternedString) -> Option<SymbolId> {
        self.table(self.builtins).get(name)
    }

    /// The innermost scope whose container covers `pos`.
    pub fn scope_at(&self, tree: &SyntaxTree, pos: TextPos) -> Option<ScopeId> {
        let root = self.root_scope()?;
        if !tree.range(self.scope(root).container).contains(pos) {
            return None;
        }
        let mut current = root;
        loop {
            let children = &self.scope(current).children;
            let after = children.partition_point(|&c| tree.range(self.scope(c).container).pos <= pos);
            match after.checked_sub(1).map(|i| children[i]) {
                Some(child) if tree.range(self.scope(child).container).contains(pos) => {
                    current = child;
                }
                _ => return Some(current),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(interner: &StringInterner) -> (SemanticModel, ScopeId, ScopeId) {
        let mut model = SemanticModel::new(interner);
        let root = model.new_scope(NodeId(0), None);
        let inner = model.new_scope(NodeId(1), Some(root));
        (model, root, inner)
    }

    #[test]
    fn test_resolve_walks_parents() {
        let interner = StringInterner::new();
        let (mut model, root, inner) = model_with(&interner);
        let x = interner.intern("x");
        let sym = model.add_symbol(Symbol::new(x, NodeId(5), SymbolFlags::VARIABLE));
        let table = model.scope(root).symbols;
        model.table_mut(table).insert(x, sym);
        assert_eq!(model.resolve_own(inner, x), Some(sym));
        assert_eq!(model.resolve_direct(inner, x), Some(sym));
        assert_eq!(model.scope(root).children, vec![inner]);
    }

    #[test]
    fn test_resolve_direct_skips_augmentation() {
        let interner = StringInterner::new();
        let (mut model, _root, inner) = model_with(&interner);
        let f = interner.intern("field");
        let members = model.new_table();
        let sym = model.add_symbol(Symbol::new(f, NodeId(7), SymbolFlags::VARIABLE));
        model.table_mut(members).insert(f, sym);
        model.augment(inner, members);
        model.augment(inner, members);
        assert_eq!(model.scope(inner).augmentation.len(), 1);
        assert_eq!(model.resolve_own(inner, f), Some(sym));
        assert_eq!(model.resolve_direct(inner, f), None);
    }

    #[test]
    fn test_builtins_are_separate() {
        let interner = StringInterner::new();
        let (model, root, _) = model_with(&interner);
        let integer = interner.intern("integer");
        assert_eq!(model.resolve_own(root, integer), None);
        let builtin = model.resolve_builtin(integer).map(|id| model.symbol(id).flags);
        assert!(builtin.is_some_and(|f| f.contains(SymbolFlags::BUILTIN | SymbolFlags::TYPE)));
        let timer = model.resolve_builtin(interner.intern("timer"));
        assert!(timer.and_then(|id| model.members(id)).is_some());
    }

    #[test]
    fn test_enumerate_skips_anonymous() {
        let interner = StringInterner::new();
        let (mut model, root, _) = model_with(&interner);
        let table = model.scope(root).symbols;
        for (name, flags) in [("a", SymbolFlags::VARIABLE), ("b", SymbolFlags::ANONYMOUS)] {
            let name = interner.intern(name);
            let id = model.add_symbol(Symbol::new(name, NodeId(0), flags));
            model.table_mut(table).insert(name, id);
        }
        assert_eq!(model.enumerate(table).count(), 1);
    }
}
