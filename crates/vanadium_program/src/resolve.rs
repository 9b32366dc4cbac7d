//! Handles into a program's semantic model.
//!
//! Ids of a [`SemanticModel`](vanadium_binder::SemanticModel) only mean
//! something for the file version that produced them. A handle pairs the id
//! with that version and keeps it alive while the handle exists, so a
//! handle taken before an edit still reads the old, consistent state.

use crate::crossbind::is_exported;
use crate::source_file::SourceFile;
use std::fmt;
use std::sync::Arc;
use vanadium_ast::NodeId;
use vanadium_binder::{ExtensionBase, ScopeId, Symbol, SymbolFlags, SymbolId, TableId};
use vanadium_core::intern::InternedString;
use vanadium_core::text::TextRange;

#[derive(Clone)]
pub struct SymbolRef {
    file: Arc<SourceFile>,
    id: SymbolId,
}

impl SymbolRef {
    pub fn new(file: Arc<SourceFile>, id: SymbolId) -> Self {
        Self { file, id }
    }

    pub fn file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn symbol(&self) -> &Symbol {
        self.file.model().symbol(self.id)
    }

    pub fn name(&self) -> InternedString {
        self.symbol().name
    }

    pub fn flags(&self) -> SymbolFlags {
        self.symbol().flags
    }

    pub fn is_builtin(&self) -> bool {
        self.flags().contains(SymbolFlags::BUILTIN)
    }

    /// The declaring node, [`NodeId::INVALID`] for builtins.
    pub fn declaration(&self) -> NodeId {
        self.symbol().declaration
    }

    pub fn declaration_range(&self) -> Option<TextRange> {
        let node = self.declaration();
        (node != NodeId::INVALID).then(|| self.file.tree().range(node))
    }

    pub fn members(&self) -> Option<TableRef> {
        let table = self.file.model().members(self.id)?;
        Some(TableRef::new(self.file.clone(), table))
    }

    pub fn originated_scope(&self) -> Option<ScopeRef> {
        let scope = self.file.model().originated_scope(self.id)?;
        Some(ScopeRef::new(self.file.clone(), scope))
    }

    pub fn extension_bases(&self) -> &[ExtensionBase] {
        self.file.model().extension_bases(self.id)
    }
}

impl PartialEq for SymbolRef {
    fn eq(&self, other: &Self) -> bool {
        self.file.id() == other.file.id() && self.id == other.id
    }
}

impl Eq for SymbolRef {}

impl fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolRef")
            .field("file", &self.file.path())
            .field("id", &self.id)
            .field("flags", &self.flags())
            .finish()
    }
}

#[derive(Clone)]
pub struct TableRef {
    file: Arc<SourceFile>,
    id: TableId,
}

impl TableRef {
    pub fn new(file: Arc<SourceFile>, id: TableId) -> Self {
        Self { file, id }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn lookup(&self, name: InternedString) -> Option<SymbolRef> {
        let id = self.file.model().table(self.id).get(name)?;
        Some(SymbolRef::new(self.file.clone(), id))
    }

    /// Named symbols in declaration order.
    pub fn enumerate(&self) -> Vec<SymbolRef> {
        self.file
            .model()
            .enumerate(self.id)
            .map(|id| SymbolRef::new(self.file.clone(), id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.file.model().table(self.id).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableRef({}, {:?})", self.file.path(), self.id)
    }
}

#[derive(Clone)]
pub struct ScopeRef {
    file: Arc<SourceFile>,
    id: ScopeId,
}

impl ScopeRef {
    pub fn new(file: Arc<SourceFile>, id: ScopeId) -> Self {
        Self { file, id }
    }

    /// The module scope of `file`, if it declares a module.
    pub fn module_scope(file: &Arc<SourceFile>) -> Option<Self> {
        let module = file.module()?;
        Some(Self::new(file.clone(), module.scope()))
    }

    /// The innermost scope of `file` covering `pos`.
    pub fn at(file: &Arc<SourceFile>, pos: vanadium_core::text::TextPos) -> Option<Self> {
        let id = file.model().scope_at(file.tree(), pos)?;
        Some(Self::new(file.clone(), id))
    }

    pub fn file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn container(&self) -> NodeId {
        self.file.model().scope(self.id).container
    }

    pub fn range(&self) -> TextRange {
        self.file.tree().range(self.container())
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        let parent = self.file.model().scope(self.id).parent?;
        Some(Self::new(self.file.clone(), parent))
    }

    pub fn children(&self) -> Vec<ScopeRef> {
        self.file
            .model()
            .scope(self.id)
            .children
            .iter()
            .map(|&child| Self::new(self.file.clone(), child))
            .collect()
    }

    pub fn symbols(&self) -> TableRef {
        TableRef::new(self.file.clone(), self.file.model().scope(self.id).symbols)
    }

    /// Full resolution: at every level the own table, the same-file
    /// augmentation, then the tables crossbinding injected. Builtins last.
    pub fn resolve(&self, name: InternedString) -> Option<SymbolRef> {
        let model = self.file.model();
        let mut current = Some(self.id);
        while let Some(id) = current {
            let scope = model.scope(id);
            let local = std::iter::once(&scope.symbols)
                .chain(&scope.augmentation)
                .find_map(|&table| model.table(table).get(name));
            if let Some(found) = local {
                return Some(SymbolRef::new(self.file.clone(), found));
            }
            if let Some(module) = self.file.module() {
                for external in module.external_tables(id) {
                    let Some(source) = external.source.upgrade() else {
                        continue;
                    };
                    let found = source
                        .model()
                        .table(external.table)
                        .get(name)
                        .filter(|&s| is_exported(source.model().symbol(s).flags));
                    if let Some(found) = found {
                        return Some(SymbolRef::new(source, found));
                    }
                }
            }
            current = scope.parent;
        }
        let builtin = model.resolve_builtin(name)?;
        Some(SymbolRef::new(self.file.clone(), builtin))
    }

    /// Same-file resolution without builtins.
    pub fn resolve_own(&self, name: InternedString) -> Option<SymbolRef> {
        let found = self.file.model().resolve_own(self.id, name)?;
        Some(SymbolRef::new(self.file.clone(), found))
    }

    /// Own tables and ancestors only.
    pub fn resolve_direct(&self, name: InternedString) -> Option<SymbolRef> {
        let found = self.file.model().resolve_direct(self.id, name)?;
        Some(SymbolRef::new(self.file.clone(), found))
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.file.id() == other.file.id() && self.id == other.id
    }
}

impl Eq for ScopeRef {}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeRef({}, {:?})", self.file.path(), self.id)
    }
}
