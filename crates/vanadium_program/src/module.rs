//! The module a file declares, and its crossbind bookkeeping.
//!
//! The bound part ([`BoundModule`]) never changes after binding. What
//! crossbinding learns is kept in [`CrossbindState`] behind the module's own
//! lock: which identifiers of each group are explained, which foreign tables
//! were injected into which scopes, and which other file versions each
//! injection depends on. Detaching one of those versions undoes exactly the
//! entries that mention it.

use crate::import_visitor::MissingModule;
use crate::source_file::{FileId, SourceFile};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Weak};
use vanadium_ast::NodeId;
use vanadium_binder::{
    BoundModule, ExternalIdent, ExternallyResolvedGroup, GroupId, ImportInfo, ModuleExternals,
    ScopeId, TableId,
};
use vanadium_core::bitset::Bitset;
use vanadium_core::intern::InternedString;
use vanadium_core::text::TextRange;

/// A table of another file version injected into a local scope.
#[derive(Debug, Clone)]
pub(crate) struct ExternalTable {
    pub file: FileId,
    pub source: Weak<SourceFile>,
    pub table: TableId,
}

/// Where an injected table went.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InjectionTarget {
    /// Every scope of the group (augmentation).
    GroupScopes,
    Scope(ScopeId),
}

/// One table injection and what it explained.
#[derive(Debug, Clone)]
pub(crate) struct DependencyEntry {
    pub table: TableId,
    pub target: InjectionTarget,
    pub group: GroupId,
    pub contribution: Bitset,
    pub augmenting_locals: bool,
    /// Every file version the injection was found through, provider last.
    pub path: Vec<FileId>,
}

#[derive(Debug, Clone)]
pub(crate) struct GroupState {
    pub resolution: Bitset,
    pub providers_injected: bool,
    /// Indices left unexplained by the last crossbind of the group.
    pub unresolved: Vec<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct CrossbindState {
    pub groups: Vec<GroupState>,
    pub injections: FxHashMap<ScopeId, Vec<ExternalTable>>,
    /// Keyed by the providing file version.
    pub dependencies: FxHashMap<FileId, Vec<DependencyEntry>>,
    /// Every file version this module registered itself with as a dependent.
    pub links: FxHashMap<FileId, Weak<SourceFile>>,
    /// Direct imports naming a module nobody declares.
    pub missing_imports: Vec<ImportInfo>,
    /// Every missing module name met by an import walk.
    pub waiting_for: FxHashSet<InternedString>,
    /// Missing modules met below one of this module's transit imports.
    pub missing_through_transit: Vec<MissingModule>,
}

impl CrossbindState {
    fn new(externals: &ModuleExternals) -> Self {
        let groups = externals
            .ids()
            .map(|id| GroupState {
                resolution: Bitset::with_len(externals.group(id).len()),
                providers_injected: false,
                unresolved: Vec::new(),
            })
            .collect();
        Self {
            groups,
            ..Default::default()
        }
    }

    pub fn group(&self, id: GroupId) -> &GroupState {
        &self.groups[slot(id)]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut GroupState {
        &mut self.groups[slot(id)]
    }

    /// Add `table` to a scope's external tables unless it is already there.
    pub fn inject(&mut self, scope: ScopeId, source: &Arc<SourceFile>, table: TableId) {
        let tables = self.injections.entry(scope).or_default();
        if !tables.iter().any(|t| t.file == source.id() && t.table == table) {
            tables.push(ExternalTable {
                file: source.id(),
                source: Arc::downgrade(source),
                table,
            });
        }
    }

    /// Record an injection, merging with an identical earlier one.
    pub fn record(&mut self, provider: FileId, entry: DependencyEntry) {
        let entries = self.dependencies.entry(provider).or_default();
        let same = entries.iter_mut().find(|e| {
            e.table == entry.table
                && e.target == entry.target
                && e.group == entry.group
                && e.path == entry.path
        });
        match same {
            Some(existing) => existing.contribution.union_with(&entry.contribution),
            None => entries.push(entry),
        }
    }
}

fn slot(id: GroupId) -> usize {
    match id {
        GroupId::Primary => 0,
        GroupId::Secondary => 1,
        GroupId::Augmented(i) => 2 + i,
    }
}

/// A read-only view of one dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub provider: FileId,
    pub table: TableId,
    pub target: InjectionTarget,
    pub group: GroupId,
    pub contribution: Bitset,
    pub augmenting_locals: bool,
    pub path: Vec<FileId>,
}

#[derive(Debug)]
pub struct ModuleDescriptor {
    bound: BoundModule,
    pub(crate) state: Mutex<CrossbindState>,
    /// File versions whose crossbinding used this module.
    pub(crate) dependents: Mutex<FxHashMap<FileId, Weak<SourceFile>>>,
}

impl ModuleDescriptor {
    pub(crate) fn new(bound: BoundModule) -> Self {
        let state = CrossbindState::new(&bound.externals);
        Self {
            bound,
            state: Mutex::new(state),
            dependents: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn name(&self) -> InternedString {
        self.bound.name
    }

    /// The `module` node.
    pub fn declaration(&self) -> NodeId {
        self.bound.declaration
    }

    pub fn name_range(&self) -> TextRange {
        self.bound.name_range
    }

    pub fn scope(&self) -> ScopeId {
        self.bound.scope
    }

    /// Imports in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportInfo> {
        self.bound.imports()
    }

    pub fn externals(&self) -> &ModuleExternals {
        &self.bound.externals
    }

    pub fn group(&self, id: GroupId) -> &ExternallyResolvedGroup {
        self.bound.externals.group(id)
    }

    pub fn required_imports(&self) -> &FxHashSet<InternedString> {
        &self.bound.required_imports
    }

    pub fn resolution(&self, id: GroupId) -> Bitset {
        self.state.lock().group(id).resolution.clone()
    }

    pub fn is_resolved(&self, id: GroupId) -> bool {
        self.state.lock().group(id).resolution.all()
    }

    /// Identifiers no crossbind could explain, primary group first.
    pub fn unresolved(&self) -> Vec<ExternalIdent> {
        let state = self.state.lock();
        let mut unresolved = Vec::new();
        for id in self.bound.externals.ids() {
            let idents = &self.group(id).idents;
            unresolved.extend(state.group(id).unresolved.iter().map(|&i| idents[i]));
        }
        unresolved
    }

    pub fn missing_imports(&self) -> Vec<ImportInfo> {
        self.state.lock().missing_imports.clone()
    }

    pub(crate) fn missing_through_transit(&self) -> Vec<MissingModule> {
        self.state.lock().missing_through_transit.clone()
    }

    /// Every recorded dependency entry, ordered by provider.
    pub fn dependencies(&self) -> Vec<Dependency> {
        let state = self.state.lock();
        let mut providers: Vec<_> = state.dependencies.keys().copied().collect();
        providers.sort();
        let mut dependencies = Vec::new();
        for provider in providers {
            for e in &state.dependencies[&provider] {
                dependencies.push(Dependency {
                    provider,
                    table: e.table,
                    target: e.target,
                    group: e.group,
                    contribution: e.contribution.clone(),
                    augmenting_locals: e.augmenting_locals,
                    path: e.path.clone(),
                });
            }
        }
        dependencies
    }

    /// Every file version this module depends on, directly or as a hop.
    pub fn dependency_files(&self) -> Vec<FileId> {
        let state = self.state.lock();
        let mut files: FxHashSet<FileId> = FxHashSet::default();
        for entries in state.dependencies.values() {
            for entry in entries {
                files.extend(entry.path.iter().copied());
            }
        }
        let mut files: Vec<_> = files.into_iter().collect();
        files.sort();
        files
    }

    pub fn dependent_files(&self) -> Vec<FileId> {
        let mut files: Vec<_> = self.dependents.lock().keys().copied().collect();
        files.sort();
        files
    }

    pub(crate) fn external_tables(&self, scope: ScopeId) -> Vec<ExternalTable> {
        self.state
            .lock()
            .injections
            .get(&scope)
            .cloned()
            .unwrap_or_default()
    }

    /// Undo everything learned through `file`. Returns whether anything
    /// changed.
    pub(crate) fn forget(&self, file: FileId) -> bool {
        let mut state = self.state.lock();
        let mut removed = Vec::new();
        for (&provider, entries) in state.dependencies.iter_mut() {
            let (gone, kept): (Vec<_>, Vec<_>) =
                entries.drain(..).partition(|e| e.path.contains(&file));
            *entries = kept;
            removed.extend(gone.into_iter().map(|e| (provider, e)));
        }
        state.dependencies.retain(|_, entries| !entries.is_empty());
        let linked = state.links.remove(&file).is_some();
        if removed.is_empty() {
            return linked;
        }

        for (provider, entry) in &removed {
            let group = state.group_mut(entry.group);
            group.resolution.subtract(&entry.contribution);
            if entry.augmenting_locals {
                group.providers_injected = false;
            }
            let still_used = state.dependencies.get(provider).is_some_and(|entries| {
                entries
                    .iter()
                    .any(|e| e.table == entry.table && self.covers(e, entry))
            });
            if !still_used {
                for scope in self.target_scopes(entry) {
                    if let Some(tables) = state.injections.get_mut(&scope) {
                        tables.retain(|t| !(t.file == *provider && t.table == entry.table));
                    }
                }
            }
        }
        state.injections.retain(|_, tables| !tables.is_empty());
        true
    }

    fn target_scopes(&self, entry: &DependencyEntry) -> Vec<ScopeId> {
        match entry.target {
            InjectionTarget::GroupScopes => self.group(entry.group).scopes.clone(),
            InjectionTarget::Scope(scope) => vec![scope],
        }
    }

    /// Whether `kept` injects into every scope `removed` did.
    fn covers(&self, kept: &DependencyEntry, removed: &DependencyEntry) -> bool {
        let kept = self.target_scopes(kept);
        self.target_scopes(removed).iter().all(|s| kept.contains(s))
    }
}
