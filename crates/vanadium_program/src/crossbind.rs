//! Crossbinding: explaining a module's externally resolved identifiers with
//! the tables of other modules.
//!
//! Crossbinding one group runs three steps:
//!
//! 1. For augmented groups whose providers are not injected yet, find every
//!    provider through the imports, inject its member table into the
//!    group's scopes and follow its `extends` chain, across modules if
//!    needed.
//! 2. Walk the imports in declaration order and inject the root table of
//!    every module that explains a still unresolved identifier into the
//!    module scope. The first module that declares a name wins.
//! 3. Record what is left as the group's unresolved identifiers.
//!
//! Every injection is recorded as a dependency entry together with the
//! identifiers it newly explained, so detaching the provider (or any module
//! it was reached through) can undo it precisely.

use crate::import_visitor::{path_ids, ImportWalk};
use crate::module::{CrossbindState, DependencyEntry, InjectionTarget, ModuleDescriptor};
use crate::program::Program;
use crate::source_file::{FileId, SourceFile};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, trace};
use vanadium_binder::{ExternallyResolvedGroup, GroupId, SymbolFlags, SymbolId, TableId};
use vanadium_core::bitset::Bitset;
use vanadium_core::intern::InternedString;

/// A symbol found through an import walk.
struct Found {
    file: Arc<SourceFile>,
    symbol: SymbolId,
    path: Vec<FileId>,
}

/// Crossbind one group of `file`'s module.
pub(crate) fn crossbind(program: &Program, file: &Arc<SourceFile>, id: GroupId) {
    if let Some(walk) = bind_group(program, file, id) {
        // Registering crosses into other modules, so the own lock is released.
        register_dependent(program, file, &walk.touched);
    }
}

/// Resolve one group under the module's own lock. Returns the walk that
/// found the providers, or `None` if `file` declares no module.
fn bind_group<'p>(program: &'p Program, file: &Arc<SourceFile>, id: GroupId) -> Option<ImportWalk<'p>> {
    let module = file.module()?;
    let group = module.group(id);
    let mut walk = ImportWalk::new(program);
    let mut state = module.state.lock();
    state.group_mut(id).unresolved.clear();
    let mut binding = GroupBinding {
        file,
        module,
        group,
        id,
        state: &mut *state,
    };
    if group.is_augmented() && !binding.state.group(id).providers_injected {
        binding.augment(&mut walk);
    }
    if !binding.state.group(id).resolution.all() {
        binding.resolve_through_imports(&mut walk);
    }

    let group_state = state.group_mut(id);
    group_state.unresolved = group_state.resolution.zeroes().collect();
    let unresolved = group_state.unresolved.len();
    state.waiting_for.extend(walk.missing.iter().map(|m| m.name));
    for missing in walk.missing.iter().filter(|m| m.via.is_some()) {
        if !state.missing_through_transit.contains(missing) {
            state.missing_through_transit.push(*missing);
        }
    }
    for (&other, source) in &walk.touched {
        if other != file.id() {
            state.links.insert(other, Arc::downgrade(source));
        }
    }
    trace!(
        module = program.interner().resolve(module.name()),
        group = ?id,
        idents = group.len(),
        unresolved,
        "crossbound group"
    );
    drop(state);
    Some(walk)
}

/// Register `file` as a dependent of every provider it used. A provider
/// version that was detached before the registration landed is forgotten
/// again and `file` is marked dirty. Returns whether every provider was
/// still live.
pub(crate) fn register_dependent(
    program: &Program,
    file: &Arc<SourceFile>,
    providers: &FxHashMap<FileId, Arc<SourceFile>>,
) -> bool {
    let mut live = true;
    for (&other, source) in providers {
        if other == file.id() {
            continue;
        }
        let Some(other_module) = source.module() else {
            continue;
        };
        other_module
            .dependents
            .lock()
            .insert(file.id(), Arc::downgrade(file));
        // Detaching removes the version from the module index before it
        // drains `dependents`, so one of the two sides always sees the other.
        let current = program
            .get_module(other_module.name())
            .is_some_and(|declaring| declaring.id() == other);
        if !current {
            other_module.dependents.lock().remove(&file.id());
            if let Some(module) = file.module() {
                module.forget(other);
            }
            live = false;
        }
    }
    if !live {
        debug!(path = file.path(), id = %file.id(), "provider detached during crossbind");
        file.mark_dirty();
    }
    live
}

/// Recompute the direct imports of `file` that name no known module.
pub(crate) fn refresh_missing_imports(program: &Program, file: &SourceFile) {
    let Some(module) = file.module() else {
        return;
    };
    let missing: Vec<_> = module
        .imports()
        .filter(|import| program.get_module(import.module).is_none())
        .copied()
        .collect();
    let mut state = module.state.lock();
    state.waiting_for.clear();
    state.waiting_for.extend(missing.iter().map(|i| i.module));
    state.missing_through_transit.clear();
    state.missing_imports = missing;
}

struct GroupBinding<'a> {
    file: &'a Arc<SourceFile>,
    module: &'a ModuleDescriptor,
    group: &'a ExternallyResolvedGroup,
    id: GroupId,
    state: &'a mut CrossbindState,
}

impl GroupBinding<'_> {
    fn augment(&mut self, walk: &mut ImportWalk<'_>) {
        let mut complete = true;
        let mut visited = FxHashSet::default();
        let group = self.group;
        for provider in &group.providers {
            match find_exported(walk, self.file, provider.name) {
                Some(found) if flags_of(&found).contains(provider.required) => {
                    complete &= self.inject_chain(walk, found, provider.required, &mut visited);
                }
                _ => complete = false,
            }
        }
        if complete {
            self.state.group_mut(self.id).providers_injected = true;
        }
    }

    /// Inject the members of `found` and of every base it extends. Returns
    /// whether the whole chain was found.
    fn inject_chain(
        &mut self,
        walk: &mut ImportWalk<'_>,
        found: Found,
        required: SymbolFlags,
        visited: &mut FxHashSet<(FileId, SymbolId)>,
    ) -> bool {
        if !visited.insert((found.file.id(), found.symbol)) {
            return true;
        }
        let source = &found.file;
        let model = source.model();
        if let Some(table) = model.members(found.symbol) {
            let contribution = self.explained_by(source, table, false);
            for &scope in &self.group.scopes {
                self.state.inject(scope, source, table);
            }
            self.state
                .group_mut(self.id)
                .resolution
                .union_with(&contribution);
            self.state.record(
                source.id(),
                DependencyEntry {
                    table,
                    target: InjectionTarget::GroupScopes,
                    group: self.id,
                    contribution,
                    augmenting_locals: true,
                    path: found.path.clone(),
                },
            );
        }

        let mut complete = true;
        for base in model.extension_bases(found.symbol) {
            let local = source
                .module()
                .and_then(|m| model.resolve_direct(m.scope(), base.name));
            let next = match local {
                Some(symbol) => Some(Found {
                    file: source.clone(),
                    symbol,
                    path: found.path.clone(),
                }),
                None => find_exported(walk, source, base.name).map(|far| Found {
                    path: found.path.iter().chain(&far.path).copied().collect(),
                    ..far
                }),
            };
            match next {
                Some(next) if flags_of(&next).contains(required) => {
                    complete &= self.inject_chain(walk, next, required, visited);
                }
                _ => complete = false,
            }
        }
        complete
    }

    fn resolve_through_imports(&mut self, walk: &mut ImportWalk<'_>) {
        let root = self.module.scope();
        let file = self.file;
        let _ = walk.visit(file, |imported, via| {
            let Some(imported_module) = imported.module() else {
                return ControlFlow::Continue(());
            };
            let table = imported.model().scope(imported_module.scope()).symbols;
            let contribution = self.explained_by(imported, table, true);
            if !contribution.none() {
                self.state.inject(root, imported, table);
                let resolution = &mut self.state.group_mut(self.id).resolution;
                resolution.union_with(&contribution);
                self.state.record(
                    imported.id(),
                    DependencyEntry {
                        table,
                        target: InjectionTarget::Scope(root),
                        group: self.id,
                        contribution,
                        augmenting_locals: false,
                        path: path_ids(via, imported),
                    },
                );
            }
            if self.state.group(self.id).resolution.all() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
    }

    /// Still unresolved identifiers of the group that `table` declares.
    fn explained_by(&self, source: &SourceFile, table: TableId, exports_only: bool) -> Bitset {
        let model = source.model();
        let resolution = &self.state.group(self.id).resolution;
        let mut bits = Bitset::with_len(resolution.len());
        for i in resolution.zeroes() {
            let Some(symbol) = model.table(table).get(self.group.idents[i].name) else {
                continue;
            };
            if !exports_only || is_exported(model.symbol(symbol).flags) {
                bits.set(i);
            }
        }
        bits
    }
}

/// The first module visible from `from` that declares `name` at top level.
fn find_exported(walk: &mut ImportWalk<'_>, from: &Arc<SourceFile>, name: InternedString) -> Option<Found> {
    let mut found = None;
    let _ = walk.visit(from, |imported, via| {
        let symbol = imported
            .module()
            .and_then(|m| imported.model().resolve_direct(m.scope(), name))
            .filter(|&s| is_exported(imported.model().symbol(s).flags));
        match symbol {
            Some(symbol) => {
                found = Some(Found {
                    file: imported.clone(),
                    symbol,
                    path: path_ids(via, imported),
                });
                ControlFlow::Break(())
            }
            None => ControlFlow::Continue(()),
        }
    });
    found
}

fn flags_of(found: &Found) -> SymbolFlags {
    found.file.model().symbol(found.symbol).flags
}

/// Imported-module symbols only qualify names inside their own module.
pub(crate) fn is_exported(flags: SymbolFlags) -> bool {
    !flags.contains(SymbolFlags::IMPORTED_MODULE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::AnalysisState;
    use vanadium_core::intern::StringInterner;

    fn update(program: &Program, path: &str, text: &str) {
        let errors = program.update(|m| {
            m.update_text(path, text);
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn test_registration_on_detached_provider_is_undone() {
        let program = Program::new("p", StringInterner::new());
        update(&program, "a.ttcn", "module A { const integer x := 1; }");
        update(&program, "b.ttcn", "module B { import from A all; const integer y := x; }");
        let a_old = program.module_by_name("A").expect("A");
        let b = program.module_by_name("B").expect("B");
        let b_module = b.module().expect("B declares a module");

        let walk = bind_group(&program, &b, GroupId::Secondary).expect("walk");
        assert!(b_module.is_resolved(GroupId::Secondary));
        assert_eq!(b_module.dependency_files(), vec![a_old.id()]);

        // A new version of A lands before B registers with the old one.
        update(&program, "a.ttcn", "module A { const integer x := 2; }");
        let ticket = b.phase_ticket();
        assert!(!register_dependent(&program, &b, &walk.touched));

        let a_old_module = a_old.module().expect("A declares a module");
        assert!(a_old_module.dependent_files().is_empty());
        assert!(b_module.dependency_files().is_empty());
        assert!(!b_module.is_resolved(GroupId::Secondary));
        assert!(!b.mark(AnalysisState::FULL_CROSSBIND, ticket));
        assert!(b.analysis_state().is_dirty());

        program.analyze();
        let a_new = program.module_by_name("A").expect("A");
        assert!(b_module.is_resolved(GroupId::Secondary));
        assert_eq!(b_module.dependency_files(), vec![a_new.id()]);
        assert_eq!(
            a_new.module().expect("A declares a module").dependent_files(),
            vec![b.id()]
        );
    }

    #[test]
    fn test_registration_on_live_provider() {
        let program = Program::new("p", StringInterner::new());
        update(&program, "a.ttcn", "module A { const integer x := 1; }");
        update(&program, "b.ttcn", "module B { import from A all; const integer y := x; }");
        let a = program.module_by_name("A").expect("A");
        let b = program.module_by_name("B").expect("B");

        let walk = bind_group(&program, &b, GroupId::Secondary).expect("walk");
        assert!(register_dependent(&program, &b, &walk.touched));
        assert_eq!(
            a.module().expect("A declares a module").dependent_files(),
            vec![b.id()]
        );
    }
}
