//! Walks the modules visible through a module's imports.
//!
//! At every level the plain imports are visited first, in declaration
//! order, and only then are transit imports expanded. Below the starting
//! module only `public` imports are visible. A module missing anywhere on
//! the way is remembered together with the transit import it was reached
//! through, so the caller can report or wait for it.

use crate::program::Program;
use crate::source_file::{FileId, SourceFile};
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::ControlFlow;
use std::sync::Arc;
use vanadium_binder::ImportInfo;
use vanadium_core::intern::InternedString;

pub(crate) struct ImportWalk<'p> {
    program: &'p Program,
    visited: FxHashSet<FileId>,
    expanded: FxHashSet<FileId>,
    /// Every module any walk of this walker reached.
    pub touched: FxHashMap<FileId, Arc<SourceFile>>,
    pub missing: Vec<MissingModule>,
}

impl<'p> ImportWalk<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            visited: FxHashSet::default(),
            expanded: FxHashSet::default(),
            touched: FxHashMap::default(),
            missing: Vec::new(),
        }
    }

    /// Call `f` with every module visible from `file` and the chain of
    /// transit modules it was reached through. `f` breaks to stop the walk.
    pub fn visit<F>(&mut self, file: &Arc<SourceFile>, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&Arc<SourceFile>, &[Arc<SourceFile>]) -> ControlFlow<()>,
    {
        self.visited.clear();
        self.expanded.clear();
        self.visited.insert(file.id());
        self.expanded.insert(file.id());
        let mut via = Vec::new();
        self.walk(file, true, &mut via, &mut f)
    }

    fn walk<F>(
        &mut self,
        file: &Arc<SourceFile>,
        accept_private: bool,
        via: &mut Vec<Arc<SourceFile>>,
        f: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&Arc<SourceFile>, &[Arc<SourceFile>]) -> ControlFlow<()>,
    {
        let Some(module) = file.module() else {
            return ControlFlow::Continue(());
        };
        let visible = |import: &&ImportInfo| accept_private || import.public;

        for import in module.imports().filter(visible).filter(|i| !i.transit) {
            let Some(imported) = self.lookup(import.module, via) else {
                continue;
            };
            if self.visited.insert(imported.id()) {
                f(&imported, via)?;
            }
        }

        for import in module.imports().filter(visible).filter(|i| i.transit) {
            let Some(imported) = self.lookup(import.module, via) else {
                continue;
            };
            if !self.expanded.insert(imported.id()) {
                continue;
            }
            via.push(imported.clone());
            let flow = self.walk(&imported, false, via, f);
            via.pop();
            flow?;
        }
        ControlFlow::Continue(())
    }

    fn lookup(&mut self, name: InternedString, via: &[Arc<SourceFile>]) -> Option<Arc<SourceFile>> {
        if let Some(module) = self.program.get_module(name) {
            self.touched.insert(module.id(), module.clone());
            return Some(module);
        }
        let missing = MissingModule {
            name,
            via: via.first().and_then(|v| v.module()).map(|m| m.name()),
        };
        if !self.missing.contains(&missing) {
            self.missing.push(missing);
        }
        None
    }
}

/// A module name no program could provide.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct MissingModule {
    pub name: InternedString,
    /// The module of the starting module's transit import that led to the
    /// miss, `None` for direct imports.
    pub via: Option<InternedString>,
}

/// File ids of a transit chain followed by the module it led to.
pub(crate) fn path_ids(via: &[Arc<SourceFile>], reached: &SourceFile) -> Vec<FileId> {
    via.iter()
        .map(|v| v.id())
        .chain(std::iter::once(reached.id()))
        .collect()
}
