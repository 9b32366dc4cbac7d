//! The program: every file of one project and the incremental analysis that
//! keeps their cross-file bindings correct.
//!
//! `update` applies a batch of edits. Each edited file is read, parsed and
//! bound in parallel, the previous version is detached (undoing everything
//! other modules learned from it) and the new version is attached.
//! `analyze` then crossbinds every dirty file in three parallel phases:
//! primary groups of all files, then the remaining groups, then type
//! checking. A phase starts only after the previous one drained, so the
//! type-level surface of every module is bound before any body is.

use crate::checker::TypeChecker;
use crate::crossbind::{crossbind, refresh_missing_imports};
use crate::error::{ProgramError, TransformError};
use crate::foreign::ForeignGrammar;
use crate::options::{AnalyzeOptions, ProgramOptions};
use crate::source_file::{AnalysisState, SourceFile};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};
use vanadium_binder::GroupId;
use vanadium_core::collections::FxIndexMap;
use vanadium_core::intern::{InternedString, StringInterner};

type ReadFn = Box<dyn FnOnce(&str) -> io::Result<String> + Send>;

enum Edit {
    Update { path: String, read: ReadFn },
    Drop(String),
}

/// A batch of edits handed to [`Program::update`].
#[derive(Default)]
pub struct Modifier {
    edits: Vec<Edit>,
}

impl Modifier {
    /// (Re)load `path` with the text `read` returns.
    pub fn update<F>(&mut self, path: impl Into<String>, read: F) -> &mut Self
    where
        F: FnOnce(&str) -> io::Result<String> + Send + 'static,
    {
        self.edits.push(Edit::Update {
            path: path.into(),
            read: Box::new(read),
        });
        self
    }

    pub fn update_text(&mut self, path: impl Into<String>, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        self.update(path, move |_| Ok(text))
    }

    /// Remove `path` from the program.
    pub fn drop(&mut self, path: impl Into<String>) -> &mut Self {
        self.edits.push(Edit::Drop(path.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

enum Prepared {
    Bound(SourceFile),
    Foreign { path: String, text: String },
    Dropped(String),
    Failed(ProgramError),
}

pub struct ProgramBuilder {
    name: String,
    interner: StringInterner,
    options: ProgramOptions,
    grammars: Vec<Box<dyn ForeignGrammar>>,
    checker: Option<Box<dyn TypeChecker>>,
}

impl ProgramBuilder {
    pub fn options(mut self, options: ProgramOptions) -> Self {
        self.options = options;
        self
    }

    pub fn foreign_grammar(mut self, grammar: impl ForeignGrammar + 'static) -> Self {
        self.grammars.push(Box::new(grammar));
        self
    }

    pub fn type_checker(mut self, checker: impl TypeChecker + 'static) -> Self {
        self.checker = Some(Box::new(checker));
        self
    }

    pub fn build(self) -> Arc<Program> {
        let pool = self.options.threads.and_then(|threads| {
            let name = self.name.clone();
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(move |i| format!("vanadium-{name}-{i}"))
                .build()
                .map_err(|error| {
                    warn!(program = %self.name, %error, "falling back to the global thread pool");
                })
                .ok()
        });
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Arc::new(Program {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            interner: self.interner,
            options: self.options,
            pool,
            grammars: self.grammars,
            checker: self.checker,
            files: RwLock::new(FxIndexMap::default()),
            modules: DashMap::default(),
            pending_foreign: Mutex::new(FxIndexMap::default()),
            references: RwLock::new(Vec::new()),
            referenced_by: RwLock::new(Vec::new()),
            visible: RwLock::new(None),
            exclusive: Mutex::new(()),
        })
    }
}

pub struct Program {
    id: u64,
    name: String,
    interner: StringInterner,
    options: ProgramOptions,
    pool: Option<rayon::ThreadPool>,
    grammars: Vec<Box<dyn ForeignGrammar>>,
    checker: Option<Box<dyn TypeChecker>>,
    files: RwLock<FxIndexMap<String, Arc<SourceFile>>>,
    /// Files declaring each module name, in attach order. The first one is
    /// the module others see.
    modules: DashMap<InternedString, Vec<Arc<SourceFile>>>,
    pending_foreign: Mutex<FxIndexMap<String, String>>,
    references: RwLock<Vec<Weak<Program>>>,
    referenced_by: RwLock<Vec<Weak<Program>>>,
    /// Transitive references, once sealed.
    visible: RwLock<Option<Vec<Weak<Program>>>>,
    /// Serializes `update` and `analyze` of this program.
    exclusive: Mutex<()>,
}

impl Program {
    pub fn builder(name: impl Into<String>, interner: StringInterner) -> ProgramBuilder {
        ProgramBuilder {
            name: name.into(),
            interner,
            options: ProgramOptions::default(),
            grammars: Vec::new(),
            checker: None,
        }
    }

    pub fn new(name: impl Into<String>, interner: StringInterner) -> Arc<Program> {
        Self::builder(name, interner).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Every file of this program, in the order they were first added.
    pub fn files(&self) -> Vec<Arc<SourceFile>> {
        self.files.read().values().cloned().collect()
    }

    /// A file of this program, or of a program it references.
    pub fn get_file(&self, path: &str) -> Option<Arc<SourceFile>> {
        if let Some(file) = self.files.read().get(path) {
            return Some(file.clone());
        }
        self.visible_programs()
            .into_iter()
            .find_map(|program| program.files.read().get(path).cloned())
    }

    /// The file declaring module `name`, own modules first.
    pub fn get_module(&self, name: InternedString) -> Option<Arc<SourceFile>> {
        self.own_module(name).or_else(|| {
            self.visible_programs()
                .into_iter()
                .find_map(|program| program.own_module(name))
        })
    }

    pub fn module_by_name(&self, name: &str) -> Option<Arc<SourceFile>> {
        self.get_module(self.interner.get(name)?)
    }

    fn own_module(&self, name: InternedString) -> Option<Arc<SourceFile>> {
        self.modules.get(&name).and_then(|files| files.first().cloned())
    }

    // ========================================================================
    // References
    // ========================================================================

    /// Let this program see the modules of `other`.
    pub fn add_reference(self: &Arc<Self>, other: &Arc<Program>) -> Result<(), ProgramError> {
        if self.id == other.id {
            return Err(ProgramError::SelfReference(self.name.clone()));
        }
        if self.visible.read().is_some() {
            return Err(ProgramError::Sealed(self.name.clone()));
        }
        if !self.interner.same_as(&other.interner) {
            return Err(ProgramError::InternerMismatch(
                self.name.clone(),
                other.name.clone(),
            ));
        }
        let mut references = self.references.write();
        if references.iter().any(|r| r.upgrade().is_some_and(|r| r.id == other.id)) {
            return Ok(());
        }
        references.push(Arc::downgrade(other));
        other.referenced_by.write().push(Arc::downgrade(self));
        debug!(program = %self.name, reference = %other.name, "added program reference");
        Ok(())
    }

    /// Flatten the reference graph. No reference can be added afterwards.
    pub fn seal_references(&self) {
        let mut seen = FxHashSet::default();
        seen.insert(self.id);
        let mut queue: VecDeque<_> = upgrade_all(&self.references.read()).into();
        let mut visible = Vec::new();
        while let Some(program) = queue.pop_front() {
            if !seen.insert(program.id) {
                continue;
            }
            visible.push(Arc::downgrade(&program));
            queue.extend(upgrade_all(&program.references.read()));
        }
        debug!(program = %self.name, visible = visible.len(), "sealed references");
        *self.visible.write() = Some(visible);
    }

    fn visible_programs(&self) -> Vec<Arc<Program>> {
        match &*self.visible.read() {
            Some(visible) => upgrade_all(visible),
            None => upgrade_all(&self.references.read()),
        }
    }

    fn referencing_programs(&self) -> Vec<Arc<Program>> {
        upgrade_all(&self.referenced_by.read())
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Apply a batch of edits without crossbinding. Returns the read
    /// failures; every other edit is applied.
    #[must_use = "read failures are only reported through the return value"]
    pub fn update(&self, modify: impl FnOnce(&mut Modifier)) -> Vec<ProgramError> {
        let _exclusive = self.exclusive.lock();
        let mut modifier = Modifier::default();
        modify(&mut modifier);
        let edits = modifier.edits.len();

        let prepared: Vec<Prepared> = self.install(|| {
            modifier
                .edits
                .into_par_iter()
                .map(|edit| self.prepare(edit))
                .collect()
        });

        let mut errors = Vec::new();
        let mut attached = FxHashSet::default();
        for prepared in prepared {
            match prepared {
                Prepared::Bound(file) => {
                    let path = file.path().to_string();
                    self.pending_foreign.lock().shift_remove(&path);
                    self.replace(&path, Some(Arc::new(file)), &mut attached);
                }
                Prepared::Foreign { path, text } => {
                    self.pending_foreign.lock().insert(path, text);
                }
                Prepared::Dropped(path) => {
                    self.pending_foreign.lock().shift_remove(&path);
                    self.replace(&path, None, &mut attached);
                }
                Prepared::Failed(error) => {
                    warn!(program = %self.name, %error, "edit failed");
                    errors.push(error);
                }
            }
        }
        self.wake_waiting(&attached);
        debug!(program = %self.name, edits, failed = errors.len(), "updated program");
        errors
    }

    /// `update` followed by `analyze`.
    #[must_use = "read failures are only reported through the return value"]
    pub fn commit(&self, modify: impl FnOnce(&mut Modifier)) -> Vec<ProgramError> {
        let errors = self.update(modify);
        self.analyze();
        errors
    }

    fn prepare(&self, edit: Edit) -> Prepared {
        match edit {
            Edit::Update { path, read } => match read(&path) {
                Ok(text) if self.grammars.iter().any(|g| g.accepts(&path)) => {
                    Prepared::Foreign { path, text }
                }
                Ok(text) => Prepared::Bound(SourceFile::bind(path, text, &self.interner, false)),
                Err(source) => Prepared::Failed(ProgramError::Read { path, source }),
            },
            Edit::Drop(path) => Prepared::Dropped(path),
        }
    }

    /// Swap the file at `path`, detaching the old version.
    fn replace(
        &self,
        path: &str,
        file: Option<Arc<SourceFile>>,
        attached: &mut FxHashSet<InternedString>,
    ) {
        let old = {
            let mut files = self.files.write();
            match &file {
                Some(file) => files.insert(path.to_string(), file.clone()),
                None => files.shift_remove(path),
            }
        };
        if let Some(old) = old {
            self.detach(&old);
        }
        if let Some(file) = file {
            self.attach(&file, attached);
        }
    }

    fn attach(&self, file: &Arc<SourceFile>, attached: &mut FxHashSet<InternedString>) {
        let Some(module) = file.module() else {
            return;
        };
        let name = module.name();
        let mut declaring = self.modules.entry(name).or_default();
        declaring.push(file.clone());
        if declaring.len() == 1 {
            attached.insert(name);
        }
        debug!(
            path = file.path(),
            module = self.interner.resolve(name),
            id = %file.id(),
            "attached file"
        );
    }

    /// Undo everything other modules learned from `file` and unregister it
    /// from the modules it learned from.
    fn detach(&self, file: &Arc<SourceFile>) {
        let Some(module) = file.module() else {
            return;
        };
        let name = module.name();
        if let Some(mut declaring) = self.modules.get_mut(&name) {
            declaring.retain(|f| f.id() != file.id());
        }
        self.modules.remove_if(&name, |_, declaring| declaring.is_empty());

        let dependents: Vec<_> = module.dependents.lock().drain().collect();
        let mut invalidated = 0;
        for dependent in dependents.into_iter().filter_map(|(_, d)| d.upgrade()) {
            if let Some(dependent_module) = dependent.module() {
                dependent_module.forget(file.id());
            }
            dependent.mark_dirty();
            invalidated += 1;
        }

        let links: Vec<_> = module.state.lock().links.drain().collect();
        for link in links.into_iter().filter_map(|(_, l)| l.upgrade()) {
            if let Some(link_module) = link.module() {
                link_module.dependents.lock().remove(&file.id());
            }
        }
        debug!(
            path = file.path(),
            module = self.interner.resolve(name),
            id = %file.id(),
            invalidated,
            "detached file"
        );
    }

    /// Mark dirty every module, here or in a program that sees this one,
    /// that waits for one of `names`.
    fn wake_waiting(&self, names: &FxHashSet<InternedString>) {
        if names.is_empty() {
            return;
        }
        let mut seen = FxHashSet::default();
        self.wake_waiting_in(names, &mut seen);
    }

    fn wake_waiting_in(&self, names: &FxHashSet<InternedString>, seen: &mut FxHashSet<u64>) {
        if !seen.insert(self.id) {
            return;
        }
        for file in self.files() {
            let Some(module) = file.module() else {
                continue;
            };
            let waiting = module
                .state
                .lock()
                .waiting_for
                .iter()
                .any(|name| names.contains(name));
            if waiting {
                file.mark_dirty();
            }
        }
        for program in self.referencing_programs() {
            program.wake_waiting_in(names, seen);
        }
    }

    // ========================================================================
    // Analyze
    // ========================================================================

    pub fn analyze(&self) {
        self.analyze_with(self.options.analyze_options());
    }

    pub fn analyze_with(&self, options: AnalyzeOptions) {
        let mut seen = FxHashSet::default();
        self.analyze_inner(options, &mut seen);
    }

    fn analyze_inner(&self, options: AnalyzeOptions, seen: &mut FxHashSet<u64>) {
        if !seen.insert(self.id) {
            return;
        }
        {
            let _exclusive = self.exclusive.lock();
            self.transform_pending();
            let files = self.files();
            self.install(|| {
                self.run_phase(&files, AnalysisState::BASIC_CROSSBIND, |file| {
                    refresh_missing_imports(self, file);
                    crossbind(self, file, GroupId::Primary);
                });
                self.run_phase(&files, AnalysisState::FULL_CROSSBIND, |file| {
                    if let Some(module) = file.module() {
                        for id in module.externals().body_ids() {
                            crossbind(self, file, id);
                        }
                    }
                });
                self.run_phase(&files, AnalysisState::TYPECHECK, |file| {
                    if let Some(checker) = &self.checker {
                        file.set_type_errors(checker.check(self, file));
                    }
                });
            });
        }
        if options.cascade {
            for program in self.referencing_programs() {
                program.analyze_inner(options, seen);
            }
        }
    }

    fn run_phase(
        &self,
        files: &[Arc<SourceFile>],
        phase: AnalysisState,
        run: impl Fn(&Arc<SourceFile>) + Sync,
    ) {
        let pending: Vec<_> = files
            .iter()
            .filter(|file| !file.analysis_state().contains(phase))
            .collect();
        pending.par_iter().for_each(|file| {
            let ticket = file.phase_ticket();
            run(file);
            if !file.mark(phase, ticket) {
                trace!(path = file.path(), phase = ?phase, "file dirtied during phase");
            }
        });
        debug!(program = %self.name, phase = ?phase, files = pending.len(), "analysis phase done");
    }

    fn transform_pending(&self) {
        let pending: Vec<(String, String)> = self.pending_foreign.lock().drain(..).collect();
        if pending.is_empty() {
            return;
        }
        let transformed: Vec<SourceFile> = self.install(|| {
            pending
                .into_par_iter()
                .map(|(path, text)| self.transform(path, text))
                .collect()
        });
        let mut attached = FxHashSet::default();
        for file in transformed {
            let path = file.path().to_string();
            self.replace(&path, Some(Arc::new(file)), &mut attached);
        }
        self.wake_waiting(&attached);
    }

    fn transform(&self, path: String, text: String) -> SourceFile {
        let result = match self.grammars.iter().find(|g| g.accepts(&path)) {
            Some(grammar) => grammar.transpile(&path, &text),
            None => Err(TransformError::NoGrammar(path.clone())),
        };
        match result {
            Ok(native) => SourceFile::bind(path, native, &self.interner, true),
            Err(error) => {
                warn!(path = %path, %error, "failed to transform foreign file");
                SourceFile::untransformed(path, text, error, &self.interner)
            }
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("files", &self.files.read().len())
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}

fn upgrade_all(programs: &[Weak<Program>]) -> Vec<Arc<Program>> {
    programs.iter().filter_map(Weak::upgrade).collect()
}
