//! One version of one file of a program.
//!
//! A `SourceFile` is immutable once built: every edit creates a new version
//! with a fresh [`FileId`] and a fresh semantic model, and the previous
//! version is detached. Only the crossbind bookkeeping of its module and
//! its analysis state change afterwards.

use crate::checker::TypeError;
use crate::error::TransformError;
use crate::module::ModuleDescriptor;
use bitflags::bitflags;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use vanadium_ast::{NodeId, SyntaxTree};
use vanadium_binder::{BindResult, SemanticModel};
use vanadium_core::intern::StringInterner;
use vanadium_core::text::LineMap;
use vanadium_diagnostics::SemanticError;

/// Identity of one file version. Never reused within a process.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u64);

impl FileId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FileId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Analysis phases completed since the file was last marked dirty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnalysisState: u8 {
        const BASIC_CROSSBIND = 1 << 0;
        const FULL_CROSSBIND = 1 << 1;
        const TYPECHECK = 1 << 2;
    }
}

impl AnalysisState {
    pub const DIRTY: AnalysisState = AnalysisState::empty();

    /// Bits of the packed state word holding completed phases.
    const PHASE_MASK: u32 = 0xff;
    /// Added to the packed state word on every `mark_dirty`.
    const DIRTY_STEP: u32 = 1 << 8;

    pub fn is_dirty(self) -> bool {
        self.is_empty()
    }
}

pub struct SourceFile {
    id: FileId,
    path: String,
    text: String,
    tree: SyntaxTree,
    model: SemanticModel,
    module: Option<ModuleDescriptor>,
    semantic_errors: Vec<SemanticError>,
    line_map: LineMap,
    foreign: bool,
    transform_error: Option<TransformError>,
    /// Completed phases in the low byte, a dirty counter above them.
    state: AtomicU32,
    type_errors: Mutex<Vec<TypeError>>,
}

impl SourceFile {
    /// Parse and bind `text`.
    pub(crate) fn bind(path: String, text: String, interner: &StringInterner, foreign: bool) -> Self {
        let tree = vanadium_parser::parse(&text);
        let BindResult {
            model,
            module,
            errors,
        } = vanadium_binder::bind(&tree, &text, interner);
        let line_map = LineMap::new(&text);
        Self {
            id: FileId::next(),
            path,
            text,
            tree,
            model,
            module: module.map(ModuleDescriptor::new),
            semantic_errors: errors,
            line_map,
            foreign,
            transform_error: None,
            state: AtomicU32::new(0),
            type_errors: Mutex::new(Vec::new()),
        }
    }

    /// A foreign file whose transformation failed. It declares no module.
    pub(crate) fn untransformed(
        path: String,
        text: String,
        error: TransformError,
        interner: &StringInterner,
    ) -> Self {
        let line_map = LineMap::new(&text);
        Self {
            id: FileId::next(),
            path,
            text,
            tree: SyntaxTree::new(),
            model: SemanticModel::new(interner),
            module: None,
            semantic_errors: Vec::new(),
            line_map,
            foreign: true,
            transform_error: Some(error),
            state: AtomicU32::new(0),
            type_errors: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The source text of a node of this file.
    pub fn node_text(&self, node: NodeId) -> &str {
        self.tree.text(&self.text, node)
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn model(&self) -> &SemanticModel {
        &self.model
    }

    pub fn module(&self) -> Option<&ModuleDescriptor> {
        self.module.as_ref()
    }

    pub fn semantic_errors(&self) -> &[SemanticError] {
        &self.semantic_errors
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// Whether this file was produced by a foreign grammar.
    pub fn is_foreign(&self) -> bool {
        self.foreign
    }

    pub fn transform_error(&self) -> Option<&TransformError> {
        self.transform_error.as_ref()
    }

    pub fn type_errors(&self) -> Vec<TypeError> {
        self.type_errors.lock().clone()
    }

    pub fn analysis_state(&self) -> AnalysisState {
        let word = self.state.load(Ordering::Acquire) & AnalysisState::PHASE_MASK;
        AnalysisState::from_bits_truncate(word as u8)
    }

    /// Snapshot of the state before running a phase on this file.
    pub(crate) fn phase_ticket(&self) -> u32 {
        self.state.load(Ordering::Acquire)
    }

    /// Record `phase` as done, unless the file was marked dirty after
    /// `ticket` was taken. Returns whether the phase was recorded.
    pub(crate) fn mark(&self, phase: AnalysisState, ticket: u32) -> bool {
        self.state
            .compare_exchange(
                ticket,
                ticket | u32::from(phase.bits()),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn mark_dirty(&self) {
        let _ = self.state.fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
            Some((word & !AnalysisState::PHASE_MASK).wrapping_add(AnalysisState::DIRTY_STEP))
        });
    }

    pub(crate) fn set_type_errors(&self, errors: Vec<TypeError>) {
        *self.type_errors.lock() = errors;
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("state", &self.analysis_state())
            .field("module", &self.module.as_ref().map(|m| m.name()))
            .finish_non_exhaustive()
    }
}
