//! The type checker seam.
//!
//! Type checking itself lives outside this crate. A checker runs in the last
//! analysis phase, after every module is fully crossbound, and reads the
//! program through [`crate::ScopeRef`] and [`crate::SymbolRef`] handles.

use crate::program::Program;
use crate::source_file::SourceFile;
use std::sync::Arc;
use vanadium_core::text::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub range: TextRange,
    pub message: String,
}

impl TypeError {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

pub trait TypeChecker: Send + Sync {
    /// Check one file. Called at most once per file version and analysis.
    fn check(&self, program: &Program, file: &Arc<SourceFile>) -> Vec<TypeError>;
}
