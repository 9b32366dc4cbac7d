//! Errors returned at the program's fallible boundaries.
//!
//! Problems inside the analyzed sources are never errors here: they become
//! diagnostics on the file they belong to.

use thiserror::Error;
use vanadium_core::text::TextRange;

#[derive(Debug, Error)]
pub enum ProgramError {
    /// The read function supplied for an edit failed. The previous version
    /// of the file, if any, stays in the program.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("programs '{0}' and '{1}' do not share a string interner")]
    InternerMismatch(String, String),

    #[error("references of program '{0}' are sealed")]
    Sealed(String),

    #[error("program '{0}' cannot reference itself")]
    SelfReference(String),
}

/// A foreign-grammar file could not be turned into a module.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("unsupported construct '{construct}'")]
    Unsupported { construct: String, range: TextRange },

    #[error("{message}")]
    Invalid { message: String, range: Option<TextRange> },

    #[error("no grammar accepts '{0}'")]
    NoGrammar(String),
}

impl TransformError {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            TransformError::Unsupported { range, .. } => Some(*range),
            TransformError::Invalid { range, .. } => *range,
            TransformError::NoGrammar(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid program options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`threads` must be at least 1")]
    ZeroThreads,
}
