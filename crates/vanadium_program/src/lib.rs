//! vanadium_program: Multi-file analysis with incremental crossbinding.
//!
//! A [`Program`] owns one [`SourceFile`] per path. Updating a file binds it
//! on its own; analyzing the program then resolves what single-file binding
//! left open against imported and extended modules, remembering where every
//! resolution came from so later edits only redo the affected work.

mod checker;
mod crossbind;
mod diagnostics;
mod error;
mod foreign;
mod import_visitor;
mod module;
mod options;
mod program;
mod resolve;
mod source_file;

pub use checker::{TypeChecker, TypeError};
pub use error::{OptionsError, ProgramError, TransformError};
pub use foreign::ForeignGrammar;
pub use module::{Dependency, InjectionTarget, ModuleDescriptor};
pub use options::{AnalyzeOptions, ProgramOptions};
pub use program::{Modifier, Program, ProgramBuilder};
pub use resolve::{ScopeRef, SymbolRef, TableRef};
pub use source_file::{AnalysisState, FileId, SourceFile};
