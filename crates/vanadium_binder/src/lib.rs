//! vanadium_binder: Symbol table construction and scope analysis.
//!
//! The binder walks one file's syntax tree, builds its scope tree and symbol
//! tables, and records every identifier it could not resolve locally into an
//! externally resolved group for the program to crossbind later.

mod binder;
mod builtins;
mod externals;
mod model;
mod symbol;

pub use binder::{bind, BindResult, BoundModule, ImportInfo};
pub use builtins::BuiltinKind;
pub use externals::{
    AugmentationProvider, ExternalIdent, ExternallyResolvedGroup, GroupId, ModuleExternals,
};
pub use model::{ExtensionBase, Scope, SemanticModel};
pub use symbol::{Containment, ScopeId, Symbol, SymbolFlags, SymbolId, SymbolTable, TableId};
