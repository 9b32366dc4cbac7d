//! vanadium_ast: Syntax tree definitions for TTCN-3 sources.
//!
//! Nodes live in an index-addressed [`SyntaxTree`]; every node knows its
//! source range and its parent. Identifier text is not stored on nodes, it
//! is always recovered by slicing the owning file's text with the range.

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
