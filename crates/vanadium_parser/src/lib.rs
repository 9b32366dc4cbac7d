//! vanadium_parser: Recursive descent parser for TTCN-3.
//!
//! Produces an index-addressed [`SyntaxTree`] with ranges and parent links.
//! Syntax errors are collected on the tree; parsing never fails.

mod parser;
mod precedence;

pub use parser::Parser;

use vanadium_ast::node::SyntaxTree;
use vanadium_core::arena::ScratchArena;

/// Parse `text` with a fresh scratch arena.
pub fn parse(text: &str) -> SyntaxTree {
    let scratch = ScratchArena::for_source_len(text.len());
    Parser::new(&scratch, text).parse_source_file()
}
