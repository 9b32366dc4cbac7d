//! vanadium_scanner: Lexer for TTCN-3 source code.
//!
//! Produces tokens on demand for the parser. Comments and whitespace are
//! skipped; malformed input yields `Unknown` tokens plus syntax errors.

mod scanner;

pub use scanner::{Scanner, ScannerState};
