//! vanadium_core: Core utilities for the vanadium TTCN-3 language server.
//!
//! Provides string interning, text ranges, scratch arenas, bitsets and
//! collections used throughout the binding pipeline.

pub mod arena;
pub mod bitset;
pub mod collections;
pub mod intern;
pub mod text;

// Re-export commonly used types
pub use arena::ScratchArena;
pub use bitset::Bitset;
pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, TextRange};
