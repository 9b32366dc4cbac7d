//! Files written in a grammar other than the native one.
//!
//! A [`ForeignGrammar`] turns such a file into native module text. Accepted
//! files are queued by `update` and transformed in the first phase of
//! `analyze`, after which they are bound like any other module.

use crate::error::TransformError;

pub trait ForeignGrammar: Send + Sync {
    fn accepts(&self, path: &str) -> bool;

    /// Produce native source for `text`.
    fn transpile(&self, path: &str, text: &str) -> Result<String, TransformError>;
}
