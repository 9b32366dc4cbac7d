//! Collection types used throughout the binding pipeline.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Insertion-ordered map with FxHash hashing.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
