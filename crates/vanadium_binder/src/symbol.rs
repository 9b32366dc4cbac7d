//! Symbol and symbol table definitions.

use vanadium_ast::NodeId;
use vanadium_core::collections::FxIndexMap;
use vanadium_core::intern::InternedString;

bitflags::bitflags! {
    /// Semantic kind of a symbol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u32 {
        const NONE                          = 0;
        const IMPORTED_MODULE               = 1 << 0;
        const VARIABLE                      = 1 << 1;
        const ARGUMENT                      = 1 << 2;
        const FUNCTION                      = 1 << 3;
        const TEMPLATE                      = 1 << 4;
        const CONTROL                       = 1 << 5;
        const TYPE                          = 1 << 6;
        const STRUCTURAL                    = 1 << 7;
        const UNION                         = 1 << 8;
        const COMPONENT                     = 1 << 9;
        const CLASS                         = 1 << 10;
        const ENUM                          = 1 << 11;
        const SUBTYPE                       = 1 << 12;
        const LIST                          = 1 << 13;
        const PORT                          = 1 << 14;
        const FIELD                         = 1 << 15;
        const ENUM_MEMBER                   = 1 << 16;
        const THIS                          = 1 << 17;
        const CONSTRUCTOR                   = 1 << 18;
        const BUILTIN                       = 1 << 19;
        const BUILTIN_STRING                = 1 << 20;
        /// Hidden from completion.
        const ANONYMOUS                     = 1 << 21;
        /// Constants and module parameters.
        const VISIBILITY_STATIC             = 1 << 22;

        const STRUCT_TYPE = Self::TYPE.bits() | Self::STRUCTURAL.bits();
        const UNION_TYPE = Self::STRUCT_TYPE.bits() | Self::UNION.bits();
        const COMPONENT_TYPE = Self::TYPE.bits() | Self::COMPONENT.bits();
        const CLASS_TYPE = Self::TYPE.bits() | Self::CLASS.bits();
        const ENUM_TYPE = Self::TYPE.bits() | Self::ENUM.bits();
        const SUBTYPE_TYPE = Self::TYPE.bits() | Self::SUBTYPE.bits();
        const LIST_TYPE = Self::TYPE.bits() | Self::LIST.bits();
        const PORT_TYPE = Self::TYPE.bits() | Self::PORT.bits();
    }
}

/// Handle to a symbol in its file's [`SemanticModel`](crate::SemanticModel).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TableId(pub u32);

impl TableId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The module scope is always the first scope of a bound file.
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol contains: a nested lexical scope or a plain member table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Containment {
    #[default]
    None,
    /// Functions, classes, components, templates and control parts.
    Scope(ScopeId),
    /// Record/set/union fields and enum members.
    Members(TableId),
}

/// A named entity declared in some file.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: InternedString,
    /// The declaring node, or [`NodeId::INVALID`] for builtins.
    pub declaration: NodeId,
    pub flags: SymbolFlags,
    pub containment: Containment,
}

impl Symbol {
    pub fn new(name: InternedString, declaration: NodeId, flags: SymbolFlags) -> Self {
        Self {
            name,
            declaration,
            flags,
            containment: Containment::None,
        }
    }

    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = containment;
        self
    }
}

/// A symbol table maps names to symbols. Keys are unique; the last insert
/// wins. Iteration follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: FxIndexMap<InternedString, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: InternedString) -> Option<SymbolId> {
        self.table.get(&name).copied()
    }

    /// Insert, returning the symbol previously bound to `name`.
    pub fn insert(&mut self, name: InternedString, symbol: SymbolId) -> Option<SymbolId> {
        self.table.insert(name, symbol)
    }

    /// Insert unless `name` is already bound. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, name: InternedString, symbol: SymbolId) -> bool {
        if self.table.contains_key(&name) {
            return false;
        }
        self.table.insert(name, symbol);
        true
    }

    pub fn contains(&self, name: InternedString) -> bool {
        self.table.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InternedString, SymbolId)> + '_ {
        self.table.iter().map(|(&name, &id)| (name, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanadium_core::intern::StringInterner;

    #[test]
    fn test_last_write_wins() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let mut table = SymbolTable::new();
        assert_eq!(table.insert(x, SymbolId(0)), None);
        assert_eq!(table.insert(x, SymbolId(1)), Some(SymbolId(0)));
        assert_eq!(table.get(x), Some(SymbolId(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let interner = StringInterner::new();
        let m = interner.intern("M");
        let mut table = SymbolTable::new();
        assert!(table.insert_if_absent(m, SymbolId(3)));
        assert!(!table.insert_if_absent(m, SymbolId(4)));
        assert_eq!(table.get(m), Some(SymbolId(3)));
    }

    #[test]
    fn test_composite_flags() {
        assert!(SymbolFlags::UNION_TYPE.contains(SymbolFlags::STRUCT_TYPE));
        assert!(SymbolFlags::COMPONENT_TYPE.contains(SymbolFlags::COMPONENT));
        assert!(!SymbolFlags::CLASS_TYPE.contains(SymbolFlags::COMPONENT));
    }
}
