//! Predefined names visible from every scope.
//!
//! Builtins are checked after every user declaration and are never
//! externally resolved, so an unknown name can never be explained by them
//! during crossbinding.

use crate::symbol::SymbolFlags;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BuiltinKind {
    Type,
    StringType,
    Value,
    Function,
}

impl BuiltinKind {
    pub fn flags(self) -> SymbolFlags {
        match self {
            BuiltinKind::Type => SymbolFlags::BUILTIN | SymbolFlags::TYPE,
            BuiltinKind::StringType => {
                SymbolFlags::BUILTIN | SymbolFlags::TYPE | SymbolFlags::BUILTIN_STRING
            }
            BuiltinKind::Value => SymbolFlags::BUILTIN | SymbolFlags::VARIABLE,
            BuiltinKind::Function => SymbolFlags::BUILTIN | SymbolFlags::FUNCTION,
        }
    }
}

pub(crate) const BUILTINS: &[(&str, BuiltinKind)] = &[
    ("anytype", BuiltinKind::Type),
    ("boolean", BuiltinKind::Type),
    ("integer", BuiltinKind::Type),
    ("float", BuiltinKind::Type),
    ("verdicttype", BuiltinKind::Type),
    ("default", BuiltinKind::Type),
    ("object", BuiltinKind::Type),
    ("bitstring", BuiltinKind::StringType),
    ("charstring", BuiltinKind::StringType),
    ("octetstring", BuiltinKind::StringType),
    ("hexstring", BuiltinKind::StringType),
    ("universal", BuiltinKind::StringType),
    ("pass", BuiltinKind::Value),
    ("fail", BuiltinKind::Value),
    ("inconc", BuiltinKind::Value),
    ("none", BuiltinKind::Value),
    ("error", BuiltinKind::Value),
    ("self", BuiltinKind::Value),
    ("null", BuiltinKind::Value),
    ("infinity", BuiltinKind::Value),
    ("int2str", BuiltinKind::Function),
    ("str2int", BuiltinKind::Function),
    ("int2float", BuiltinKind::Function),
    ("float2int", BuiltinKind::Function),
    ("int2char", BuiltinKind::Function),
    ("char2int", BuiltinKind::Function),
    ("int2bit", BuiltinKind::Function),
    ("bit2int", BuiltinKind::Function),
    ("int2hex", BuiltinKind::Function),
    ("hex2int", BuiltinKind::Function),
    ("int2oct", BuiltinKind::Function),
    ("oct2int", BuiltinKind::Function),
    ("oct2str", BuiltinKind::Function),
    ("str2oct", BuiltinKind::Function),
    ("lengthof", BuiltinKind::Function),
    ("sizeof", BuiltinKind::Function),
    ("ispresent", BuiltinKind::Function),
    ("isbound", BuiltinKind::Function),
    ("isvalue", BuiltinKind::Function),
    ("ischosen", BuiltinKind::Function),
    ("substr", BuiltinKind::Function),
    ("replace", BuiltinKind::Function),
    ("regexp", BuiltinKind::Function),
    ("rnd", BuiltinKind::Function),
    ("log", BuiltinKind::Function),
    ("setverdict", BuiltinKind::Function),
    ("getverdict", BuiltinKind::Function),
    ("valueof", BuiltinKind::Function),
    ("match", BuiltinKind::Function),
    ("action", BuiltinKind::Function),
    ("stop", BuiltinKind::Function),
];

/// Builtin types that carry members, with their member names.
pub(crate) const BUILTIN_MEMBERS: &[(&str, &[&str])] =
    &[("timer", &["timeout", "start", "running", "read"])];

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_builtin_names_are_unique() {
        let mut seen = FxHashSet::default();
        for (name, _) in BUILTINS {
            assert!(seen.insert(*name), "duplicate builtin {name}");
        }
        for (name, _) in BUILTIN_MEMBERS {
            assert!(seen.insert(*name), "duplicate builtin {name}");
        }
    }

    #[test]
    fn test_string_types_are_types() {
        assert!(BuiltinKind::StringType.flags().contains(SymbolFlags::TYPE));
        assert!(!BuiltinKind::Function.flags().contains(SymbolFlags::TYPE));
    }
}
