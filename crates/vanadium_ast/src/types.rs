//! Small enums and flag types carried by syntax nodes.

bitflags::bitflags! {
    /// `@`-modifiers attached to declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u8 {
        const ABSTRACT      = 1 << 0;
        const FINAL         = 1 << 1;
        const DETERMINISTIC = 1 << 2;
        const CONTROL       = 1 << 3;
        const LAZY          = 1 << 4;
        const FUZZY         = 1 << 5;
        const TRAIT         = 1 << 6;
    }
}

impl ModifierFlags {
    /// Map the text of a modifier token (including the `@`) to its flag.
    pub fn from_text(text: &str) -> Option<ModifierFlags> {
        Some(match text {
            "@abstract" => ModifierFlags::ABSTRACT,
            "@final" => ModifierFlags::FINAL,
            "@deterministic" => ModifierFlags::DETERMINISTIC,
            "@control" => ModifierFlags::CONTROL,
            "@lazy" => ModifierFlags::LAZY,
            "@fuzzy" => ModifierFlags::FUZZY,
            "@trait" => ModifierFlags::TRAIT,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Const,
    Var,
    VarTemplate,
    ModulePar,
    Timer,
    Port,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Record,
    Set,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    RecordOf,
    SetOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Function,
    Testcase,
    Altstep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParDirection {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Message,
    Procedure,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    BitString,
    Boolean,
    Omit,
    /// `?` and `*` matching templates.
    Wildcard,
}

/// The leading keyword of an item inside an import list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    All,
    Import,
    Type,
    Const,
    Template,
    Function,
    Testcase,
    Altstep,
    ModulePar,
    Signature,
}
