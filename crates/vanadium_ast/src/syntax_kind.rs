//! SyntaxKind enum - all token kinds produced by the scanner.

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Literals
    NumericLiteral,
    FloatLiteral,
    StringLiteral,
    /// `'0101'B`, `'FF'H`, `'00'O`
    BitStringLiteral,

    Identifier,
    /// `@abstract`, `@final`, ...
    ModifierToken,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotToken,
    SemicolonToken,
    CommaToken,
    ColonToken,
    AssignToken,
    ArrowToken,
    QuestionToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    LessThanToken,
    LessThanEqualsToken,
    GreaterThanToken,
    GreaterThanEqualsToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    AmpersandToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    LessThanAtToken,
    AtGreaterThanToken,

    // ========================================================================
    // Keywords
    // ========================================================================
    ModuleKeyword,
    ImportKeyword,
    FromKeyword,
    AllKeyword,
    ExceptKeyword,
    PublicKeyword,
    PrivateKeyword,
    FriendKeyword,
    ConstKeyword,
    VarKeyword,
    TemplateKeyword,
    ModuleparKeyword,
    TimerKeyword,
    PortKeyword,
    TypeKeyword,
    ComponentKeyword,
    RecordKeyword,
    SetKeyword,
    UnionKeyword,
    EnumeratedKeyword,
    OfKeyword,
    ClassKeyword,
    ExtendsKeyword,
    RunsKeyword,
    OnKeyword,
    MtcKeyword,
    SystemKeyword,
    FunctionKeyword,
    TestcaseKeyword,
    AltstepKeyword,
    SignatureKeyword,
    ReturnKeyword,
    ControlKeyword,
    IfKeyword,
    ElseKeyword,
    ForKeyword,
    WhileKeyword,
    DoKeyword,
    BreakKeyword,
    ContinueKeyword,
    OptionalKeyword,
    CreateKeyword,
    InKeyword,
    OutKeyword,
    InoutKeyword,
    AndKeyword,
    OrKeyword,
    XorKeyword,
    NotKeyword,
    ModKeyword,
    RemKeyword,
    TrueKeyword,
    FalseKeyword,
    MessageKeyword,
    ProcedureKeyword,
    MixedKeyword,
    ModifiesKeyword,
    OmitKeyword,
}

impl SyntaxKind {
    /// Whether this kind represents a keyword.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u8;
        v >= SyntaxKind::ModuleKeyword as u8 && v <= SyntaxKind::OmitKeyword as u8
    }

    /// Whether this kind represents a punctuation token.
    #[inline]
    pub fn is_punctuation(self) -> bool {
        let v = self as u8;
        v >= SyntaxKind::OpenBraceToken as u8 && v <= SyntaxKind::AtGreaterThanToken as u8
    }

    /// Whether this kind is a literal token.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::NumericLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::BitStringLiteral
        )
    }

    /// Whether this kind can begin a module-level definition.
    pub fn starts_definition(self) -> bool {
        matches!(
            self,
            SyntaxKind::ImportKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::FriendKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::VarKeyword
                | SyntaxKind::TemplateKeyword
                | SyntaxKind::ModuleparKeyword
                | SyntaxKind::TypeKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::TestcaseKeyword
                | SyntaxKind::AltstepKeyword
                | SyntaxKind::ControlKeyword
                | SyntaxKind::ModuleKeyword
        )
    }

    /// Get the text of a keyword token.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::ModuleKeyword => Some("module"),
            SyntaxKind::ImportKeyword => Some("import"),
            SyntaxKind::FromKeyword => Some("from"),
            SyntaxKind::AllKeyword => Some("all"),
            SyntaxKind::ExceptKeyword => Some("except"),
            SyntaxKind::PublicKeyword => Some("public"),
            SyntaxKind::PrivateKeyword => Some("private"),
            SyntaxKind::FriendKeyword => Some("friend"),
            SyntaxKind::ConstKeyword => Some("const"),
            SyntaxKind::VarKeyword => Some("var"),
            SyntaxKind::TemplateKeyword => Some("template"),
            SyntaxKind::ModuleparKeyword => Some("modulepar"),
            SyntaxKind::TimerKeyword => Some("timer"),
            SyntaxKind::PortKeyword => Some("port"),
            SyntaxKind::TypeKeyword => Some("type"),
            SyntaxKind::ComponentKeyword => Some("component"),
            SyntaxKind::RecordKeyword => Some("record"),
            SyntaxKind::SetKeyword => Some("set"),
            SyntaxKind::UnionKeyword => Some("union"),
            SyntaxKind::EnumeratedKeyword => Some("enumerated"),
            SyntaxKind::OfKeyword => Some("of"),
            SyntaxKind::ClassKeyword => Some("class"),
            SyntaxKind::ExtendsKeyword => Some("extends"),
            SyntaxKind::RunsKeyword => Some("runs"),
            SyntaxKind::OnKeyword => Some("on"),
            SyntaxKind::MtcKeyword => Some("mtc"),
            SyntaxKind::SystemKeyword => Some("system"),
            SyntaxKind::FunctionKeyword => Some("function"),
            SyntaxKind::TestcaseKeyword => Some("testcase"),
            SyntaxKind::AltstepKeyword => Some("altstep"),
            SyntaxKind::SignatureKeyword => Some("signature"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::ControlKeyword => Some("control"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::WhileKeyword => Some("while"),
            SyntaxKind::DoKeyword => Some("do"),
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::OptionalKeyword => Some("optional"),
            SyntaxKind::CreateKeyword => Some("create"),
            SyntaxKind::InKeyword => Some("in"),
            SyntaxKind::OutKeyword => Some("out"),
            SyntaxKind::InoutKeyword => Some("inout"),
            SyntaxKind::AndKeyword => Some("and"),
            SyntaxKind::OrKeyword => Some("or"),
            SyntaxKind::XorKeyword => Some("xor"),
            SyntaxKind::NotKeyword => Some("not"),
            SyntaxKind::ModKeyword => Some("mod"),
            SyntaxKind::RemKeyword => Some("rem"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::MessageKeyword => Some("message"),
            SyntaxKind::ProcedureKeyword => Some("procedure"),
            SyntaxKind::MixedKeyword => Some("mixed"),
            SyntaxKind::ModifiesKeyword => Some("modifies"),
            SyntaxKind::OmitKeyword => Some("omit"),
            _ => None,
        }
    }

    /// Look up a keyword by its text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "module" => Some(SyntaxKind::ModuleKeyword),
            "import" => Some(SyntaxKind::ImportKeyword),
            "from" => Some(SyntaxKind::FromKeyword),
            "all" => Some(SyntaxKind::AllKeyword),
            "except" => Some(SyntaxKind::ExceptKeyword),
            "public" => Some(SyntaxKind::PublicKeyword),
            "private" => Some(SyntaxKind::PrivateKeyword),
            "friend" => Some(SyntaxKind::FriendKeyword),
            "const" => Some(SyntaxKind::ConstKeyword),
            "var" => Some(SyntaxKind::VarKeyword),
            "template" => Some(SyntaxKind::TemplateKeyword),
            "modulepar" => Some(SyntaxKind::ModuleparKeyword),
            "timer" => Some(SyntaxKind::TimerKeyword),
            "port" => Some(SyntaxKind::PortKeyword),
            "type" => Some(SyntaxKind::TypeKeyword),
            "component" => Some(SyntaxKind::ComponentKeyword),
            "record" => Some(SyntaxKind::RecordKeyword),
            "set" => Some(SyntaxKind::SetKeyword),
            "union" => Some(SyntaxKind::UnionKeyword),
            "enumerated" => Some(SyntaxKind::EnumeratedKeyword),
            "of" => Some(SyntaxKind::OfKeyword),
            "class" => Some(SyntaxKind::ClassKeyword),
            "extends" => Some(SyntaxKind::ExtendsKeyword),
            "runs" => Some(SyntaxKind::RunsKeyword),
            "on" => Some(SyntaxKind::OnKeyword),
            "mtc" => Some(SyntaxKind::MtcKeyword),
            "system" => Some(SyntaxKind::SystemKeyword),
            "function" => Some(SyntaxKind::FunctionKeyword),
            "testcase" => Some(SyntaxKind::TestcaseKeyword),
            "altstep" => Some(SyntaxKind::AltstepKeyword),
            "signature" => Some(SyntaxKind::SignatureKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "control" => Some(SyntaxKind::ControlKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            "do" => Some(SyntaxKind::DoKeyword),
            "break" => Some(SyntaxKind::BreakKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "optional" => Some(SyntaxKind::OptionalKeyword),
            "create" => Some(SyntaxKind::CreateKeyword),
            "in" => Some(SyntaxKind::InKeyword),
            "out" => Some(SyntaxKind::OutKeyword),
            "inout" => Some(SyntaxKind::InoutKeyword),
            "and" => Some(SyntaxKind::AndKeyword),
            "or" => Some(SyntaxKind::OrKeyword),
            "xor" => Some(SyntaxKind::XorKeyword),
            "not" => Some(SyntaxKind::NotKeyword),
            "mod" => Some(SyntaxKind::ModKeyword),
            "rem" => Some(SyntaxKind::RemKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "message" => Some(SyntaxKind::MessageKeyword),
            "procedure" => Some(SyntaxKind::ProcedureKeyword),
            "mixed" => Some(SyntaxKind::MixedKeyword),
            "modifies" => Some(SyntaxKind::ModifiesKeyword),
            "omit" => Some(SyntaxKind::OmitKeyword),
            _ => None,
        }
    }

    /// Get the text of a punctuation token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::DotDotToken => Some(".."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::AssignToken => Some(":="),
            SyntaxKind::ArrowToken => Some("->"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::LessThanAtToken => Some("<@"),
            SyntaxKind::AtGreaterThanToken => Some("@>"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(text) = self.keyword_text().or_else(|| self.punctuation_text()) {
            f.write_str(text)
        } else {
            write!(f, "{:?}", self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        assert_eq!(SyntaxKind::from_keyword("runs"), Some(SyntaxKind::RunsKeyword));
        assert_eq!(SyntaxKind::RunsKeyword.keyword_text(), Some("runs"));
        assert!(SyntaxKind::OmitKeyword.is_keyword());
        assert!(SyntaxKind::ModuleKeyword.is_keyword());
        assert!(!SyntaxKind::Identifier.is_keyword());
        assert_eq!(SyntaxKind::from_keyword("ModuleA"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SyntaxKind::AssignToken.to_string(), ":=");
        assert_eq!(SyntaxKind::ComponentKeyword.to_string(), "component");
        assert!(SyntaxKind::LessThanAtToken.is_punctuation());
    }
}
