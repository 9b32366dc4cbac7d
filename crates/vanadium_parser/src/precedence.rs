//! Binary operator precedence.

use vanadium_ast::syntax_kind::SyntaxKind;

/// Binding power of a binary operator; higher binds tighter.
pub fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
    Some(match kind {
        SyntaxKind::DotDotToken => 1,
        SyntaxKind::OrKeyword => 2,
        SyntaxKind::XorKeyword => 3,
        SyntaxKind::AndKeyword => 4,
        SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => 5,
        SyntaxKind::LessThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::GreaterThanEqualsToken => 6,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::LessThanAtToken
        | SyntaxKind::AtGreaterThanToken => 7,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::AmpersandToken => 8,
        SyntaxKind::AsteriskToken
        | SyntaxKind::SlashToken
        | SyntaxKind::ModKeyword
        | SyntaxKind::RemKeyword => 9,
        _ => return None,
    })
}
