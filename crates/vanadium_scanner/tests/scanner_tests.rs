//! Scanner integration tests.
//!
//! Verifies that the scanner correctly tokenizes TTCN-3 constructs.

use vanadium_ast::syntax_kind::SyntaxKind;
use vanadium_scanner::Scanner;

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("  \n\t // line comment\n /* block */ ").is_empty());
}

#[test]
fn test_unterminated_comment_reports_error() {
    let mut scanner = Scanner::new("/* never closed");
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    assert_eq!(scanner.take_errors().len(), 1);
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_module_header() {
    assert_eq!(
        scan_kinds("module ModuleA {"),
        vec![
            SyntaxKind::ModuleKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::OpenBraceToken
        ]
    );
}

#[test]
fn test_runs_on_clause() {
    let tokens = scan_all("testcase target() runs on Provider");
    assert_eq!(tokens[0].0, SyntaxKind::TestcaseKeyword);
    assert_eq!(tokens[1], (SyntaxKind::Identifier, "target".to_string()));
    assert_eq!(tokens[4].0, SyntaxKind::RunsKeyword);
    assert_eq!(tokens[5].0, SyntaxKind::OnKeyword);
    assert_eq!(tokens[6], (SyntaxKind::Identifier, "Provider".to_string()));
}

#[test]
fn test_modifiers() {
    assert_eq!(
        scan_all("@abstract x @> y"),
        vec![
            (SyntaxKind::ModifierToken, "@abstract".to_string()),
            (SyntaxKind::Identifier, "x".to_string()),
            (SyntaxKind::AtGreaterThanToken, "@>".to_string()),
            (SyntaxKind::Identifier, "y".to_string()),
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(
        scan_kinds("42 3.14 1e5 0..10"),
        vec![
            SyntaxKind::NumericLiteral,
            SyntaxKind::FloatLiteral,
            SyntaxKind::FloatLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::DotDotToken,
            SyntaxKind::NumericLiteral,
        ]
    );
}

#[test]
fn test_string_literals() {
    let tokens = scan_all(r#""say ""hi""" 'FF'H '0101'B"#);
    assert_eq!(tokens[0], (SyntaxKind::StringLiteral, r#""say ""hi""""#.to_string()));
    assert_eq!(tokens[1], (SyntaxKind::BitStringLiteral, "'FF'H".to_string()));
    assert_eq!(tokens[2].0, SyntaxKind::BitStringLiteral);
}

#[test]
fn test_unterminated_string() {
    let mut scanner = Scanner::new("\"open");
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.take_errors().len(), 1);
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_operators() {
    assert_eq!(
        scan_kinds(":= == != <= >= << >> <@ -> : ."),
        vec![
            SyntaxKind::AssignToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::LessThanEqualsToken,
            SyntaxKind::GreaterThanEqualsToken,
            SyntaxKind::LessThanLessThanToken,
            SyntaxKind::GreaterThanGreaterThanToken,
            SyntaxKind::LessThanAtToken,
            SyntaxKind::ArrowToken,
            SyntaxKind::ColonToken,
            SyntaxKind::DotToken,
        ]
    );
}

#[test]
fn test_invalid_character() {
    let mut scanner = Scanner::new("x § y");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    assert_eq!(scanner.token_value(), "§");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.take_errors().len(), 1);
}

#[test]
fn test_look_ahead_restores_state() {
    let mut scanner = Scanner::new("a b c");
    scanner.scan();
    let second = scanner.look_ahead(|s| s.scan());
    assert_eq!(second, SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "a");
    scanner.scan();
    assert_eq!(scanner.token_value(), "b");
}
