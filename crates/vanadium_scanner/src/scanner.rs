//! The TTCN-3 scanner.

use memchr::{memchr, memmem};
use vanadium_ast::node::SyntaxError;
use vanadium_ast::syntax_kind::SyntaxKind;
use vanadium_core::text::TextRange;
use vanadium_diagnostics::messages;

/// Saved scanner state for lookahead.
#[derive(Debug, Clone, Copy)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
}

/// The scanner converts TTCN-3 source text into tokens.
pub struct Scanner<'t> {
    /// The source text being scanned.
    text: &'t str,
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// Accumulated errors.
    errors: Vec<SyntaxError>,
}

impl<'t> Scanner<'t> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            errors: Vec::new(),
        }
    }

    /// Look ahead: save position, call f, restore position and return result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let errors = self.errors.len();
        let result = f(self);
        self.restore_state(state);
        self.errors.truncate(errors);
        result
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's source text.
    #[inline]
    pub fn token_value(&self) -> &'t str {
        &self.text[self.token_start..self.pos]
    }

    /// Get the start position of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_range(&self) -> TextRange {
        TextRange::new(self.token_start as u32, self.pos as u32)
    }

    /// Take the accumulated errors.
    pub fn take_errors(&mut self) -> Vec<SyntaxError> {
        std::mem::take(&mut self.errors)
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn peek(&self, offset: usize) -> u8 {
        self.text.as_bytes().get(self.pos + offset).copied().unwrap_or(0)
    }

    fn error(&mut self, start: usize, message: &'static vanadium_diagnostics::DiagnosticMessage) {
        self.errors.push(SyntaxError::new(
            TextRange::new(start as u32, self.pos as u32),
            message,
        ));
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == b'/' => {
                    self.pos = match memchr(b'\n', &bytes[self.pos..]) {
                        Some(offset) => self.pos + offset + 1,
                        None => bytes.len(),
                    };
                }
                b'/' if self.peek(1) == b'*' => {
                    let start = self.pos;
                    match memmem::find(&bytes[self.pos + 2..], b"*/") {
                        Some(offset) => self.pos += offset + 4,
                        None => {
                            self.pos = bytes.len();
                            self.error(start, &messages::UNTERMINATED_COMMENT);
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.token_start = self.pos;
        self.token = self.scan_token();
        self.token
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        if self.pos >= bytes.len() {
            return SyntaxKind::EndOfFileToken;
        }
        let ch = bytes[self.pos];
        match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.pos += 1;
                self.eat_identifier_tail();
                SyntaxKind::from_keyword(self.token_value()).unwrap_or(SyntaxKind::Identifier)
            }
            b'0'..=b'9' => self.scan_number(),
            b'"' => self.scan_string(),
            b'\'' => self.scan_bit_string(),
            b'@' => {
                if self.peek(1) == b'>' {
                    self.pos += 2;
                    SyntaxKind::AtGreaterThanToken
                } else if self.peek(1).is_ascii_alphabetic() {
                    self.pos += 1;
                    self.eat_identifier_tail();
                    SyntaxKind::ModifierToken
                } else {
                    self.pos += 1;
                    self.error(self.token_start, &messages::INVALID_CHARACTER);
                    SyntaxKind::Unknown
                }
            }
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'?' => self.single(SyntaxKind::QuestionToken),
            b'+' => self.single(SyntaxKind::PlusToken),
            b'*' => self.single(SyntaxKind::AsteriskToken),
            b'/' => self.single(SyntaxKind::SlashToken),
            b'&' => self.single(SyntaxKind::AmpersandToken),
            b'.' => match self.peek(1) {
                b'.' => self.double(SyntaxKind::DotDotToken),
                _ => self.single(SyntaxKind::DotToken),
            },
            b':' => match self.peek(1) {
                b'=' => self.double(SyntaxKind::AssignToken),
                _ => self.single(SyntaxKind::ColonToken),
            },
            b'-' => match self.peek(1) {
                b'>' => self.double(SyntaxKind::ArrowToken),
                _ => self.single(SyntaxKind::MinusToken),
            },
            b'=' if self.peek(1) == b'=' => self.double(SyntaxKind::EqualsEqualsToken),
            b'!' if self.peek(1) == b'=' => self.double(SyntaxKind::ExclamationEqualsToken),
            b'<' => match self.peek(1) {
                b'=' => self.double(SyntaxKind::LessThanEqualsToken),
                b'<' => self.double(SyntaxKind::LessThanLessThanToken),
                b'@' => self.double(SyntaxKind::LessThanAtToken),
                _ => self.single(SyntaxKind::LessThanToken),
            },
            b'>' => match self.peek(1) {
                b'=' => self.double(SyntaxKind::GreaterThanEqualsToken),
                b'>' => self.double(SyntaxKind::GreaterThanGreaterThanToken),
                _ => self.single(SyntaxKind::GreaterThanToken),
            },
            _ => {
                // Skip one whole character so ranges stay on char boundaries.
                let len = self.text[self.pos..].chars().next().map_or(1, char::len_utf8);
                self.pos += len;
                self.error(self.token_start, &messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        }
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    #[inline]
    fn double(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 2;
        kind
    }

    fn eat_identifier_tail(&mut self) {
        while matches!(self.peek(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }
    }

    fn eat_digits(&mut self) {
        while self.peek(0).is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        self.eat_digits();
        let mut kind = SyntaxKind::NumericLiteral;
        // `1..5` is a range, not a float.
        if self.peek(0) == b'.' && self.peek(1).is_ascii_digit() {
            self.pos += 1;
            self.eat_digits();
            kind = SyntaxKind::FloatLiteral;
        }
        if matches!(self.peek(0), b'e' | b'E')
            && (self.peek(1).is_ascii_digit()
                || (matches!(self.peek(1), b'+' | b'-') && self.peek(2).is_ascii_digit()))
        {
            self.pos += 2;
            self.eat_digits();
            kind = SyntaxKind::FloatLiteral;
        }
        kind
    }

    /// `"text"`, with `""` standing for an embedded quote.
    fn scan_string(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        self.pos += 1;
        loop {
            match memchr(b'"', &bytes[self.pos..]) {
                Some(offset) => {
                    self.pos += offset + 1;
                    if self.peek(0) == b'"' {
                        self.pos += 1;
                        continue;
                    }
                    return SyntaxKind::StringLiteral;
                }
                None => {
                    self.pos = bytes.len();
                    self.error(self.token_start, &messages::UNTERMINATED_STRING_LITERAL);
                    return SyntaxKind::StringLiteral;
                }
            }
        }
    }

    /// `'0110'B`, `'FF'H`, `'00'O`.
    fn scan_bit_string(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        self.pos += 1;
        match memchr(b'\'', &bytes[self.pos..]) {
            Some(offset) => {
                self.pos += offset + 1;
                if matches!(self.peek(0), b'B' | b'H' | b'O') {
                    self.pos += 1;
                }
                SyntaxKind::BitStringLiteral
            }
            None => {
                self.pos = bytes.len();
                self.error(self.token_start, &messages::UNTERMINATED_STRING_LITERAL);
                SyntaxKind::BitStringLiteral
            }
        }
    }
}
