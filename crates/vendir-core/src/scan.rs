//! Import header scanner for Go source files.
//!
//! Lexes a file's package clause and import declarations, recording the
//! exact byte span of every import path literal. Nothing past the last
//! import declaration is parsed; when directive scanning is requested the
//! remainder is only tokenized far enough to find comments (string, raw
//! string and rune literals are skipped so their contents are never
//! mistaken for comments).
//!
//! Recognized header grammar (with Go's automatic semicolon insertion):
//!
//! ```text
//! File       = "package" ident ";" { ImportDecl ";" } ...
//! ImportDecl = "import" ( ImportSpec | "(" { ImportSpec [ ";" ] } ")" )
//! ImportSpec = [ "." | ident ] string_lit
//! ```

use thiserror::Error;

use crate::text::{byte_offset_to_position, Span};

/// Comment prefix that instructs `go generate` to run a command.
pub const GENERATE_DIRECTIVE: &str = "//go:generate";

/// One import path literal found in an import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Local name (`_`, `.`, or an identifier), if one was given.
    pub name: Option<String>,
    /// The literal exactly as written, delimiters included.
    pub literal: String,
    /// Location of `literal` in the source.
    pub span: Span,
}

/// A `//go:generate` directive prefix found in a line comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveRef {
    /// Location of the [`GENERATE_DIRECTIVE`] prefix.
    pub span: Span,
}

/// What the scanner found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedFile {
    pub package: String,
    pub imports: Vec<ImportRef>,
    pub directives: Vec<DirectiveRef>,
}

/// Error produced when the import header is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct ScanError {
    pub line: u32,
    pub col: u32,
    pub message: String,
}

/// Scan a Go source file's import header.
///
/// With `directives` set, the whole file is additionally scanned for
/// `//go:generate` comments.
pub fn scan(source: &str, directives: bool) -> Result<ScannedFile, ScanError> {
    let mut parser = HeaderParser::new(source);
    let mut scanned = parser.parse_header()?;

    if directives {
        parser.lexer.drain_lenient();
        scanned.directives = parser
            .lexer
            .comments
            .iter()
            .filter(|c| source[c.start..c.end].starts_with(GENERATE_DIRECTIVE))
            .map(|c| DirectiveRef {
                span: Span::new(c.start, c.start + GENERATE_DIRECTIVE.len()),
            })
            .collect();
    }

    Ok(scanned)
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    String,
    LParen,
    RParen,
    Semi,
    Dot,
    Other,
    Eof,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    span: Span,
}

/// Lexer error: byte offset plus message, converted to a [`ScanError`] by
/// the caller that owns the source.
type LexError = (usize, &'static str);

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// Set after tokens that end a statement when followed by a newline.
    semi_pending: bool,
    /// Spans of every line comment seen so far.
    comments: Vec<Span>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            src,
            pos,
            semi_pending: false,
            comments: Vec::new(),
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize, semi: bool) -> Token {
        self.semi_pending = semi;
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let src = self.src;
        loop {
            let rest = &src[self.pos..];
            let Some(ch) = rest.chars().next() else {
                if self.semi_pending {
                    return Ok(self.token(TokenKind::Semi, self.pos, false));
                }
                return Ok(self.token(TokenKind::Eof, self.pos, false));
            };

            match ch {
                '\n' => {
                    let start = self.pos;
                    self.pos += 1;
                    if self.semi_pending {
                        return Ok(self.token(TokenKind::Semi, start, false));
                    }
                }
                ' ' | '\t' | '\r' => self.pos += 1,
                '/' if rest.starts_with("//") => {
                    let len = rest.find('\n').unwrap_or(rest.len());
                    self.comments.push(Span::new(self.pos, self.pos + len));
                    self.pos += len;
                }
                '/' if rest.starts_with("/*") => {
                    let close = rest[2..]
                        .find("*/")
                        .ok_or((self.pos, "comment not terminated"))?;
                    let start = self.pos;
                    let body = &rest[..close + 4];
                    self.pos += body.len();
                    if self.semi_pending && body.contains('\n') {
                        return Ok(self.token(TokenKind::Semi, start, false));
                    }
                }
                '"' => return self.interpreted_string(),
                '`' => return self.raw_string(),
                '\'' => return self.rune_literal(),
                '(' => {
                    let start = self.pos;
                    self.pos += 1;
                    return Ok(self.token(TokenKind::LParen, start, false));
                }
                ')' => {
                    let start = self.pos;
                    self.pos += 1;
                    return Ok(self.token(TokenKind::RParen, start, true));
                }
                ';' => {
                    let start = self.pos;
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Semi, start, false));
                }
                '.' => {
                    let start = self.pos;
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Dot, start, false));
                }
                c if c == '_' || c.is_alphabetic() => {
                    let start = self.pos;
                    let len = rest
                        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
                        .unwrap_or(rest.len());
                    self.pos += len;
                    let semi = ends_statement(&rest[..len]);
                    return Ok(self.token(TokenKind::Ident, start, semi));
                }
                c if c.is_ascii_digit() => {
                    let start = self.pos;
                    let len = rest
                        .find(|c: char| !(c == '_' || c == '.' || c.is_ascii_alphanumeric()))
                        .unwrap_or(rest.len());
                    self.pos += len;
                    return Ok(self.token(TokenKind::Other, start, true));
                }
                c => {
                    let start = self.pos;
                    self.pos += c.len_utf8();
                    let semi = matches!(c, ']' | '}');
                    return Ok(self.token(TokenKind::Other, start, semi));
                }
            }
        }
    }

    /// Consume a quoted literal delimited by `quote`, honoring backslash
    /// escapes. Newlines are not allowed inside.
    fn escaped_literal(
        &mut self,
        quote: char,
        unterminated: &'static str,
    ) -> Result<usize, LexError> {
        let src = self.src;
        let start = self.pos;
        let mut chars = src[start + 1..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, '\n')) | None = chars.next() {
                        return Err((start, unterminated));
                    }
                }
                '\n' => return Err((start, unterminated)),
                c if c == quote => {
                    self.pos = start + 1 + i + 1;
                    return Ok(start);
                }
                _ => {}
            }
        }
        Err((start, unterminated))
    }

    fn interpreted_string(&mut self) -> Result<Token, LexError> {
        let start = self.escaped_literal('"', "string literal not terminated")?;
        Ok(self.token(TokenKind::String, start, true))
    }

    fn rune_literal(&mut self) -> Result<Token, LexError> {
        let start = self.escaped_literal('\'', "rune literal not terminated")?;
        Ok(self.token(TokenKind::Other, start, true))
    }

    fn raw_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let close = self.src[start + 1..]
            .find('`')
            .ok_or((start, "raw string literal not terminated"))?;
        self.pos = start + 1 + close + 1;
        Ok(self.token(TokenKind::String, start, true))
    }

    /// Tokenize the rest of the file only to collect comments.
    ///
    /// A lexical error past the import header ends the scan; the header is
    /// all that must be well formed.
    fn drain_lenient(&mut self) {
        loop {
            match self.next_token() {
                Ok(tok) if tok.kind == TokenKind::Eof => return,
                Ok(_) => {}
                Err((offset, message)) => {
                    tracing::warn!(
                        offset,
                        reason = message,
                        "stopped directive scan early; later directives stay active"
                    );
                    return;
                }
            }
        }
    }
}

/// Keywords after which a newline is not a statement terminator. Every other
/// identifier, and `break`, `continue`, `fallthrough` and `return`, ends a
/// statement at a newline.
const NON_TERMINATING_KEYWORDS: &[&str] = &[
    "case",
    "chan",
    "const",
    "default",
    "defer",
    "else",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

fn ends_statement(word: &str) -> bool {
    !NON_TERMINATING_KEYWORDS.contains(&word)
}

// ============================================================================
// Header Parser
// ============================================================================

struct HeaderParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> HeaderParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
        }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ScanError {
        let (line, col) = byte_offset_to_position(self.lexer.src, offset);
        ScanError {
            line,
            col,
            message: message.into(),
        }
    }

    fn next(&mut self) -> Result<Token, ScanError> {
        self.lexer
            .next_token()
            .map_err(|(offset, message)| self.error_at(offset, message))
    }

    fn text(&self, tok: &Token) -> &'a str {
        let src: &'a str = self.lexer.src;
        &src[tok.span.start..tok.span.end]
    }

    fn describe(&self, tok: &Token) -> String {
        match tok.kind {
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Semi if tok.span.is_empty() || self.text(tok) == "\n" => {
                "newline".to_string()
            }
            _ => format!("'{}'", self.text(tok)),
        }
    }

    fn unexpected(&self, tok: &Token, expected: &str) -> ScanError {
        self.error_at(
            tok.span.start,
            format!("expected {}, found {}", expected, self.describe(tok)),
        )
    }

    fn expect_semi(&mut self) -> Result<(), ScanError> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Semi | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected(&tok, "';'")),
        }
    }

    fn parse_header(&mut self) -> Result<ScannedFile, ScanError> {
        let tok = self.next()?;
        if tok.kind != TokenKind::Ident || self.text(&tok) != "package" {
            return Err(self.unexpected(&tok, "'package'"));
        }
        let name = self.next()?;
        if name.kind != TokenKind::Ident {
            return Err(self.unexpected(&name, "package name"));
        }
        let package = self.text(&name).to_string();
        self.expect_semi()?;

        let mut imports = Vec::new();
        loop {
            let tok = self.next()?;
            if tok.kind != TokenKind::Ident || self.text(&tok) != "import" {
                break;
            }

            let first = self.next()?;
            if first.kind == TokenKind::LParen {
                self.parse_import_group(&mut imports)?;
            } else {
                imports.push(self.parse_import_spec(first)?);
            }
            self.expect_semi()?;
        }

        Ok(ScannedFile {
            package,
            imports,
            directives: Vec::new(),
        })
    }

    fn parse_import_group(&mut self, imports: &mut Vec<ImportRef>) -> Result<(), ScanError> {
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::RParen => return Ok(()),
                TokenKind::Semi => continue,
                TokenKind::Eof => return Err(self.unexpected(&tok, "')'")),
                _ => {}
            }
            imports.push(self.parse_import_spec(tok)?);

            let after = self.next()?;
            match after.kind {
                TokenKind::Semi => {}
                TokenKind::RParen => return Ok(()),
                _ => return Err(self.unexpected(&after, "';' or ')'")),
            }
        }
    }

    fn parse_import_spec(&mut self, first: Token) -> Result<ImportRef, ScanError> {
        let (name, path) = match first.kind {
            TokenKind::Ident | TokenKind::Dot => {
                let name = self.text(&first).to_string();
                (Some(name), self.next()?)
            }
            _ => (None, first),
        };

        if path.kind != TokenKind::String {
            return Err(self.unexpected(&path, "import path"));
        }

        Ok(ImportRef {
            name,
            literal: self.text(&path).to_string(),
            span: path.span,
        })
    }
}
