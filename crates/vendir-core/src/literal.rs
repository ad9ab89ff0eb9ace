//! Go string literal unquoting and quoting.
//!
//! Import paths appear in source as interpreted (`"..."`) or raw
//! (`` `...` ``) string literals. [`unquote`] decodes either form to its
//! logical value; [`quote`] produces the canonical interpreted form used when
//! writing a rewritten path back.

use thiserror::Error;

/// Error decoding a string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnquoteError {
    /// The text is not delimited by matching quotes.
    #[error("not a string literal: {literal}")]
    NotALiteral { literal: String },

    /// An escape sequence is malformed.
    #[error("invalid escape sequence at byte {offset} in {literal}")]
    InvalidEscape { literal: String, offset: usize },

    /// The decoded bytes are not valid UTF-8.
    #[error("string literal {literal} does not decode to valid UTF-8")]
    InvalidUtf8 { literal: String },
}

/// Decode a Go string literal (including its delimiters) to its value.
///
/// Raw literals have carriage returns removed, as the Go compiler does.
pub fn unquote(literal: &str) -> Result<String, UnquoteError> {
    let not_a_literal = || UnquoteError::NotALiteral {
        literal: literal.to_string(),
    };

    if literal.len() < 2 {
        return Err(not_a_literal());
    }

    if let Some(inner) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        if inner.contains('`') {
            return Err(not_a_literal());
        }
        return Ok(inner.replace('\r', ""));
    }

    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(not_a_literal)?;

    // Fast path: nothing to decode
    if !inner.contains('\\') {
        if inner.contains('"') || inner.contains('\n') {
            return Err(not_a_literal());
        }
        return Ok(inner.to_string());
    }

    let bytes = inner.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\n' => return Err(not_a_literal()),
            b'\\' => {
                let offset = i + 1;
                let invalid = move || UnquoteError::InvalidEscape {
                    literal: literal.to_string(),
                    offset,
                };
                let esc = *bytes.get(i + 1).ok_or_else(invalid)?;
                i += 2;
                match esc {
                    b'a' => out.push(0x07),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'v' => out.push(0x0b),
                    b'\\' => out.push(b'\\'),
                    b'"' => out.push(b'"'),
                    b'0'..=b'7' => {
                        let digits = bytes.get(i - 1..i + 2).ok_or_else(invalid)?;
                        let mut value: u32 = 0;
                        for &d in digits {
                            if !(b'0'..=b'7').contains(&d) {
                                return Err(invalid());
                            }
                            value = value * 8 + u32::from(d - b'0');
                        }
                        let byte = u8::try_from(value).map_err(|_| invalid())?;
                        out.push(byte);
                        i += 2;
                    }
                    b'x' => {
                        let value = hex_value(bytes.get(i..i + 2).ok_or_else(invalid)?)
                            .ok_or_else(invalid)?;
                        // Two hex digits always fit in a byte
                        out.push(value as u8);
                        i += 2;
                    }
                    b'u' | b'U' => {
                        let width = if esc == b'u' { 4 } else { 8 };
                        let value = hex_value(bytes.get(i..i + width).ok_or_else(invalid)?)
                            .ok_or_else(invalid)?;
                        let ch = char::from_u32(value).ok_or_else(invalid)?;
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                        i += width;
                    }
                    _ => return Err(invalid()),
                }
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| UnquoteError::InvalidUtf8 {
        literal: literal.to_string(),
    })
}

fn hex_value(digits: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    for &d in digits {
        value = value * 16 + char::from(d).to_digit(16)?;
    }
    Some(value)
}

/// Encode a value as an interpreted Go string literal.
///
/// Printable characters are kept as-is; quotes, backslashes and control
/// characters are escaped.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if (c as u32) < 0x80 && c.is_control() => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() || c == '\u{feff}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
