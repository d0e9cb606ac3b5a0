//! Decoding of TSDL constant literals into Rust values.

use crate::lang::{FileId, Range};
use crate::reporting::Message;

/// Decode an integer literal token.
///
/// A contiguous `0x`/`0X` prefix selects hexadecimal, a leading zero with
/// further digits selects octal, anything else is decimal. Values must fit
/// in an `i64`.
pub fn parse_integer(file_id: FileId, range: Range, source: &str) -> Result<i64, Message> {
    let (digits, radix) = match source.strip_prefix("0x").or_else(|| source.strip_prefix("0X")) {
        Some(digits) => (digits, 16),
        None if source.len() > 1 && source.starts_with('0') => (&source[1..], 8),
        None => (source, 10),
    };

    i64::from_str_radix(digits, radix).map_err(|_| Message::InvalidIntegerLiteral {
        file_id,
        range,
        literal: source.to_owned(),
    })
}

/// Decode the backslash escapes in the body of a string literal.
///
/// Unrecognized escapes keep their backslash rather than failing, so
/// decoding never rejects a literal the lexer accepted.
pub fn decode_string(source: &str) -> String {
    let mut decoded = String::with_capacity(source.len());
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('0') => decoded.push('\0'),
            Some('a') => decoded.push('\x07'),
            Some('b') => decoded.push('\x08'),
            Some('f') => decoded.push('\x0c'),
            Some('v') => decoded.push('\x0b'),
            Some('\\') => decoded.push('\\'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('x') => match hex_escape(&mut chars, 2) {
                Some(c) => decoded.push(c),
                None => decoded.push_str("\\x"),
            },
            Some('u') => match hex_escape(&mut chars, 4) {
                Some(c) => decoded.push(c),
                None => decoded.push_str("\\u"),
            },
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }

    decoded
}

/// Consume exactly `len` hex digits, or consume nothing and return `None`.
fn hex_escape(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let mut lookahead = chars.clone();
    let mut value = 0;

    for _ in 0..len {
        value = value * 16 + lookahead.next()?.to_digit(16)?;
    }

    let decoded = char::from_u32(value)?;
    *chars = lookahead;
    Some(decoded)
}
