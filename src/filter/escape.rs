// src/filter/escape.rs

//! Escaping of the characters that carry meaning in the filter grammar.
//!
//! A backslash makes the following special character literal, so
//! `Name=Foo\(1\)` matches the value `Foo(1)` instead of opening a group.

use super::error::FilterFormatError;

pub const ESCAPE_CHARACTER: char = '\\';

/// Characters that must be escaped to appear literally in a name or value.
pub const SPECIAL_CHARACTERS: [char; 8] = ['\\', '(', ')', '&', '|', '=', '!', '~'];

pub fn is_special(c: char) -> bool {
    SPECIAL_CHARACTERS.contains(&c)
}

/// Escape every special character in `s`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_special(c) {
            out.push(ESCAPE_CHARACTER);
        }
        out.push(c);
    }
    out
}

/// Reverse [`escape`].
///
/// A trailing backslash, or a backslash in front of a character that is not
/// special, is rejected.
pub fn unescape(s: &str) -> Result<String, FilterFormatError> {
    if !s.contains(ESCAPE_CHARACTER) {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE_CHARACTER {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if is_special(next) => out.push(next),
            _ => return Err(FilterFormatError::InvalidEscapeSequence(s.to_string())),
        }
    }
    Ok(out)
}
