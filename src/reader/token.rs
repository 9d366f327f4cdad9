//! Lexical readers.
//!
//! Every reader here consumes from a [`Cursor`], leaving it just past the last character it used.
//! Token text is accumulated one character at a time with fallible reservation.

use super::cursor::Cursor;
use super::ErrorKind;
use crate::data::{Node, Value};

/// Characters that end a bare token. They are left for the next read.
const BREAKSET: &[char] = &['(', ')', ' ', '\t', '\n', '\r', ':', '=', '"'];

/// What ends a delimited read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    /// This character, which is consumed. Running out of input first is an error.
    Char(char),
    /// Any [`BREAKSET`] character, which is not consumed, or end of input.
    Breakset,
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn space() -> &'static Regex {
        static SPACE: OnceLock<Regex> = OnceLock::new();
        SPACE.get_or_init(|| {
            Regex::new(r"\A[ \t\n\r]+").expect("could not compile regex for empty space")
        })
    }

    pub(super) fn number() -> &'static Regex {
        static NUMBER: OnceLock<Regex> = OnceLock::new();
        // Digits and dots; how many dots is checked while consuming.
        NUMBER.get_or_init(|| {
            Regex::new(r"\A[0-9][0-9.]*").expect("could not compile regex for number")
        })
    }
}

fn push(text: &mut String, c: char) -> Result<(), ErrorKind> {
    text.try_reserve(c.len_utf8())?;
    text.push(c);
    Ok(())
}

/// Skip spaces, tabs, newlines and carriage returns.
pub(crate) fn skip_whitespace(cursor: &mut Cursor<'_>) {
    if let Some(space) = regex::space().find(cursor.rest()) {
        cursor.skip(space.end());
    }
}

/// Shared primitive: collect characters up to `terminator`.
///
/// A backslash takes the next character literally, delimiters and terminators included;
/// the backslash itself is never part of the result.
/// A backslash with nothing after it contributes nothing.
pub(crate) fn read_delimited(
    cursor: &mut Cursor<'_>,
    terminator: Terminator,
) -> Result<String, ErrorKind> {
    let mut text = String::new();
    loop {
        let Some(c) = cursor.peek() else {
            return match terminator {
                Terminator::Breakset => Ok(text),
                Terminator::Char(_) => Err(ErrorKind::UnterminatedString),
            };
        };
        match terminator {
            Terminator::Breakset if BREAKSET.contains(&c) => return Ok(text),
            Terminator::Char(t) if c == t => {
                cursor.bump();
                return Ok(text);
            }
            _ => (),
        }

        cursor.bump();
        let literal = if c == '\\' {
            match cursor.bump() {
                Some(escaped) => escaped,
                None => continue,
            }
        } else {
            c
        };
        push(&mut text, literal)?;
    }
}

/// Body of a quoted string; the opening quote is already consumed.
pub(crate) fn read_string(cursor: &mut Cursor<'_>) -> Result<String, ErrorKind> {
    read_delimited(cursor, Terminator::Char('"'))
}

pub(crate) fn read_symbol(cursor: &mut Cursor<'_>) -> Result<String, ErrorKind> {
    read_delimited(cursor, Terminator::Breakset)
}

/// Rest of the line after a `;`. The newline is consumed but not kept.
pub(crate) fn read_comment(cursor: &mut Cursor<'_>) -> Result<String, ErrorKind> {
    read_delimited(cursor, Terminator::Char('\n'))
}

/// A run of digits with at most one decimal point.
///
/// The cursor stops in front of a second point, which is [`ErrorKind::MangledNumber`].
pub(crate) fn read_number(cursor: &mut Cursor<'_>) -> Result<Value, ErrorKind> {
    let run = regex::number()
        .find(cursor.rest())
        .map(|m| m.as_str())
        .unwrap_or_default();

    let mut text = String::new();
    let mut dots = 0;
    for c in run.chars() {
        if c == '.' {
            if dots > 0 {
                return Err(ErrorKind::MangledNumber);
            }
            dots += 1;
        }
        push(&mut text, c)?;
        cursor.bump();
    }

    Ok(if dots == 1 {
        Value::Float(text)
    } else {
        Value::Integer(text)
    })
}

/// `key=value`, after the leading `:`.
///
/// The pair lands in `scope` if that is a list; otherwise it is read and dropped.
pub(crate) fn read_attribute(
    cursor: &mut Cursor<'_>,
    scope: Option<&mut Node>,
) -> Result<(), ErrorKind> {
    let key = read_delimited(cursor, Terminator::Char('=')).map_err(|kind| match kind {
        ErrorKind::UnterminatedString => ErrorKind::UnrecognisedInput,
        other => other,
    })?;
    if key.is_empty() {
        return Err(ErrorKind::UnrecognisedInput);
    }
    let value = read_delimited(cursor, Terminator::Breakset)?;

    let stored = match scope {
        Some(list) => list.set_attribute(key, value)?,
        None => false,
    };
    if !stored {
        tracing::debug!("attribute outside of any list; discarded");
    }
    Ok(())
}
