//! Read position within the source buffer.
//!
//! All scanning state lives here and is threaded explicitly through every reader call.

/// A (line, column) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position after consuming `c`.
    ///
    /// A newline moves to the next line, at `column_origin`.
    /// Every other character, tabs included, is one column.
    pub fn advance(self, c: char, column_origin: usize) -> Position {
        if c == '\n' {
            Position {
                line: self.line + 1,
                column: column_origin,
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

/// Read pointer into a caller-owned buffer, plus the position and nesting depth that go with it.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    position: Position,
    column_origin: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str, position: Position, column_origin: usize) -> Self {
        Cursor {
            input,
            offset: 0,
            position,
            column_origin,
            depth: 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        self.position = self.position.advance(c, self.column_origin);
        Some(c)
    }

    /// Consume `len` bytes; `len` must fall on a character boundary.
    pub(crate) fn skip(&mut self, len: usize) {
        let end = self.offset + len;
        while self.offset < end && self.bump().is_some() {}
    }

    /// Unconsumed input.
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Step into a list; returns the new depth.
    pub(crate) fn enter(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
