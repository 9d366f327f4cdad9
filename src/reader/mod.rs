//! Support for reading S-expressions from an in-memory buffer.
//!
//! The [`Reader`] walks a caller-owned `&str` and hands back one top-level [`Node`] per call,
//! each a complete subtree. Parsing stops at the first error; nothing partially built escapes.

use std::{borrow::Cow, collections::TryReserveError, path::Path, rc::Rc};

use crate::data::{Location, Node};
use cursor::Cursor;
pub use cursor::Position;

mod cursor;
mod parse;
mod token;

/// What went wrong, or why reading stopped.
///
/// The discriminants are stable codes for [`error_name`].
/// Code 0 ("Ok") and code 2 ("Unknown") are reserved and never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[repr(u8)]
pub enum ErrorKind {
    /// No more input at top level. This is how a successful read ends.
    #[error("end of input")]
    Eof = 1,
    #[error("out of memory")]
    OutOfMemory = 3,
    /// The next character starts no production, or an attribute has no key.
    #[error("unrecognised input")]
    UnrecognisedInput = 4,
    /// A quoted string or comment ran off the end of the input.
    #[error("unterminated string")]
    UnterminatedString = 5,
    /// A number with more than one decimal point.
    #[error("mangled number")]
    MangledNumber = 6,
    /// A `)` was consumed. Only returned to callers that pass a scope to [`Reader::next_node`].
    #[error("list terminator")]
    ListTerminator = 7,
    /// A `)` with no list open.
    #[error("unmatched closing parenthesis")]
    UnmatchedClose = 8,
    /// The input ended inside a list.
    #[error("unterminated list")]
    UnterminatedList = 9,
    /// Lists nested deeper than [`ReaderConfig::max_depth`].
    #[error("lists nested too deeply")]
    NestingTooDeep = 10,
}

impl ErrorKind {
    /// Look up a kind by its numeric code.
    pub fn from_code(code: u8) -> Option<ErrorKind> {
        Some(match code {
            1 => ErrorKind::Eof,
            3 => ErrorKind::OutOfMemory,
            4 => ErrorKind::UnrecognisedInput,
            5 => ErrorKind::UnterminatedString,
            6 => ErrorKind::MangledNumber,
            7 => ErrorKind::ListTerminator,
            8 => ErrorKind::UnmatchedClose,
            9 => ErrorKind::UnterminatedList,
            10 => ErrorKind::NestingTooDeep,
            _ => return None,
        })
    }

    /// Stable, human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Eof => "Eof",
            ErrorKind::OutOfMemory => "OutOfMemory",
            ErrorKind::UnrecognisedInput => "UnrecognisedInput",
            ErrorKind::UnterminatedString => "UnterminatedString",
            ErrorKind::MangledNumber => "MangledNumber",
            ErrorKind::ListTerminator => "ListTerminator",
            ErrorKind::UnmatchedClose => "UnmatchedClose",
            ErrorKind::UnterminatedList => "UnterminatedList",
            ErrorKind::NestingTooDeep => "NestingTooDeep",
        }
    }
}

impl From<TryReserveError> for ErrorKind {
    fn from(_: TryReserveError) -> Self {
        ErrorKind::OutOfMemory
    }
}

/// Label for a raw error code; codes outside the enum get a placeholder instead of failing.
pub fn error_name(code: u8) -> Cow<'static, str> {
    match code {
        0 => Cow::Borrowed("Ok"),
        2 => Cow::Borrowed("Unknown"),
        _ => match ErrorKind::from_code(code) {
            Some(kind) => Cow::Borrowed(kind.name()),
            None => Cow::Owned(format!("unknown error kind ({code})")),
        },
    }
}

/// A read failure, located at the start of the token it happened in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Location,
}

impl Error {
    pub fn new(kind: ErrorKind, location: Location) -> Self {
        Error { kind, location }
    }

    /// Ordinary end of input, not a failure.
    pub fn is_eof(&self) -> bool {
        self.kind == ErrorKind::Eof
    }

    /// The input stopped before a construct was closed; more input could complete it.
    ///
    /// Useful when input arrives interactively: prompt for more instead of reporting.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnterminatedString | ErrorKind::UnterminatedList
        )
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        let kind = if value.is_eof() || value.is_incomplete() {
            std::io::ErrorKind::UnexpectedEof
        } else {
            std::io::ErrorKind::InvalidData
        };
        std::io::Error::new(kind, value.to_string())
    }
}

/// The main result type for this module.
pub type ReadResult<T> = Result<T, Error>;

/// Reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Line number of the first character of the buffer.
    pub first_line: usize,
    /// Column number of the first character of the buffer.
    pub first_column: usize,
    /// Column number of the first character after each newline.
    pub column_origin: usize,
    /// Deepest allowed list nesting; one more `(` is [`ErrorKind::NestingTooDeep`].
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            first_line: 1,
            first_column: 1,
            column_origin: 1,
            max_depth: 256,
        }
    }
}

impl ReaderConfig {
    /// Continue line/column bookkeeping that the caller has already started.
    pub fn starting_at(mut self, line: usize, column: usize) -> Self {
        self.first_line = line;
        self.first_column = column;
        self
    }

    pub fn with_column_origin(mut self, column_origin: usize) -> Self {
        self.column_origin = column_origin;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Reads nodes out of a source buffer, one top-level node at a time.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    name: Rc<str>,
    cursor: Cursor<'a>,
    config: ReaderConfig,
    // Set once iteration has hit end of input or an error.
    finished: bool,
}

impl<'a> Reader<'a> {
    /// Read `source`, attributing locations to the file `name`.
    pub fn new(name: impl Into<Rc<str>>, source: &'a str) -> Self {
        Self::with_config(name, source, ReaderConfig::default())
    }

    pub fn with_config(name: impl Into<Rc<str>>, source: &'a str, config: ReaderConfig) -> Self {
        let start = Position {
            line: config.first_line,
            column: config.first_column,
        };
        Reader {
            name: name.into(),
            cursor: Cursor::new(source, start, config.column_origin),
            config,
            finished: false,
        }
    }

    /// Where the next read will start.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Byte offset where the next read will start.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Read the next node.
    ///
    /// - `Ok(Some(node))`: a complete node (for `(`, the whole list).
    /// - `Ok(None)`: an attribute was consumed; call again.
    /// - `Err` of kind [`ErrorKind::Eof`]: the input is exhausted.
    ///
    /// `scope` is the list that attributes belong to. Without one, attributes are discarded and
    /// a `)` is [`ErrorKind::UnmatchedClose`]; with one, a `)` is [`ErrorKind::ListTerminator`],
    /// letting the caller finish the list itself.
    pub fn next_node(&mut self, scope: Option<&mut Node>) -> ReadResult<Option<Node>> {
        let top_level = scope.is_none();
        match self.step(scope)? {
            parse::Step::Node(node) => Ok(Some(node)),
            parse::Step::Attribute => Ok(None),
            parse::Step::Eof => Err(Error::new(ErrorKind::Eof, self.location())),
            parse::Step::Close(at) if top_level => Err(Error::new(ErrorKind::UnmatchedClose, at)),
            parse::Step::Close(at) => Err(Error::new(ErrorKind::ListTerminator, at)),
        }
    }

    fn location(&self) -> Location {
        let Position { line, column } = self.cursor.position();
        Location {
            file: self.name.clone(),
            line,
            column,
            offset: self.cursor.offset(),
        }
    }
}

/// Top-level nodes in document order. Attributes outside any list are skipped.
/// Ends at end of input, or after yielding the first error.
impl Iterator for Reader<'_> {
    type Item = ReadResult<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.next_node(None) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(err) => {
                    self.finished = true;
                    if !err.is_eof() {
                        return Some(Err(err));
                    }
                }
            }
        }
        None
    }
}

/// Parse the whole buffer as a sequence of top-level nodes.
pub fn read_all(name: impl Into<Rc<str>>, source: &str) -> ReadResult<Vec<Node>> {
    Reader::new(name, source).collect()
}

/// Read a file into memory for a [`Reader`].
pub fn load(path: impl AsRef<Path>) -> std::io::Result<String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded source");
    Ok(content)
}
