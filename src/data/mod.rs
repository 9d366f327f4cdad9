//! Parsed tree types.
//!
//! A [`Node`] owns everything beneath it: its text, its attributes, and (for lists) its children.
//! There is no pointer back to the parent; the reader passes the enclosing list down as a
//! `&mut` scope while a list is being filled in, and nothing after that needs to walk upwards.
//!
//! Growth of the tree goes through fallible reservation,
//! so running out of memory is reported as [`ErrorKind::OutOfMemory`] rather than aborting.

mod render;

use std::{
    borrow::Cow,
    collections::{HashMap, TryReserveError},
    ops::Range,
    rc::Rc,
};

use crate::reader::ErrorKind;

pub use render::dump;

/// Attributes of a list: `key=value` pairs, last write wins.
pub type Attributes = HashMap<String, String>;

/// The kind of a node.
///
/// The discriminants are stable; [`tag_name`] accepts them as raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Placeholder before a node's kind is known. Never carried by a node the reader returns.
    Unknown = 0,
    Integer = 1,
    Float = 2,
    String = 3,
    Symbol = 4,
    List = 5,
    Comment = 6,
}

impl Tag {
    /// Look up a tag by its numeric code.
    pub fn from_code(code: u8) -> Option<Tag> {
        Some(match code {
            0 => Tag::Unknown,
            1 => Tag::Integer,
            2 => Tag::Float,
            3 => Tag::String,
            4 => Tag::Symbol,
            5 => Tag::List,
            6 => Tag::Comment,
            _ => return None,
        })
    }

    /// Stable, human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Unknown => "Unknown",
            Tag::Integer => "Integer",
            Tag::Float => "Float",
            Tag::String => "String",
            Tag::Symbol => "Symbol",
            Tag::List => "List",
            Tag::Comment => "Comment",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Label for a raw tag code; codes outside the enum get a placeholder instead of failing.
pub fn tag_name(code: u8) -> Cow<'static, str> {
    match Tag::from_code(code) {
        Some(tag) => Cow::Borrowed(tag.name()),
        None => Cow::Owned(format!("unknown tag ({code})")),
    }
}

/// Where a token starts.
///
/// `line` and `column` follow the reader's configured origins;
/// `offset` is the byte offset into the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Payload of a node, one variant per production.
///
/// Numbers keep their digits exactly as written; no numeric conversion happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(String),
    Float(String),
    /// Contents with escapes already applied.
    String(String),
    Symbol(String),
    /// Everything after the `;` up to, not including, the newline.
    Comment(String),
    List(Vec<Node>),
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Integer(_) => Tag::Integer,
            Value::Float(_) => Tag::Float,
            Value::String(_) => Tag::String,
            Value::Symbol(_) => Tag::Symbol,
            Value::Comment(_) => Tag::Comment,
            Value::List(_) => Tag::List,
        }
    }
}

/// One parsed unit: a list, symbol, string, number, or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    location: Location,
    span: Range<usize>,
    value: Value,
    attributes: Attributes,
}

impl Node {
    pub(crate) fn new(location: Location, span: Range<usize>, value: Value) -> Self {
        Node {
            location,
            span,
            value,
            attributes: Attributes::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.value.tag()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Text payload; empty for lists.
    pub fn text(&self) -> &str {
        match &self.value {
            Value::Integer(s)
            | Value::Float(s)
            | Value::String(s)
            | Value::Symbol(s)
            | Value::Comment(s) => s,
            Value::List(_) => "",
        }
    }

    /// Children in document order; empty unless this is a list.
    pub fn children(&self) -> &[Node] {
        match &self.value {
            Value::List(children) => children,
            _ => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.value, Value::List(_))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Byte range of this node in the source, delimiters included.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub(crate) fn set_span_end(&mut self, end: usize) {
        self.span.end = end;
    }

    /// Append a finished child. Only called on the list being built.
    pub(crate) fn push_child(&mut self, child: Node) -> Result<(), TryReserveError> {
        debug_assert!(self.is_list(), "child pushed onto a {} node", self.tag());
        if let Value::List(children) = &mut self.value {
            children.try_reserve(1)?;
            children.push(child);
        }
        Ok(())
    }

    /// Record an attribute, overwriting any earlier value for the key.
    ///
    /// Returns whether it was stored: only lists hold attributes.
    pub(crate) fn set_attribute(
        &mut self,
        key: String,
        value: String,
    ) -> Result<bool, TryReserveError> {
        if !self.is_list() {
            return Ok(false);
        }
        self.attributes.try_reserve(1)?;
        self.attributes.insert(key, value);
        Ok(true)
    }
}

/// Destroy a tree, returning how many nodes it held.
///
/// Children are detached onto a work list before their parent is dropped,
/// so teardown never recurses. Passing `None` is a no-op.
pub fn delete(node: Option<Node>) -> usize {
    let Some(node) = node else {
        return 0;
    };

    let mut pending = vec![node];
    let mut deleted = 0;
    while let Some(mut node) = pending.pop() {
        if let Value::List(children) = &mut node.value {
            pending.append(children);
        }
        deleted += 1;
    }
    tracing::trace!(deleted, "deleted tree");
    deleted
}

/// A copy of a node's attributes as two parallel sequences; `keys[i]` pairs with `values[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSnapshot {
    pub keys: Vec<String>,
    pub values: Vec<String>,
}

impl AttributeSnapshot {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Write one `key = "value"` line per attribute, sorted by key.
    pub fn dump<W: std::io::Write + ?Sized>(&self, sink: &mut W) -> std::io::Result<()> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        writeln!(sink, "{} attribute(s)", pairs.len())?;
        for (key, value) in pairs {
            writeln!(sink, "  {key} = {value:?}")?;
        }
        Ok(())
    }
}

/// Export a node's attributes.
///
/// An absent node gives an empty snapshot; the only failure is running out of memory.
pub fn attributes_of(node: Option<&Node>) -> Result<AttributeSnapshot, ErrorKind> {
    let mut snapshot = AttributeSnapshot::default();
    let Some(node) = node else {
        return Ok(snapshot);
    };

    let count = node.attributes.len();
    snapshot.keys.try_reserve_exact(count)?;
    snapshot.values.try_reserve_exact(count)?;
    for (key, value) in &node.attributes {
        snapshot.keys.push(try_copy(key)?);
        snapshot.values.push(try_copy(value)?);
    }
    Ok(snapshot)
}

fn try_copy(s: &str) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())?;
    out.push_str(s);
    Ok(out)
}
