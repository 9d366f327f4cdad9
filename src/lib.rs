//! Reader for a small S-expression format.
//!
//! Lists of symbols, strings, numbers and comments, with `key=value` attributes attached to the
//! enclosing list:
//!
//! ```text
//! (window :title=main
//!   (button "OK" 12 0.5) ; trailing comment
//! )
//! ```
//!
//! The [`reader`] module turns an in-memory buffer into [`data::Node`] trees;
//! the [`data`] module holds the tree and its debugging helpers.

pub mod data;
pub mod reader;

pub use data::{
    attributes_of, delete, dump, tag_name, AttributeSnapshot, Attributes, Location, Node, Tag,
    Value,
};
pub use reader::{
    error_name, load, read_all, Error, ErrorKind, Position, ReadResult, Reader, ReaderConfig,
};
