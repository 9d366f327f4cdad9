//! Debug rendering of a parsed tree.
//!
//! ```text
//! [List] input.sexp:1:1
//!   @k = "v"
//!   [Symbol] "a" input.sexp:1:2
//!   [Symbol] "b" input.sexp:1:9
//! ```

use std::io::Write;

use super::{Node, Value};

const INDENT: usize = 2;

/// Write `node` and everything beneath it to `sink`, starting at `level` steps of indentation.
///
/// An absent node renders as a `(null)` line.
pub fn dump<W: Write + ?Sized>(
    node: Option<&Node>,
    sink: &mut W,
    level: usize,
) -> std::io::Result<()> {
    let width = level * INDENT;
    let Some(node) = node else {
        return writeln!(sink, "{:width$}(null)", "");
    };

    match &node.value {
        Value::List(_) => writeln!(sink, "{:width$}[{}] {}", "", node.tag(), node.location)?,
        _ => writeln!(
            sink,
            "{:width$}[{}] {:?} {}",
            "",
            node.tag(),
            node.text(),
            node.location
        )?,
    }

    // HashMap order isn't stable; sort so dumps can be compared.
    let mut attributes: Vec<_> = node.attributes.iter().collect();
    attributes.sort_unstable();
    let inner = width + INDENT;
    for (key, value) in attributes {
        writeln!(sink, "{:inner$}@{key} = {value:?}", "")?;
    }

    for child in node.children() {
        dump(Some(child), sink, level + 1)?;
    }
    Ok(())
}
