//! Recursive-descent tree builder.
//!
//! [`Reader::step`] looks at the first non-whitespace character and reads one production.
//! A `(` recurses, with the new list as the scope for its own attributes,
//! until the matching `)` comes back as [`Step::Close`].
//!
//! A child is pushed onto its list only once it is complete, and a list is only handed to its
//! parent once its `)` has been read. When anything fails, the partial subtree is simply dropped
//! on the way out; callers never see it.

use super::{token, Error, ErrorKind, ReadResult, Reader};
use crate::data::{Location, Node, Value};

/// Outcome of one step of the builder.
#[derive(Debug)]
pub(super) enum Step {
    Node(Node),
    /// An attribute was read; there is no node.
    Attribute,
    /// A `)` was consumed; carries its location.
    Close(Location),
    Eof,
}

impl Reader<'_> {
    pub(super) fn step(&mut self, scope: Option<&mut Node>) -> ReadResult<Step> {
        token::skip_whitespace(&mut self.cursor);
        let start = self.location();
        let fail = |kind: ErrorKind| Error::new(kind, start.clone());

        let Some(lookahead) = self.cursor.peek() else {
            return Ok(Step::Eof);
        };

        let value = match lookahead {
            '"' => {
                self.cursor.bump();
                Value::String(token::read_string(&mut self.cursor).map_err(fail)?)
            }
            ';' => {
                self.cursor.bump();
                Value::Comment(token::read_comment(&mut self.cursor).map_err(fail)?)
            }
            ':' => {
                self.cursor.bump();
                token::read_attribute(&mut self.cursor, scope).map_err(fail)?;
                return Ok(Step::Attribute);
            }
            '(' => {
                self.cursor.bump();
                return self.read_list(start).map(Step::Node);
            }
            ')' => {
                self.cursor.bump();
                return Ok(Step::Close(start));
            }
            c if c.is_ascii_digit() => token::read_number(&mut self.cursor).map_err(fail)?,
            c if c.is_alphabetic() => {
                Value::Symbol(token::read_symbol(&mut self.cursor).map_err(fail)?)
            }
            _ => return Err(fail(ErrorKind::UnrecognisedInput)),
        };

        let span = start.offset..self.cursor.offset();
        let node = Node::new(start, span, value);
        tracing::trace!(tag = %node.tag(), location = %node.location(), "read node");
        Ok(Step::Node(node))
    }

    /// Read list contents up to and including the closing `)`; the `(` is already consumed.
    fn read_list(&mut self, start: Location) -> ReadResult<Node> {
        let depth = self.cursor.enter();
        let result = if depth > self.config.max_depth {
            Err(Error::new(ErrorKind::NestingTooDeep, start))
        } else {
            tracing::trace!(depth, location = %start, "entering list");
            self.read_list_body(start)
        };
        self.cursor.leave();
        result
    }

    fn read_list_body(&mut self, start: Location) -> ReadResult<Node> {
        let empty = start.offset..start.offset;
        let mut list = Node::new(start.clone(), empty, Value::List(Vec::new()));
        loop {
            match self.step(Some(&mut list))? {
                Step::Node(child) => list
                    .push_child(child)
                    .map_err(|_| Error::new(ErrorKind::OutOfMemory, start.clone()))?,
                Step::Attribute => (),
                Step::Close(_) => break,
                Step::Eof => return Err(Error::new(ErrorKind::UnterminatedList, start)),
            }
        }
        list.set_span_end(self.cursor.offset());
        tracing::trace!(
            children = list.children().len(),
            depth = self.cursor.depth(),
            "closed list"
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{Node, Tag};
    use crate::reader::{read_all, ErrorKind, ReadResult, Reader, ReaderConfig};

    fn read_err(input: &str) -> ErrorKind {
        match read_all("test", input) {
            Ok(nodes) => panic!("unexpected successful read of {input:?}: {nodes:?}"),
            Err(e) => e.kind,
        }
    }

    fn texts(nodes: &[Node]) -> Vec<(Tag, &str)> {
        nodes.iter().map(|n| (n.tag(), n.text())).collect()
    }

    #[test]
    fn atoms() -> ReadResult<()> {
        let nodes = read_all("test", "hello \"hi\" world 24601 3.22 ; done\n")?;
        let want = [
            (Tag::Symbol, "hello"),
            (Tag::String, "hi"),
            (Tag::Symbol, "world"),
            (Tag::Integer, "24601"),
            (Tag::Float, "3.22"),
            (Tag::Comment, " done"),
        ];
        assert_eq!(texts(&nodes), want);
        Ok(())
    }

    #[test]
    fn escaped_quote_in_string() -> ReadResult<()> {
        let nodes = read_all("test", r#""\"""#)?;
        assert_eq!(texts(&nodes), [(Tag::String, "\"")]);
        Ok(())
    }

    #[test]
    fn attribute_inside_list() -> ReadResult<()> {
        let nodes = read_all("test", "(a :k=v b)")?;
        assert_eq!(nodes.len(), 1);
        let list = &nodes[0];
        assert_eq!(list.tag(), Tag::List);
        assert_eq!(
            texts(list.children()),
            [(Tag::Symbol, "a"), (Tag::Symbol, "b")]
        );
        assert_eq!(list.attributes().len(), 1);
        assert_eq!(list.attribute("k"), Some("v"));
        Ok(())
    }

    #[test]
    fn attributes_belong_to_nearest_list() -> ReadResult<()> {
        let nodes = read_all("test", "(outer :a=1 (inner :a=2 :b=) :a=3)")?;
        let outer = &nodes[0];
        assert_eq!(outer.attribute("a"), Some("3"));
        assert_eq!(outer.attribute("b"), None);
        let inner = &outer.children()[1];
        assert_eq!(inner.attribute("a"), Some("2"));
        assert_eq!(inner.attribute("b"), Some(""));
        assert_eq!(inner.children().len(), 1);
        Ok(())
    }

    #[test]
    fn top_level_attribute_is_dropped() -> ReadResult<()> {
        let nodes = read_all("test", ":k=v x")?;
        assert_eq!(texts(&nodes), [(Tag::Symbol, "x")]);
        assert!(nodes[0].attributes().is_empty());
        Ok(())
    }

    #[test]
    fn attribute_reports_no_node() {
        let mut reader = Reader::new("test", ":k=v x");
        assert_eq!(reader.next_node(None), Ok(None));
        let node = reader.next_node(None).unwrap().unwrap();
        assert_eq!(node.text(), "x");
        assert_eq!(reader.next_node(None).unwrap_err().kind, ErrorKind::Eof);
    }

    #[test]
    fn nested_lists() -> ReadResult<()> {
        let nodes = read_all("test", "(1)( 2 ) (hello) ( hello (\"hi\") (( \"hi\" )))")?;
        assert_eq!(nodes.len(), 4);
        assert!(nodes.iter().all(Node::is_list));
        assert_eq!(texts(nodes[0].children()), [(Tag::Integer, "1")]);
        assert_eq!(texts(nodes[1].children()), [(Tag::Integer, "2")]);

        let last = nodes[3].children();
        assert_eq!(last.len(), 3);
        assert_eq!(texts(last[1].children()), [(Tag::String, "hi")]);
        let deepest = &last[2].children()[0];
        assert_eq!(texts(deepest.children()), [(Tag::String, "hi")]);
        Ok(())
    }

    #[test]
    fn empty_list() -> ReadResult<()> {
        let nodes = read_all("test", "()")?;
        assert!(nodes[0].is_list());
        assert!(nodes[0].children().is_empty());
        assert_eq!(nodes[0].span(), 0..2);
        Ok(())
    }

    #[test]
    fn comments_inside_lists_are_children() -> ReadResult<()> {
        let nodes = read_all("test", "(a ; note\n b)")?;
        assert_eq!(
            texts(nodes[0].children()),
            [(Tag::Symbol, "a"), (Tag::Comment, " note"), (Tag::Symbol, "b")]
        );
        Ok(())
    }

    #[test]
    fn locations() -> ReadResult<()> {
        let nodes = read_all("loc.sexp", "(first\n  second\n\t\"third\")")?;
        let children = nodes[0].children();
        let at: Vec<_> = children
            .iter()
            .map(|n| (n.location().line, n.location().column))
            .collect();
        assert_eq!(at, [(1, 2), (2, 3), (3, 2)]);
        assert_eq!(&*children[0].location().file, "loc.sexp");
        Ok(())
    }

    #[test]
    fn mangled_number() {
        assert_eq!(read_err("1.2.3"), ErrorKind::MangledNumber);
        assert_eq!(read_err("(x 1.2.3)"), ErrorKind::MangledNumber);
    }

    #[test]
    fn unterminated_list() {
        let err = read_all("test", "(a b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedList);
        assert!(!err.is_eof());
        assert_eq!((err.location.line, err.location.column), (1, 1));

        assert_eq!(read_err("(a (b c)"), ErrorKind::UnterminatedList);
    }

    #[test]
    fn stray_close() {
        let err = read_all("test", "a )").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnmatchedClose);
        assert_eq!(err.location.column, 3);

        assert_eq!(read_err("(a))"), ErrorKind::UnmatchedClose);
    }

    #[test]
    fn close_with_caller_scope() {
        let mut reader = Reader::new("test", "x :k=v )");
        let mut list = read_all("test", "()").unwrap().remove(0);

        let x = reader.next_node(Some(&mut list)).unwrap().unwrap();
        assert_eq!(x.text(), "x");
        assert_eq!(reader.next_node(Some(&mut list)), Ok(None));
        assert_eq!(list.attribute("k"), Some("v"));
        let err = reader.next_node(Some(&mut list)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ListTerminator);
    }

    #[test]
    fn unrecognised_input() {
        assert_eq!(read_err("#t"), ErrorKind::UnrecognisedInput);
        assert_eq!(read_err("(a -1)"), ErrorKind::UnrecognisedInput);
        assert_eq!(read_err("(:=v)"), ErrorKind::UnrecognisedInput);
        assert_eq!(read_err("="), ErrorKind::UnrecognisedInput);
    }

    #[test]
    fn unterminated_string_in_list() {
        let err = read_all("test", "(\n\"hello1\"\n \"hello\n\n)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        assert!(err.is_incomplete());
        assert_eq!((err.location.line, err.location.column), (3, 2));
    }

    #[test]
    fn comment_needs_newline() {
        assert_eq!(read_err("x ; trailing"), ErrorKind::UnterminatedString);
    }

    #[test]
    fn nesting_limit() {
        let config = ReaderConfig::default().with_max_depth(3);
        let ok = Reader::with_config("test", "(((x)))", config).collect::<Result<Vec<_>, _>>();
        assert!(ok.is_ok());

        let mut deep = Reader::with_config("test", "((((x))))", config);
        let err = deep.next().unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);
        assert_eq!(err.location.column, 4);
    }

    #[test]
    fn default_nesting_limit_stops_runaway_input() {
        let input = "(".repeat(100_000);
        assert_eq!(read_err(&input), ErrorKind::NestingTooDeep);
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut reader = Reader::new("test", "a ) b");
        assert_eq!(reader.next().unwrap().unwrap().text(), "a");
        assert_eq!(reader.next().unwrap().unwrap_err().kind, ErrorKind::UnmatchedClose);
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_input() -> ReadResult<()> {
        assert!(read_all("test", "")?.is_empty());
        assert!(read_all("test", " \t\r\n ")?.is_empty());
        Ok(())
    }

    /// Stitching every node's source slice back together reproduces the input, less whitespace.
    #[test]
    fn spans_cover_the_input() -> ReadResult<()> {
        fn stitch(source: &str, node: &Node, out: &mut String) {
            let span = node.span();
            if node.is_list() {
                assert!(source[span.clone()].starts_with('('));
                assert!(source[span].ends_with(')'));
                out.push('(');
                for child in node.children() {
                    stitch(source, child, out);
                }
                out.push(')');
            } else {
                out.push_str(&source[span]);
            }
        }

        let source = "(define (square x)\n  (mul x x))\n\n\"a\\\"b\" 12 3.5 (nested (deeper (deepest)))";
        let mut stitched = String::new();
        for node in read_all("test", source)? {
            stitch(source, &node, &mut stitched);
        }
        let compact: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(stitched, compact);
        Ok(())
    }
}
