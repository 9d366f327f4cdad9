//! Dump every top-level node of an input file, with its attributes, then the reason reading
//! stopped.
//!
//! ```ignore
//! sexp_to_debug input.sexp
//! <input.sexp sexp_to_debug
//! ```
//!
//! Set `RUST_LOG=trace` to watch the reader work.

use std::io::{Read, Write};
use std::process::ExitCode;

use sexpr_reader::{attributes_of, delete, dump, load, Reader};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (name, source) = match std::env::args().nth(1) {
        Some(path) => {
            let source = load(&path).expect("error: could not read input");
            (path, source)
        }
        None => {
            let mut source = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut source)
                .expect("error: could not read input");
            ("<stdin>".to_owned(), source)
        }
    };

    let mut stdout = std::io::stdout().lock();
    let mut reader = Reader::new(name, &source);
    let last = loop {
        match reader.next_node(None) {
            Ok(Some(node)) => {
                dump(Some(&node), &mut stdout, 0).expect("error: could not write output");
                match attributes_of(Some(&node)) {
                    Ok(info) => info.dump(&mut stdout).expect("error: could not write output"),
                    Err(kind) => eprintln!("failed to get attributes: {kind}"),
                }
                delete(Some(node));
            }
            Ok(None) => continue,
            Err(err) => break err,
        }
    };

    writeln!(stdout, "Last error: {}", last.kind.name()).expect("error: could not write output");
    if last.is_eof() {
        ExitCode::SUCCESS
    } else {
        eprintln!("{last}");
        ExitCode::FAILURE
    }
}
