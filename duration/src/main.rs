//! Reads lines from stdin and prints each one as a nanosecond count when it
//! parses as a duration (`1h`, `250ms`, `1m30s`), or unchanged when it
//! doesn't. Lines that aren't UTF-8 are echoed byte for byte.
use std::io::{self, BufRead, Write};

use eyre::WrapErr;
use probe::duration::render_line;

fn transform<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<()> {
    for line in input.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        match std::str::from_utf8(&line) {
            Ok(text) => writeln!(output, "{}", render_line(text))?,
            Err(_) => {
                output.write_all(&line)?;
                output.write_all(b"\n")?;
            }
        }
    }
    output.flush()
}

fn main() -> eyre::Result<()> {
    probe::logging::init();
    let stdin = io::stdin();
    let stdout = io::stdout();
    transform(stdin.lock(), io::BufWriter::new(stdout.lock())).wrap_err("transforming stdin")
}
