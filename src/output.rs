//! Output emitter: turns command results into the SMT-LIB v2 response
//! format and writes them to whichever sink is currently active.
//!
//! `:regular-output-channel` can redirect output to a file mid-script, so
//! the emitter owns its sink rather than borrowing a single `&mut dyn Write`
//! for its whole lifetime.
use std::fs::File;
use std::io::{self, Write};

use crate::ops::SatResult;

enum Sink<'a> {
    Borrowed(&'a mut dyn Write),
    File(File),
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Borrowed(w) => w.write(buf),
            Sink::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Borrowed(w) => w.flush(),
            Sink::File(f) => f.flush(),
        }
    }
}

pub struct Emitter<'a> {
    sink: Sink<'a>,
}

impl<'a> Emitter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Emitter { sink: Sink::Borrowed(out) }
    }

    /// `:regular-output-channel <file>`: every following response goes to
    /// `file` instead of wherever output was going before.
    pub fn redirect_to_file(&mut self, path: &str) -> io::Result<()> {
        self.sink = Sink::File(File::create(path)?);
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.sink, "{text}")?;
        self.sink.flush()
    }

    pub fn success(&mut self) -> io::Result<()> {
        self.line("success")
    }

    pub fn sat_result(&mut self, result: SatResult) -> io::Result<()> {
        self.line(&result.to_string())
    }

    pub fn unsat_assumptions(&mut self, names: &[String]) -> io::Result<()> {
        self.line(&format!("({})", names.join(" ")))
    }

    pub fn symbol_list(&mut self, names: &[String]) -> io::Result<()> {
        self.line(&format!("({})", names.join(" ")))
    }

    pub fn echo(&mut self, text: &str) -> io::Result<()> {
        self.line(text)
    }

    pub fn model(&mut self, text: &str) -> io::Result<()> {
        self.line(text)
    }

    /// `get-value` response: `(((e1 v1) (e2 v2) ...))`.
    pub fn values(&mut self, pairs: &[(String, String)]) -> io::Result<()> {
        let body = pairs.iter().map(|(e, v)| format!("({e} {v})")).collect::<Vec<_>>().join(" ");
        self.line(&format!("({body})"))
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.line(&format!("(error \"{message}\")"))
    }
}
