//! Destinations for generated lines

use std::io::{self, Write};

/// Receives the program one line at a time, in order
///
/// Lines carry no terminator. Generation is append only; a sink never sees a
/// line that is later withdrawn.
pub trait GcodeSink {
    fn push_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush any buffered output
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl GcodeSink for Vec<String> {
    fn push_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Writes each line followed by `\n`
pub struct WriterSink<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Lines written so far
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> GcodeSink for WriterSink<W> {
    fn push_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
