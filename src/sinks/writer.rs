//! Sink adapter over any `io::Write`

use crate::core::{LoggerError, Result, Sink};
use std::io::{self, Write};

/// Forwards lines to an `io::Write` and flushes it on sync.
///
/// This is the adapter behind the stderr default logger; it also turns a
/// socket, a pipe or a `Vec<u8>` into a sink.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self::named(writer, "writer")
    }

    pub fn named(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl WriterSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::named(io::stderr(), "stderr")
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::named(io::stdout(), "stdout")
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        self.writer
            .write_all(line)
            .map_err(|e| LoggerError::sink_write(&self.name, e.to_string()))
    }

    fn sync(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            LoggerError::io_operation("syncing sink", format!("flush of '{}' failed", self.name), e)
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
