//! Sink trait for encoded log output destinations

use super::error::Result;

/// Destination for encoded log lines.
///
/// `write` receives exactly one complete record (a JSON object followed by a
/// newline) per call. `sync` flushes anything the sink buffers.
///
/// # Example
///
/// ```
/// use rust_log_facade::{Level, Logger, Result, Sink};
///
/// struct CountingSink(usize);
///
/// impl Sink for CountingSink {
///     fn write(&mut self, _line: &[u8]) -> Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
///
///     fn sync(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "counting"
///     }
/// }
///
/// let logger = Logger::new(CountingSink(0), Level::Info, []);
/// logger.info("hello", &[]);
/// ```
pub trait Sink: Send {
    fn write(&mut self, line: &[u8]) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        (**self).write(line)
    }

    fn sync(&mut self) -> Result<()> {
        (**self).sync()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
