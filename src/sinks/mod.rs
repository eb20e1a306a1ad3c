//! Sink implementations

#[cfg(feature = "async-sink")]
pub mod async_sink;
pub mod file;
pub mod memory;
pub mod writer;

#[cfg(feature = "async-sink")]
pub use async_sink::AsyncSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use writer::WriterSink;

pub use crate::core::Sink;
