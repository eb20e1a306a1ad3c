//! # Rust Log Facade
//!
//! Leveled, structured JSON logging with a swappable process-wide default
//! logger and verbosity that can be changed at runtime.
//!
//! ## Features
//!
//! - **Structured**: typed fields, one JSON object per line
//! - **Runtime levels**: an atomic level cell shared by derived loggers
//! - **Default logger**: free functions routed to a replaceable global logger
//! - **Pluggable sinks**: stderr, files, in-memory capture, async worker
//!
//! ```
//! use rust_log_facade::{field, Level, Logger, MemorySink};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::new(sink.clone(), Level::Info, [rust_log_facade::with_caller(true)]);
//! rust_log_facade::reset_default(logger);
//! let _guard = rust_log_facade::sync_guard();
//!
//! rust_log_facade::info("demo1: ", &[field::string("app", "start ok"), field::int("version", 2)]);
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::field::{self, Field, FieldValue};
    pub use crate::core::options::{
        add_caller_skip, add_stacktrace, development, named, on_fatal, with_caller,
    };
    pub use crate::core::{
        AtomicLevel, FatalAction, Level, LogPanic, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, LoggerOption, Output, Result, Sink, SyncGuard,
    };
    pub use crate::sinks::{FileSink, MemorySink, WriterSink};
    #[cfg(feature = "async-sink")]
    pub use crate::sinks::AsyncSink;
}

pub use crate::core::field::{self, Field, FieldValue};
pub use crate::core::options::{
    add_caller_skip, add_stacktrace, development, named, on_fatal, with_caller,
};
pub use crate::core::{
    AtomicLevel, Caller, Entry, FatalAction, Level, LogPanic, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerMetrics, LoggerOption, Output, Result, Sink, SyncGuard,
};
pub use global::{
    debug, debugf, default, dpanic, dpanicf, error, errorf, fatal, fatalf, info, infof, panic,
    panicf, reset_default, sync, sync_guard, warn, warnf, with,
};
#[cfg(feature = "async-sink")]
pub use sinks::AsyncSink;
pub use sinks::{FileSink, MemorySink, WriterSink};
