//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod entry;
pub mod error;
pub mod field;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod sink;

pub use caller::Caller;
pub use config::{LoggerConfig, Output};
pub use entry::Entry;
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use level::{AtomicLevel, Level};
pub use logger::{LogPanic, Logger, LoggerBuilder, SyncGuard};
pub use metrics::LoggerMetrics;
pub use options::{FatalAction, LoggerOption};
pub use sink::Sink;
