//! Process-wide default logger
//!
//! The free functions here look the active logger up on every call, so a
//! [`reset_default`] is picked up by the very next record. Until a logger is
//! installed, the first lookup creates one that writes to stderr at info
//! level with caller capture.
//!
//! Install the default once during startup. Resetting is thread safe, but
//! records already being written by other threads still go to the logger
//! they looked up.

use crate::core::{options, Field, Level, Logger, Result, SyncGuard};
use crate::sinks::WriterSink;
use parking_lot::RwLock;
use std::fmt;

static DEFAULT: RwLock<Option<Logger>> = parking_lot::const_rwlock(None);

fn stderr_logger() -> Logger {
    Logger::new(WriterSink::stderr(), Level::Info, [options::with_caller(true)])
}

/// The active process-wide logger.
pub fn default() -> Logger {
    if let Some(logger) = DEFAULT.read().as_ref() {
        return logger.clone();
    }
    DEFAULT.write().get_or_insert_with(stderr_logger).clone()
}

/// Install `logger` as the process-wide default and return the previous one.
///
/// # Example
///
/// ```
/// use rust_log_facade::{field, Level, Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// rust_log_facade::reset_default(Logger::new(sink.clone(), Level::Info, []));
/// let _guard = rust_log_facade::sync_guard();
///
/// rust_log_facade::info("demo1: ", &[field::string("app", "start ok"), field::int("version", 2)]);
/// assert_eq!(sink.records().unwrap()[0]["version"], 2);
/// ```
pub fn reset_default(logger: Logger) -> Option<Logger> {
    DEFAULT.write().replace(logger)
}

/// Sync the default logger. A no-op when none has been installed or created.
pub fn sync() -> Result<()> {
    let current = DEFAULT.read().clone();
    match current {
        Some(logger) => logger.sync(),
        None => Ok(()),
    }
}

/// Guard that syncs whichever logger is the default when it drops.
#[must_use = "the default logger is synced when the guard is dropped"]
pub fn sync_guard() -> SyncGuard {
    default().sync_guard()
}

/// Derive a logger from the default with extra fields.
#[must_use]
pub fn with(fields: &[Field]) -> Logger {
    default().with(fields)
}

#[track_caller]
pub fn debug(message: impl AsRef<str>, fields: &[Field]) {
    default().debug(message, fields);
}

#[track_caller]
pub fn info(message: impl AsRef<str>, fields: &[Field]) {
    default().info(message, fields);
}

#[track_caller]
pub fn warn(message: impl AsRef<str>, fields: &[Field]) {
    default().warn(message, fields);
}

#[track_caller]
pub fn error(message: impl AsRef<str>, fields: &[Field]) {
    default().error(message, fields);
}

#[track_caller]
pub fn dpanic(message: impl AsRef<str>, fields: &[Field]) {
    default().dpanic(message, fields);
}

#[track_caller]
pub fn panic(message: impl AsRef<str>, fields: &[Field]) -> ! {
    default().panic(message, fields)
}

#[track_caller]
pub fn fatal(message: impl AsRef<str>, fields: &[Field]) -> ! {
    default().fatal(message, fields)
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    default().debugf(args);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    default().infof(args);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    default().warnf(args);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    default().errorf(args);
}

#[track_caller]
pub fn dpanicf(args: fmt::Arguments<'_>) {
    default().dpanicf(args);
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    default().panicf(args)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    default().fatalf(args)
}
