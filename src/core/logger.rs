//! Main logger implementation

use super::{
    caller::Caller,
    entry::Entry,
    error::{LoggerError, Result},
    field::Field,
    level::{AtomicLevel, Level},
    metrics::LoggerMetrics,
    options::{FatalAction, LoggerOption, Settings},
    sink::Sink,
};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Panic payload raised by panic-level records.
///
/// Raised with [`std::panic::panic_any`], so callers that need to intercept
/// it can `catch_unwind` and downcast the payload to `LogPanic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPanic {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for LogPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

impl std::error::Error for LogPanic {}

/// Sink and counters shared by a logger and everything derived from it.
struct Core {
    sink: Mutex<Box<dyn Sink>>,
    metrics: LoggerMetrics,
}

/// A leveled, structured logger.
///
/// Cloning is cheap: clones and loggers derived with [`with`](Logger::with)
/// share the sink and the level cell.
///
/// # Example
///
/// ```
/// use rust_log_facade::{field, Level, Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::new(sink.clone(), Level::Info, []);
///
/// logger.info("demo1: ", &[field::string("app", "start ok"), field::int("version", 2)]);
/// logger.debug("hidden", &[]);
///
/// logger.set_level(Level::Debug);
/// logger.debug("level changed to debug", &[]);
///
/// assert_eq!(sink.lines().len(), 2);
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    level: AtomicLevel,
    context: Arc<[Field]>,
    settings: Arc<Settings>,
}

impl Logger {
    pub fn new<S, I>(sink: S, level: Level, options: I) -> Self
    where
        S: Sink + 'static,
        I: IntoIterator<Item = LoggerOption>,
    {
        Self::with_atomic_level(sink, AtomicLevel::new(level), options)
    }

    /// Build a logger around an existing level cell, so independently
    /// constructed loggers can be switched together.
    pub fn with_atomic_level<S, I>(sink: S, level: AtomicLevel, options: I) -> Self
    where
        S: Sink + 'static,
        I: IntoIterator<Item = LoggerOption>,
    {
        Self {
            core: Arc::new(Core {
                sink: Mutex::new(Box::new(sink)),
                metrics: LoggerMetrics::new(),
            }),
            level,
            context: Arc::from(Vec::new()),
            settings: Arc::new(Settings::default().with(options)),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// Change the minimum level for this logger and every logger sharing
    /// its level cell. Safe to call while other threads are logging.
    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    pub fn atomic_level(&self) -> AtomicLevel {
        self.level.clone()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    /// Fields added here appear on every record of the returned logger,
    /// before the per-call fields. `self` is left untouched.
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        let context: Vec<Field> = self.context.iter().chain(fields).cloned().collect();
        Logger {
            core: Arc::clone(&self.core),
            level: self.level.clone(),
            context: Arc::from(context),
            settings: Arc::clone(&self.settings),
        }
    }

    #[must_use]
    pub fn with_options<I>(&self, options: I) -> Logger
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        Logger {
            core: Arc::clone(&self.core),
            level: self.level.clone(),
            context: Arc::clone(&self.context),
            settings: Arc::new(self.settings.with(options)),
        }
    }

    #[must_use]
    pub fn named(&self, name: impl Into<String>) -> Logger {
        self.with_options([LoggerOption::Named(name.into())])
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    /// Flush anything the sink buffers.
    pub fn sync(&self) -> Result<()> {
        let result = self.core.sink.lock().sync();
        self.core.metrics.record_sync(result.is_ok());
        result
    }

    /// Guard that syncs this logger when dropped, including during unwinding.
    #[must_use = "the logger is synced when the guard is dropped"]
    pub fn sync_guard(&self) -> SyncGuard {
        SyncGuard {
            logger: self.clone(),
        }
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl AsRef<str>, fields: &[Field]) {
        match level {
            Level::DPanic => self.dpanic(message, fields),
            Level::Panic => self.panic(message, fields),
            Level::Fatal => self.fatal(message, fields),
            _ => {
                if self.enabled(level) {
                    self.write(level, message.as_ref(), fields);
                }
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }

    /// Logs, then panics if the logger is in development mode.
    #[track_caller]
    pub fn dpanic(&self, message: impl AsRef<str>, fields: &[Field]) {
        let message = message.as_ref();
        if self.enabled(Level::DPanic) {
            self.write(Level::DPanic, message, fields);
        }
        if self.settings.development {
            raise(Level::DPanic, message);
        }
    }

    /// Logs, then panics with a [`LogPanic`] payload.
    ///
    /// The panic is raised even when the panic level is filtered out.
    #[track_caller]
    pub fn panic(&self, message: impl AsRef<str>, fields: &[Field]) -> ! {
        let message = message.as_ref();
        if self.enabled(Level::Panic) {
            self.write(Level::Panic, message, fields);
        }
        raise(Level::Panic, message)
    }

    /// Logs, syncs the sink, then terminates according to the configured
    /// [`FatalAction`] (process exit with status 1 by default).
    #[track_caller]
    pub fn fatal(&self, message: impl AsRef<str>, fields: &[Field]) -> ! {
        let message = message.as_ref();
        if self.enabled(Level::Fatal) {
            self.write(Level::Fatal, message, fields);
        }
        if let Err(e) = self.sync() {
            eprintln!("[LOGGER ERROR] Failed to sync before fatal exit: {}", e);
        }
        match self.settings.fatal_action {
            FatalAction::Exit(code) => std::process::exit(code),
            FatalAction::Panic => raise(Level::Fatal, message),
        }
    }

    /// Formatted logging. The arguments are only rendered when the level is
    /// enabled (panic and fatal always render them for the payload).
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::DPanic | Level::Panic | Level::Fatal => self.log(level, render(args), &[]),
            _ => {
                if self.enabled(level) {
                    match args.as_str() {
                        Some(message) => self.write(level, message, &[]),
                        None => self.write(level, &args.to_string(), &[]),
                    }
                }
            }
        }
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Info, args);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Warn, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(Level::Error, args);
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) {
        self.dpanic(render(args), &[]);
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panic(render(args), &[])
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal(render(args), &[])
    }

    /// Encode and write one record. Failures are counted and reported on
    /// stderr; they never reach the caller.
    #[track_caller]
    fn write(&self, level: Level, message: &str, fields: &[Field]) {
        let location = Location::caller();

        let mut entry = Entry::new(level, message);
        entry.name = self.settings.name.as_deref();
        entry.context = &self.context;
        entry.fields = fields;
        if self.settings.caller {
            entry.caller = Some(Caller::resolve(location, self.settings.caller_skip));
        }
        if self.settings.wants_stacktrace(level) {
            entry.stack = Some(Backtrace::force_capture().to_string());
        }

        let line = match entry.to_json_line() {
            Ok(line) => line,
            Err(e) => {
                self.report_dropped(&LoggerError::from(e));
                return;
            }
        };

        // One write per record under the lock keeps lines whole.
        let result = self.core.sink.lock().write(&line);
        match result {
            Ok(()) => {
                self.core.metrics.record_logged();
            }
            Err(e) => self.report_dropped(&e),
        }
    }

    fn report_dropped(&self, error: &LoggerError) {
        let dropped = self.core.metrics.record_dropped();
        // Alert on first drop and periodically thereafter
        if dropped == 0 || (dropped + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER ERROR] {} log records dropped, last failure: {}",
                dropped + 1,
                error
            );
        }
    }
}

fn render(args: fmt::Arguments<'_>) -> String {
    match args.as_str() {
        Some(s) => s.to_string(),
        None => args.to_string(),
    }
}

fn raise(level: Level, message: &str) -> ! {
    std::panic::panic_any(LogPanic {
        level,
        message: message.to_string(),
    })
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("name", &self.settings.name)
            .field("context", &self.context.len())
            .finish_non_exhaustive()
    }
}

/// Syncs its logger on drop.
///
/// # Example
///
/// ```
/// use rust_log_facade::{Level, Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::new(sink.clone(), Level::Info, []);
/// {
///     let _guard = logger.sync_guard();
///     logger.info("work done", &[]);
/// }
/// assert_eq!(sink.sync_count(), 1);
/// ```
pub struct SyncGuard {
    logger: Logger,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        if let Err(e) = self.logger.sync() {
            eprintln!("[LOGGER ERROR] Failed to sync on scope exit: {}", e);
        }
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let logger = Logger::builder()
///     .sink(MemorySink::new())
///     .level(Level::Debug)
///     .option(with_caller(true))
///     .option(add_stacktrace(Level::Error))
///     .build()
///     .unwrap();
/// assert_eq!(logger.level(), Level::Debug);
/// ```
pub struct LoggerBuilder {
    sink: Option<Box<dyn Sink>>,
    level: AtomicLevel,
    options: Vec<LoggerOption>,
    fields: Vec<Field>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            sink: None,
            level: AtomicLevel::new(Level::Info),
            options: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(self, level: Level) -> Self {
        self.atomic_level(AtomicLevel::new(level))
    }

    /// Share an existing level cell instead of creating one
    #[must_use = "builder methods return a new value"]
    pub fn atomic_level(mut self, level: AtomicLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn option(mut self, option: LoggerOption) -> Self {
        self.options.push(option);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn options<I: IntoIterator<Item = LoggerOption>>(mut self, options: I) -> Self {
        self.options.extend(options);
        self
    }

    /// Field attached to every record of the built logger
    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the Logger. Fails with [`LoggerError::MissingSink`] when no
    /// sink was given.
    pub fn build(self) -> Result<Logger> {
        let sink = self.sink.ok_or(LoggerError::MissingSink)?;
        let logger = Logger::with_atomic_level(sink, self.level, self.options);
        Ok(logger.with(&self.fields))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field;
    use crate::core::options::{add_caller_skip, development, named, on_fatal, with_caller};
    use crate::sinks::MemorySink;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn capture(level: Level) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::new(sink.clone(), level, []), sink)
    }

    #[test]
    fn test_builder_requires_sink() {
        let result = Logger::builder().level(Level::Debug).build();
        assert!(matches!(result, Err(LoggerError::MissingSink)));
    }

    #[test]
    fn test_builder_fields_and_options() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .sink(sink.clone())
            .field(field::string("service", "billing"))
            .option(named("worker"))
            .build()
            .unwrap();

        logger.info("started", &[]);
        let record = &sink.records().unwrap()[0];
        assert_eq!(record["service"], "billing");
        assert_eq!(record["logger"], "worker");
    }

    #[test]
    fn test_level_filtering() {
        let (logger, sink) = capture(Level::Warn);
        logger.debug("d", &[]);
        logger.info("i", &[]);
        logger.warn("w", &[]);
        logger.error("e", &[]);

        let levels: Vec<String> = sink
            .records()
            .unwrap()
            .iter()
            .map(|r| r["level"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(levels, vec!["warn", "error"]);
    }

    #[test]
    fn test_with_does_not_touch_parent() {
        let (parent, sink) = capture(Level::Info);
        let child = parent.with(&[field::string("request_id", "abc-123")]);

        child.info("child", &[field::int("attempt", 1)]);
        parent.info("parent", &[]);

        let records = sink.records().unwrap();
        assert_eq!(records[0]["request_id"], "abc-123");
        assert_eq!(records[0]["attempt"], 1);
        assert!(records[1].get("request_id").is_none());
    }

    #[test]
    fn test_with_shares_level_cell() {
        let (parent, sink) = capture(Level::Info);
        let child = parent.with(&[field::bool("child", true)]);

        child.debug("hidden", &[]);
        parent.set_level(Level::Debug);
        child.debug("visible", &[]);

        assert_eq!(sink.lines().len(), 1);
        assert!(child.atomic_level().shares_cell_with(&parent.atomic_level()));
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone(), Level::Info, [with_caller(true)]);

        let line = line!() + 1;
        logger.info("here", &[]);

        let record = &sink.records().unwrap()[0];
        assert_eq!(record["caller"], format!("core/logger.rs:{}", line));
    }

    #[test]
    fn test_caller_skip_falls_back_when_unresolvable() {
        let sink = MemorySink::new();
        let logger = Logger::new(
            sink.clone(),
            Level::Info,
            [with_caller(true), add_caller_skip(50)],
        );

        logger.info("deep", &[]);

        let caller = sink.records().unwrap()[0]["caller"].as_str().unwrap().to_string();
        assert!(caller.contains(".rs:"), "unexpected caller {}", caller);
    }

    #[test]
    fn test_formatted_variants() {
        let (logger, sink) = capture(Level::Info);
        let topic = "logs";
        logger.infof(format_args!("connected to topic {}", topic));
        logger.debugf(format_args!("never rendered {}", topic));

        let records = sink.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["msg"], "connected to topic logs");
    }

    #[test]
    fn test_panic_raises_log_panic() {
        let (logger, sink) = capture(Level::Info);

        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.panic("invariant broken", &[field::int("shard", 3)]);
        }));

        let payload = result.unwrap_err();
        let panic = payload.downcast_ref::<LogPanic>().unwrap();
        assert_eq!(panic.level, Level::Panic);
        assert_eq!(panic.message, "invariant broken");
        assert_eq!(sink.records().unwrap()[0]["shard"], 3);
    }

    #[test]
    fn test_dpanic_panics_only_in_development() {
        let (logger, sink) = capture(Level::Info);
        logger.dpanic("tolerated in production", &[]);
        assert_eq!(sink.lines().len(), 1);

        let dev = logger.with_options([development(true)]);
        let result = catch_unwind(AssertUnwindSafe(|| dev.dpanic("caught in development", &[])));
        assert!(result.is_err());
        assert_eq!(sink.lines().len(), 2);
    }

    #[test]
    fn test_fatal_syncs_before_terminating() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone(), Level::Info, [on_fatal(FatalAction::Panic)]);

        let result = catch_unwind(AssertUnwindSafe(|| {
            logger.fatal("cannot bind port", &[]);
        }));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<LogPanic>().unwrap().level, Level::Fatal);
        assert_eq!(sink.sync_count(), 1);
        assert_eq!(sink.records().unwrap()[0]["level"], "fatal");
    }

    #[test]
    fn test_write_failures_are_counted_not_raised() {
        struct Full;

        impl Sink for Full {
            fn write(&mut self, _line: &[u8]) -> Result<()> {
                Err(LoggerError::sink_write("full", "no space left"))
            }

            fn sync(&mut self) -> Result<()> {
                Err(LoggerError::other("no space left"))
            }

            fn name(&self) -> &str {
                "full"
            }
        }

        let logger = Logger::new(Full, Level::Info, []);
        logger.info("lost", &[]);
        logger.error("lost too", &[]);

        assert_eq!(logger.metrics().dropped_count(), 2);
        assert!(logger.sync().is_err());
        assert_eq!(logger.metrics().sync_failures(), 1);
    }

    #[test]
    fn test_sync_guard_syncs_on_unwind() {
        let (logger, sink) = capture(Level::Info);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = logger.sync_guard();
            logger.panic("abort request", &[]);
        }));

        assert_eq!(sink.sync_count(), 1);
    }
}
