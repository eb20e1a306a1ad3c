//! Logging macros for formatted messages.
//!
//! Each macro takes the logger first and forwards `format_args!` to the
//! matching `*f` method, so nothing is rendered when the level is disabled.
//! Use [`default()`](crate::default) to target the process-wide logger.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::info;
//!
//! let logger = Logger::new(MemorySink::new(), Level::Info, []);
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! info!(rust_log_facade::default(), "Routed through the default logger");
//! ```

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new(MemorySink::new(), Level::Info, []);
/// use rust_log_facade::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new(MemorySink::new(), Level::Debug, []);
/// use rust_log_facade::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a dpanic-level message; panics in development mode.
#[macro_export]
macro_rules! dpanic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.dpanicf(format_args!($($arg)+))
    };
}

/// Log a fatal-level message, sync, and terminate.
///
/// ```no_run
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::new(MemorySink::new(), Level::Info, []);
/// use rust_log_facade::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}
