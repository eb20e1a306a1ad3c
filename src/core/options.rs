//! Construction options for [`Logger`](super::Logger)

use super::level::Level;

/// What a fatal-level record does after it has been written and synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalAction {
    /// `std::process::exit` with the given code.
    Exit(i32),
    /// Raise a [`LogPanic`](super::LogPanic) instead of exiting, so a test
    /// harness can observe the termination.
    Panic,
}

impl Default for FatalAction {
    fn default() -> Self {
        FatalAction::Exit(1)
    }
}

/// A single logger option, applied in order at construction
/// or by [`Logger::with_options`](super::Logger::with_options).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerOption {
    WithCaller(bool),
    /// Adds to the current skip count.
    AddCallerSkip(usize),
    AddStacktrace(Level),
    Development(bool),
    OnFatal(FatalAction),
    /// Appends a segment to the logger name.
    Named(String),
}

pub fn with_caller(enabled: bool) -> LoggerOption {
    LoggerOption::WithCaller(enabled)
}

/// Report the caller `skip` frames further out, for loggers called through
/// wrapper functions.
///
/// Resolving a non-zero skip needs line tables in the binary. Release
/// profiles without debug info should set `debug = "line-tables-only"`;
/// otherwise the direct call site is reported and a warning is printed
/// once. Marking the wrappers `#[track_caller]` avoids the skip entirely.
pub fn add_caller_skip(skip: usize) -> LoggerOption {
    LoggerOption::AddCallerSkip(skip)
}

pub fn add_stacktrace(level: Level) -> LoggerOption {
    LoggerOption::AddStacktrace(level)
}

pub fn development(enabled: bool) -> LoggerOption {
    LoggerOption::Development(enabled)
}

pub fn on_fatal(action: FatalAction) -> LoggerOption {
    LoggerOption::OnFatal(action)
}

pub fn named(name: impl Into<String>) -> LoggerOption {
    LoggerOption::Named(name.into())
}

/// Resolved option set carried by every logger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Settings {
    pub caller: bool,
    pub caller_skip: usize,
    pub stacktrace_level: Option<Level>,
    pub development: bool,
    pub fatal_action: FatalAction,
    pub name: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, option: LoggerOption) {
        match option {
            LoggerOption::WithCaller(enabled) => self.caller = enabled,
            LoggerOption::AddCallerSkip(skip) => self.caller_skip += skip,
            LoggerOption::AddStacktrace(level) => self.stacktrace_level = Some(level),
            LoggerOption::Development(enabled) => self.development = enabled,
            LoggerOption::OnFatal(action) => self.fatal_action = action,
            LoggerOption::Named(name) => {
                if name.is_empty() {
                    return;
                }
                self.name = Some(match self.name.take() {
                    Some(parent) => format!("{}.{}", parent, name),
                    None => name,
                });
            }
        }
    }

    pub fn with<I>(&self, options: I) -> Self
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut settings = self.clone();
        for option in options {
            settings.apply(option);
        }
        settings
    }

    #[inline]
    pub fn wants_stacktrace(&self, level: Level) -> bool {
        self.stacktrace_level.is_some_and(|threshold| level >= threshold)
    }
}
