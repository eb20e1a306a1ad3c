//! Log level definitions and the shared level cell

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

/// Severity of a log record.
///
/// The discriminants follow the usual structured-logging numbering where
/// `Info` is zero and `Debug` sits just below it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum Level {
    Debug = -1,
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    /// Panics after logging when the logger runs in development mode.
    DPanic = 3,
    /// Panics after logging.
    Panic = 4,
    /// Terminates the process after logging and syncing.
    Fatal = 5,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    pub fn as_capital_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Level::Debug),
            0 => Some(Level::Info),
            1 => Some(Level::Warn),
            2 => Some(Level::Error),
            3 => Some(Level::DPanic),
            4 => Some(Level::Panic),
            5 => Some(Level::Fatal),
            _ => None,
        }
    }

    /// Whether a record at `level` passes a threshold of `self`.
    #[inline]
    pub fn enables(&self, level: Level) -> bool {
        level >= *self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" | "" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "dpanic" => Ok(Level::DPanic),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

/// Shared, atomically updatable minimum level.
///
/// Clones share the same cell, so a [`set`](AtomicLevel::set) through any
/// clone is seen by every logger holding it on its next call.
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    cell: Arc<AtomicI8>,
}

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self {
            cell: Arc::new(AtomicI8::new(level as i8)),
        }
    }

    #[inline]
    pub fn get(&self) -> Level {
        // Only `Level` discriminants are ever stored.
        Level::from_i8(self.cell.load(Ordering::Relaxed)).unwrap_or_default()
    }

    #[inline]
    pub fn set(&self, level: Level) {
        self.cell.store(level as i8, Ordering::Relaxed);
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.get().enables(level)
    }

    /// Whether two handles point at the same cell.
    pub fn shares_cell_with(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl From<Level> for AtomicLevel {
    fn from(level: Level) -> Self {
        Self::new(level)
    }
}
