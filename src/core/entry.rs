//! Log record structure and its JSON line encoding

use super::caller::Caller;
use super::field::Field;
use super::level::Level;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "ts";
pub const NAME_KEY: &str = "logger";
pub const CALLER_KEY: &str = "caller";
pub const MESSAGE_KEY: &str = "msg";
pub const STACKTRACE_KEY: &str = "stacktrace";

/// A single log record.
///
/// Context fields (from [`Logger::with`](super::Logger::with)) and per-call
/// fields are borrowed; the record lives only for the duration of one call.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub name: Option<&'a str>,
    pub message: &'a str,
    pub caller: Option<Caller>,
    pub stack: Option<String>,
    pub context: &'a [Field],
    pub fields: &'a [Field],
}

impl<'a> Entry<'a> {
    pub fn new(level: Level, message: &'a str) -> Self {
        Self {
            level,
            time: Utc::now(),
            name: None,
            message,
            caller: None,
            stack: None,
            context: &[],
            fields: &[],
        }
    }

    /// RFC 3339 with nanosecond precision, always UTC.
    pub fn timestamp(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Encode as one JSON object terminated by a newline.
    pub fn to_json_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LEVEL_KEY, &self.level)?;
        map.serialize_entry(TIME_KEY, &self.timestamp())?;
        if let Some(name) = self.name {
            map.serialize_entry(NAME_KEY, name)?;
        }
        if let Some(ref caller) = self.caller {
            map.serialize_entry(CALLER_KEY, caller)?;
        }
        map.serialize_entry(MESSAGE_KEY, self.message)?;
        if let Some(ref stack) = self.stack {
            map.serialize_entry(STACKTRACE_KEY, stack)?;
        }
        for field in self.context.iter().chain(self.fields) {
            map.serialize_entry(field.key(), field.value())?;
        }
        map.end()
    }
}
