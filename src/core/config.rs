//! Declarative logger configuration
//!
//! `LoggerConfig` can be deserialized from any serde format (the tests use
//! JSON) and turned into a [`Logger`]. Missing keys take production defaults.

use super::{
    error::{LoggerError, Result},
    level::Level,
    logger::Logger,
    options::{self, LoggerOption},
    sink::Sink,
};
use crate::sinks::{FileSink, WriterSink};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where records go
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Level,
    pub caller: bool,
    pub caller_skip: usize,
    pub stacktrace_level: Option<Level>,
    pub development: bool,
    pub output: Output,
    pub name: Option<String>,
    /// Queue depth of an asynchronous sink; writes are synchronous when unset.
    pub async_buffer: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggerConfig {
    /// Info level, caller capture on, stack traces from error upward.
    pub fn production() -> Self {
        Self {
            level: Level::Info,
            caller: true,
            caller_skip: 0,
            stacktrace_level: Some(Level::Error),
            development: false,
            output: Output::Stderr,
            name: None,
            async_buffer: None,
        }
    }

    /// Debug level, stack traces from warn upward, DPanic panics.
    pub fn development() -> Self {
        Self {
            level: Level::Debug,
            stacktrace_level: Some(Level::Warn),
            development: true,
            ..Self::production()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn options(&self) -> Vec<LoggerOption> {
        let mut opts = vec![
            options::with_caller(self.caller),
            options::add_caller_skip(self.caller_skip),
            options::development(self.development),
        ];
        if let Some(level) = self.stacktrace_level {
            opts.push(options::add_stacktrace(level));
        }
        if let Some(ref name) = self.name {
            opts.push(options::named(name.clone()));
        }
        opts
    }

    pub fn build(&self) -> Result<Logger> {
        let sink: Box<dyn Sink> = match self.output {
            Output::Stderr => Box::new(WriterSink::stderr()),
            Output::Stdout => Box::new(WriterSink::stdout()),
            Output::File(ref path) => Box::new(FileSink::open(path)?),
        };
        let sink = self.wrap_async(sink)?;

        Logger::builder()
            .sink(sink)
            .level(self.level)
            .options(self.options())
            .build()
    }

    #[cfg(feature = "async-sink")]
    fn wrap_async(&self, sink: Box<dyn Sink>) -> Result<Box<dyn Sink>> {
        match self.async_buffer {
            Some(0) => Err(LoggerError::config("async_buffer", "must be greater than zero")),
            Some(size) => Ok(Box::new(crate::sinks::AsyncSink::new(sink, size))),
            None => Ok(sink),
        }
    }

    #[cfg(not(feature = "async-sink"))]
    fn wrap_async(&self, sink: Box<dyn Sink>) -> Result<Box<dyn Sink>> {
        match self.async_buffer {
            Some(_) => Err(LoggerError::config(
                "async_buffer",
                "asynchronous sinks require the `async-sink` feature",
            )),
            None => Ok(sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = LoggerConfig::from_json(r#"{"level": "warn"}"#).unwrap();
        assert_eq!(config.level, Level::Warn);
        assert!(config.caller);
        assert_eq!(config.stacktrace_level, Some(Level::Error));
        assert_eq!(config.output, Output::Stderr);
    }

    #[test]
    fn test_file_output_and_name() {
        let config = LoggerConfig::from_json(
            r#"{"output": {"file": "/var/log/app.log"}, "name": "api", "stacktrace_level": null}"#,
        )
        .unwrap();
        assert_eq!(config.output, Output::File(PathBuf::from("/var/log/app.log")));
        assert_eq!(config.stacktrace_level, None);
        assert_eq!(config.name.as_deref(), Some("api"));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = LoggerConfig::from_json(r#"{"level": "loud"}"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_development_preset() {
        let config = LoggerConfig::development();
        assert_eq!(config.level, Level::Debug);
        assert!(config.development);
        assert!(config.options().contains(&options::development(true)));
    }

    #[test]
    fn test_build_file_logger() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");
        let config = LoggerConfig {
            output: Output::File(path.clone()),
            stacktrace_level: None,
            ..LoggerConfig::production()
        };

        let logger = config.build()?;
        logger.info("written to file", &[]);
        logger.sync()?;

        let content = std::fs::read_to_string(&path)?;
        let record: serde_json::Value = serde_json::from_str(content.trim())?;
        assert_eq!(record["msg"], "written to file");
        Ok(())
    }

    #[cfg(feature = "async-sink")]
    #[test]
    fn test_zero_async_buffer_is_invalid() {
        let config = LoggerConfig {
            async_buffer: Some(0),
            ..LoggerConfig::production()
        };
        assert!(matches!(config.build(), Err(LoggerError::InvalidConfiguration { .. })));
    }
}
