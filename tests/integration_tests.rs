//! Integration tests for the logging facade
//!
//! These tests verify:
//! - The JSON wire format of a record
//! - Runtime level changes
//! - Derived loggers
//! - Panic and fatal behavior
//! - File and asynchronous sinks

use chrono::{DateTime, Timelike};
use rust_log_facade::prelude::*;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tempfile::TempDir;

fn capture(level: Level) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    (Logger::new(sink.clone(), level, [with_caller(true)]), sink)
}

#[test]
fn test_record_round_trip() {
    let (logger, sink) = capture(Level::Info);

    logger.info(
        "demo1: ",
        &[field::string("app", "start ok"), field::int("version", 2)],
    );

    let line = sink.lines().pop().expect("one record");
    assert!(line.contains("\"app\":\"start ok\""));
    assert!(line.contains("\"version\":2"));

    let record: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(record["level"], "info");
    assert_eq!(record["msg"], "demo1: ");
    assert!(record["version"].is_i64());

    let ts = record["ts"].as_str().unwrap();
    let parsed = DateTime::parse_from_rfc3339(ts).expect("RFC 3339 timestamp");
    // Nine fractional digits are always written
    let fraction = ts.rsplit('.').next().unwrap().trim_end_matches('Z');
    assert_eq!(fraction.len(), 9);
    assert_eq!(fraction.parse::<u32>().unwrap(), parsed.nanosecond());
}

#[test]
fn test_caller_is_reported_for_test_file() {
    let (logger, sink) = capture(Level::Info);
    logger.warn("where am I", &[]);

    let record = &sink.records().unwrap()[0];
    let caller = record["caller"].as_str().unwrap();
    assert!(
        caller.starts_with("tests/integration_tests.rs:"),
        "unexpected caller {}",
        caller
    );
}

#[inline(never)]
fn log_through_helper(logger: &Logger) {
    logger.info("from helper", &[]);
}

#[test]
fn test_caller_skip_reports_helpers_caller() {
    let sink = MemorySink::new();
    let logger = Logger::new(sink.clone(), Level::Info, [with_caller(true), add_caller_skip(1)]);

    let line = line!() + 1;
    log_through_helper(&logger);

    let record = &sink.records().unwrap()[0];
    assert_eq!(record["caller"], format!("tests/integration_tests.rs:{}", line));
}

#[test]
fn test_every_level_pair_filters() {
    let emitting = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::DPanic];

    for threshold in Level::ALL {
        let (logger, sink) = capture(threshold);
        for level in emitting {
            logger.log(level, "probe", &[]);
        }

        let expected = emitting.iter().filter(|l| **l >= threshold).count();
        assert_eq!(sink.lines().len(), expected, "threshold {}", threshold);
    }
}

#[test]
fn test_set_level_takes_effect_immediately() {
    let (logger, sink) = capture(Level::Info);

    logger.debugf(format_args!("{}", "test debug"));
    assert!(sink.lines().is_empty());

    logger.set_level(Level::Debug);
    logger.debugf(format_args!("{}", "test level changed to debug"));
    assert_eq!(sink.records().unwrap()[0]["msg"], "test level changed to debug");

    logger.set_level(Level::Error);
    logger.warn("muted again", &[]);
    assert_eq!(sink.lines().len(), 1);
}

#[test]
fn test_shared_atomic_level_across_loggers() {
    let level = AtomicLevel::new(Level::Warn);
    let first = MemorySink::new();
    let second = MemorySink::new();
    let a = Logger::with_atomic_level(first.clone(), level.clone(), []);
    let b = Logger::builder()
        .sink(second.clone())
        .atomic_level(level.clone())
        .build()
        .unwrap();

    a.info("dropped", &[]);
    b.info("dropped", &[]);
    level.set(Level::Info);
    a.info("kept", &[]);
    b.info("kept", &[]);

    assert_eq!(first.lines().len(), 1);
    assert_eq!(second.lines().len(), 1);
}

#[test]
fn test_with_fields_on_every_record() {
    let (parent, sink) = capture(Level::Info);
    let child = parent.with(&[field::string("component", "kafka"), field::int("partition", 4)]);
    let grandchild = child.with(&[field::bool("retry", true)]);

    child.info("one", &[]);
    grandchild.info("two", &[field::uint("offset", 42)]);
    parent.info("three", &[]);

    let records = sink.records().unwrap();
    assert_eq!(records[0]["component"], "kafka");
    assert_eq!(records[1]["partition"], 4);
    assert_eq!(records[1]["retry"], true);
    assert_eq!(records[1]["offset"], 42);
    assert!(records[2].get("component").is_none());
}

#[test]
fn test_stacktrace_above_threshold() {
    let sink = MemorySink::new();
    let logger = Logger::new(sink.clone(), Level::Info, [add_stacktrace(Level::Error)]);

    logger.warn("no trace", &[]);
    logger.error("with trace", &[]);

    let records = sink.records().unwrap();
    assert!(records[0].get("stacktrace").is_none());
    assert!(records[1]["stacktrace"].is_string());
}

#[test]
fn test_named_logger() {
    let (logger, sink) = capture(Level::Info);
    logger.named("broker").named("producer").info("sent", &[]);
    assert_eq!(sink.records().unwrap()[0]["logger"], "broker.producer");
}

#[test]
fn test_panic_is_interceptable_even_when_filtered() {
    let (logger, sink) = capture(Level::Fatal);

    let payload = catch_unwind(AssertUnwindSafe(|| {
        logger.panic("filtered but still panics", &[]);
    }))
    .unwrap_err();

    assert!(payload.downcast_ref::<LogPanic>().is_some());
    assert!(sink.lines().is_empty());
}

#[test]
fn test_fatal_flushes_buffered_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("fatal.log");

    let logger = Logger::new(
        FileSink::open(&log_file).expect("Failed to open log file"),
        Level::Info,
        [on_fatal(FatalAction::Panic)],
    );

    logger.info("before the end", &[]);
    let _ = catch_unwind(AssertUnwindSafe(|| {
        logger.fatalf(format_args!("config {} missing", "app.toml"));
    }));

    // Readable without dropping the logger: fatal synced the buffer
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("config app.toml missing"));
    assert_eq!(logger.metrics().sync_count(), 1);
}

#[test]
fn test_file_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("demo1.log");

    let logger = Logger::new(
        FileSink::open(&log_file).expect("Failed to open log file"),
        Level::Info,
        [with_caller(true), add_caller_skip(0)],
    );
    {
        let _guard = logger.sync_guard();
        for i in 0..10 {
            logger.info("tick", &[field::int("i", i)]);
        }
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    for (i, line) in content.lines().enumerate() {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["i"], i as i64);
    }
    assert_eq!(content.lines().count(), 10);
}

#[cfg(feature = "async-sink")]
#[test]
fn test_async_sink_behind_logger() {
    let memory = MemorySink::new();
    let logger = Logger::new(AsyncSink::new(memory.clone(), 16), Level::Debug, []);

    for i in 0..200 {
        logger.debug("queued", &[field::int("n", i)]);
    }
    logger.sync().unwrap();

    let records = memory.records().unwrap();
    assert_eq!(records.len(), 200);
    assert_eq!(records[199]["n"], 199);
}

#[test]
fn test_sync_error_is_returned() {
    struct Unflushable;

    impl Sink for Unflushable {
        fn write(&mut self, _line: &[u8]) -> Result<()> {
            Ok(())
        }

        fn sync(&mut self) -> Result<()> {
            Err(LoggerError::other("broker closed"))
        }

        fn name(&self) -> &str {
            "unflushable"
        }
    }

    let logger = Logger::new(Unflushable, Level::Info, []);
    logger.info("buffered", &[]);

    let err = logger.sync().unwrap_err();
    assert_eq!(err.to_string(), "broker closed");
}

#[cfg(feature = "async-sink")]
#[test]
fn test_config_built_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("configured.log");
    let json = format!(
        r#"{{"level": "debug", "name": "svc", "output": {{"file": {}}}, "async_buffer": 8}}"#,
        serde_json::to_string(&log_file).unwrap()
    );

    let logger = LoggerConfig::from_json(&json).unwrap().build().unwrap();
    logger.debug("configured", &[]);
    logger.sync().unwrap();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let record: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(record["logger"], "svc");
    assert_eq!(record["level"], "debug");
}
