//! Call-site resolution
//!
//! Every emitting method in the crate is `#[track_caller]`, so
//! [`Location::caller`] already names the first frame outside the facade.
//! A non-zero caller skip moves that many frames further out, which needs a
//! captured backtrace. When the backtrace cannot be symbolized (stripped
//! binaries, missing debug info) the tracked location is used as is and a
//! one-time warning is printed. Release builds keep the skip working with
//! `debug = "line-tables-only"` in the profile.

use serde::{Serialize, Serializer};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

static SKIP_WARNED: AtomicBool = AtomicBool::new(false);

/// Source location reported in the `caller` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Resolve the caller `skip` frames outward from `location`.
    pub fn resolve(location: &'static Location<'static>, skip: usize) -> Self {
        if skip == 0 {
            return Self::from(location);
        }
        let trace = Backtrace::force_capture().to_string();
        let frames = parse_frames(&trace);
        match select_frame(&frames, location.file(), location.line(), skip) {
            Some(caller) => caller,
            None => {
                warn_unresolved_skip(skip);
                Self::from(location)
            }
        }
    }

    /// `dir/file.rs:line`, keeping only the last two path components.
    pub fn short(&self) -> String {
        let file = self.file.replace('\\', "/");
        let trimmed = match file.rmatch_indices('/').nth(1) {
            Some((idx, _)) => &file[idx + 1..],
            None => file.as_str(),
        };
        format!("{}:{}", trimmed, self.line)
    }
}

impl From<&Location<'_>> for Caller {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

impl Serialize for Caller {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.short())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub symbol: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Parse the textual form of a `std::backtrace::Backtrace`.
///
/// Frames look like `  12: symbol` followed by an optional
/// `at path/to/file.rs:LINE:COL` line.
pub(crate) fn parse_frames(trace: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for raw in trace.lines() {
        let line = raw.trim_start();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    let (file, line) = split_location(location);
                    frame.file = file;
                    frame.line = line;
                }
            }
            continue;
        }

        if let Some((index, symbol)) = line.split_once(": ") {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                frames.push(Frame {
                    symbol: symbol.trim().to_string(),
                    file: None,
                    line: None,
                });
            }
        }
    }

    frames
}

fn split_location(location: &str) -> (Option<String>, Option<u32>) {
    let mut parts = location.trim().rsplitn(3, ':');
    let _column = parts.next();
    let line = parts.next().and_then(|l| l.parse().ok());
    let file = parts.next().map(str::to_string);
    match (file, line) {
        (Some(file), Some(line)) => (Some(file), Some(line)),
        _ => (None, None),
    }
}

/// Print the fallback warning once per process. Returns whether it printed.
fn warn_unresolved_skip(skip: usize) -> bool {
    if SKIP_WARNED.swap(true, Ordering::Relaxed) {
        return false;
    }
    eprintln!(
        "[LOGGER WARNING] Caller skip of {} could not be resolved (no line tables in the \
         backtrace); reporting the direct call site. Build with debug = \"line-tables-only\" \
         or mark wrapper functions #[track_caller].",
        skip
    );
    true
}

/// Find the frame at `file:line` and step `skip` located frames outward.
pub(crate) fn select_frame(
    frames: &[Frame],
    file: &str,
    line: u32,
    skip: usize,
) -> Option<Caller> {
    if skip == 0 {
        return Some(Caller::new(file, line));
    }
    let wanted = file.replace('\\', "/");
    let start = frames.iter().position(|frame| match (&frame.file, frame.line) {
        (Some(f), Some(l)) => l == line && f.replace('\\', "/").ends_with(&wanted),
        _ => false,
    })?;

    frames[start + 1..]
        .iter()
        .filter_map(|frame| match (&frame.file, frame.line) {
            (Some(file), Some(line)) => Some(Caller::new(file.clone(), line)),
            _ => None,
        })
        .nth(skip - 1)
}
