//! Asynchronous sink wrapper
//!
//! Moves writes to a worker thread so slow destinations (remote collectors,
//! message queues) do not stall the logging thread. Lines travel over a
//! bounded channel; `sync` is a barrier that returns once everything queued
//! before it has been written and the inner sink flushed.

use crate::core::{LoggerError, Result, Sink};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout when the sink is dropped (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const BATCH_SIZE: usize = 64;

enum Command {
    Write(Vec<u8>),
    Sync(Sender<Result<()>>),
}

pub struct AsyncSink {
    sender: Option<Sender<Command>>,
    handle: Option<thread::JoinHandle<()>>,
    name: String,
}

impl AsyncSink {
    /// Wrap `inner`, queueing at most `buffer_size` lines.
    ///
    /// A full queue blocks the writer rather than dropping records.
    pub fn new<S: Sink + 'static>(inner: S, buffer_size: usize) -> Self {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let name = format!("async({})", inner.name());

        let spawned = thread::Builder::new()
            .name("log-sink".to_string())
            .spawn(move || Self::run(inner, receiver));
        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to spawn async sink worker: {}", e);
                None
            }
        };

        Self {
            // Without a worker there is nobody to receive.
            sender: handle.as_ref().map(|_| sender),
            handle,
            name,
        }
    }

    fn run<S: Sink>(mut inner: S, receiver: Receiver<Command>) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        // First write failure since the last sync, reported by the next sync.
        let mut pending_error: Option<LoggerError> = None;

        while let Ok(command) = receiver.recv() {
            batch.push(command);
            while batch.len() < BATCH_SIZE {
                match receiver.try_recv() {
                    Ok(command) => batch.push(command),
                    Err(_) => break,
                }
            }

            for command in batch.drain(..) {
                match command {
                    Command::Write(line) => {
                        if let Err(e) = inner.write(&line) {
                            eprintln!(
                                "[LOGGER ERROR] Async sink '{}' write failed: {}",
                                inner.name(),
                                e
                            );
                            pending_error.get_or_insert(e);
                        }
                    }
                    Command::Sync(ack) => {
                        let result = match pending_error.take() {
                            Some(e) => {
                                let _ = inner.sync();
                                Err(e)
                            }
                            None => inner.sync(),
                        };
                        let _ = ack.send(result);
                    }
                }
            }
        }

        // Channel closed: final flush of whatever the inner sink buffered
        if let Err(e) = inner.sync() {
            eprintln!("[LOGGER ERROR] Async sink '{}' final flush failed: {}", inner.name(), e);
        }
    }

    /// Close the queue and wait up to `timeout` for the worker to drain it.
    ///
    /// Returns `true` if the worker finished in time.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.handle.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Async sink worker panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Async sink worker did not finish within {:?}. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.sender.as_ref().ok_or(LoggerError::ChannelSendError)
    }
}

impl Sink for AsyncSink {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        self.sender()?
            .send(Command::Write(line.to_vec()))
            .map_err(|_| LoggerError::ChannelSendError)
    }

    fn sync(&mut self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender()?
            .send(Command::Sync(ack_tx))
            .map_err(|_| LoggerError::ChannelSendError)?;
        ack_rx.recv().map_err(|_| LoggerError::ChannelReceiveError)?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
