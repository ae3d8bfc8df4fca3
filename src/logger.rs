//! Process-wide logger.
//!
//! Records go through `simple_logger` to stderr, except while the TUI owns the
//! terminal: then they are held in memory and printed once it is restored.
//! Only the most recent [`MAX_BUFFERED_LINES`] are kept.

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use simple_logger::SimpleLogger;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const MAX_BUFFERED_LINES: usize = 1000;

static BUFFER: Mutex<Option<VecDeque<String>>> = Mutex::new(None);

struct BufferedLogger {
    inner: SimpleLogger,
}

impl Log for BufferedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{:<5} [{}] {}", record.level(), record.target(), record.args());
        if !buffer(line) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the logger. `verbose` turns on debug output for this crate;
/// dependencies stay at warn.
pub fn init(verbose: bool) -> Result<()> {
    let own_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let inner = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("pr_dash", own_level)
        .without_timestamps();

    log::set_max_level(inner.max_level());
    log::set_boxed_logger(Box::new(BufferedLogger { inner }))
        .context("Failed to install logger")?;
    Ok(())
}

/// Start holding log output in memory
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(VecDeque::new());
    }
}

/// Stop buffering and return everything collected, oldest first
pub fn drain() -> Vec<String> {
    BUFFER
        .lock()
        .ok()
        .and_then(|mut guard| guard.take())
        .map(Vec::from)
        .unwrap_or_default()
}

/// Store `line` if buffering is active. Returns false when the caller should
/// print it instead.
fn buffer(line: String) -> bool {
    match BUFFER.lock() {
        Ok(mut guard) => match guard.as_mut() {
            Some(buf) => {
                if buf.len() >= MAX_BUFFERED_LINES {
                    buf.pop_front();
                }
                buf.push_back(line);
                true
            }
            None => false,
        },
        Err(_) => false,
    }
}
