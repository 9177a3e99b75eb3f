//! The zoo's event journal.
//!
//! Every state change the zoo makes is described by one human-readable line
//! handed to an [`EventLog`]. The journal is a record for people, not a
//! recovery mechanism, so write failures are reported through `log` and
//! never reach the caller.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Header line of a CSV journal.
pub const CSV_HEADER: &str = "timestamp,action";

/// Timestamp layout used for journal rows, e.g. `2026:Oct:16 09:05:33`.
pub const TIMESTAMP_FORMAT: &str = "%Y:%b:%d %H:%M:%S";

/// Sink for journal messages.
pub trait EventLog: Send + Sync {
    /// Records one action. Must not fail.
    fn log_message(&self, message: &str);
}

/// Formats a timestamp the way journal rows carry it.
#[must_use]
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Append-only CSV file journal.
#[derive(Debug)]
pub struct CsvJournal {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl CsvJournal {
    /// Opens `path` for appending, writing the header if the file is new or empty.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be opened or the header cannot be written.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        if writer.get_ref().metadata()?.len() == 0 {
            writeln!(writer, "{CSV_HEADER}")?;
            writer.flush()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, message: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "poisoned lock: journal"))?;
        let stamp = format_timestamp(&Local::now());
        writeln!(writer, "{stamp},{}", csv_field(message))?;
        writer.flush()
    }
}

impl EventLog for CsvJournal {
    fn log_message(&self, message: &str) {
        if let Err(e) = self.append(message) {
            log::warn!("journal {}: failed to record {message:?}: {e}", self.path.display());
        }
    }
}

/// Journal that keeps messages in memory. Useful in tests.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    lines: Mutex<Vec<String>>,
}

impl MemoryJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// True if any recorded message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .map(|l| l.iter().any(|line| line.contains(needle)))
            .unwrap_or(false)
    }
}

impl EventLog for MemoryJournal {
    fn log_message(&self, message: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(message.to_string()),
            Err(_) => log::warn!("memory journal lock poisoned; dropped {message:?}"),
        }
    }
}

/// Journal that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl EventLog for NullJournal {
    fn log_message(&self, _message: &str) {}
}
