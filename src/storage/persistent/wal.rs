//! Write-ahead log for the zoo records.
//!
//! Every store mutation is appended here before it is applied to the
//! in-memory snapshot, and the whole log is replayed on open.
//!
//! # File Format
//! ```text
//! [MAGIC: 4 bytes][VERSION: 1 byte]
//! [ENTRY 1: codec-encoded WalEntry]
//! [ENTRY 2: codec-encoded WalEntry]
//! ...
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{
    BufReader, BufWriter, Error as IoError, ErrorKind, Read, Result as IoResult, Seek, SeekFrom,
    Write,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::animal::{Animal, AnimalId};
use crate::habitat::{Habitat, HabitatId};
use crate::storage::memory::ZooRecords;
use crate::storage::traits::Placement;

use super::codec;

const HEADER_LEN: u64 = 5;

fn lock<'a, T>(mutex: &'a Mutex<T>, context: &'static str) -> IoResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| IoError::new(ErrorKind::Other, format!("poisoned lock: {context}")))
}

/// A single entry in the write-ahead log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WalEntry {
    /// Monotonically increasing sequence number.
    pub sequence: u64,
    /// When this entry was written.
    pub timestamp: DateTime<Utc>,
    /// The mutation being logged.
    pub kind: WalEntryKind,
}

/// One logged store mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum WalEntryKind {
    AnimalSave(Animal),
    HabitatSave(Habitat),
    AnimalUsed { id: AnimalId, used: bool },
    HabitatUsed { id: HabitatId, used: bool },
    HabitatName { id: HabitatId, name: String },
    Attributes { balance: u32, current_day: u32 },
    AssociationSave(Placement),
    AssociationRemove(Placement),

    /// Full state written by compaction; replaces everything before it.
    Snapshot(ZooRecords),
}

/// Append-only log file. Thread-safe via internal mutexes.
#[derive(Debug)]
pub(crate) struct WriteAheadLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    current_sequence: Mutex<u64>,
    sync_on_write: bool,
}

impl WriteAheadLog {
    /// Opens or creates a log file.
    ///
    /// A new file gets a header. An existing file is scanned for its last
    /// sequence number; a torn final entry left by a crash is cut off so
    /// later appends start on a frame boundary.
    ///
    /// # Errors
    /// `InvalidData` if an entry fails its checksum, or if an unreadable
    /// entry is followed by intact newer ones.
    pub fn open(path: &Path, sync_on_write: bool) -> IoResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let current_sequence = if file.metadata()?.len() >= HEADER_LEN {
            let (last, valid_len) = Self::scan(path)?;
            let actual_len = file.metadata()?.len();
            if valid_len < actual_len {
                let mut tail = Vec::new();
                let mut reader = &file;
                reader.seek(SeekFrom::Start(valid_len))?;
                reader.read_to_end(&mut tail)?;
                if holds_later_entry(&tail, last) {
                    log::error!(
                        "wal {}: unreadable entry after sequence {last} with newer entries \
                         in the {} bytes behind it",
                        path.display(),
                        tail.len()
                    );
                    return Err(IoError::new(
                        ErrorKind::InvalidData,
                        format!("unreadable entry at offset {valid_len} precedes intact entries"),
                    ));
                }
                log::warn!(
                    "wal {}: dropping {} bytes of torn tail after sequence {last}",
                    path.display(),
                    actual_len - valid_len
                );
                file.set_len(valid_len)?;
                file.sync_all()?;
            }
            last
        } else {
            let mut file = file;
            file.set_len(0)?;
            codec::write_header(&mut file)?;
            if sync_on_write {
                file.sync_all()?;
            }
            0
        };

        let file = OpenOptions::new().append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
            current_sequence: Mutex::new(current_sequence),
            sync_on_write,
        })
    }

    /// Appends an entry and returns its sequence number.
    pub fn append(&self, kind: WalEntryKind) -> IoResult<u64> {
        let mut writer = lock(&self.writer, "wal.writer")?;
        let mut seq_guard = lock(&self.current_sequence, "wal.sequence")?;

        let candidate = *seq_guard + 1;
        let entry = WalEntry {
            sequence: candidate,
            timestamp: Utc::now(),
            kind,
        };
        let encoded = codec::encode(&entry)?;

        writer.write_all(&encoded)?;
        writer.flush()?;
        if self.sync_on_write {
            writer.get_ref().sync_all()?;
        }

        *seq_guard = candidate;
        Ok(candidate)
    }

    /// Replaces the whole log with a single entry.
    ///
    /// The new log is written beside the old one and renamed over it, so a
    /// crash leaves either the old log or the new one intact.
    pub fn rewrite(&self, kind: WalEntryKind) -> IoResult<u64> {
        let mut writer = lock(&self.writer, "wal.writer")?;
        let mut seq_guard = lock(&self.current_sequence, "wal.sequence")?;
        writer.flush()?;

        let tmp_path = self.path.with_extension("wal.tmp");
        {
            let mut tmp = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            codec::write_header(&mut tmp)?;
            let entry = WalEntry {
                sequence: 1,
                timestamp: Utc::now(),
                kind,
            };
            tmp.write_all(&codec::encode(&entry)?)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        *writer = BufWriter::new(OpenOptions::new().append(true).open(&self.path)?);
        *seq_guard = 1;
        Ok(1)
    }

    /// Iterates over every entry, oldest first.
    pub fn iter(&self) -> IoResult<WalIterator> {
        WalIterator::new(&self.path)
    }

    pub fn current_sequence(&self) -> u64 {
        lock(&self.current_sequence, "wal.sequence").map_or(0, |s| *s)
    }

    pub fn size_bytes(&self) -> IoResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    /// Returns the last good sequence number and the byte length it ends at.
    fn scan(path: &Path) -> IoResult<(u64, u64)> {
        let mut iter = WalIterator::new(path)?;
        let mut last_seq = 0;
        let mut valid_len = HEADER_LEN;
        while let Some(entry) = iter.next() {
            match entry {
                Ok(entry) => {
                    last_seq = entry.sequence;
                    valid_len = iter.position()?;
                }
                Err(e) => {
                    log::error!("wal {}: corruption after sequence {last_seq}: {e}", path.display());
                    return Err(e);
                }
            }
        }
        Ok((last_seq, valid_len))
    }
}

/// True if a complete entry newer than `after` starts anywhere in `tail`
/// past its first byte.
///
/// A crash can only tear the last entry, so its leftovers never contain one.
fn holds_later_entry(tail: &[u8], after: u64) -> bool {
    (1..tail.len()).any(|offset| {
        let mut rest = &tail[offset..];
        codec::frame_len(rest).is_some_and(|len| len <= rest.len())
            && codec::decode::<WalEntry>(&mut rest).is_ok_and(|entry| entry.sequence > after)
    })
}

/// Iterator over log entries.
///
/// A truncated final frame ends iteration; any other decode failure is
/// yielded as an error.
pub(crate) struct WalIterator {
    reader: BufReader<File>,
    file_size: u64,
}

impl WalIterator {
    fn new(path: &Path) -> IoResult<Self> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        codec::read_header(&mut reader)?;
        Ok(Self { reader, file_size })
    }

    fn position(&mut self) -> IoResult<u64> {
        self.reader.stream_position()
    }
}

impl Iterator for WalIterator {
    type Item = IoResult<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.position() {
            Ok(pos) if pos >= self.file_size => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e)),
        }

        match codec::decode(&mut self.reader) {
            Ok(entry) => Some(Ok(entry)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }
}
